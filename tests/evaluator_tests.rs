use seqwire::*;

fn person() -> Type {
    Type::named("Person")
}

fn x() -> Expr {
    Expr::parameter("x", person())
}

fn prop(name: &str, ty: Type) -> Expr {
    Expr::member(x(), name, person(), ty)
}

fn int(n: i32) -> Expr {
    Expr::constant(Value::Int32(n))
}

fn add(left: Expr, right: Expr) -> Expr {
    Expr::binary(BinaryOp::Add, left, right)
}

fn fold(expr: &Expr) -> Expr {
    partially_evaluate(expr, can_be_evaluated_locally).unwrap()
}

fn fold_deferring_now(expr: &Expr) -> Expr {
    partially_evaluate(expr, can_be_evaluated_locally_deferring_now).unwrap()
}

fn now() -> Expr {
    Expr::static_member(Type::DateTime, "Now", Type::DateTime)
}

// ============================================================================
// Nomination
// ============================================================================

#[test]
fn test_constant_subtree_folds() {
    let expr = add(int(1), Expr::binary(BinaryOp::Multiply, int(2), int(3)));
    assert_eq!(fold(&expr), int(7));
}

#[test]
fn test_parameter_poisons_ancestors_only() {
    // (x.Age + (1 + 2)) > (3 * 4)
    let expr = Expr::binary(
        BinaryOp::GreaterThan,
        add(prop("Age", Type::Int32), add(int(1), int(2))),
        Expr::binary(BinaryOp::Multiply, int(3), int(4)),
    );
    assert_eq!(
        fold(&expr),
        Expr::binary(
            BinaryOp::GreaterThan,
            add(prop("Age", Type::Int32), int(3)),
            int(12),
        )
    );
}

#[test]
fn test_constants_are_returned_unchanged() {
    let typed = Expr::typed_constant(Value::Int32(5), Type::nullable(Type::Int32));
    assert_eq!(fold(&typed), typed);
}

#[test]
fn test_folded_constant_keeps_static_type() {
    let converted = Expr::convert(int(5), Type::nullable(Type::Int32));
    assert_eq!(
        fold(&converted),
        Expr::typed_constant(Value::Int32(5), Type::nullable(Type::Int32))
    );
}

#[test]
fn test_lambda_body_folds_but_lambda_stays() {
    let lambda = Expr::lambda(vec![], add(int(1), int(1)));
    assert_eq!(fold(&lambda), Expr::lambda(vec![], int(2)));
}

#[test]
fn test_query_root_is_never_folded() {
    let query = QueryBuilder::from_source("people", person()).take(5).build();
    assert_eq!(fold(&query), query);
}

#[test]
fn test_operator_arguments_fold_inside_chain() {
    let query = QueryBuilder::from_source("people", person())
        .filter(|x| {
            Expr::binary(
                BinaryOp::GreaterThan,
                Expr::member(x.clone(), "Age", person(), Type::Int32),
                add(int(20), int(1)),
            )
        })
        .build();
    let expected = QueryBuilder::from_source("people", person())
        .filter(|x| {
            Expr::binary(
                BinaryOp::GreaterThan,
                Expr::member(x.clone(), "Age", person(), Type::Int32),
                int(21),
            )
        })
        .build();
    assert_eq!(fold(&query), expected);
}

// ============================================================================
// Current Moment
// ============================================================================

#[test]
fn test_default_predicate_folds_now() {
    let folded = fold(&now());
    assert!(matches!(
        folded,
        Expr::Constant {
            value: Value::DateTime(_),
            ..
        }
    ));
}

#[test]
fn test_extended_predicate_defers_now() {
    assert_eq!(fold_deferring_now(&now()), now());

    let utc_offset = Expr::static_member(Type::DateTimeOffset, "UtcNow", Type::DateTimeOffset);
    assert_eq!(fold_deferring_now(&utc_offset), utc_offset);
}

#[test]
fn test_now_poisons_its_ancestors() {
    let tomorrow = Expr::call(
        now(),
        Method::new(Type::DateTime, "AddDays", Type::DateTime),
        vec![Expr::constant(Value::Double(1.0))],
    );
    assert_eq!(fold_deferring_now(&tomorrow), tomorrow);
}

#[test]
fn test_extended_predicate_still_folds_today() {
    let today = Expr::static_member(Type::DateTime, "Today", Type::DateTime);
    assert!(matches!(
        fold_deferring_now(&today),
        Expr::Constant {
            value: Value::DateTime(_),
            ..
        }
    ));
}

// ============================================================================
// Member Initialization
// ============================================================================

#[test]
fn test_member_init_folds_when_constant() {
    let init = Expr::member_init(
        Expr::new_object(Type::named("Filter"), vec![]),
        vec![("Min".to_string(), add(int(1), int(2)))],
    );
    assert_eq!(
        fold(&init),
        Expr::typed_constant(
            Value::object("Filter", [("Min", Value::Int32(3))]),
            Type::named("Filter")
        )
    );
}

#[test]
fn test_member_init_short_circuits_on_constant_allocation() {
    let init = Expr::member_init(
        Expr::new_object(Type::named("Filter"), vec![]),
        vec![("Min".to_string(), prop("Age", Type::Int32))],
    );
    assert_eq!(
        fold(&init),
        Expr::typed_constant(
            Value::object("Filter", Vec::<(String, Value)>::new()),
            Type::named("Filter")
        )
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_evaluation_errors_propagate_unchanged() {
    let expr = Expr::binary(BinaryOp::Divide, int(1), int(0));
    assert_eq!(
        partially_evaluate(&expr, can_be_evaluated_locally),
        Err(EvalError::DivisionByZero)
    );
}

#[test]
fn test_custom_predicate() {
    // never fold string literals' lengths
    let length = Expr::member(
        Expr::constant(Value::string("abc")),
        "Length",
        Type::String,
        Type::Int32,
    );
    let keep_members = |e: &Expr| can_be_evaluated_locally(e) && !matches!(e, Expr::MemberAccess { .. });
    assert_eq!(partially_evaluate(&length, keep_members).unwrap(), length);
    assert_eq!(fold(&length), int(3));
}
