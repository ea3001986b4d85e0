use rust_decimal::Decimal;
use seqwire::interpreter::evaluate;
use seqwire::value::temporal::MAX_TICKS;
use seqwire::value::{DateTimeOffset, TimeSpan};
use seqwire::*;

fn int(n: i32) -> Expr {
    Expr::constant(Value::Int32(n))
}

fn double(n: f64) -> Expr {
    Expr::constant(Value::Double(n))
}

fn string(s: &str) -> Expr {
    Expr::constant(Value::string(s))
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(op, left, right)
}

fn static_call(ty: Type, name: &str, ret: Type, args: Vec<Expr>) -> Expr {
    Expr::static_call(Method::new(ty, name, ret), args)
}

fn call(target: Expr, ty: Type, name: &str, ret: Type, args: Vec<Expr>) -> Expr {
    Expr::call(target, Method::new(ty, name, ret), args)
}

fn date(year: i32, month: i32, day: i32) -> Expr {
    Expr::new_object(Type::DateTime, vec![int(year), int(month), int(day)])
}

fn eval(expr: &Expr) -> Value {
    evaluate(expr).unwrap()
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval(&binary(BinaryOp::Add, int(2), int(3))), Value::Int32(5));
    assert_eq!(eval(&binary(BinaryOp::Divide, int(7), int(2))), Value::Int32(3));
    assert_eq!(eval(&binary(BinaryOp::Modulo, int(7), int(2))), Value::Int32(1));
}

#[test]
fn test_mixed_operands_promote() {
    assert_eq!(eval(&binary(BinaryOp::Add, int(1), double(0.5))), Value::Double(1.5));
}

#[test]
fn test_integer_overflow_is_an_error() {
    let expr = binary(BinaryOp::Add, int(i32::MAX), int(1));
    assert!(matches!(evaluate(&expr), Err(EvalError::Overflow(_))));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        evaluate(&binary(BinaryOp::Divide, int(1), int(0))),
        Err(EvalError::DivisionByZero)
    );
    let decimal_zero = Expr::constant(Value::Decimal(Decimal::ZERO));
    assert_eq!(
        evaluate(&binary(BinaryOp::Modulo, Expr::constant(Value::Decimal(Decimal::ONE)), decimal_zero)),
        Err(EvalError::DivisionByZero)
    );
}

#[test]
fn test_decimal_arithmetic_is_exact() {
    let sum = binary(
        BinaryOp::Add,
        Expr::constant(Value::Decimal(Decimal::new(110, 2))),
        Expr::constant(Value::Decimal(Decimal::new(2205, 3))),
    );
    assert_eq!(eval(&sum), Value::Decimal(Decimal::new(3305, 3)));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        eval(&binary(BinaryOp::Add, string("Room "), int(12))),
        Value::string("Room 12")
    );
}

#[test]
fn test_short_circuit_skips_right_operand() {
    // the right side would divide by zero
    let guarded = binary(
        BinaryOp::AndAlso,
        Expr::constant(Value::Boolean(false)),
        binary(
            BinaryOp::Equal,
            binary(BinaryOp::Divide, int(1), int(0)),
            int(1),
        ),
    );
    assert_eq!(eval(&guarded), Value::Boolean(false));
}

#[test]
fn test_lifted_comparison_with_null() {
    let expr = binary(BinaryOp::LessThan, Expr::constant(Value::Null), int(3));
    assert_eq!(eval(&expr), Value::Boolean(false));
}

#[test]
fn test_conditional() {
    let expr = Expr::conditional(
        binary(BinaryOp::GreaterThan, int(3), int(2)),
        string("yes"),
        string("no"),
    );
    assert_eq!(eval(&expr), Value::string("yes"));
}

// ============================================================================
// Members and Closures
// ============================================================================

#[test]
fn test_captured_variable_reads() {
    let closure = Expr::constant(Value::object("Closure", [("limit", Value::Int32(40))]));
    let read = Expr::member(closure, "limit", Type::named("Closure"), Type::Int32);
    assert_eq!(eval(&read), Value::Int32(40));
}

#[test]
fn test_missing_member() {
    let closure = Expr::constant(Value::object("Closure", [("limit", Value::Int32(40))]));
    let read = Expr::member(closure, "other", Type::named("Closure"), Type::Int32);
    assert!(matches!(evaluate(&read), Err(EvalError::UnknownMember(_))));
}

#[test]
fn test_parameters_are_unbound() {
    let expr = Expr::parameter("x", Type::Int32);
    assert_eq!(evaluate(&expr), Err(EvalError::UnboundParameter("x".into())));
}

#[test]
fn test_nullable_members() {
    let null = Expr::typed_constant(Value::Null, Type::nullable(Type::Int32));
    let has_value = Expr::member(null.clone(), "HasValue", Type::nullable(Type::Int32), Type::Boolean);
    assert_eq!(eval(&has_value), Value::Boolean(false));

    let value = Expr::member(null, "Value", Type::nullable(Type::Int32), Type::Int32);
    assert!(matches!(evaluate(&value), Err(EvalError::NullReference(_))));
}

#[test]
fn test_member_init_sets_fields() {
    let init = Expr::member_init(
        Expr::new_object(Type::named("Range"), vec![]),
        vec![("Low".to_string(), int(1)), ("High".to_string(), int(9))],
    );
    assert_eq!(
        eval(&init),
        Value::object("Range", [("High", Value::Int32(9)), ("Low", Value::Int32(1))])
    );
}

// ============================================================================
// String Methods
// ============================================================================

#[test]
fn test_string_methods() {
    let name = || string("  Ada Lovelace ");
    let trimmed = call(name(), Type::String, "Trim", Type::String, vec![]);
    assert_eq!(eval(&trimmed), Value::string("Ada Lovelace"));

    let upper = call(trimmed.clone(), Type::String, "ToUpper", Type::String, vec![]);
    assert_eq!(eval(&upper), Value::string("ADA LOVELACE"));

    let index = call(trimmed.clone(), Type::String, "IndexOf", Type::Int32, vec![string("Love")]);
    assert_eq!(eval(&index), Value::Int32(4));

    let sub = call(trimmed, Type::String, "Substring", Type::String, vec![int(0), int(3)]);
    assert_eq!(eval(&sub), Value::string("Ada"));
}

#[test]
fn test_substring_out_of_range() {
    let sub = call(string("abc"), Type::String, "Substring", Type::String, vec![int(2), int(5)]);
    assert!(evaluate(&sub).is_err());
}

#[test]
fn test_string_compare() {
    let compare = |a: &str, b: &str, ignore_case: bool| {
        static_call(
            Type::String,
            "Compare",
            Type::Int32,
            vec![string(a), string(b), Expr::constant(Value::Boolean(ignore_case))],
        )
    };
    assert_eq!(eval(&compare("a", "B", true)), Value::Int32(-1));
    assert_eq!(eval(&compare("abc", "ABC", true)), Value::Int32(0));
    assert_eq!(eval(&compare("a", "B", false)), Value::Int32(1));
}

#[test]
fn test_regex_methods() {
    let is_match = static_call(
        Type::Regex,
        "IsMatch",
        Type::Boolean,
        vec![string("order-1234"), string(r"\d{4}$")],
    );
    assert_eq!(eval(&is_match), Value::Boolean(true));

    let bad_pattern = static_call(Type::Regex, "IsMatch", Type::Boolean, vec![string("x"), string("(")]);
    assert!(matches!(evaluate(&bad_pattern), Err(EvalError::InvalidArgument(_))));
}

// ============================================================================
// Math and Convert
// ============================================================================

#[test]
fn test_math_functions() {
    let max = static_call(Type::Math, "Max", Type::Int32, vec![int(3), int(7)]);
    assert_eq!(eval(&max), Value::Int32(7));

    let abs = static_call(Type::Math, "Abs", Type::Int32, vec![int(-4)]);
    assert_eq!(eval(&abs), Value::Int32(4));

    let round = static_call(Type::Math, "Round", Type::Double, vec![double(2.5)]);
    assert_eq!(eval(&round), Value::Double(2.0));
}

#[test]
fn test_convert_rounds_to_even() {
    let to_int = |n: f64| static_call(Type::Convert, "ToInt32", Type::Int32, vec![double(n)]);
    assert_eq!(eval(&to_int(2.5)), Value::Int32(2));
    assert_eq!(eval(&to_int(3.5)), Value::Int32(4));
}

#[test]
fn test_explicit_conversion_checks_range() {
    let narrowed = Expr::convert(int(300), Type::Byte);
    assert!(matches!(evaluate(&narrowed), Err(EvalError::Overflow(_))));

    let widened = Expr::convert(int(300), Type::Int64);
    assert_eq!(eval(&widened), Value::Int64(300));
}

// ============================================================================
// Dates and Times
// ============================================================================

#[test]
fn test_date_arithmetic() {
    let leap = call(
        date(2020, 2, 28),
        Type::DateTime,
        "AddDays",
        Type::DateTime,
        vec![double(1.0)],
    );
    let day = Expr::member(leap, "Day", Type::DateTime, Type::Int32);
    assert_eq!(eval(&day), Value::Int32(29));
}

#[test]
fn test_add_months_clamps_day() {
    let next = call(date(2021, 1, 31), Type::DateTime, "AddMonths", Type::DateTime, vec![int(1)]);
    let day = Expr::member(next, "Day", Type::DateTime, Type::Int32);
    assert_eq!(eval(&day), Value::Int32(28));
}

#[test]
fn test_date_difference_is_a_timespan() {
    let span = binary(BinaryOp::Subtract, date(2020, 3, 1), date(2020, 2, 1));
    let days = Expr::member(span, "Days", Type::TimeSpan, Type::Int32);
    assert_eq!(eval(&days), Value::Int32(29));
}

#[test]
fn test_timespan_factories() {
    let span = static_call(Type::TimeSpan, "FromHours", Type::TimeSpan, vec![double(1.5)]);
    let minutes = Expr::member(span, "TotalMinutes", Type::TimeSpan, Type::Double);
    assert_eq!(eval(&minutes), Value::Double(90.0));
}

#[test]
fn test_offset_outside_fourteen_hours_is_rejected() {
    let clock = date(2020, 1, 1);
    let offset = static_call(Type::TimeSpan, "FromHours", Type::TimeSpan, vec![double(15.0)]);
    let built = Expr::new_object(Type::DateTimeOffset, vec![clock, offset]);
    assert!(matches!(evaluate(&built), Err(EvalError::InvalidArgument(_))));
}

#[test]
fn test_unvalidated_offset_reports_instead_of_overflowing() {
    // e.g. read straight from a deserialized tree
    let raw = || {
        Expr::constant(Value::DateTimeOffset(DateTimeOffset {
            ticks: MAX_TICKS,
            offset: TimeSpan::from_ticks(i64::MIN),
        }))
    };
    assert!(matches!(
        evaluate(&binary(BinaryOp::LessThan, raw(), raw())),
        Err(EvalError::TypeError(_))
    ));
    assert!(matches!(
        evaluate(&binary(BinaryOp::Subtract, raw(), raw())),
        Err(EvalError::Overflow(_))
    ));
    let utc = Expr::member(raw(), "UtcTicks", Type::DateTimeOffset, Type::Int64);
    assert!(matches!(evaluate(&utc), Err(EvalError::Overflow(_))));
}

#[test]
fn test_enum_has_flag() {
    let access = Expr::constant(Value::enumeration("Access", "Read, Write"));
    let has = |flag: &str| {
        call(
            access.clone(),
            Type::enumeration("Access"),
            "HasFlag",
            Type::Boolean,
            vec![Expr::constant(Value::enumeration("Access", flag))],
        )
    };
    assert_eq!(eval(&has("Write")), Value::Boolean(true));
    assert_eq!(eval(&has("Delete")), Value::Boolean(false));
}

#[test]
fn test_unknown_method() {
    let expr = static_call(Type::Math, "Cbrt", Type::Double, vec![double(8.0)]);
    assert!(matches!(evaluate(&expr), Err(EvalError::UnknownMethod(_))));
}
