#![cfg(feature = "cli")]

use seqwire::cli::{CliError, FoldOptions, SerializeOptions, execute_fold, execute_serialize};
use seqwire::*;

fn person() -> Type {
    Type::named("Person")
}

fn adults_query() -> Expr {
    QueryBuilder::from_source("people", person())
        .filter(|x| {
            Expr::binary(
                BinaryOp::GreaterThanOrEqual,
                Expr::member(x.clone(), "Age", person(), Type::Int32),
                Expr::binary(
                    BinaryOp::Add,
                    Expr::constant(Value::Int32(17)),
                    Expr::constant(Value::Int32(1)),
                ),
            )
        })
        .take(10)
        .build()
}

fn to_json(expr: &Expr) -> String {
    serde_json::to_string(expr).unwrap()
}

// ============================================================================
// Serialize Command
// ============================================================================

#[test]
fn test_serialize_parts() {
    let options = SerializeOptions {
        input: Some(to_json(&adults_query())),
        ..Default::default()
    };
    assert_eq!(
        execute_serialize(&options).unwrap(),
        "where: (it.Age>=18)\ntake: 10"
    );
}

#[test]
fn test_serialize_url() {
    let options = SerializeOptions {
        input: Some(to_json(&adults_query())),
        format: OutputFormat::Url,
        pretty: false,
    };
    assert_eq!(
        execute_serialize(&options).unwrap(),
        "$where=%28it.Age%3E%3D18%29&$take=10"
    );
}

#[test]
fn test_serialize_without_input() {
    let result = execute_serialize(&SerializeOptions::default());
    assert!(matches!(result, Err(CliError::NoInput)));
}

#[test]
fn test_serialize_rejects_bad_json() {
    let options = SerializeOptions {
        input: Some("{not json".to_string()),
        ..Default::default()
    };
    assert!(matches!(execute_serialize(&options), Err(CliError::Json(_))));
}

#[test]
fn test_serialize_reports_unsupported_queries() {
    let query = QueryBuilder::from_source("people", person())
        .filter(|x| {
            Expr::binary(
                BinaryOp::And,
                Expr::member(x.clone(), "Flags", person(), Type::Int32),
                Expr::constant(Value::Int32(4)),
            )
        })
        .build();
    let options = SerializeOptions {
        input: Some(to_json(&query)),
        ..Default::default()
    };
    assert!(matches!(
        execute_serialize(&options),
        Err(CliError::Serialize(SerializeError::BitwiseOperator))
    ));
}

// ============================================================================
// Fold Command
// ============================================================================

#[test]
fn test_fold_returns_folded_tree() {
    let options = FoldOptions {
        input: Some(to_json(&adults_query())),
        pretty: false,
    };
    let folded: Expr = serde_json::from_str(&execute_fold(&options).unwrap()).unwrap();

    let expected = QueryBuilder::from_source("people", person())
        .filter(|x| {
            Expr::binary(
                BinaryOp::GreaterThanOrEqual,
                Expr::member(x.clone(), "Age", person(), Type::Int32),
                Expr::constant(Value::Int32(18)),
            )
        })
        .take(10)
        .build();
    assert_eq!(folded, expected);
}

#[test]
fn test_fold_propagates_evaluation_errors() {
    let expr = Expr::binary(
        BinaryOp::Divide,
        Expr::constant(Value::Int32(1)),
        Expr::constant(Value::Int32(0)),
    );
    let options = FoldOptions {
        input: Some(to_json(&expr)),
        pretty: true,
    };
    assert!(matches!(
        execute_fold(&options),
        Err(CliError::Eval(EvalError::DivisionByZero))
    ));
}
