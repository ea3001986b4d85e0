//! Renders a composed query into the ordered query options a remote
//! query parser understands.
//!
//! The query is normalized and partially evaluated first, so everything
//! that does not depend on the element parameter reaches the writer as a
//! literal. The writer then walks the operator chain from the outermost
//! call inwards, opening one [`QueryPart`] per recognized operator.

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{BinaryOp, Expr, Member, Method, QueryOperator, QueryPart, Type, UnaryOp},
    evaluator::{can_be_evaluated_locally_deferring_now, partially_evaluate},
    interpreter::{EvalError, invariant_string},
    normalizer::normalize,
    value::Value,
};

/// Errors raised while serializing a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializeError {
    #[error("Bitwise operators are not supported")]
    BitwiseOperator,

    #[error("Binary operator {0:?} is not supported")]
    UnsupportedBinaryOperator(BinaryOp),

    #[error("Unary operator {0:?} is not supported")]
    UnsupportedUnaryOperator(UnaryOp),

    /// A sequence operator outside where/orderby/thenby/skip/take/select
    #[error("Query operator '{0}' is not supported")]
    UnsupportedQueryOperator(String),

    #[error("Projections are not supported")]
    ProjectionNotSupported,

    #[error("Nested queries are not supported")]
    NestedQuery,

    #[error("Object construction is not supported in a query")]
    ObjectConstruction,

    #[error("Constants of type {0} are not supported")]
    UnsupportedConstantType(String),

    #[error("Method {0} is not accessible")]
    InaccessibleMethod(String),

    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// Folding a parameter-independent subtree failed
    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

/// Broad category of a [`SerializeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedOperator,
    UnsupportedQueryOperator,
    UnsupportedQueryShape,
    UnsupportedConstantType,
    InaccessibleMethod,
    MalformedQuery,
    Evaluation,
}

impl SerializeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SerializeError::BitwiseOperator
            | SerializeError::UnsupportedBinaryOperator(_)
            | SerializeError::UnsupportedUnaryOperator(_) => ErrorKind::UnsupportedOperator,
            SerializeError::UnsupportedQueryOperator(_) => ErrorKind::UnsupportedQueryOperator,
            SerializeError::ProjectionNotSupported
            | SerializeError::NestedQuery
            | SerializeError::ObjectConstruction => ErrorKind::UnsupportedQueryShape,
            SerializeError::UnsupportedConstantType(_) => ErrorKind::UnsupportedConstantType,
            SerializeError::InaccessibleMethod(_) => ErrorKind::InaccessibleMethod,
            SerializeError::MalformedQuery(_) => ErrorKind::MalformedQuery,
            SerializeError::Evaluation(_) => ErrorKind::Evaluation,
        }
    }
}

/// Serializes a composed query into its query parts, in application order.
///
/// # Examples
///
/// ```
/// use seqwire::{BinaryOp, Expr, QueryBuilder, Type, Value, serialize};
///
/// let person = Type::named("Person");
/// let query = QueryBuilder::from_source("people", person.clone())
///     .filter(|x| {
///         Expr::binary(
///             BinaryOp::GreaterThan,
///             Expr::member(x.clone(), "Age", person.clone(), Type::Int32),
///             Expr::constant(Value::Int32(5)),
///         )
///     })
///     .take(10)
///     .build();
///
/// let parts = serialize(&query).unwrap();
/// assert_eq!(parts[0].to_string(), "where: (it.Age>5)");
/// assert_eq!(parts[1].to_string(), "take: 10");
/// ```
pub fn serialize(query: &Expr) -> Result<Vec<QueryPart>, SerializeError> {
    let root = query.query_root();
    if !matches!(root, Expr::Constant { .. }) {
        return Err(SerializeError::MalformedQuery(format!(
            "the query root must be a constant data source, found {}",
            describe(root)
        )));
    }

    let normalized = normalize(query);
    let evaluated = partially_evaluate(&normalized, can_be_evaluated_locally_deferring_now)?;

    let mut writer = QueryWriter {
        root: evaluated.query_root(),
        parts: Vec::new(),
        current: OpenPart::default(),
        in_lambda: false,
    };
    writer.visit(&evaluated)?;

    // collected outermost call first
    let mut parts = writer.parts;
    parts.reverse();
    merge_secondary_orderings(parts)
}

/// Appends every `thenby` part onto the nearest preceding `orderby`.
fn merge_secondary_orderings(parts: Vec<QueryPart>) -> Result<Vec<QueryPart>, SerializeError> {
    let mut merged: Vec<QueryPart> = Vec::with_capacity(parts.len());
    for part in parts {
        if part.operator != QueryOperator::ThenBy {
            merged.push(part);
            continue;
        }
        let ordering = merged
            .iter_mut()
            .rev()
            .find(|p| p.operator == QueryOperator::OrderBy)
            .ok_or_else(|| {
                SerializeError::MalformedQuery("thenby without a preceding orderby".into())
            })?;
        ordering.expression.push_str(", ");
        ordering.expression.push_str(&part.expression);
    }
    Ok(merged)
}

/// The part being written and its text so far.
#[derive(Debug, Default)]
struct OpenPart {
    operator: Option<QueryOperator>,
    text: String,
}

struct QueryWriter<'q> {
    root: &'q Expr,
    parts: Vec<QueryPart>,
    current: OpenPart,
    in_lambda: bool,
}

impl QueryWriter<'_> {
    fn write(&mut self, text: &str) {
        self.current.text.push_str(text);
    }

    fn visit(&mut self, expr: &Expr) -> Result<(), SerializeError> {
        match expr {
            Expr::Parameter(_) => self.write("it"),
            Expr::Constant { .. } if std::ptr::eq(expr, self.root) => {}
            Expr::Constant { value, .. } => {
                let text = render_constant(value)?;
                self.write(&text);
            }
            Expr::MemberAccess { object, member } => self.visit_member(object.as_deref(), member)?,
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                if method.declaring_type.is_sequence_operator_provider() {
                    // operator chains only exist at the top level
                    if self.in_lambda {
                        return Err(SerializeError::NestedQuery);
                    }
                    self.visit_query_operator(method, args)?;
                } else {
                    self.visit_call(object.as_deref(), method, args)?;
                }
            }
            Expr::Binary {
                op, left, right, ..
            } => self.visit_binary(*op, left, right)?,
            Expr::Unary { op, operand, .. } => self.visit_unary(*op, operand)?,
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => {
                self.write("iif(");
                self.visit(test)?;
                self.write(",");
                self.visit(if_true)?;
                self.write(",");
                self.visit(if_false)?;
                self.write(")");
            }
            Expr::Lambda { body, .. } => {
                if self.in_lambda {
                    return Err(SerializeError::NestedQuery);
                }
                self.in_lambda = true;
                let result = self.visit(body);
                self.in_lambda = false;
                result?;
            }
            Expr::New { .. } | Expr::MemberInit { .. } => {
                return Err(SerializeError::ObjectConstruction);
            }
        }
        Ok(())
    }

    fn visit_query_operator(&mut self, method: &Method, args: &[Expr]) -> Result<(), SerializeError> {
        let source = args.first();

        if method.name.eq_ignore_ascii_case("select") {
            let identity = args
                .get(1)
                .and_then(unquote)
                .is_some_and(is_identity_lambda);
            if !identity {
                return Err(SerializeError::ProjectionNotSupported);
            }
            if let Some(source) = source {
                self.visit(source)?;
            }
            return Ok(());
        }

        let (operator, descending) = QueryOperator::from_method_name(&method.name)
            .ok_or_else(|| SerializeError::UnsupportedQueryOperator(method.name.clone()))?;

        let outer = std::mem::replace(
            &mut self.current,
            OpenPart {
                operator: Some(operator),
                text: String::new(),
            },
        );
        let written = self.write_arguments(args.iter().skip(1));
        let part = std::mem::replace(&mut self.current, outer);
        written?;

        let mut text = part.text;
        if descending {
            text.push_str(" desc");
        }
        debug!(%operator, expression = %text, "emitted query part");
        self.parts.push(QueryPart::new(operator, text));

        if let Some(source) = source {
            self.visit(source)?;
        }
        Ok(())
    }

    fn visit_call(
        &mut self,
        object: Option<&Expr>,
        method: &Method,
        args: &[Expr],
    ) -> Result<(), SerializeError> {
        if method.declaring_type == Type::EnumBase && method.name == "HasFlag" {
            if let (Some(target), [flag]) = (object, args) {
                self.write("(");
                self.visit(target)?;
                self.write(" has ");
                self.visit(flag)?;
                self.write(")");
                return Ok(());
            }
        }

        if !method.declaring_type.is_accessible() {
            return Err(SerializeError::InaccessibleMethod(format!(
                "{}.{}",
                method.declaring_type.name(),
                method.name
            )));
        }

        match object {
            // members of the element are in scope unqualified
            Some(target) if target.is_parameter() => {}
            Some(target) => {
                self.visit(target)?;
                self.write(".");
            }
            None => {
                self.write(&method.declaring_type.name());
                self.write(".");
            }
        }
        self.write(&method.name);
        self.write("(");
        self.write_arguments(args.iter())?;
        self.write(")");
        Ok(())
    }

    fn write_arguments<'e>(
        &mut self,
        args: impl Iterator<Item = &'e Expr>,
    ) -> Result<(), SerializeError> {
        for (i, arg) in args.enumerate() {
            if i > 0 {
                self.write(",");
            }
            self.visit(arg)?;
        }
        Ok(())
    }

    fn visit_member(&mut self, object: Option<&Expr>, member: &Member) -> Result<(), SerializeError> {
        match object {
            Some(target) if target.is_parameter() => self.write("it"),
            Some(target) => self.visit(target)?,
            None => self.write(&member.declaring_type.name()),
        }
        self.write(".");
        self.write(&member.name);
        Ok(())
    }

    fn visit_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<(), SerializeError> {
        if op.is_bitwise() {
            return Err(SerializeError::BitwiseOperator);
        }
        if op == BinaryOp::ArrayIndex {
            self.write("(");
            self.visit(left)?;
            self.write("[");
            self.visit(right)?;
            self.write("])");
            return Ok(());
        }
        let token = op
            .token()
            .ok_or(SerializeError::UnsupportedBinaryOperator(op))?;
        self.write("(");
        self.visit(left)?;
        self.write(token);
        self.visit(right)?;
        self.write(")");
        Ok(())
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<(), SerializeError> {
        match op {
            UnaryOp::Not if operand.static_type().is_boolean() => {
                self.write("!");
                self.visit(operand)
            }
            UnaryOp::Not => Err(SerializeError::BitwiseOperator),
            UnaryOp::Negate => {
                self.write("-");
                self.visit(operand)
            }
            UnaryOp::ArrayLength => {
                self.visit(operand)?;
                self.write(".Length");
                Ok(())
            }
            UnaryOp::Quote | UnaryOp::Convert | UnaryOp::ConvertChecked => self.visit(operand),
            other => Err(SerializeError::UnsupportedUnaryOperator(other)),
        }
    }
}

/// Literal text of a constant in the remote grammar.
pub fn render_constant(value: &Value) -> Result<String, SerializeError> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::String(s) => format!("\"{}\"", escape(s, '"')),
        Value::Char(c) => format!("'{}'", escape(&c.to_string(), '\'')),
        Value::Enum { type_name, member } => format!("{}.{}", type_name, member),
        Value::DateTime(dt) => format!("DateTime({},\"{}\")", dt.ticks, dt.kind.as_str()),
        Value::DateTimeOffset(dto) => {
            format!("DateTimeOffset({},TimeSpan({}))", dto.ticks, dto.offset.ticks)
        }
        Value::TimeSpan(span) => format!("TimeSpan({})", span.ticks),
        Value::Uri(uri) => format!("Uri(\"{}\")", escape(uri.as_str(), '"')),
        Value::Guid(guid) => {
            let (a, b, c, rest) = guid.as_fields();
            let mut text = format!("Guid({},{},{}", a as i32, b as i16, c as i16);
            for byte in rest {
                text.push_str(&format!(",{}", byte));
            }
            text.push(')');
            text
        }
        Value::Single(_) => format!("{}F", invariant_string(value)),
        Value::Decimal(_) => format!("{}M", invariant_string(value)),
        Value::Double(_) => format!("{}D", invariant_string(value)),
        Value::Boolean(_)
        | Value::SByte(_)
        | Value::Byte(_)
        | Value::Int16(_)
        | Value::UInt16(_)
        | Value::Int32(_)
        | Value::UInt32(_)
        | Value::Int64(_)
        | Value::UInt64(_) => invariant_string(value),
        Value::Array(_) | Value::Object { .. } | Value::Source(_) => {
            return Err(SerializeError::UnsupportedConstantType(value.type_of().name()));
        }
    })
}

fn escape(text: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == quote {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn unquote(expr: &Expr) -> Option<&Expr> {
    match expr {
        Expr::Unary {
            op: UnaryOp::Quote,
            operand,
            ..
        } => unquote(operand),
        Expr::Lambda { .. } => Some(expr),
        _ => None,
    }
}

fn is_identity_lambda(lambda: &Expr) -> bool {
    match lambda {
        Expr::Lambda { parameters, body } => match (parameters.as_slice(), body.as_parameter()) {
            ([parameter], Some(returned)) => parameter == returned,
            _ => false,
        },
        _ => false,
    }
}

fn describe(expr: &Expr) -> &'static str {
    match expr {
        Expr::Parameter(_) => "a parameter",
        Expr::MemberAccess { .. } => "a member access",
        Expr::MethodCall { .. } => "a method call without arguments",
        Expr::Binary { .. } => "a binary expression",
        Expr::Unary { .. } => "a unary expression",
        Expr::Conditional { .. } => "a conditional",
        Expr::Constant { .. } => "a constant",
        Expr::Lambda { .. } => "a lambda",
        Expr::New { .. } | Expr::MemberInit { .. } => "an object construction",
    }
}
