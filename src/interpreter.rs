//! Tree-walking interpreter used to fold parameter-independent subtrees
//! into constants.
//!
//! It understands literals, operators, conditionals, member reads and a
//! fixed table of static and instance methods. There is no access to the
//! per-element parameter and nothing it runs has side effects.

use std::{cmp::Ordering, collections::BTreeMap};

use chrono::{Datelike, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::{
    ast::{BinaryOp, Expr, Member, Method, Type, UnaryOp},
    value::{
        DateTime, DateTimeKind, DateTimeOffset, TimeSpan, Value,
        numeric::{self, NumericKind},
        temporal::TICKS_PER_SECOND,
    },
};

/// Errors raised while folding a subtree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Type mismatch or invalid operation for the given type
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// A parameter reference reached the interpreter
    #[error("Parameter '{0}' has no value outside the query")]
    UnboundParameter(String),

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Null reference: {0}")]
    NullReference(String),
}

/// Evaluates an expression that does not reference any parameter.
pub fn evaluate(expr: &Expr) -> Result<Value, EvalError> {
    Interpreter::new().eval(expr)
}

/// The fold interpreter.
#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Parameter(p) => Err(EvalError::UnboundParameter(p.name.clone())),
            Expr::Constant { value, .. } => Ok(value.clone()),
            Expr::MemberAccess { object: None, member } => self.static_member(member),
            Expr::MemberAccess {
                object: Some(object),
                member,
            } => {
                let target = self.eval(object)?;
                self.instance_member(&target, member)
            }
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                match object {
                    None => self.static_method(method, &args),
                    Some(object) => {
                        let target = self.eval(object)?;
                        self.instance_method(&target, method, &args)
                    }
                }
            }
            Expr::Binary {
                op, left, right, ..
            } => match op {
                BinaryOp::AndAlso => {
                    if !self.eval_bool(left)? {
                        return Ok(Value::Boolean(false));
                    }
                    Ok(Value::Boolean(self.eval_bool(right)?))
                }
                BinaryOp::OrElse => {
                    if self.eval_bool(left)? {
                        return Ok(Value::Boolean(true));
                    }
                    Ok(Value::Boolean(self.eval_bool(right)?))
                }
                BinaryOp::Coalesce => {
                    let left = self.eval(left)?;
                    if left.is_null() {
                        self.eval(right)
                    } else {
                        Ok(left)
                    }
                }
                _ => {
                    let left = self.eval(left)?;
                    let right = self.eval(right)?;
                    apply_binary(*op, &left, &right)
                }
            },
            Expr::Unary { op, operand, ty } => {
                if *op == UnaryOp::Quote {
                    return Err(EvalError::TypeError("a quoted lambda has no value".into()));
                }
                let operand = self.eval(operand)?;
                apply_unary(*op, &operand, ty)
            }
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => {
                if self.eval_bool(test)? {
                    self.eval(if_true)
                } else {
                    self.eval(if_false)
                }
            }
            Expr::Lambda { .. } => Err(EvalError::TypeError("a lambda has no value".into())),
            Expr::New { ty, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                construct(ty, &args)
            }
            Expr::MemberInit { new, bindings } => match self.eval(new)? {
                Value::Object {
                    type_name,
                    mut fields,
                } => {
                    for (name, binding) in bindings {
                        fields.insert(name.clone(), self.eval(binding)?);
                    }
                    Ok(Value::Object { type_name, fields })
                }
                other => Err(EvalError::TypeError(format!(
                    "cannot initialize members of {}",
                    other.type_of().name()
                ))),
            },
        }
    }

    fn eval_bool(&self, expr: &Expr) -> Result<bool, EvalError> {
        let value = self.eval(expr)?;
        value.as_bool().ok_or_else(|| {
            EvalError::TypeError(format!("expected Boolean, got {}", value.type_of().name()))
        })
    }

    fn static_member(&self, member: &Member) -> Result<Value, EvalError> {
        let unknown = || {
            EvalError::UnknownMember(format!("{}.{}", member.declaring_type.name(), member.name))
        };
        let out_of_range = || EvalError::Overflow("current time is out of range".into());

        Ok(match (&member.declaring_type, member.name.as_str()) {
            (Type::DateTime, "Now") => Value::DateTime(DateTime::now().ok_or_else(out_of_range)?),
            (Type::DateTime, "UtcNow") => {
                Value::DateTime(DateTime::utc_now().ok_or_else(out_of_range)?)
            }
            (Type::DateTime, "Today") => {
                Value::DateTime(DateTime::today().ok_or_else(out_of_range)?)
            }
            (Type::DateTime, "MinValue") => Value::DateTime(DateTime::MIN),
            (Type::DateTime, "MaxValue") => Value::DateTime(DateTime::MAX),
            (Type::DateTimeOffset, "Now") => {
                Value::DateTimeOffset(DateTimeOffset::now().ok_or_else(out_of_range)?)
            }
            (Type::DateTimeOffset, "UtcNow") => {
                Value::DateTimeOffset(DateTimeOffset::utc_now().ok_or_else(out_of_range)?)
            }
            (Type::TimeSpan, "Zero") => Value::TimeSpan(TimeSpan::ZERO),
            (Type::TimeSpan, "MaxValue") => Value::TimeSpan(TimeSpan::from_ticks(i64::MAX)),
            (Type::TimeSpan, "MinValue") => Value::TimeSpan(TimeSpan::from_ticks(i64::MIN)),
            (Type::String, "Empty") => Value::String(String::new()),
            (Type::Guid, "Empty") => Value::Guid(Uuid::nil()),
            (Type::Math, "PI") => Value::Double(std::f64::consts::PI),
            (Type::Math, "E") => Value::Double(std::f64::consts::E),
            (Type::Int16, "MaxValue") => Value::Int16(i16::MAX),
            (Type::Int16, "MinValue") => Value::Int16(i16::MIN),
            (Type::Int32, "MaxValue") => Value::Int32(i32::MAX),
            (Type::Int32, "MinValue") => Value::Int32(i32::MIN),
            (Type::Int64, "MaxValue") => Value::Int64(i64::MAX),
            (Type::Int64, "MinValue") => Value::Int64(i64::MIN),
            (Type::Byte, "MaxValue") => Value::Byte(u8::MAX),
            (Type::Byte, "MinValue") => Value::Byte(u8::MIN),
            (Type::Double, "MaxValue") => Value::Double(f64::MAX),
            (Type::Double, "MinValue") => Value::Double(f64::MIN),
            (Type::Decimal, "MaxValue") => Value::Decimal(Decimal::MAX),
            (Type::Decimal, "MinValue") => Value::Decimal(Decimal::MIN),
            (Type::Decimal, "Zero") => Value::Decimal(Decimal::ZERO),
            (Type::Decimal, "One") => Value::Decimal(Decimal::ONE),
            _ => return Err(unknown()),
        })
    }

    fn instance_member(&self, target: &Value, member: &Member) -> Result<Value, EvalError> {
        let name = member.name.as_str();

        // Nullable<T> wrappers expose HasValue/Value over the inner value
        if matches!(member.declaring_type, Type::Nullable(_)) {
            match name {
                "HasValue" => return Ok(Value::Boolean(!target.is_null())),
                "Value" if target.is_null() => {
                    return Err(EvalError::NullReference("nullable object must have a value".into()));
                }
                "Value" => return Ok(target.clone()),
                _ => {}
            }
        }

        let unknown = || EvalError::UnknownMember(format!("{}.{}", target.type_of().name(), name));
        let invalid_date = || EvalError::Overflow(format!("invalid date/time for {}", name));

        match target {
            Value::Null => Err(EvalError::NullReference(format!(
                "cannot read {} of null",
                name
            ))),
            Value::String(s) => match name {
                "Length" => Ok(Value::Int32(s.chars().count() as i32)),
                _ => Err(unknown()),
            },
            Value::Array(items) => match name {
                "Length" | "Count" => Ok(Value::Int32(items.len() as i32)),
                _ => Err(unknown()),
            },
            Value::DateTime(dt) => {
                let component = |f: fn(DateTime) -> Option<i32>| {
                    f(*dt).map(Value::Int32).ok_or_else(invalid_date)
                };
                match name {
                    "Year" => component(DateTime::year),
                    "Month" => component(DateTime::month),
                    "Day" => component(DateTime::day),
                    "Hour" => component(DateTime::hour),
                    "Minute" => component(DateTime::minute),
                    "Second" => component(DateTime::second),
                    "DayOfYear" => component(DateTime::day_of_year),
                    "Millisecond" => Ok(Value::Int32(dt.time_of_day().milliseconds())),
                    "Ticks" => Ok(Value::Int64(dt.ticks)),
                    "Date" => Ok(Value::DateTime(dt.date())),
                    "TimeOfDay" => Ok(Value::TimeSpan(dt.time_of_day())),
                    "Kind" => Ok(Value::enumeration("DateTimeKind", dt.kind.as_str())),
                    "DayOfWeek" => {
                        let naive = dt.to_naive().ok_or_else(invalid_date)?;
                        Ok(Value::enumeration("DayOfWeek", weekday_name(naive.weekday())))
                    }
                    _ => Err(unknown()),
                }
            }
            Value::DateTimeOffset(dto) => match name {
                "Ticks" => Ok(Value::Int64(dto.ticks)),
                "UtcTicks" => Ok(Value::Int64(dto.utc_ticks().ok_or_else(invalid_date)?)),
                "Offset" => Ok(Value::TimeSpan(dto.offset)),
                "DateTime" => Ok(Value::DateTime(
                    DateTime::from_ticks(dto.ticks, DateTimeKind::Unspecified)
                        .ok_or_else(invalid_date)?,
                )),
                "UtcDateTime" => Ok(Value::DateTime(
                    dto.utc_ticks()
                        .and_then(|t| DateTime::from_ticks(t, DateTimeKind::Utc))
                        .ok_or_else(invalid_date)?,
                )),
                _ => Err(unknown()),
            },
            Value::TimeSpan(span) => Ok(match name {
                "Ticks" => Value::Int64(span.ticks),
                "Days" => Value::Int32(span.days()),
                "Hours" => Value::Int32(span.hours()),
                "Minutes" => Value::Int32(span.minutes()),
                "Seconds" => Value::Int32(span.seconds()),
                "Milliseconds" => Value::Int32(span.milliseconds()),
                "TotalDays" => Value::Double(span.total_days()),
                "TotalHours" => Value::Double(span.total_hours()),
                "TotalMinutes" => Value::Double(span.total_minutes()),
                "TotalSeconds" => Value::Double(span.total_seconds()),
                "TotalMilliseconds" => Value::Double(span.total_milliseconds()),
                _ => return Err(unknown()),
            }),
            Value::Object { fields, .. } => fields.get(name).cloned().ok_or_else(unknown),
            _ => Err(unknown()),
        }
    }

    fn instance_method(
        &self,
        target: &Value,
        method: &Method,
        args: &[Value],
    ) -> Result<Value, EvalError> {
        let name = method.name.as_str();

        // methods every value answers
        match name {
            "ToString" if args.is_empty() => {
                return match target {
                    Value::Null => Err(EvalError::NullReference("cannot call ToString on null".into())),
                    other => Ok(Value::String(invariant_string(other))),
                };
            }
            "Equals" if args.len() == 1 => {
                return Ok(Value::Boolean(target.loosely_equals(&args[0])));
            }
            "GetValueOrDefault" if matches!(method.declaring_type, Type::Nullable(_)) => {
                return Ok(match (target, args.first()) {
                    (Value::Null, Some(default)) => default.clone(),
                    (Value::Null, None) => default_of(method.return_type.non_nullable()),
                    (value, _) => value.clone(),
                });
            }
            _ => {}
        }

        match target {
            Value::Null => Err(EvalError::NullReference(format!("cannot call {} on null", name))),
            Value::String(s) => self.string_method(s, name, args),
            Value::DateTime(dt) => self.date_time_method(*dt, name, args),
            Value::DateTimeOffset(dto) => match name {
                "Add" => shift(target, timespan_arg(args, 0, name)?, name),
                "Subtract" => match arg(args, 0, name)? {
                    Value::DateTimeOffset(other) => instant_difference(*dto, *other)
                        .map(Value::TimeSpan)
                        .ok_or_else(|| overflow(name)),
                    _ => {
                        let span = timespan_arg(args, 0, name)?;
                        shift(target, span.checked_neg().ok_or_else(|| overflow(name))?, name)
                    }
                },
                _ => match add_unit_span(name, args)? {
                    Some(span) => shift(target, span, name),
                    None => Err(unknown_method(target, name)),
                },
            },
            Value::TimeSpan(span) => match name {
                "Add" => span
                    .checked_add(timespan_arg(args, 0, name)?)
                    .map(Value::TimeSpan)
                    .ok_or_else(|| overflow(name)),
                "Subtract" => span
                    .checked_sub(timespan_arg(args, 0, name)?)
                    .map(Value::TimeSpan)
                    .ok_or_else(|| overflow(name)),
                "Negate" => span.checked_neg().map(Value::TimeSpan).ok_or_else(|| overflow(name)),
                "Duration" => span
                    .ticks
                    .checked_abs()
                    .map(|t| Value::TimeSpan(TimeSpan::from_ticks(t)))
                    .ok_or_else(|| overflow(name)),
                _ => Err(unknown_method(target, name)),
            },
            Value::Enum { member, .. } => match name {
                "HasFlag" => match arg(args, 0, name)? {
                    Value::Enum { member: flag, .. } => Ok(Value::Boolean(
                        member.split(", ").any(|m| m == flag),
                    )),
                    other => Err(EvalError::InvalidArgument(format!(
                        "HasFlag expects an enum, got {}",
                        other.type_of().name()
                    ))),
                },
                _ => Err(unknown_method(target, name)),
            },
            other => match (NumericKind::of(other), name) {
                (Some(_), "CompareTo") => {
                    let ordering = other.compare(arg(args, 0, name)?).ok_or_else(|| {
                        EvalError::InvalidArgument("CompareTo expects a comparable value".into())
                    })?;
                    Ok(Value::Int32(ordering_to_int(ordering)))
                }
                _ => Err(unknown_method(other, name)),
            },
        }
    }

    fn string_method(&self, s: &str, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        Ok(match name {
            "ToUpper" | "ToUpperInvariant" => Value::String(s.to_uppercase()),
            "ToLower" | "ToLowerInvariant" => Value::String(s.to_lowercase()),
            "Trim" => Value::String(s.trim().to_string()),
            "TrimStart" => Value::String(s.trim_start().to_string()),
            "TrimEnd" => Value::String(s.trim_end().to_string()),
            "Contains" => Value::Boolean(s.contains(str_arg(args, 0, name)?)),
            "StartsWith" => Value::Boolean(s.starts_with(str_arg(args, 0, name)?)),
            "EndsWith" => Value::Boolean(s.ends_with(str_arg(args, 0, name)?)),
            "IndexOf" => {
                let needle = str_arg(args, 0, name)?;
                Value::Int32(match s.find(needle) {
                    Some(byte_index) => s[..byte_index].chars().count() as i32,
                    None => -1,
                })
            }
            "Replace" => Value::String(s.replace(str_arg(args, 0, name)?, str_arg(args, 1, name)?)),
            "Substring" => {
                let chars: Vec<char> = s.chars().collect();
                let start = usize::try_from(int_arg(args, 0, name)?)
                    .ok()
                    .filter(|start| *start <= chars.len())
                    .ok_or_else(|| out_of_range(name))?;
                let end = match args.get(1) {
                    Some(_) => usize::try_from(int_arg(args, 1, name)?)
                        .ok()
                        .and_then(|len| start.checked_add(len))
                        .filter(|end| *end <= chars.len())
                        .ok_or_else(|| out_of_range(name))?,
                    None => chars.len(),
                };
                Value::String(chars[start..end].iter().collect())
            }
            "CompareTo" => Value::Int32(ordering_to_int(s.cmp(str_arg(args, 0, name)?))),
            _ => return Err(unknown_method(&Value::string(s), name)),
        })
    }

    fn date_time_method(&self, dt: DateTime, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let target = Value::DateTime(dt);
        match name {
            "AddMonths" | "AddYears" => {
                let n = int_arg(args, 0, name)?;
                let months = if name == "AddYears" { n.checked_mul(12) } else { Some(n) };
                months
                    .and_then(|m| i32::try_from(m).ok())
                    .and_then(|m| dt.add_months(m))
                    .map(Value::DateTime)
                    .ok_or_else(|| overflow(name))
            }
            "Add" => shift(&target, timespan_arg(args, 0, name)?, name),
            "Subtract" => match arg(args, 0, name)? {
                Value::DateTime(other) => Ok(Value::TimeSpan(dt.since(*other))),
                _ => {
                    let span = timespan_arg(args, 0, name)?;
                    shift(&target, span.checked_neg().ok_or_else(|| overflow(name))?, name)
                }
            },
            "CompareTo" => match arg(args, 0, name)? {
                Value::DateTime(other) => Ok(Value::Int32(ordering_to_int(dt.ticks.cmp(&other.ticks)))),
                other => Err(EvalError::InvalidArgument(format!(
                    "CompareTo expects a DateTime, got {}",
                    other.type_of().name()
                ))),
            },
            _ => match add_unit_span(name, args)? {
                Some(span) => shift(&target, span, name),
                None => Err(unknown_method(&target, name)),
            },
        }
    }

    fn static_method(&self, method: &Method, args: &[Value]) -> Result<Value, EvalError> {
        let name = method.name.as_str();
        match &method.declaring_type {
            Type::Math => math_function(name, args),
            Type::Convert => convert_function(name, args),
            Type::String => match name {
                "Concat" => Ok(Value::String(args.iter().map(invariant_string).collect())),
                "IsNullOrEmpty" => Ok(Value::Boolean(match arg(args, 0, name)? {
                    Value::Null => true,
                    Value::String(s) => s.is_empty(),
                    _ => false,
                })),
                "IsNullOrWhiteSpace" => Ok(Value::Boolean(match arg(args, 0, name)? {
                    Value::Null => true,
                    Value::String(s) => s.trim().is_empty(),
                    _ => false,
                })),
                "Equals" => Ok(Value::Boolean(arg(args, 0, name)?.loosely_equals(arg(args, 1, name)?))),
                "Compare" => string_compare(args),
                _ => Err(EvalError::UnknownMethod(format!("String.{}", name))),
            },
            Type::TimeSpan => {
                let span = match name {
                    "FromTicks" => Some(TimeSpan::from_ticks(int_arg(args, 0, name)?)),
                    "FromDays" => TimeSpan::from_days(float_arg(args, 0, name)?),
                    "FromHours" => TimeSpan::from_hours(float_arg(args, 0, name)?),
                    "FromMinutes" => TimeSpan::from_minutes(float_arg(args, 0, name)?),
                    "FromSeconds" => TimeSpan::from_seconds(float_arg(args, 0, name)?),
                    "FromMilliseconds" => TimeSpan::from_milliseconds(float_arg(args, 0, name)?),
                    _ => return Err(EvalError::UnknownMethod(format!("TimeSpan.{}", name))),
                };
                span.map(Value::TimeSpan).ok_or_else(|| overflow(name))
            }
            Type::Guid => match name {
                "Parse" => Uuid::parse_str(str_arg(args, 0, name)?)
                    .map(Value::Guid)
                    .map_err(|e| EvalError::InvalidArgument(format!("Guid.Parse: {}", e))),
                "NewGuid" => Ok(Value::Guid(Uuid::new_v4())),
                _ => Err(EvalError::UnknownMethod(format!("Guid.{}", name))),
            },
            Type::DateTime => match name {
                "SpecifyKind" => match (arg(args, 0, name)?, arg(args, 1, name)?) {
                    (Value::DateTime(dt), Value::Enum { member, .. }) => Ok(Value::DateTime(DateTime {
                        ticks: dt.ticks,
                        kind: parse_kind(member)?,
                    })),
                    _ => Err(EvalError::InvalidArgument(
                        "SpecifyKind expects a DateTime and a DateTimeKind".into(),
                    )),
                },
                _ => Err(EvalError::UnknownMethod(format!("DateTime.{}", name))),
            },
            Type::Regex => {
                let input = str_arg(args, 0, name)?;
                let pattern = regex::Regex::new(str_arg(args, 1, name)?)
                    .map_err(|e| EvalError::InvalidArgument(format!("invalid regex: {e}")))?;
                match name {
                    "IsMatch" => Ok(Value::Boolean(pattern.is_match(input))),
                    "Replace" => Ok(Value::String(
                        pattern.replace_all(input, str_arg(args, 2, name)?).into_owned(),
                    )),
                    _ => Err(EvalError::UnknownMethod(format!("Regex.{}", name))),
                }
            }
            other => Err(EvalError::UnknownMethod(format!("{}.{}", other.name(), name))),
        }
    }
}

/// Evaluates `op` over two already evaluated operands.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let mismatch = || {
        EvalError::TypeError(format!(
            "operator {:?} cannot be applied to {} and {}",
            op,
            left.type_of().name(),
            right.type_of().name()
        ))
    };

    match op {
        BinaryOp::Equal => Ok(Value::Boolean(left.loosely_equals(right))),
        BinaryOp::NotEqual => Ok(Value::Boolean(!left.loosely_equals(right))),
        BinaryOp::LessThan
        | BinaryOp::LessThanOrEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanOrEqual => {
            // lifted comparisons against null are false
            if left.is_null() || right.is_null() {
                return Ok(Value::Boolean(false));
            }
            let ordering = left.compare(right).ok_or_else(mismatch)?;
            Ok(Value::Boolean(match op {
                BinaryOp::LessThan => ordering == Ordering::Less,
                BinaryOp::LessThanOrEqual => ordering != Ordering::Greater,
                BinaryOp::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        BinaryOp::AndAlso | BinaryOp::OrElse => {
            let (a, b) = (left.as_bool().ok_or_else(mismatch)?, right.as_bool().ok_or_else(mismatch)?);
            Ok(Value::Boolean(if op == BinaryOp::AndAlso { a && b } else { a || b }))
        }
        BinaryOp::Coalesce => Ok(if left.is_null() { right.clone() } else { left.clone() }),
        BinaryOp::ArrayIndex => match (left, numeric::integral(right)) {
            (Value::Array(items), Some(index)) => usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| EvalError::InvalidArgument(format!("index {} is out of range", index))),
            _ => Err(mismatch()),
        },
        BinaryOp::And | BinaryOp::Or | BinaryOp::ExclusiveOr => match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(match op {
                BinaryOp::And => a & b,
                BinaryOp::Or => a | b,
                _ => a ^ b,
            })),
            _ => {
                let kind = NumericKind::promote(
                    NumericKind::of(left).ok_or_else(mismatch)?,
                    NumericKind::of(right).ok_or_else(mismatch)?,
                )
                .filter(|k| k.is_integral())
                .ok_or_else(mismatch)?;
                let (a, b) = (
                    numeric::integral(left).ok_or_else(mismatch)?,
                    numeric::integral(right).ok_or_else(mismatch)?,
                );
                let n = match op {
                    BinaryOp::And => a & b,
                    BinaryOp::Or => a | b,
                    _ => a ^ b,
                };
                numeric::from_integral(kind, n).ok_or_else(mismatch)
            }
        },
        BinaryOp::LeftShift | BinaryOp::RightShift => {
            let count = numeric::integral(right).ok_or_else(mismatch)? as u32;
            let left_shift = op == BinaryOp::LeftShift;
            Ok(match left {
                Value::Int32(n) if left_shift => Value::Int32(n.wrapping_shl(count)),
                Value::Int32(n) => Value::Int32(n.wrapping_shr(count)),
                Value::UInt32(n) if left_shift => Value::UInt32(n.wrapping_shl(count)),
                Value::UInt32(n) => Value::UInt32(n.wrapping_shr(count)),
                Value::Int64(n) if left_shift => Value::Int64(n.wrapping_shl(count)),
                Value::Int64(n) => Value::Int64(n.wrapping_shr(count)),
                Value::UInt64(n) if left_shift => Value::UInt64(n.wrapping_shl(count)),
                Value::UInt64(n) => Value::UInt64(n.wrapping_shr(count)),
                _ => return Err(mismatch()),
            })
        }
        BinaryOp::Add | BinaryOp::Subtract => {
            let subtract = op == BinaryOp::Subtract;
            match (left, right) {
                (Value::Null, _) | (_, Value::Null) if !matches!((left, right), (Value::String(_), _) | (_, Value::String(_))) => {
                    Ok(Value::Null)
                }
                (Value::String(_), _) | (_, Value::String(_)) if !subtract => Ok(Value::String(format!(
                    "{}{}",
                    invariant_string(left),
                    invariant_string(right)
                ))),
                (Value::DateTime(a), Value::DateTime(b)) if subtract => Ok(Value::TimeSpan(a.since(*b))),
                (Value::DateTimeOffset(a), Value::DateTimeOffset(b)) if subtract => {
                    instant_difference(*a, *b)
                        .map(Value::TimeSpan)
                        .ok_or_else(|| overflow("Subtract"))
                }
                (Value::DateTime(_) | Value::DateTimeOffset(_), Value::TimeSpan(span)) => {
                    let span = if subtract {
                        span.checked_neg().ok_or_else(|| overflow("Subtract"))?
                    } else {
                        *span
                    };
                    shift(left, span, "Add")
                }
                (Value::TimeSpan(a), Value::TimeSpan(b)) => {
                    let result = if subtract { a.checked_sub(*b) } else { a.checked_add(*b) };
                    result.map(Value::TimeSpan).ok_or_else(|| overflow("TimeSpan"))
                }
                _ => numeric::arithmetic(op, left, right),
            }
        }
        BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo | BinaryOp::Power => {
            if left.is_null() || right.is_null() {
                return Ok(Value::Null);
            }
            if op == BinaryOp::Power {
                let (a, b) = (
                    numeric::to_f64(left).ok_or_else(mismatch)?,
                    numeric::to_f64(right).ok_or_else(mismatch)?,
                );
                return Ok(Value::Double(a.powf(b)));
            }
            numeric::arithmetic(op, left, right)
        }
    }
}

fn apply_unary(op: UnaryOp, operand: &Value, ty: &Type) -> Result<Value, EvalError> {
    let mismatch = || {
        EvalError::TypeError(format!(
            "operator {:?} cannot be applied to {}",
            op,
            operand.type_of().name()
        ))
    };

    match op {
        UnaryOp::Not => Ok(match operand {
            Value::Null => Value::Null,
            Value::Boolean(b) => Value::Boolean(!b),
            Value::SByte(n) => Value::SByte(!n),
            Value::Byte(n) => Value::Byte(!n),
            Value::Int16(n) => Value::Int16(!n),
            Value::UInt16(n) => Value::UInt16(!n),
            Value::Int32(n) => Value::Int32(!n),
            Value::UInt32(n) => Value::UInt32(!n),
            Value::Int64(n) => Value::Int64(!n),
            Value::UInt64(n) => Value::UInt64(!n),
            _ => return Err(mismatch()),
        }),
        UnaryOp::Negate => match operand {
            Value::Null => Ok(Value::Null),
            Value::TimeSpan(span) => span
                .checked_neg()
                .map(Value::TimeSpan)
                .ok_or_else(|| overflow("Negate")),
            Value::Single(n) => Ok(Value::Single(-n)),
            Value::Double(n) => Ok(Value::Double(-n)),
            Value::Decimal(d) => Ok(Value::Decimal(-*d)),
            other => {
                let kind = NumericKind::of(other).ok_or_else(mismatch)?;
                let kind = NumericKind::promote(kind, NumericKind::Int32).ok_or_else(mismatch)?;
                let n = numeric::integral(other).ok_or_else(mismatch)?;
                numeric::from_integral(kind, -n).ok_or_else(|| overflow("Negate"))
            }
        },
        UnaryOp::UnaryPlus | UnaryOp::TypeAs => Ok(operand.clone()),
        UnaryOp::ArrayLength => match operand {
            Value::Array(items) => Ok(Value::Int32(items.len() as i32)),
            _ => Err(mismatch()),
        },
        UnaryOp::Convert | UnaryOp::ConvertChecked => convert_to(operand, ty),
        UnaryOp::Quote => Err(mismatch()),
    }
}

/// Conversion node semantics: numerics convert with range checks,
/// everything else passes through unchanged.
fn convert_to(value: &Value, ty: &Type) -> Result<Value, EvalError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match (value, NumericKind::of_type(ty)) {
        (Value::Enum { .. }, Some(_)) => Err(EvalError::TypeError(
            "enum members carry no numeric value".into(),
        )),
        (v, Some(kind)) if NumericKind::of(v).is_some() || matches!(v, Value::Char(_)) => {
            numeric::convert(v, kind)
        }
        (v, _) => match (v, ty.non_nullable()) {
            (Value::Int32(n), Type::Char) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| overflow("Char")),
            _ => Ok(v.clone()),
        },
    }
}

fn construct(ty: &Type, args: &[Value]) -> Result<Value, EvalError> {
    let invalid = |what: &str| EvalError::InvalidArgument(format!("invalid {} constructor arguments", what));

    match ty.non_nullable() {
        Type::DateTime => {
            let kind = match args.last() {
                Some(Value::Enum { member, .. }) => parse_kind(member)?,
                _ => DateTimeKind::Unspecified,
            };
            let numbers = args
                .iter()
                .filter(|a| !matches!(a, Value::Enum { .. }))
                .map(|a| numeric::integral(a).ok_or_else(|| invalid("DateTime")))
                .collect::<Result<Vec<_>, _>>()?;
            let part = |i: usize| numbers.get(i).copied().unwrap_or(0);
            let dt = match numbers.len() {
                1 => i64::try_from(part(0)).ok().and_then(|t| DateTime::from_ticks(t, kind)),
                3 | 6 => DateTime::from_ymd_hms(
                    i32::try_from(part(0)).map_err(|_| invalid("DateTime"))?,
                    u32::try_from(part(1)).map_err(|_| invalid("DateTime"))?,
                    u32::try_from(part(2)).map_err(|_| invalid("DateTime"))?,
                    u32::try_from(part(3)).map_err(|_| invalid("DateTime"))?,
                    u32::try_from(part(4)).map_err(|_| invalid("DateTime"))?,
                    u32::try_from(part(5)).map_err(|_| invalid("DateTime"))?,
                    kind,
                ),
                _ => return Err(invalid("DateTime")),
            };
            dt.map(Value::DateTime).ok_or_else(|| invalid("DateTime"))
        }
        Type::DateTimeOffset => {
            let dto = match args {
                [Value::DateTime(dt), Value::TimeSpan(offset)] => {
                    DateTimeOffset::new(dt.ticks, *offset)
                }
                [ticks, Value::TimeSpan(offset)] => numeric::integral(ticks)
                    .and_then(|t| i64::try_from(t).ok())
                    .and_then(|t| DateTimeOffset::new(t, *offset)),
                _ => None,
            };
            dto.map(Value::DateTimeOffset)
                .ok_or_else(|| invalid("DateTimeOffset"))
        }
        Type::TimeSpan => {
            let numbers = args
                .iter()
                .map(|a| {
                    numeric::integral(a)
                        .and_then(|n| i64::try_from(n).ok())
                        .ok_or_else(|| invalid("TimeSpan"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let span = match numbers.as_slice() {
                [ticks] => Some(TimeSpan::from_ticks(*ticks)),
                [h, m, s] => TimeSpan::from_hms(*h, *m, *s),
                [d, h, m, s] => TimeSpan::from_dhms(*d, *h, *m, *s),
                _ => None,
            };
            span.map(Value::TimeSpan).ok_or_else(|| invalid("TimeSpan"))
        }
        Type::Guid => match args {
            [Value::String(s)] => Uuid::parse_str(s)
                .map(Value::Guid)
                .map_err(|e| EvalError::InvalidArgument(format!("Guid: {}", e))),
            [] => Ok(Value::Guid(Uuid::nil())),
            _ => Err(invalid("Guid")),
        },
        Type::Uri => match args {
            [Value::String(s)] => Url::parse(s)
                .map(Value::Uri)
                .map_err(|e| EvalError::InvalidArgument(format!("Uri: {}", e))),
            _ => Err(invalid("Uri")),
        },
        Type::Decimal => match args {
            [v] => numeric::convert(v, NumericKind::Decimal),
            _ => Err(invalid("Decimal")),
        },
        Type::String => match args {
            [Value::Char(c), count] => {
                let count = numeric::integral(count)
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| invalid("String"))?;
                Ok(Value::String(std::iter::repeat_n(*c, count).collect()))
            }
            _ => Err(invalid("String")),
        },
        Type::Named(type_name) if args.is_empty() => Ok(Value::Object {
            type_name: type_name.clone(),
            fields: BTreeMap::new(),
        }),
        other => Err(EvalError::TypeError(format!(
            "cannot construct {} with {} argument(s)",
            other.name(),
            args.len()
        ))),
    }
}

fn math_function(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let x = arg(args, 0, name)?;
    match name {
        "Abs" => match x {
            Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
            Value::Double(n) => Ok(Value::Double(n.abs())),
            Value::Single(n) => Ok(Value::Single(n.abs())),
            other => {
                let kind = NumericKind::of(other).ok_or_else(|| not_a_number(name, other))?;
                let n = numeric::integral(other).ok_or_else(|| not_a_number(name, other))?;
                numeric::from_integral(kind, n.abs()).ok_or_else(|| overflow(name))
            }
        },
        "Max" | "Min" => {
            let y = arg(args, 1, name)?;
            let ordering = x.compare(y).ok_or_else(|| not_a_number(name, y))?;
            let pick_x = (ordering != Ordering::Less) == (name == "Max");
            Ok(if pick_x { x.clone() } else { y.clone() })
        }
        "Floor" | "Ceiling" | "Truncate" | "Round" => match x {
            Value::Decimal(d) => {
                let digits = match args.get(1) {
                    Some(_) => u32::try_from(int_arg(args, 1, name)?).map_err(|_| out_of_range(name))?,
                    None => 0,
                };
                Ok(Value::Decimal(match name {
                    "Floor" => d.floor(),
                    "Ceiling" => d.ceil(),
                    "Truncate" => d.trunc(),
                    _ => d.round_dp_with_strategy(digits, RoundingStrategy::MidpointNearestEven),
                }))
            }
            other => {
                let n = numeric::to_f64(other).ok_or_else(|| not_a_number(name, other))?;
                Ok(Value::Double(match name {
                    "Floor" => n.floor(),
                    "Ceiling" => n.ceil(),
                    "Truncate" => n.trunc(),
                    _ => match args.get(1) {
                        Some(_) => {
                            let factor = 10f64.powi(int_arg(args, 1, name)? as i32);
                            (n * factor).round_ties_even() / factor
                        }
                        None => n.round_ties_even(),
                    },
                }))
            }
        },
        "Sign" => {
            let ordering = x
                .compare(&Value::Int32(0))
                .ok_or_else(|| not_a_number(name, x))?;
            Ok(Value::Int32(ordering_to_int(ordering)))
        }
        "Pow" => Ok(Value::Double(float_arg(args, 0, name)?.powf(float_arg(args, 1, name)?))),
        "Sqrt" => Ok(Value::Double(float_arg(args, 0, name)?.sqrt())),
        "Exp" => Ok(Value::Double(float_arg(args, 0, name)?.exp())),
        "Log" => Ok(Value::Double(float_arg(args, 0, name)?.ln())),
        "Log10" => Ok(Value::Double(float_arg(args, 0, name)?.log10())),
        _ => Err(EvalError::UnknownMethod(format!("Math.{}", name))),
    }
}

fn convert_function(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let value = arg(args, 0, name)?;
    let target = match name {
        "ToString" => return Ok(Value::String(invariant_string(value))),
        "ToBoolean" => {
            return match value {
                Value::Boolean(b) => Ok(Value::Boolean(*b)),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
                other => Ok(Value::Boolean(
                    !other.loosely_equals(&Value::Int32(0)),
                )),
            };
        }
        "ToByte" => NumericKind::Byte,
        "ToSByte" => NumericKind::SByte,
        "ToInt16" => NumericKind::Int16,
        "ToUInt16" => NumericKind::UInt16,
        "ToInt32" => NumericKind::Int32,
        "ToUInt32" => NumericKind::UInt32,
        "ToInt64" => NumericKind::Int64,
        "ToUInt64" => NumericKind::UInt64,
        "ToSingle" => NumericKind::Single,
        "ToDouble" => NumericKind::Double,
        "ToDecimal" => NumericKind::Decimal,
        _ => return Err(EvalError::UnknownMethod(format!("Convert.{}", name))),
    };

    // Convert rounds to nearest even rather than truncating
    let rounded = match value {
        Value::Double(n) if target.is_integral() => Value::Double(n.round_ties_even()),
        Value::Single(n) if target.is_integral() => Value::Single(n.round_ties_even()),
        Value::Decimal(d) if target.is_integral() => {
            Value::Decimal(d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
        }
        Value::String(s) => {
            let parsed = s
                .trim()
                .parse::<i64>()
                .ok()
                .map(Value::Int64)
                .or_else(|| s.trim().parse::<Decimal>().ok().map(Value::Decimal))
                .ok_or_else(|| EvalError::InvalidArgument(format!("'{}' is not a number", s)))?;
            return numeric::convert(&parsed, target);
        }
        Value::Boolean(b) => Value::Int32(i32::from(*b)),
        other => other.clone(),
    };
    numeric::convert(&rounded, target)
}

/// `String.Compare(a, b[, comparison])` with ordinal ordering; the third
/// argument may be a `StringComparison` member or an ignore-case flag.
fn string_compare(args: &[Value]) -> Result<Value, EvalError> {
    let name = "Compare";
    let ignore_case = match args.get(2) {
        None => false,
        Some(Value::Boolean(b)) => *b,
        Some(Value::Enum { member, .. }) => member.ends_with("IgnoreCase"),
        Some(other) => {
            return Err(EvalError::InvalidArgument(format!(
                "Compare: unexpected {}",
                other.type_of().name()
            )));
        }
    };
    let ordering = match (arg(args, 0, name)?, arg(args, 1, name)?) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::String(a), Value::String(b)) if ignore_case => a.to_lowercase().cmp(&b.to_lowercase()),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (a, b) => {
            return Err(EvalError::InvalidArgument(format!(
                "Compare expects strings, got {} and {}",
                a.type_of().name(),
                b.type_of().name()
            )));
        }
    };
    Ok(Value::Int32(ordering_to_int(ordering)))
}

/// Culture-invariant default string form of a value, as `ToString()`
/// and string concatenation produce it.
pub fn invariant_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(true) => "True".into(),
        Value::Boolean(false) => "False".into(),
        Value::Char(c) => c.to_string(),
        Value::String(s) => s.clone(),
        Value::SByte(n) => n.to_string(),
        Value::Byte(n) => n.to_string(),
        Value::Int16(n) => n.to_string(),
        Value::UInt16(n) => n.to_string(),
        Value::Int32(n) => n.to_string(),
        Value::UInt32(n) => n.to_string(),
        Value::Int64(n) => n.to_string(),
        Value::UInt64(n) => n.to_string(),
        Value::Single(n) => float_string(n.to_string()),
        Value::Double(n) => float_string(n.to_string()),
        Value::Decimal(d) => d.to_string(),
        Value::DateTime(dt) => match dt.to_naive() {
            Some(naive) => naive.format("%m/%d/%Y %H:%M:%S").to_string(),
            None => dt.ticks.to_string(),
        },
        Value::DateTimeOffset(dto) => {
            let clock = DateTime::from_ticks(dto.ticks, DateTimeKind::Unspecified)
                .map(|dt| invariant_string(&Value::DateTime(dt)))
                .unwrap_or_default();
            let offset = dto.offset.ticks / (60 * TICKS_PER_SECOND);
            let sign = if offset < 0 { '-' } else { '+' };
            format!("{} {}{:02}:{:02}", clock, sign, offset.abs() / 60, offset.abs() % 60)
        }
        Value::TimeSpan(span) => timespan_string(*span),
        Value::Guid(g) => g.hyphenated().to_string(),
        Value::Uri(u) => u.as_str().to_string(),
        Value::Enum { member, .. } => member.clone(),
        Value::Array(items) => format!("{}[]", items.first().map_or(Type::Object, Value::type_of).name()),
        Value::Object { type_name, .. } => type_name.clone(),
        Value::Source(name) => name.clone(),
    }
}

fn float_string(text: String) -> String {
    match text.as_str() {
        "inf" => "Infinity".into(),
        "-inf" => "-Infinity".into(),
        _ => text,
    }
}

/// `[-][d.]hh:mm:ss[.fffffff]`
fn timespan_string(span: TimeSpan) -> String {
    let sign = if span.ticks < 0 { "-" } else { "" };
    let ticks = span.ticks.unsigned_abs();
    let per_second = TICKS_PER_SECOND as u64;
    let days = ticks / (86_400 * per_second);
    let hours = (ticks / (3_600 * per_second)) % 24;
    let minutes = (ticks / (60 * per_second)) % 60;
    let seconds = (ticks / per_second) % 60;
    let fraction = ticks % per_second;

    let mut out = String::from(sign);
    if days > 0 {
        out.push_str(&format!("{}.", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if fraction > 0 {
        out.push_str(&format!(".{:07}", fraction));
    }
    out
}

fn shift(target: &Value, span: TimeSpan, method: &str) -> Result<Value, EvalError> {
    let shifted = match target {
        Value::DateTime(dt) => dt.checked_add(span).map(Value::DateTime),
        Value::DateTimeOffset(dto) => dto.checked_add(span).map(Value::DateTimeOffset),
        _ => None,
    };
    shifted.ok_or_else(|| overflow(method))
}

/// Span for `AddDays(n)`-style methods, `None` when `name` is not one.
fn add_unit_span(name: &str, args: &[Value]) -> Result<Option<TimeSpan>, EvalError> {
    let span = match name {
        "AddTicks" => Some(TimeSpan::from_ticks(int_arg(args, 0, name)?)),
        "AddDays" => TimeSpan::from_days(float_arg(args, 0, name)?),
        "AddHours" => TimeSpan::from_hours(float_arg(args, 0, name)?),
        "AddMinutes" => TimeSpan::from_minutes(float_arg(args, 0, name)?),
        "AddSeconds" => TimeSpan::from_seconds(float_arg(args, 0, name)?),
        "AddMilliseconds" => TimeSpan::from_milliseconds(float_arg(args, 0, name)?),
        _ => return Ok(None),
    };
    span.map(Some).ok_or_else(|| overflow(name))
}

fn parse_kind(member: &str) -> Result<DateTimeKind, EvalError> {
    match member {
        "Unspecified" => Ok(DateTimeKind::Unspecified),
        "Utc" => Ok(DateTimeKind::Utc),
        "Local" => Ok(DateTimeKind::Local),
        other => Err(EvalError::InvalidArgument(format!("unknown DateTimeKind '{}'", other))),
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn default_of(ty: &Type) -> Value {
    match NumericKind::of_type(ty) {
        Some(kind) => numeric::from_integral(kind, 0).unwrap_or(Value::Int32(0)),
        None => match ty {
            Type::Boolean => Value::Boolean(false),
            Type::DateTime => Value::DateTime(DateTime::MIN),
            Type::TimeSpan => Value::TimeSpan(TimeSpan::ZERO),
            Type::Guid => Value::Guid(Uuid::nil()),
            _ => Value::Null,
        },
    }
}

fn ordering_to_int(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn instant_difference(a: DateTimeOffset, b: DateTimeOffset) -> Option<TimeSpan> {
    a.utc_ticks()?
        .checked_sub(b.utc_ticks()?)
        .map(TimeSpan::from_ticks)
}

fn arg<'a>(args: &'a [Value], index: usize, method: &str) -> Result<&'a Value, EvalError> {
    args.get(index).ok_or_else(|| {
        EvalError::InvalidArgument(format!("{} expects at least {} argument(s)", method, index + 1))
    })
}

fn int_arg(args: &[Value], index: usize, method: &str) -> Result<i64, EvalError> {
    let value = arg(args, index, method)?;
    numeric::integral(value)
        .and_then(|n| i64::try_from(n).ok())
        .ok_or_else(|| {
            EvalError::InvalidArgument(format!(
                "{}: argument {} must be an integer, got {}",
                method,
                index + 1,
                value.type_of().name()
            ))
        })
}

fn float_arg(args: &[Value], index: usize, method: &str) -> Result<f64, EvalError> {
    let value = arg(args, index, method)?;
    numeric::to_f64(value).ok_or_else(|| not_a_number(method, value))
}

fn str_arg<'a>(args: &'a [Value], index: usize, method: &str) -> Result<&'a str, EvalError> {
    let value = arg(args, index, method)?;
    value.as_str().ok_or_else(|| {
        EvalError::InvalidArgument(format!(
            "{}: argument {} must be a string, got {}",
            method,
            index + 1,
            value.type_of().name()
        ))
    })
}

fn timespan_arg(args: &[Value], index: usize, method: &str) -> Result<TimeSpan, EvalError> {
    match arg(args, index, method)? {
        Value::TimeSpan(span) => Ok(*span),
        other => Err(EvalError::InvalidArgument(format!(
            "{} expects a TimeSpan, got {}",
            method,
            other.type_of().name()
        ))),
    }
}

fn not_a_number(method: &str, value: &Value) -> EvalError {
    EvalError::InvalidArgument(format!(
        "{} expects a number, got {}",
        method,
        value.type_of().name()
    ))
}

fn overflow(method: &str) -> EvalError {
    EvalError::Overflow(format!("{} result is out of range", method))
}

fn out_of_range(method: &str) -> EvalError {
    EvalError::InvalidArgument(format!("{}: argument out of range", method))
}

fn unknown_method(target: &Value, name: &str) -> EvalError {
    EvalError::UnknownMethod(format!("{}.{}", target.type_of().name(), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timespan_strings() {
        assert_eq!(timespan_string(TimeSpan::from_hms(1, 2, 3).unwrap()), "01:02:03");
        assert_eq!(timespan_string(TimeSpan::from_dhms(2, 0, 0, 1).unwrap()), "2.00:00:01");
        assert_eq!(timespan_string(TimeSpan::from_ticks(-15_000_000)), "-00:00:01.5000000");
    }

    #[test]
    fn invariant_strings() {
        assert_eq!(invariant_string(&Value::Boolean(true)), "True");
        assert_eq!(invariant_string(&Value::Double(2.5)), "2.5");
        assert_eq!(invariant_string(&Value::Double(f64::NAN)), "NaN");
        let dt = DateTime::from_ymd_hms(2009, 6, 15, 13, 45, 30, DateTimeKind::Unspecified).unwrap();
        assert_eq!(invariant_string(&Value::DateTime(dt)), "06/15/2009 13:45:30");
    }
}
