//! Numeric promotion, checked arithmetic and conversions for folded constants.

use std::cmp::Ordering;

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    ast::{BinaryOp, Type},
    interpreter::EvalError,
    value::Value,
};

/// Numeric value categories, ordered by width within each family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericKind {
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
}

impl NumericKind {
    pub fn of(value: &Value) -> Option<NumericKind> {
        Some(match value {
            Value::SByte(_) => NumericKind::SByte,
            Value::Byte(_) => NumericKind::Byte,
            Value::Int16(_) => NumericKind::Int16,
            Value::UInt16(_) => NumericKind::UInt16,
            Value::Int32(_) => NumericKind::Int32,
            Value::UInt32(_) => NumericKind::UInt32,
            Value::Int64(_) => NumericKind::Int64,
            Value::UInt64(_) => NumericKind::UInt64,
            Value::Single(_) => NumericKind::Single,
            Value::Double(_) => NumericKind::Double,
            Value::Decimal(_) => NumericKind::Decimal,
            _ => return None,
        })
    }

    pub fn of_type(ty: &Type) -> Option<NumericKind> {
        Some(match ty.non_nullable() {
            Type::SByte => NumericKind::SByte,
            Type::Byte => NumericKind::Byte,
            Type::Int16 => NumericKind::Int16,
            Type::UInt16 => NumericKind::UInt16,
            Type::Int32 => NumericKind::Int32,
            Type::UInt32 => NumericKind::UInt32,
            Type::Int64 => NumericKind::Int64,
            Type::UInt64 => NumericKind::UInt64,
            Type::Single => NumericKind::Single,
            Type::Double => NumericKind::Double,
            Type::Decimal => NumericKind::Decimal,
            _ => return None,
        })
    }

    pub fn is_integral(self) -> bool {
        self <= NumericKind::UInt64
    }

    /// Common kind two operands are computed in; `None` when no implicit
    /// promotion exists (e.g. `UInt64` with a signed integer, `Decimal`
    /// with a float).
    pub fn promote(left: NumericKind, right: NumericKind) -> Option<NumericKind> {
        use NumericKind as K;

        let widen = |k: NumericKind| if k < K::Int32 { K::Int32 } else { k };
        let (a, b) = (widen(left), widen(right));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        Some(match (lo, hi) {
            (K::Single | K::Double, K::Decimal) => return None,
            (_, K::Decimal) => K::Decimal,
            (_, K::Double) => K::Double,
            (_, K::Single) => K::Single,
            (K::Int32, K::Int32) => K::Int32,
            (K::UInt32, K::UInt32) => K::UInt32,
            (K::Int32, K::UInt32) | (_, K::Int64) => K::Int64,
            (K::UInt32 | K::UInt64, K::UInt64) => K::UInt64,
            _ => return None,
        })
    }
}

pub fn integral(value: &Value) -> Option<i128> {
    Some(match value {
        Value::SByte(n) => i128::from(*n),
        Value::Byte(n) => i128::from(*n),
        Value::Int16(n) => i128::from(*n),
        Value::UInt16(n) => i128::from(*n),
        Value::Int32(n) => i128::from(*n),
        Value::UInt32(n) => i128::from(*n),
        Value::Int64(n) => i128::from(*n),
        Value::UInt64(n) => i128::from(*n),
        Value::Char(c) => i128::from(u32::from(*c)),
        _ => return None,
    })
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Single(n) => Some(f64::from(*n)),
        Value::Double(n) => Some(*n),
        Value::Decimal(d) => d.to_f64(),
        other => integral(other).map(|n| n as f64),
    }
}

pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Decimal(d) => Some(*d),
        Value::Single(n) => Decimal::from_f32(*n),
        Value::Double(n) => Decimal::from_f64(*n),
        other => integral(other).and_then(Decimal::from_i128),
    }
}

/// Builds an integral value of `kind`; `None` when `n` does not fit.
pub fn from_integral(kind: NumericKind, n: i128) -> Option<Value> {
    Some(match kind {
        NumericKind::SByte => Value::SByte(i8::try_from(n).ok()?),
        NumericKind::Byte => Value::Byte(u8::try_from(n).ok()?),
        NumericKind::Int16 => Value::Int16(i16::try_from(n).ok()?),
        NumericKind::UInt16 => Value::UInt16(u16::try_from(n).ok()?),
        NumericKind::Int32 => Value::Int32(i32::try_from(n).ok()?),
        NumericKind::UInt32 => Value::UInt32(u32::try_from(n).ok()?),
        NumericKind::Int64 => Value::Int64(i64::try_from(n).ok()?),
        NumericKind::UInt64 => Value::UInt64(u64::try_from(n).ok()?),
        NumericKind::Single => Value::Single(n as f32),
        NumericKind::Double => Value::Double(n as f64),
        NumericKind::Decimal => Value::Decimal(Decimal::from_i128(n)?),
    })
}

fn operand_kinds(op: BinaryOp, left: &Value, right: &Value) -> Result<NumericKind, EvalError> {
    let mismatch = || {
        EvalError::TypeError(format!(
            "operator {:?} cannot be applied to {} and {}",
            op,
            left.type_of().name(),
            right.type_of().name()
        ))
    };
    let l = NumericKind::of(left).ok_or_else(mismatch)?;
    let r = NumericKind::of(right).ok_or_else(mismatch)?;
    NumericKind::promote(l, r).ok_or_else(mismatch)
}

/// Checked arithmetic on two numeric values.
///
/// Overflow and division by zero are errors, as they are for constant
/// expressions evaluated at compile time.
pub fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let kind = operand_kinds(op, left, right)?;
    let overflow = || EvalError::Overflow(format!("{:?} on {}", op, kind_name(kind)));

    match kind {
        k if k.is_integral() => {
            let (a, b) = (integral(left).ok_or_else(overflow)?, integral(right).ok_or_else(overflow)?);
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                BinaryOp::Divide | BinaryOp::Modulo if b == 0 => {
                    return Err(EvalError::DivisionByZero);
                }
                BinaryOp::Divide => a.checked_div(b),
                BinaryOp::Modulo => a.checked_rem(b),
                _ => return Err(unsupported(op)),
            };
            result
                .and_then(|n| from_integral(k, n))
                .ok_or_else(overflow)
        }
        NumericKind::Single => {
            let (a, b) = (to_f64(left).ok_or_else(overflow)? as f32, to_f64(right).ok_or_else(overflow)? as f32);
            Ok(Value::Single(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Modulo => a % b,
                BinaryOp::Power => a.powf(b),
                _ => return Err(unsupported(op)),
            }))
        }
        NumericKind::Double => {
            let (a, b) = (to_f64(left).ok_or_else(overflow)?, to_f64(right).ok_or_else(overflow)?);
            Ok(Value::Double(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Modulo => a % b,
                BinaryOp::Power => a.powf(b),
                _ => return Err(unsupported(op)),
            }))
        }
        _ => {
            let (a, b) = (to_decimal(left).ok_or_else(overflow)?, to_decimal(right).ok_or_else(overflow)?);
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                BinaryOp::Divide | BinaryOp::Modulo if b.is_zero() => {
                    return Err(EvalError::DivisionByZero);
                }
                BinaryOp::Divide => a.checked_div(b),
                BinaryOp::Modulo => a.checked_rem(b),
                _ => return Err(unsupported(op)),
            };
            result.map(Value::Decimal).ok_or_else(overflow)
        }
    }
}

/// Orders two numeric values after promotion; `None` for non-numerics
/// and NaN.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let kind = NumericKind::promote(NumericKind::of(left)?, NumericKind::of(right)?)?;
    match kind {
        k if k.is_integral() => Some(integral(left)?.cmp(&integral(right)?)),
        NumericKind::Decimal => Some(to_decimal(left)?.cmp(&to_decimal(right)?)),
        _ => to_f64(left)?.partial_cmp(&to_f64(right)?),
    }
}

/// Explicit numeric conversion, truncating fractions toward zero and
/// failing when the value does not fit the target.
pub fn convert(value: &Value, target: NumericKind) -> Result<Value, EvalError> {
    let overflow = || {
        EvalError::Overflow(format!(
            "{} does not fit in {}",
            value.type_of().name(),
            kind_name(target)
        ))
    };

    if target.is_integral() {
        let n = match value {
            Value::Single(_) | Value::Double(_) => {
                let f = to_f64(value).ok_or_else(overflow)?.trunc();
                if !f.is_finite() || f.abs() > 1e38 {
                    return Err(overflow());
                }
                f as i128
            }
            Value::Decimal(d) => d.trunc().to_i128().ok_or_else(overflow)?,
            other => integral(other).ok_or_else(|| not_numeric(other, target))?,
        };
        return from_integral(target, n).ok_or_else(overflow);
    }

    match target {
        NumericKind::Single => Ok(Value::Single(
            to_f64(value).ok_or_else(|| not_numeric(value, target))? as f32,
        )),
        NumericKind::Double => Ok(Value::Double(
            to_f64(value).ok_or_else(|| not_numeric(value, target))?,
        )),
        _ => {
            if NumericKind::of(value).is_none() && !matches!(value, Value::Char(_)) {
                return Err(not_numeric(value, target));
            }
            to_decimal(value).map(Value::Decimal).ok_or_else(overflow)
        }
    }
}

pub fn kind_name(kind: NumericKind) -> &'static str {
    match kind {
        NumericKind::SByte => "SByte",
        NumericKind::Byte => "Byte",
        NumericKind::Int16 => "Int16",
        NumericKind::UInt16 => "UInt16",
        NumericKind::Int32 => "Int32",
        NumericKind::UInt32 => "UInt32",
        NumericKind::Int64 => "Int64",
        NumericKind::UInt64 => "UInt64",
        NumericKind::Single => "Single",
        NumericKind::Double => "Double",
        NumericKind::Decimal => "Decimal",
    }
}

fn unsupported(op: BinaryOp) -> EvalError {
    EvalError::TypeError(format!("operator {:?} is not arithmetic", op))
}

fn not_numeric(value: &Value, target: NumericKind) -> EvalError {
    EvalError::TypeError(format!(
        "cannot convert {} to {}",
        value.type_of().name(),
        kind_name(target)
    ))
}
