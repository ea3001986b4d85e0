pub mod numeric;
pub mod temporal;

use std::{cmp::Ordering, collections::BTreeMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::ast::Type;

pub use temporal::{DateTime, DateTimeKind, DateTimeOffset, TimeSpan};

/// A runtime value held by a constant node or produced by folding.
///
/// # Examples
///
/// ```
/// use seqwire::Value;
///
/// let name = Value::string("Bob");
/// let age = Value::Int32(42);
/// let color = Value::enumeration("Color", "Red");
/// assert_eq!(age.type_of().name(), "Int32");
/// assert_eq!(color.type_of().name(), "Color");
/// # let _ = name;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    String(String),

    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),

    DateTime(DateTime),
    DateTimeOffset(DateTimeOffset),
    TimeSpan(TimeSpan),
    Guid(Uuid),
    Uri(Url),

    /// Enum member, by type and member name
    Enum { type_name: String, member: String },

    /// Array of values
    Array(Vec<Value>),

    /// Opaque object: a user entity, a captured closure, a projection.
    /// Member access reads `fields`.
    Object {
        type_name: String,
        fields: BTreeMap<String, Value>,
    },

    /// The data source a query is composed over
    Source(String),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn enumeration(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Value::Enum {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Object with the given fields, e.g. the closure captured variables
    /// are read from.
    pub fn object<K: Into<String>>(
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Value::Object {
            type_name: type_name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Runtime type of the value.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Null => Type::Object,
            Value::Boolean(_) => Type::Boolean,
            Value::Char(_) => Type::Char,
            Value::String(_) => Type::String,
            Value::SByte(_) => Type::SByte,
            Value::Byte(_) => Type::Byte,
            Value::Int16(_) => Type::Int16,
            Value::UInt16(_) => Type::UInt16,
            Value::Int32(_) => Type::Int32,
            Value::UInt32(_) => Type::UInt32,
            Value::Int64(_) => Type::Int64,
            Value::UInt64(_) => Type::UInt64,
            Value::Single(_) => Type::Single,
            Value::Double(_) => Type::Double,
            Value::Decimal(_) => Type::Decimal,
            Value::DateTime(_) => Type::DateTime,
            Value::DateTimeOffset(_) => Type::DateTimeOffset,
            Value::TimeSpan(_) => Type::TimeSpan,
            Value::Guid(_) => Type::Guid,
            Value::Uri(_) => Type::Uri,
            Value::Enum { type_name, .. } => Type::Enum(type_name.clone()),
            Value::Array(items) => Type::array(items.first().map_or(Type::Object, Value::type_of)),
            Value::Object { type_name, .. } => Type::Named(type_name.clone()),
            Value::Source(_) => Type::named("QuerySource"),
        }
    }

    /// Equality as the `==` operator sees it: numerics compare after
    /// promotion, date/times by instant, everything else structurally.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::DateTime(a), Value::DateTime(b)) => a.ticks == b.ticks,
            (Value::DateTimeOffset(a), Value::DateTimeOffset(b)) => match (a.utc_ticks(), b.utc_ticks()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            (a, b) => match numeric::compare(a, b) {
                Some(ordering) => ordering == Ordering::Equal,
                None => a == b,
            },
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`; `None` when the values are not
    /// comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.ticks.cmp(&b.ticks)),
            (Value::DateTimeOffset(a), Value::DateTimeOffset(b)) => {
                Some(a.utc_ticks()?.cmp(&b.utc_ticks()?))
            }
            (Value::TimeSpan(a), Value::TimeSpan(b)) => Some(a.cmp(b)),
            (Value::Guid(a), Value::Guid(b)) => Some(a.cmp(b)),
            (a, b) => numeric::compare(a, b),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
