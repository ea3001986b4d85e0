use serde::{Deserialize, Serialize};

/// Static type of an expression node, a member's declaring type, or a
/// method's declaring/return type.
///
/// The set is closed over what the serializer and the fold interpreter
/// need to know about; anything else is a [`Type::Named`] user type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// The universal base object type
    Object,
    Boolean,
    Char,
    String,
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
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Guid,
    Uri,

    /// Math function library (`Math.Abs`, `Math.Round`, ...)
    Math,
    /// Type conversion library (`Convert.ToInt32`, ...)
    Convert,
    /// Regular expression helpers, foldable but never rendered
    Regex,

    /// Base type of every enum; declares `HasFlag`
    EnumBase,
    /// A concrete enum type, by name
    Enum(String),
    /// The case/culture selector accepted by `String.Compare`
    StringComparison,

    Nullable(Box<Type>),
    Array(Box<Type>),

    /// Provider of the composable query operators over a remote source
    Queryable,
    /// Provider of the same operators over in-memory sequences
    Enumerable,

    /// Helper library some source surfaces emit for object comparisons
    /// (`CompareObjectEqual`, `CompareString`, ...)
    Operators,
    /// Helper library some source surfaces emit for inline conditionals (`IIf`)
    Interaction,

    /// Any other type, by name (entities, closures, projections)
    Named(String),
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Type::Enum(name.into())
    }

    pub fn nullable(inner: Type) -> Self {
        Type::Nullable(Box::new(inner))
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Name used when the type appears in rendered text, e.g. the
    /// `DateTime` in `DateTime.Now` or the `Color` in `Color.Red`.
    pub fn name(&self) -> String {
        match self {
            Type::Object => "Object".into(),
            Type::Boolean => "Boolean".into(),
            Type::Char => "Char".into(),
            Type::String => "String".into(),
            Type::SByte => "SByte".into(),
            Type::Byte => "Byte".into(),
            Type::Int16 => "Int16".into(),
            Type::UInt16 => "UInt16".into(),
            Type::Int32 => "Int32".into(),
            Type::UInt32 => "UInt32".into(),
            Type::Int64 => "Int64".into(),
            Type::UInt64 => "UInt64".into(),
            Type::Single => "Single".into(),
            Type::Double => "Double".into(),
            Type::Decimal => "Decimal".into(),
            Type::DateTime => "DateTime".into(),
            Type::DateTimeOffset => "DateTimeOffset".into(),
            Type::TimeSpan => "TimeSpan".into(),
            Type::Guid => "Guid".into(),
            Type::Uri => "Uri".into(),
            Type::Math => "Math".into(),
            Type::Convert => "Convert".into(),
            Type::Regex => "Regex".into(),
            Type::EnumBase => "Enum".into(),
            Type::Enum(name) | Type::Named(name) => name.clone(),
            Type::StringComparison => "StringComparison".into(),
            Type::Nullable(inner) => format!("{}?", inner.name()),
            Type::Array(element) => format!("{}[]", element.name()),
            Type::Queryable => "Queryable".into(),
            Type::Enumerable => "Enumerable".into(),
            Type::Operators => "Operators".into(),
            Type::Interaction => "Interaction".into(),
        }
    }

    /// Strips one level of `Nullable`.
    pub fn non_nullable(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.non_nullable(), Type::Boolean)
    }

    pub fn is_date_time(&self) -> bool {
        matches!(self.non_nullable(), Type::DateTime | Type::DateTimeOffset)
    }

    pub fn is_sequence_operator_provider(&self) -> bool {
        matches!(self, Type::Queryable | Type::Enumerable)
    }

    /// Whether methods declared on this type may appear in rendered output.
    ///
    /// Bounds what the remote parser must be able to execute: the basic
    /// value types, `Math`, `Convert` and `Object`.
    pub fn is_accessible(&self) -> bool {
        matches!(
            self,
            Type::Object
                | Type::Boolean
                | Type::Char
                | Type::String
                | Type::SByte
                | Type::Byte
                | Type::Int16
                | Type::UInt16
                | Type::Int32
                | Type::UInt32
                | Type::Int64
                | Type::UInt64
                | Type::Single
                | Type::Double
                | Type::Decimal
                | Type::DateTime
                | Type::DateTimeOffset
                | Type::TimeSpan
                | Type::Guid
                | Type::Math
                | Type::Convert
        )
    }

    /// Element type of an array type, `Object` otherwise.
    pub fn element_type(&self) -> Type {
        match self.non_nullable() {
            Type::Array(element) => (**element).clone(),
            _ => Type::Object,
        }
    }
}
