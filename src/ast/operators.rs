use serde::{Deserialize, Serialize};

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessThanOrEqual,
    /// Greater than or equal (`>=`)
    GreaterThanOrEqual,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
    /// Exponentiation, emitted by some source surfaces (`^`)
    Power,

    // Logical
    /// Short-circuit AND (`&&`)
    AndAlso,
    /// Short-circuit OR (`||`)
    OrElse,

    // Bitwise
    And,
    Or,
    ExclusiveOr,
    LeftShift,
    RightShift,

    /// Null-coalescing (`??`)
    Coalesce,

    /// Array element access (`a[i]`)
    ArrayIndex,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::GreaterThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThanOrEqual
        )
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::ExclusiveOr
                | BinaryOp::LeftShift
                | BinaryOp::RightShift
        )
    }

    /// Infix token in the remote grammar, `None` when the operator has none.
    pub fn token(self) -> Option<&'static str> {
        Some(match self {
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::AndAlso => "&&",
            BinaryOp::OrElse => "||",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::Multiply => "*",
            BinaryOp::Modulo => "%",
            BinaryOp::Subtract => "-",
            BinaryOp::Divide => "/",
            BinaryOp::Add => "+",
            _ => return None,
        })
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical or bitwise complement (`!`, `~`)
    Not,
    /// Arithmetic negation (`-`)
    Negate,
    /// Unary plus (`+`)
    UnaryPlus,
    /// Length of an array operand
    ArrayLength,
    /// Wraps a lambda passed as a query operator argument
    Quote,
    /// Type conversion
    Convert,
    /// Overflow-checked type conversion
    ConvertChecked,
    /// Reference conversion yielding null on failure (`as`)
    TypeAs,
}
