use std::fmt;

use serde::{Deserialize, Serialize};

/// Query option a [`QueryPart`] carries.
///
/// `ThenBy` only exists while parts are being collected; it is folded into
/// the preceding `OrderBy` before parts are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOperator {
    Where,
    OrderBy,
    ThenBy,
    Skip,
    Take,
}

impl QueryOperator {
    /// Matches a sequence operator by lower-cased method name.
    ///
    /// Returns the canonical operator and whether the method was a
    /// descending variant.
    pub fn from_method_name(name: &str) -> Option<(QueryOperator, bool)> {
        Some(match name.to_lowercase().as_str() {
            "where" => (QueryOperator::Where, false),
            "orderby" => (QueryOperator::OrderBy, false),
            "orderbydescending" => (QueryOperator::OrderBy, true),
            "thenby" => (QueryOperator::ThenBy, false),
            "thenbydescending" => (QueryOperator::ThenBy, true),
            "skip" => (QueryOperator::Skip, false),
            "take" => (QueryOperator::Take, false),
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryOperator::Where => "where",
            QueryOperator::OrderBy => "orderby",
            QueryOperator::ThenBy => "thenby",
            QueryOperator::Skip => "skip",
            QueryOperator::Take => "take",
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (operator, rendered expression) pair of serializer output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPart {
    pub operator: QueryOperator,
    pub expression: String,
}

impl QueryPart {
    pub fn new(operator: QueryOperator, expression: impl Into<String>) -> Self {
        QueryPart {
            operator,
            expression: expression.into(),
        }
    }
}

impl fmt::Display for QueryPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operator, self.expression)
    }
}
