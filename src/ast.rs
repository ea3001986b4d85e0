//! # Query Expression Tree
//!
//! This module defines the expression tree a composed client-side query is
//! made of, the way a query provider receives it: a chain of static
//! operator calls (`Where`, `OrderBy`, `Skip`, ...) whose first argument is
//! the source sequence, bottoming out at a constant data source.
//!
//! ## Architecture Overview
//!
//! - **[expressions]** - Expression nodes (parameters, members, calls, operators, literals)
//! - **[operators]** - Binary and unary operators
//! - **[types]** - Static types of nodes, members and methods
//! - **[query]** - Ergonomic builder for operator chains
//! - **[parts]** - Serializer output: (operator, expression text) pairs
//!
//! ## Example
//!
//! ```text
//! Take(OrderBy(Where(people, x => x.Age > 5), x => x.Name), 10)
//! ```
//!
//! serializes to the parts
//!
//! ```text
//! where:   (it.Age>5)
//! orderby: it.Name
//! take:    10
//! ```
pub mod expressions;
pub mod operators;
pub mod parts;
pub mod query;
pub mod types;

pub use expressions::{Expr, Member, Method, Parameter};
pub use operators::{BinaryOp, UnaryOp};
pub use parts::{QueryOperator, QueryPart};
pub use query::QueryBuilder;
pub use types::Type;
