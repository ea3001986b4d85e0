//! Compiles composed, client-side query expression trees into the ordered
//! textual query options a remote query parser executes.
//!
//! The pipeline is [`normalize`] → [`partially_evaluate`] → [`serialize`]:
//! alternate source-surface shapes become canonical nodes, everything not
//! depending on the element parameter folds into literals, and the
//! operator chain renders into [`QueryPart`]s.

#[cfg(feature = "cli")]
pub mod cli;

pub mod ast;
pub mod evaluator;
pub mod interpreter;
pub mod normalizer;
pub mod output;
pub mod serializer;
pub mod value;

pub use ast::{BinaryOp, Expr, Member, Method, Parameter, QueryBuilder, QueryOperator, QueryPart, Type, UnaryOp};
pub use evaluator::{can_be_evaluated_locally, can_be_evaluated_locally_deferring_now, partially_evaluate};
pub use interpreter::{EvalError, Interpreter};
pub use normalizer::normalize;
pub use output::{OutputFormat, to_json, to_json_pretty, to_query_string, to_xml_body};
pub use serializer::{ErrorKind, SerializeError, serialize};
pub use value::Value;
