//! CLI support for seqwire
//!
//! Provides programmatic access to the `seqwire` commands so other tools
//! can embed them.

mod serialize;

pub use serialize::{FoldOptions, SerializeOptions, execute_fold, execute_serialize};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] crate::SerializeError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    /// The input is not a JSON expression tree
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe a JSON expression tree to stdin.")]
    NoInput,
}
