//! Serialize or fold JSON-encoded expression trees

use tracing::debug;

use super::CliError;
use crate::{
    Expr, can_be_evaluated_locally_deferring_now, normalize,
    output::{self, OutputFormat},
    partially_evaluate, serialize,
};

/// Options for the serialize command
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// JSON-encoded query expression tree
    pub input: Option<String>,
    /// How the resulting parts are written
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Options for the fold command
#[derive(Debug, Clone, Default)]
pub struct FoldOptions {
    /// JSON-encoded expression tree
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
}

fn parse_tree(input: Option<&String>) -> Result<Expr, CliError> {
    let json = input.ok_or(CliError::NoInput)?;
    let expr: Expr = serde_json::from_str(json)?;
    Ok(expr)
}

/// Serializes the query in `options.input` and renders its parts.
pub fn execute_serialize(options: &SerializeOptions) -> Result<String, CliError> {
    let query = parse_tree(options.input.as_ref())?;
    let parts = serialize(&query)?;
    debug!(parts = parts.len(), format = ?options.format, "serialized query");
    Ok(output::render(&parts, options.format, options.pretty)?)
}

/// Normalizes and partially evaluates the tree in `options.input`,
/// returning the resulting tree as JSON.
pub fn execute_fold(options: &FoldOptions) -> Result<String, CliError> {
    let expr = parse_tree(options.input.as_ref())?;
    let folded = partially_evaluate(&normalize(&expr), can_be_evaluated_locally_deferring_now)?;
    let json = if options.pretty {
        serde_json::to_string_pretty(&folded)
    } else {
        serde_json::to_string(&folded)
    }?;
    Ok(json)
}
