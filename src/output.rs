//! Transport-facing renderings of serialized query parts.
//!
//! The serializer only produces [`QueryPart`]s; how they travel is up to
//! the caller. This module covers the usual carriers:
//!
//! - **URL query string** via [`to_query_string()`] - `$where=...&$orderby=...`
//! - **XML message body** via [`to_xml_body()`] - `<QueryOption Name=".." Value=".." />` elements
//! - **JSON** via [`to_json()`] / [`to_json_pretty()`] - an array of `{operator, expression}` objects
//!
//! # Examples
//!
//! ```
//! use seqwire::{QueryOperator, QueryPart};
//! use seqwire::output::{to_query_string, to_xml_body};
//!
//! let parts = vec![
//!     QueryPart::new(QueryOperator::Where, "(it.Name==\"Bob\")"),
//!     QueryPart::new(QueryOperator::Take, "10"),
//! ];
//!
//! assert_eq!(
//!     to_query_string(&parts),
//!     "$where=%28it.Name%3D%3D%22Bob%22%29&$take=10"
//! );
//! assert_eq!(
//!     to_xml_body(&parts),
//!     "<QueryOptions><QueryOption Name=\"where\" Value=\"(it.Name==&quot;Bob&quot;)\" /><QueryOption Name=\"take\" Value=\"10\" /></QueryOptions>"
//! );
//! ```

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::ast::QueryPart;

/// How query parts are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `operator: expression` line per part
    #[default]
    Parts,
    Json,
    Url,
    Xml,
}

/// Renders `parts` in the given format.
pub fn render(parts: &[QueryPart], format: OutputFormat, pretty: bool) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Parts => parts
            .iter()
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json if pretty => to_json_pretty(parts)?,
        OutputFormat::Json => to_json(parts)?,
        OutputFormat::Url => to_query_string(parts),
        OutputFormat::Xml => to_xml_body(parts),
    })
}

/// `$<operator>=<expression>` pairs joined by `&`, form-URL encoded.
pub fn to_query_string(parts: &[QueryPart]) -> String {
    parts
        .iter()
        .map(|part| {
            let value: String = form_urlencoded::byte_serialize(part.expression.as_bytes()).collect();
            format!("${}={}", part.operator, value)
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// `<QueryOptions>` element holding one `<QueryOption>` per part.
pub fn to_xml_body(parts: &[QueryPart]) -> String {
    let mut body = String::from("<QueryOptions>");
    for part in parts {
        body.push_str(&format!(
            "<QueryOption Name=\"{}\" Value=\"{}\" />",
            part.operator,
            escape_attribute(&part.expression)
        ));
    }
    body.push_str("</QueryOptions>");
    body
}

pub fn to_json(parts: &[QueryPart]) -> Result<String, serde_json::Error> {
    serde_json::to_string(parts)
}

pub fn to_json_pretty(parts: &[QueryPart]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(parts)
}

fn escape_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
