use seqwire::output::{OutputFormat, render};
use seqwire::*;

fn sample_parts() -> Vec<QueryPart> {
    vec![
        QueryPart::new(QueryOperator::Where, "(it.Name==\"O'Neil & Co\")"),
        QueryPart::new(QueryOperator::OrderBy, "it.Name desc, it.Age"),
        QueryPart::new(QueryOperator::Take, "10"),
    ]
}

// ============================================================================
// Query String
// ============================================================================

#[test]
fn test_query_string_encodes_expressions() {
    assert_eq!(
        to_query_string(&sample_parts()),
        "$where=%28it.Name%3D%3D%22O%27Neil+%26+Co%22%29&$orderby=it.Name+desc%2C+it.Age&$take=10"
    );
}

#[test]
fn test_query_string_of_no_parts_is_empty() {
    assert_eq!(to_query_string(&[]), "");
}

// ============================================================================
// XML Body
// ============================================================================

#[test]
fn test_xml_body_escapes_attribute_values() {
    assert_eq!(
        to_xml_body(&sample_parts()),
        "<QueryOptions>\
         <QueryOption Name=\"where\" Value=\"(it.Name==&quot;O&apos;Neil &amp; Co&quot;)\" />\
         <QueryOption Name=\"orderby\" Value=\"it.Name desc, it.Age\" />\
         <QueryOption Name=\"take\" Value=\"10\" />\
         </QueryOptions>"
    );
}

#[test]
fn test_xml_body_of_no_parts() {
    assert_eq!(to_xml_body(&[]), "<QueryOptions></QueryOptions>");
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_json_uses_lowercase_operators() {
    let parts = vec![QueryPart::new(QueryOperator::Skip, "20")];
    assert_eq!(
        to_json(&parts).unwrap(),
        r#"[{"operator":"skip","expression":"20"}]"#
    );
}

#[test]
fn test_json_round_trips() {
    let json = to_json_pretty(&sample_parts()).unwrap();
    let parsed: Vec<QueryPart> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, sample_parts());
}

// ============================================================================
// Render
// ============================================================================

#[test]
fn test_render_parts_one_per_line() {
    let rendered = render(&sample_parts(), OutputFormat::Parts, false).unwrap();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(
        lines,
        vec![
            "where: (it.Name==\"O'Neil & Co\")",
            "orderby: it.Name desc, it.Age",
            "take: 10",
        ]
    );
}

#[test]
fn test_render_dispatches_on_format() {
    let parts = sample_parts();
    assert_eq!(render(&parts, OutputFormat::Url, false).unwrap(), to_query_string(&parts));
    assert_eq!(render(&parts, OutputFormat::Xml, false).unwrap(), to_xml_body(&parts));
    assert_eq!(render(&parts, OutputFormat::Json, false).unwrap(), to_json(&parts).unwrap());
    assert_eq!(
        render(&parts, OutputFormat::Json, true).unwrap(),
        to_json_pretty(&parts).unwrap()
    );
}

#[test]
fn test_output_format_default() {
    assert_eq!(OutputFormat::default(), OutputFormat::Parts);
}
