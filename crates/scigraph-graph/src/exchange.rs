//! Graph exchange formats: a JSON list of string triples and N-Triples.

use crate::StatementStore;
use scigraph_core::{Datatype, Iri, Literal, Result, SciGraphError, Term, Triple};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    Json,
    NTriples,
}

impl GraphFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        extension.parse()
    }

}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GraphFormat::Json => "json",
            GraphFormat::NTriples => "ntriples",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for GraphFormat {
    type Err = SciGraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(GraphFormat::Json),
            "nt" | "ntriples" | "n-triples" => Ok(GraphFormat::NTriples),
            other => Err(SciGraphError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Iri,
    Literal,
}

/// One statement in the JSON exchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleRecord {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Datatype>,
}

impl From<&Triple> for TripleRecord {
    fn from(triple: &Triple) -> Self {
        let (object_type, datatype) = match &triple.object {
            Term::Iri(_) => (ObjectType::Iri, None),
            Term::Literal(lit) => (ObjectType::Literal, lit.datatype),
        };
        Self {
            subject: triple.subject.to_string(),
            predicate: triple.predicate.to_string(),
            object: triple.object.lexical().to_string(),
            object_type: Some(object_type),
            datatype,
        }
    }
}

impl From<TripleRecord> for Triple {
    fn from(record: TripleRecord) -> Self {
        // Records from other producers may omit the object type.
        let object_type = record.object_type.unwrap_or_else(|| {
            if record.datatype.is_none() && Iri::is_absolute(&record.object) {
                ObjectType::Iri
            } else {
                ObjectType::Literal
            }
        });
        let object = match object_type {
            ObjectType::Iri => Term::Iri(Iri::new(record.object)),
            ObjectType::Literal => Term::Literal(Literal {
                value: record.object,
                datatype: record.datatype,
            }),
        };
        Triple::new(Iri::new(record.subject), Iri::new(record.predicate), object)
    }
}

pub fn to_json(store: &StatementStore) -> Result<String> {
    let records: Vec<TripleRecord> = store.iter().map(TripleRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn from_json(source: &str) -> Result<Vec<Triple>> {
    let records: Vec<TripleRecord> = serde_json::from_str(source)?;
    Ok(records.into_iter().map(Triple::from).collect())
}

pub fn to_ntriples(store: &StatementStore) -> String {
    let mut out = String::new();
    for (prefix, namespace) in store.bindings() {
        out.push_str(&format!("# @prefix {}: <{}> .\n", prefix, namespace));
    }
    for triple in store.iter() {
        out.push_str(&format!(
            "<{}> <{}> {} .\n",
            escape_iri(triple.subject.as_str()),
            escape_iri(triple.predicate.as_str()),
            format_object(&triple.object)
        ));
    }
    out
}

fn format_object(object: &Term) -> String {
    match object {
        Term::Iri(iri) => format!("<{}>", escape_iri(iri.as_str())),
        Term::Literal(lit) => {
            let escaped = escape_literal(&lit.value);
            match lit.datatype {
                Some(dt) => format!("\"{}\"^^<{}>", escaped, dt.iri()),
                None => format!("\"{}\"", escaped),
            }
        }
    }
}

/// Characters that may not appear raw between `<` and `>` become `\uXXXX`.
fn escape_iri(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                out.push_str(&format!("\\u{:04X}", c as u32))
            }
            c if c <= ' ' => out.push_str(&format!("\\u{:04X}", c as u32)),
            other => out.push(other),
        }
    }
    out
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

pub fn from_ntriples(source: &str) -> Result<Vec<Triple>> {
    let mut triples = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        triples.push(parse_statement(line, index + 1)?);
    }
    Ok(triples)
}

fn parse_statement(line: &str, line_no: usize) -> Result<Triple> {
    let (subject, rest) = parse_resource(line, line_no)?;
    let (predicate, rest) = parse_resource(rest.trim_start(), line_no)?;
    let (object, rest) = parse_object(rest.trim_start(), line_no)?;

    let rest = rest.trim_start();
    let Some(tail) = rest.strip_prefix('.') else {
        return Err(SciGraphError::parse(line_no, "expected '.' after object"));
    };
    let tail = tail.trim_start();
    if !tail.is_empty() && !tail.starts_with('#') {
        return Err(SciGraphError::parse(
            line_no,
            format!("unexpected content after statement: {}", tail),
        ));
    }

    Ok(Triple::new(subject, predicate, object))
}

/// `<iri>` or a `_:label` blank node, kept verbatim as an identifier.
fn parse_resource(input: &str, line_no: usize) -> Result<(Iri, &str)> {
    if let Some(rest) = input.strip_prefix('<') {
        let end = rest
            .find('>')
            .ok_or_else(|| SciGraphError::parse(line_no, "unterminated IRI"))?;
        let iri = unescape_iri(&rest[..end], line_no)?;
        return Ok((Iri::new(iri), &rest[end + 1..]));
    }
    if input.starts_with("_:") {
        let end = input
            .find(char::is_whitespace)
            .unwrap_or(input.len());
        return Ok((Iri::new(&input[..end]), &input[end..]));
    }
    Err(SciGraphError::parse(
        line_no,
        format!("expected IRI, found: {}", input),
    ))
}

/// Decodes the `\uXXXX` and `\UXXXXXXXX` escapes allowed inside an IRI.
fn unescape_iri(raw: &str, line_no: usize) -> Result<String> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let width = match chars.next() {
            Some('u') => 4,
            Some('U') => 8,
            other => {
                return Err(SciGraphError::parse(
                    line_no,
                    format!("invalid escape in IRI: \\{}", other.unwrap_or(' ')),
                ))
            }
        };
        out.push(decode_hex(&mut chars, width, line_no)?);
    }
    Ok(out)
}

fn decode_hex(
    chars: &mut impl Iterator<Item = char>,
    width: usize,
    line_no: usize,
) -> Result<char> {
    let hex: String = chars.take(width).collect();
    if hex.len() != width {
        return Err(SciGraphError::parse(
            line_no,
            format!("bad unicode escape: {}", hex),
        ));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| SciGraphError::parse(line_no, format!("bad unicode escape: {}", hex)))
}

fn parse_object(input: &str, line_no: usize) -> Result<(Term, &str)> {
    if !input.starts_with('"') {
        let (iri, rest) = parse_resource(input, line_no)?;
        return Ok((Term::Iri(iri), rest));
    }

    let mut value = String::new();
    let mut chars = input.char_indices().skip(1);
    let mut end = None;
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => {
                end = Some(idx);
                break;
            }
            '\\' => {
                let (_, escape) = chars
                    .next()
                    .ok_or_else(|| SciGraphError::parse(line_no, "dangling escape"))?;
                match escape {
                    't' => value.push('\t'),
                    'b' => value.push('\u{8}'),
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    'f' => value.push('\u{c}'),
                    '"' => value.push('"'),
                    '\'' => value.push('\''),
                    '\\' => value.push('\\'),
                    'u' | 'U' => {
                        let width = if escape == 'u' { 4 } else { 8 };
                        let mut hex = chars.by_ref().map(|(_, h)| h);
                        value.push(decode_hex(&mut hex, width, line_no)?);
                    }
                    other => {
                        return Err(SciGraphError::parse(
                            line_no,
                            format!("unknown escape: \\{}", other),
                        ))
                    }
                }
            }
            other => value.push(other),
        }
    }

    let end = end.ok_or_else(|| SciGraphError::parse(line_no, "unterminated literal"))?;
    let rest = &input[end + 1..];

    if let Some(typed) = rest.strip_prefix("^^") {
        let (datatype_iri, rest) = parse_resource(typed, line_no)?;
        let literal = match Datatype::from_iri(datatype_iri.as_str()) {
            Some(dt) => Literal::typed(value, dt),
            // Unknown datatypes keep their lexical form.
            None => Literal::plain(value),
        };
        return Ok((Term::Literal(literal), rest));
    }

    if let Some(tagged) = rest.strip_prefix('@') {
        let end = tagged
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(tagged.len());
        return Ok((Term::Literal(Literal::plain(value)), &tagged[end..]));
    }

    Ok((Term::Literal(Literal::plain(value)), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            GraphFormat::from_path(Path::new("graph.json")).unwrap(),
            GraphFormat::Json
        );
        assert_eq!(
            GraphFormat::from_path(Path::new("graph.NT")).unwrap(),
            GraphFormat::NTriples
        );
        assert!(matches!(
            GraphFormat::from_path(Path::new("graph.ttl")),
            Err(SciGraphError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_parse_typed_and_escaped_literals() {
        let source = concat!(
            "# comment\n",
            "\n",
            "<https://a.org/x> <https://schema.org/name> \"Say \\\"hi\\\"\\n\" .\n",
            "<https://a.org/x> <https://r.org/score> \"0.4\"^^<http://www.w3.org/2001/XMLSchema#float> .\n",
            "<https://a.org/x> <https://schema.org/abstract> \"caf\\u00E9\"@fr .\n",
            "<https://a.org/x> <https://schema.org/url> <https://a.org/x> . # trailing\n",
        );
        let triples = from_ntriples(source).unwrap();
        assert_eq!(triples.len(), 4);
        assert_eq!(
            triples[0].object,
            Term::Literal(Literal::plain("Say \"hi\"\n"))
        );
        assert_eq!(triples[1].object, Term::Literal(Literal::float(0.4)));
        assert_eq!(triples[2].object, Term::Literal(Literal::plain("café")));
        assert!(triples[3].object.is_iri());
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = from_ntriples("<a> <b> <c> .\n<a> <b> \"open .\n").unwrap_err();
        match err {
            SciGraphError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(from_ntriples("<a> <b> <c>\n").is_err());
        assert!(from_ntriples("a b c .\n").is_err());
    }

    #[test]
    fn test_iri_escapes() {
        assert_eq!(escape_iri("a<b> c"), "a\\u003Cb\\u003E\\u0020c");
        let triples =
            from_ntriples("<https://a.org/x\\u003E1> <https://b.org/p> <https://c.org/\\U0001F600> .\n")
                .unwrap();
        assert_eq!(triples[0].subject.as_str(), "https://a.org/x>1");
        assert_eq!(triples[0].object, Term::Iri(Iri::new("https://c.org/\u{1F600}")));
        assert!(from_ntriples("<https://a.org/\\n> <b> <c> .\n").is_err());
    }

    #[test]
    fn test_json_record_inference() {
        let source = r#"[
            {"subject": "https://p.org/a", "predicate": "https://schema.org/url", "object": "https://p.org/a"},
            {"subject": "https://p.org/a", "predicate": "https://schema.org/name", "object": "Deep Nets"},
            {"subject": "https://p.org/a", "predicate": "https://r.org/score", "object": "0.5", "datatype": "float"}
        ]"#;
        let triples = from_json(source).unwrap();
        assert!(triples[0].object.is_iri());
        assert_eq!(triples[1].object, Term::Literal(Literal::plain("Deep Nets")));
        assert_eq!(triples[2].object, Term::Literal(Literal::float(0.5)));
    }
}
