use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A URI-like identifier naming an entity or a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The segment after the last `/` or `#`.
    pub fn local_name(&self) -> &str {
        self.0
            .rfind(['/', '#'])
            .map(|idx| &self.0[idx + 1..])
            .unwrap_or(&self.0)
    }

    /// Whether `value` looks like an absolute identifier (has a scheme).
    pub fn is_absolute(value: &str) -> bool {
        !value.chars().any(char::is_whitespace) && url::Url::parse(value).is_ok()
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// XSD datatype tags carried by typed literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    String,
    Float,
    Boolean,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
}

impl Datatype {
    pub fn iri(&self) -> &'static str {
        match self {
            Datatype::String => "http://www.w3.org/2001/XMLSchema#string",
            Datatype::Float => "http://www.w3.org/2001/XMLSchema#float",
            Datatype::Boolean => "http://www.w3.org/2001/XMLSchema#boolean",
            Datatype::Date => "http://www.w3.org/2001/XMLSchema#date",
            Datatype::DateTime => "http://www.w3.org/2001/XMLSchema#dateTime",
        }
    }

    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            "http://www.w3.org/2001/XMLSchema#string" => Some(Datatype::String),
            "http://www.w3.org/2001/XMLSchema#float" | "http://www.w3.org/2001/XMLSchema#double" => {
                Some(Datatype::Float)
            }
            "http://www.w3.org/2001/XMLSchema#boolean" => Some(Datatype::Boolean),
            "http://www.w3.org/2001/XMLSchema#date" => Some(Datatype::Date),
            "http://www.w3.org/2001/XMLSchema#dateTime" => Some(Datatype::DateTime),
            _ => None,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Datatype::String => "string",
            Datatype::Float => "float",
            Datatype::Boolean => "boolean",
            Datatype::Date => "date",
            Datatype::DateTime => "datetime",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Datatype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(Datatype::String),
            "float" | "double" => Ok(Datatype::Float),
            "boolean" | "bool" => Ok(Datatype::Boolean),
            "date" => Ok(Datatype::Date),
            "datetime" => Ok(Datatype::DateTime),
            other => Datatype::from_iri(other)
                .ok_or_else(|| format!("Unknown datatype: {}", other)),
        }
    }
}

/// A literal value. The lexical form is kept as text so literals hash and
/// compare exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Datatype>,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype),
        }
    }

    pub fn float(value: f64) -> Self {
        Self::typed(value.to_string(), Datatype::Float)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), Datatype::Boolean)
    }

    pub fn date(value: impl Into<String>) -> Self {
        Self::typed(value, Datatype::Date)
    }

    pub fn date_time(value: impl Into<String>) -> Self {
        Self::typed(value, Datatype::DateTime)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

/// Object position of a statement: either another identifier or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
}

impl Term {
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Iri(_) => None,
            Term::Literal(lit) => Some(lit),
        }
    }

    /// The identifier text or the literal's lexical form.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri(iri) => iri.as_str(),
            Term::Literal(lit) => &lit.value,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Literal(lit) => match lit.datatype {
                Some(dt) => write!(f, "\"{}\"^^{}", lit.value, dt),
                None => write!(f, "\"{}\"", lit.value),
            },
        }
    }
}

/// A (subject, predicate, object) statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Iri, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> <{}> {}", self.subject, self.predicate, self.object)
    }
}
