use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, Result};

/// Longest author name accepted, counted in characters after trimming.
pub const MAX_AUTHOR_CHARS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TributeKind {
    #[default]
    Candle,
    Bow,
    Money,
}

impl TributeKind {
    pub const ALL: [TributeKind; 3] = [TributeKind::Candle, TributeKind::Bow, TributeKind::Money];

    pub fn as_str(self) -> &'static str {
        match self {
            TributeKind::Candle => "candle",
            TributeKind::Bow => "bow",
            TributeKind::Money => "money",
        }
    }

    /// Human-facing label shown next to each tribute.
    pub fn label(self) -> &'static str {
        match self {
            TributeKind::Candle => "Candle",
            TributeKind::Bow => "Bow",
            TributeKind::Money => "Money",
        }
    }
}

impl fmt::Display for TributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TributeKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        TributeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                AppError::Validation("Invalid tribute type. Must be: candle, bow, or money".into())
            })
    }
}

/// One user-submitted record. There is no id: tributes are append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tribute {
    #[serde(rename = "type")]
    pub kind: TributeKind,
    pub author: String,
}

impl Tribute {
    /// Build a tribute from raw form input, trimming and length-checking the author.
    pub fn new(kind: TributeKind, author: &str) -> Result<Self> {
        let author = author.trim();
        let len = author.chars().count();
        if len == 0 || len > MAX_AUTHOR_CHARS {
            return Err(AppError::Validation(
                "Author name must be 1-50 characters".into(),
            ));
        }
        Ok(Self {
            kind,
            author: author.to_string(),
        })
    }
}

/// The whole stored file, kept as parsed JSON.
///
/// Reads hand the document back untouched, and a write only appends to the
/// `tributes` array, so fields and entries this crate does not model survive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TributesDocument(Value);

impl TributesDocument {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(content)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Stored entries in submission order. A missing or null list reads as empty.
    pub fn entries(&self) -> &[Value] {
        self.0
            .get("tributes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Entries that are well-formed tributes. Anything else is skipped.
    pub fn tributes(&self) -> Vec<Tribute> {
        self.entries()
            .iter()
            .filter_map(|entry| Tribute::deserialize(entry).ok())
            .collect()
    }

    /// Pretty form written back to the gist.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Add `tribute` after the stored entries.
    ///
    /// A missing or null list starts a new one. A root that is not an object is
    /// replaced by a fresh document. A `tributes` field of any other type is an error.
    pub fn append(&mut self, tribute: &Tribute) -> Result<()> {
        let entry = serde_json::to_value(tribute)?;
        let Value::Object(root) = &mut self.0 else {
            self.0 = json!({ "tributes": [entry] });
            return Ok(());
        };
        let slot = root.entry("tributes").or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(list) => {
                list.push(entry);
                Ok(())
            }
            other => Err(AppError::Upstream(format!(
                "Stored tributes is not a list: {other}"
            ))),
        }
    }
}

/// Validate a raw write request body, in the order callers are told about problems:
/// JSON syntax, presence of both fields, tribute type, author length.
pub fn validate_submission(body: &[u8]) -> Result<Tribute> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::Validation("Invalid JSON in request body".into()))?;

    let kind = value.get("type").filter(|v| is_present(v));
    let author = value.get("author").filter(|v| is_present(v));
    let (Some(kind), Some(author)) = (kind, author) else {
        return Err(AppError::Validation(
            "Missing required fields: type and author".into(),
        ));
    };

    let kind: TributeKind = kind.as_str().unwrap_or_default().parse()?;

    let Some(author) = author.as_str() else {
        return Err(AppError::Validation(
            "Author name must be 1-50 characters".into(),
        ));
    };

    Tribute::new(kind, author)
}

// Empty strings, zero, false and null all count as "not provided".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
