use std::{fmt, ops::Index};

use lazy_static::lazy_static;
use regex::Regex;

use super::Canonized;
use crate::{tokenizer::literal::unescape, types::TypedValue};

lazy_static! {
    /// Values that may appear unquoted in canonical form.
    static ref UNQUOTED: Regex = Regex::new(r#"^[^"'\s=,;]+$"#).unwrap();
}

/// A keyword or command value: the token as parsed, or a value already
/// converted by its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Raw(String),
    Typed(TypedValue),
}

impl Value {
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Value::Raw(s) => Some(s),
            Value::Typed(_) => None,
        }
    }

    pub fn as_typed(&self) -> Option<&TypedValue> {
        match self {
            Value::Typed(v) => Some(v),
            Value::Raw(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Raw(s) => write!(f, "{}", s),
            Value::Typed(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Raw(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Raw(s)
    }
}

impl From<TypedValue> for Value {
    fn from(v: TypedValue) -> Self {
        Value::Typed(v)
    }
}

/// The ordered values of a command or keyword.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values(Vec<Value>);

impl Values {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Typed values, if every value has been converted.
    pub fn typed(&self) -> Option<Vec<TypedValue>> {
        self.0
            .iter()
            .map(|v| v.as_typed().cloned())
            .collect::<Option<Vec<_>>>()
    }

    pub(crate) fn replace(&mut self, values: Vec<Value>) {
        self.0 = values;
    }
}

impl Canonized for Values {
    /// A value is quoted when it is empty or holds a quote, a comma, a
    /// semicolon, an equals sign or whitespace. A lone value is always quoted so it cannot
    /// be taken for a keyword name.
    fn canonical(&self) -> String {
        let lone = self.0.len() == 1;
        self.0
            .iter()
            .map(|value| {
                let text = value.to_string();
                if !lone && UNQUOTED.is_match(&text) {
                    text
                } else {
                    format!("\"{}\"", unescape(&text).replace('"', "\\\""))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn tokenized(&self) -> String {
        vec!["123"; self.0.len()].join(",")
    }
}

impl Index<usize> for Values {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.0[index]
    }
}

impl<V: Into<Value>> FromIterator<V> for Values {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Values(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Values {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Values {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
