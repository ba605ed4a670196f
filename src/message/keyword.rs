use std::{fmt, ops::Index};

use super::{values::Value, Canonized, MessageError, MessageResult, Values};

const RAW: &str = "raw";

/// A name plus zero or more values. The reserved `raw` keyword carries a
/// single unparsed line instead.
#[derive(Debug, Clone)]
pub struct Keyword {
    name: String,
    values: Values,
    raw: bool,
    matched: bool,
}

impl Keyword {
    pub fn new<N, I, V>(name: N, values: I) -> MessageResult<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        if name.eq_ignore_ascii_case(RAW) {
            return Err(MessageError::ReservedKeyword(name));
        }
        Ok(Self {
            name,
            values: values.into_iter().collect(),
            raw: false,
            matched: false,
        })
    }

    /// A keyword without values.
    pub fn bare(name: impl Into<String>) -> MessageResult<Self> {
        Self::new(name, Vec::<Value>::new())
    }

    pub fn raw(line: impl Into<String>) -> Self {
        Self {
            name: RAW.to_string(),
            values: std::iter::once(Value::Raw(line.into())).collect(),
            raw: true,
            matched: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// The unparsed line of a raw keyword.
    pub fn raw_line(&self) -> Option<&str> {
        if !self.raw {
            return None;
        }
        self.values.get(0).and_then(Value::as_raw)
    }

    /// Set once a declared key has accepted and typed the values.
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub(crate) fn set_matched(&mut self, matched: bool) {
        self.matched = matched;
    }

    pub(crate) fn values_mut(&mut self) -> &mut Values {
        &mut self.values
    }
}

impl Canonized for Keyword {
    fn canonical(&self) -> String {
        if self.raw {
            return format!("raw={}", self.raw_line().unwrap_or_default());
        }
        let name = self.name.to_lowercase();
        if self.values.is_empty() {
            name
        } else {
            format!("{}={}", name, self.values.canonical())
        }
    }

    fn tokenized(&self) -> String {
        if self.raw {
            return "RAW=LINE".to_string();
        }
        if self.values.is_empty() {
            "KEY".to_string()
        } else {
            format!("KEY={}", self.values.tokenized())
        }
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// An ordered list of keywords. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keywords(Vec<Keyword>);

impl Keywords {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, keyword: Keyword) {
        self.0.push(keyword);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyword> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Keyword> {
        self.0.iter_mut()
    }

    /// First keyword with this name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Keyword> {
        self.0.iter().find(|k| k.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn canonical_with(&self, delimiter: &str) -> String {
        self.0
            .iter()
            .map(Keyword::canonical)
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    pub fn tokenized_with(&self, delimiter: &str) -> String {
        self.0
            .iter()
            .map(Keyword::tokenized)
            .collect::<Vec<_>>()
            .join(delimiter)
    }
}

impl Index<usize> for Keywords {
    type Output = Keyword;

    fn index(&self, index: usize) -> &Keyword {
        &self.0[index]
    }
}

impl FromIterator<Keyword> for Keywords {
    fn from_iter<I: IntoIterator<Item = Keyword>>(iter: I) -> Self {
        Keywords(iter.into_iter().collect())
    }
}

impl From<Vec<Keyword>> for Keywords {
    fn from(keywords: Vec<Keyword>) -> Self {
        Keywords(keywords)
    }
}

impl<'a> IntoIterator for &'a Keywords {
    type Item = &'a Keyword;
    type IntoIter = std::slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Keywords {
    type Item = Keyword;
    type IntoIter = std::vec::IntoIter<Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
