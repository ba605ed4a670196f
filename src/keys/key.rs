use std::fmt;

use super::{typed_values::TypedValues, DictionaryError, DictionaryResult};
use crate::{
    message::{Keyword, Value},
    types::{describe, ValueSpec},
};

/// A keyword declaration: its name, expected values and metadata.
#[derive(Debug, Clone)]
pub struct Key {
    name: String,
    typed_values: TypedValues,
    help: Option<String>,
    refresh_cmd: Option<String>,
    do_cache: Option<bool>,
    unique: Option<String>,
}

impl Key {
    pub fn new<I>(name: impl Into<String>, specs: I) -> DictionaryResult<Self>
    where
        I: IntoIterator<Item = ValueSpec>,
    {
        Ok(Self {
            name: name.into(),
            typed_values: TypedValues::new(specs.into_iter().collect())?,
            help: None,
            refresh_cmd: None,
            do_cache: None,
            unique: None,
        })
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Command sent to the actor to refresh this keyword.
    pub fn with_refresh_cmd(mut self, refresh_cmd: impl Into<String>) -> Self {
        self.refresh_cmd = Some(refresh_cmd.into());
        self
    }

    pub fn with_do_cache(mut self, do_cache: bool) -> Self {
        self.do_cache = Some(do_cache);
        self
    }

    /// Registers the key under another name, for keywords declared twice.
    pub fn with_unique(mut self, unique: impl Into<String>) -> Self {
        self.unique = Some(unique.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name the key is registered under in its dictionary.
    pub fn unique_name(&self) -> &str {
        self.unique.as_deref().unwrap_or(&self.name)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn refresh_cmd(&self) -> Option<&str> {
        self.refresh_cmd.as_deref()
    }

    /// Whether a cached value may stand in for asking the actor. Defaults
    /// to true for keys with values and no refresh command.
    pub fn do_cache(&self) -> bool {
        self.do_cache
            .unwrap_or(self.typed_values.max_values() != Some(0) && self.refresh_cmd.is_none())
    }

    pub fn typed_values(&self) -> &TypedValues {
        &self.typed_values
    }

    pub(crate) fn typed_values_mut(&mut self) -> &mut TypedValues {
        &mut self.typed_values
    }

    /// Types the keyword's values in place and marks it matched. Returns
    /// false, leaving the keyword as it was, when the name differs or the
    /// values do not fit.
    pub fn consume(&self, keyword: &mut Keyword) -> bool {
        if !keyword.name().eq_ignore_ascii_case(&self.name) {
            return false;
        }
        if !self.typed_values.consume(keyword.values_mut()) {
            tracing::debug!("no match for keyword values: {}", keyword);
            return false;
        }
        keyword.set_matched(true);
        true
    }

    /// Builds a typed keyword named after this key.
    pub fn create<I, V>(&self, values: I) -> DictionaryResult<Keyword>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let shown: Vec<String> = values.iter().map(ToString::to_string).collect();
        let mut keyword = Keyword::new(self.name.clone(), values)?;
        if !self.consume(&mut keyword) {
            return Err(DictionaryError::ValueMismatch {
                name: self.name.clone(),
                values: format!("{:?}", shown),
            });
        }
        Ok(keyword)
    }

    pub fn describe(&self) -> String {
        let mut text = format!("{:>12}: {}\n", "Keyword", self.name);
        if let Some(help) = &self.help {
            text.push_str(&describe::render(&[("Description".to_string(), help.clone())]));
            text.push('\n');
        }
        text.push_str(&self.typed_values.describe());
        text
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        message::Canonized,
        types::{TypedValue, ValueType},
    };
    use pretty_assertions::assert_eq;

    fn temperature() -> Key {
        Key::new("Temp", vec![ValueType::float().with_units("C").into()])
            .unwrap()
            .with_help("Air temperature")
    }

    #[test]
    fn test_consume_matches_name_case_insensitively() {
        let key = temperature();
        let mut keyword = Keyword::new("TEMP", ["21.5"]).unwrap();
        assert!(key.consume(&mut keyword));
        assert!(keyword.is_matched());
        assert_eq!(keyword.values()[0].as_typed(), Some(&TypedValue::Float(21.5)));

        let mut other = Keyword::new("humidity", ["21.5"]).unwrap();
        assert!(!key.consume(&mut other));
        assert!(!other.is_matched());
    }

    #[test]
    fn test_consume_failure_keeps_raw_values() {
        let key = temperature();
        let mut keyword = Keyword::new("temp", ["warm"]).unwrap();
        assert!(!key.consume(&mut keyword));
        assert!(!keyword.is_matched());
        assert_eq!(keyword.values()[0].as_raw(), Some("warm"));
    }

    #[test]
    fn test_create() {
        let key = temperature();
        let keyword = key.create(["-3.25"]).unwrap();
        assert_eq!(keyword.canonical(), "temp=\"-3.25\"");

        let err = key.create(["1", "2"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "value types do not match for keyword Temp: [\"1\", \"2\"]"
        );
    }

    #[test]
    fn test_do_cache_default() {
        assert!(temperature().do_cache());
        assert!(!temperature().with_refresh_cmd("status").do_cache());
        assert!(!Key::new("flag", vec![]).unwrap().do_cache());
        assert!(Key::new("flag", vec![]).unwrap().with_do_cache(true).do_cache());
    }

    #[test]
    fn test_unique_name() {
        let key = temperature().with_unique("temp2");
        assert_eq!(key.name(), "Temp");
        assert_eq!(key.unique_name(), "temp2");
    }

    #[test]
    fn test_describe() {
        let text = temperature().describe();
        assert!(text.starts_with("     Keyword: Temp\n Description: Air temperature\n      Values: 1\n"));
    }
}
