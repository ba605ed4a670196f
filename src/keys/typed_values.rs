use std::{collections::HashMap, fmt};

use super::{DictionaryError, DictionaryResult};
use crate::{
    message::{Value, Values},
    types::{TypedValue, ValueError, ValueSpec, ValueType},
};

/// The ordered value shape of a key and the consumer that checks raw
/// values against it.
#[derive(Debug, Clone)]
pub struct TypedValues {
    specs: Vec<ValueSpec>,
    min_values: usize,
    max_values: Option<usize>,
}

impl TypedValues {
    /// Only the last entry may repeat a variable number of times.
    pub fn new(specs: Vec<ValueSpec>) -> DictionaryResult<Self> {
        let last = specs.len().saturating_sub(1);
        for (index, spec) in specs.iter().enumerate() {
            if let ValueSpec::Repeated(repeated) = spec {
                if !repeated.is_fixed() && index != last {
                    return Err(DictionaryError::RepetitionRange);
                }
            }
        }
        let (min_values, max_values) = count(&specs);
        Ok(Self {
            specs,
            min_values,
            max_values,
        })
    }

    pub fn specs(&self) -> &[ValueSpec] {
        &self.specs
    }

    pub fn min_values(&self) -> usize {
        self.min_values
    }

    /// `None` when the last entry repeats without bound.
    pub fn max_values(&self) -> Option<usize> {
        self.max_values
    }

    /// `none`, `N`, `N-M` or `N or more`.
    pub fn descriptor(&self) -> String {
        match self.max_values {
            Some(0) => "none".to_string(),
            Some(max) if max == self.min_values => max.to_string(),
            Some(max) => format!("{}-{}", self.min_values, max),
            None => format!("{} or more", self.min_values),
        }
    }

    /// Replaces named references with the types they name and recounts.
    pub(crate) fn resolve(&mut self, named: &HashMap<String, ValueSpec>) -> DictionaryResult<()> {
        for spec in self.specs.iter_mut() {
            if let ValueSpec::ByName(name) = spec {
                let resolved = named
                    .get(name)
                    .cloned()
                    .ok_or_else(|| DictionaryError::Unresolved(name.clone()))?;
                *spec = resolved;
            }
        }
        let (min_values, max_values) = count(&self.specs);
        self.min_values = min_values;
        self.max_values = max_values;
        Ok(())
    }

    /// Converts every value to its declared type. The values are replaced
    /// only when the whole sequence matches and nothing is left over;
    /// otherwise they are left untouched and `false` is returned.
    pub fn consume(&self, values: &mut Values) -> bool {
        let tokens: Vec<String> = values.iter().map(Value::to_string).collect();
        let mut cursor = Cursor {
            tokens: &tokens,
            index: 0,
        };
        let mut typed = Vec::with_capacity(tokens.len());

        for spec in &self.specs {
            let matched = match spec {
                ValueSpec::Single(vtype) => cursor.next(vtype).map(|value| typed.push(value)),
                ValueSpec::Repeated(repeated) => {
                    let vtype = repeated.vtype();
                    let mut matched = Some(());
                    for _ in 0..repeated.min() {
                        match cursor.next(vtype) {
                            Some(value) => typed.push(value),
                            None => {
                                matched = None;
                                break;
                            }
                        }
                    }
                    let mut count = repeated.min();
                    while matched.is_some() && repeated.max().map_or(true, |max| count < max) {
                        match cursor.next(vtype) {
                            Some(value) => typed.push(value),
                            None => break,
                        }
                        count += 1;
                    }
                    matched
                }
                ValueSpec::Compound(compound) => compound
                    .vtypes()
                    .iter()
                    .map(|vtype| cursor.next(vtype))
                    .collect::<Option<Vec<_>>>()
                    .map(|group| typed.push(compound.wrap(group))),
                ValueSpec::ByName(name) => {
                    tracing::warn!("unresolved type ByName(\"{}\")", name);
                    None
                }
            };
            if matched.is_none() {
                tracing::trace!("expected {} at value {} of {:?}", spec, cursor.index, tokens);
                return false;
            }
        }

        if cursor.index != tokens.len() {
            tracing::trace!("not all values consumed: {:?}", &tokens[cursor.index..]);
            return false;
        }

        values.replace(typed.into_iter().map(Value::Typed).collect());
        true
    }

    pub fn describe(&self) -> String {
        let mut text = format!("{:>12}: {}\n", "Values", self.descriptor());
        for spec in &self.specs {
            text.push_str(&format!("\n    {}\n", spec.describe().replace('\n', "\n    ")));
        }
        text
    }
}

impl fmt::Display for TypedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let specs: Vec<String> = self.specs.iter().map(ToString::to_string).collect();
        write!(f, "Types[{}]", specs.join(", "))
    }
}

fn count(specs: &[ValueSpec]) -> (usize, Option<usize>) {
    specs
        .iter()
        .fold((0, Some(0)), |(min, max), spec| match spec {
            ValueSpec::Single(_) => (min + 1, max.map(|m| m + 1)),
            ValueSpec::Repeated(repeated) => (
                min + repeated.min(),
                max.zip(repeated.max()).map(|(m, r)| m + r),
            ),
            ValueSpec::Compound(compound) => {
                (min + compound.len(), max.map(|m| m + compound.len()))
            }
            ValueSpec::ByName(_) => (min, max),
        })
}

struct Cursor<'a> {
    tokens: &'a [String],
    index: usize,
}

impl Cursor<'_> {
    /// Converts the next token. The invalid sentinel still counts as a
    /// match.
    fn next(&mut self, vtype: &ValueType) -> Option<TypedValue> {
        let token = self.tokens.get(self.index)?;
        let value = match vtype.parse(token) {
            Ok(value) => value,
            Err(ValueError::Invalid) => TypedValue::Invalid,
            Err(_) => return None,
        };
        self.index += 1;
        Some(value)
    }
}
