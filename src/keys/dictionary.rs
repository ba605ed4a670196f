use std::{collections::HashMap, sync::Arc};

use super::{key::Key, loader::DictionaryLoader, registry, DictionaryError, DictionaryResult};
use crate::types::ValueSpec;

/// `(major, minor)`
pub type Version = (u32, u32);

/// The keys of one actor, in declaration order, looked up by lower case
/// name.
#[derive(Debug, Clone)]
pub struct KeysDictionary {
    name: String,
    version: Version,
    keys: Vec<Arc<Key>>,
    index: HashMap<String, usize>,
    named_types: HashMap<String, ValueSpec>,
    checksum: Option<String>,
}

impl KeysDictionary {
    pub fn new(name: impl Into<String>, version: Version) -> DictionaryResult<Self> {
        let name = name.into();
        if name != name.to_lowercase() {
            return Err(DictionaryError::InvalidName(name));
        }
        Ok(Self {
            name,
            version,
            keys: Vec::new(),
            index: HashMap::new(),
            named_types: HashMap::new(),
            checksum: None,
        })
    }

    /// Builds a dictionary from its keys and registers it process wide.
    pub fn declare<I>(name: impl Into<String>, version: Version, keys: I) -> DictionaryResult<Arc<Self>>
    where
        I: IntoIterator<Item = Key>,
    {
        let mut dictionary = Self::new(name, version)?;
        dictionary.extend(keys)?;
        Ok(registry::register(dictionary))
    }

    /// The registered dictionary with this name, loading it from the
    /// default search path when needed or when `force_reload` is set.
    pub fn load(name: &str, force_reload: bool) -> DictionaryResult<Arc<Self>> {
        DictionaryLoader::from_env().load(name, force_reload)
    }

    /// Adds a key under its unique name. Types referenced by name must have
    /// been declared by a key added earlier.
    pub fn add(&mut self, mut key: Key) -> DictionaryResult<()> {
        let name = key.unique_name().to_lowercase();
        if self.index.contains_key(&name) {
            return Err(DictionaryError::NotUnique(key.unique_name().to_string()));
        }

        let local_names: Vec<(String, ValueSpec)> = key
            .typed_values()
            .specs()
            .iter()
            .filter_map(|spec| spec.name().map(|n| (n.to_string(), spec.clone())))
            .collect();
        key.typed_values_mut().resolve(&self.named_types)?;
        self.named_types.extend(local_names);

        self.index.insert(name, self.keys.len());
        self.keys.push(Arc::new(key));
        Ok(())
    }

    pub fn extend<I>(&mut self, keys: I) -> DictionaryResult<()>
    where
        I: IntoIterator<Item = Key>,
    {
        keys.into_iter().try_for_each(|key| self.add(key))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Hex digest of the definition source, when loaded from one.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub(crate) fn set_checksum(&mut self, checksum: String) {
        self.checksum = Some(checksum);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Key>> {
        self.index
            .get(&name.to_lowercase())
            .and_then(|&index| self.keys.get(index))
    }

    pub fn lookup(&self, name: &str) -> DictionaryResult<&Arc<Key>> {
        self.get(name)
            .ok_or_else(|| DictionaryError::NoSuchKey(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &Arc<Key>> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Text describing every key, in alphabetical order of registered name.
    pub fn describe(&self) -> String {
        let mut text = format!(
            "Keys Dictionary for \"{}\" version ({}, {})\n",
            self.name, self.version.0, self.version.1
        );
        let mut names: Vec<&String> = self.index.keys().collect();
        names.sort();
        for name in names {
            if let Some(key) = self.get(name) {
                text.push('\n');
                text.push_str(&key.describe());
            }
        }
        text
    }
}
