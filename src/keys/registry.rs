//! Process wide table of loaded dictionaries, keyed by dictionary name.

use std::sync::Arc;

use dashmap::DashMap;
use lazy_static::lazy_static;

use super::KeysDictionary;

lazy_static! {
    static ref REGISTRY: DashMap<String, Arc<KeysDictionary>> = DashMap::new();
}

/// Registers a dictionary, replacing any previous one with the same name.
pub fn register(dictionary: KeysDictionary) -> Arc<KeysDictionary> {
    let dictionary = Arc::new(dictionary);
    if REGISTRY
        .insert(dictionary.name().to_string(), dictionary.clone())
        .is_some()
    {
        tracing::debug!("replaced keys dictionary {}", dictionary.name());
    }
    dictionary
}

pub fn get(name: &str) -> Option<Arc<KeysDictionary>> {
    REGISTRY.get(name).map(|entry| entry.value().clone())
}

pub fn remove(name: &str) -> Option<Arc<KeysDictionary>> {
    REGISTRY.remove(name).map(|(_, dictionary)| dictionary)
}

pub fn names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.iter().map(|entry| entry.key().clone()).collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_replaces() {
        let first = register(KeysDictionary::new("registrytest", (1, 0)).unwrap());
        assert!(Arc::ptr_eq(&first, &get("registrytest").unwrap()));

        let second = register(KeysDictionary::new("registrytest", (2, 0)).unwrap());
        assert_eq!(get("registrytest").unwrap().version(), (2, 0));
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(names().contains(&"registrytest".to_string()));

        assert!(remove("registrytest").is_some());
        assert!(get("registrytest").is_none());
    }
}
