//! Live keyword values of tracked actors.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value as JsonValue};

use crate::{
    keys::{DictionaryError, DictionaryLoader, DictionaryResult, KeysDictionary},
    message::{Keyword, Reply},
    types::TypedValue,
};

/// Called with the model and the name of the key that changed.
pub type ModelObserver = Arc<dyn Fn(&KeywordModel, &str) + Send + Sync>;
/// Called with the keyword that was just stored.
pub type KeyObserver = Arc<dyn Fn(&Keyword) + Send + Sync>;

/// Prefix of the pseudo actor that answers key requests for `<actor>`.
pub const KEYS_ACTOR_PREFIX: &str = "keys_";

#[derive(Default)]
struct Entry {
    keyword: Option<Keyword>,
    last_seen: Option<DateTime<Utc>>,
    observers: Vec<KeyObserver>,
}

/// Last known values of every key of one actor's dictionary.
///
/// Only replies change the model. Each keyword of a reply is typed by its
/// key before it is stored; keywords that are unknown or do not match
/// their declared types are skipped with a warning.
pub struct KeywordModel {
    dictionary: Arc<KeysDictionary>,
    entries: HashMap<String, Entry>,
    last_update: Option<DateTime<Utc>>,
    observers: Vec<ModelObserver>,
}

impl KeywordModel {
    pub fn new(dictionary: Arc<KeysDictionary>) -> Self {
        let entries = dictionary
            .keys()
            .map(|key| (key.name().to_lowercase(), Entry::default()))
            .collect();
        Self {
            dictionary,
            entries,
            last_update: None,
            observers: Vec::new(),
        }
    }

    /// Loads the actor's dictionary and builds an empty model for it.
    pub fn load(actor: &str) -> DictionaryResult<Self> {
        Self::load_with(&DictionaryLoader::from_env(), actor)
    }

    pub fn load_with(loader: &DictionaryLoader, actor: &str) -> DictionaryResult<Self> {
        Ok(Self::new(loader.load(actor, false)?))
    }

    pub fn actor(&self) -> &str {
        self.dictionary.name()
    }

    pub fn dictionary(&self) -> &Arc<KeysDictionary> {
        &self.dictionary
    }

    /// Key names in declaration order.
    pub fn key_names(&self) -> Vec<String> {
        self.dictionary
            .keys()
            .map(|key| key.name().to_lowercase())
            .collect()
    }

    /// Stores every keyword of `reply` that its key accepts and returns how
    /// many were stored.
    #[tracing::instrument(level = "debug", skip(self, reply), fields(actor = %self.actor()))]
    pub fn apply_reply(&mut self, reply: &Reply) -> usize {
        let mut applied = 0;
        for keyword in reply.keywords() {
            let name = keyword.name().to_lowercase();
            let Some(key) = self.dictionary.get(&name).cloned() else {
                tracing::warn!("Cannot parse unknown keyword {}.{}.", self.actor(), keyword.name());
                continue;
            };
            let mut keyword = keyword.clone();
            if !key.consume(&mut keyword) {
                tracing::warn!("Failed parsing keyword {}.{}.", self.actor(), keyword.name());
                continue;
            }
            self.store(name, keyword);
            applied += 1;
        }
        applied
    }

    fn store(&mut self, name: String, keyword: Keyword) {
        let now = Utc::now();
        let entry = self.entries.entry(name.clone()).or_default();
        entry.keyword = Some(keyword);
        entry.last_seen = Some(now);
        self.last_update = Some(now);

        if let Some(keyword) = &entry.keyword {
            for observer in &entry.observers {
                observer(keyword);
            }
        }
        let observers = self.observers.clone();
        for observer in &observers {
            observer(self, &name);
        }
    }

    /// The typed values last received for `name`.
    pub fn get(&self, name: &str) -> Option<Vec<TypedValue>> {
        self.keyword(name).and_then(|keyword| keyword.values().typed())
    }

    pub fn keyword(&self, name: &str) -> Option<&Keyword> {
        self.entries
            .get(&name.to_lowercase())
            .and_then(|entry| entry.keyword.as_ref())
    }

    pub fn last_seen(&self, name: &str) -> Option<DateTime<Utc>> {
        self.entries
            .get(&name.to_lowercase())
            .and_then(|entry| entry.last_seen)
    }

    pub fn last_update_time(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn register_observer<F>(&mut self, observer: F)
    where
        F: Fn(&KeywordModel, &str) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
    }

    pub fn register_key_observer<F>(&mut self, name: &str, observer: F) -> DictionaryResult<()>
    where
        F: Fn(&Keyword) + Send + Sync + 'static,
    {
        let entry = self
            .entries
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| DictionaryError::NoSuchKey(name.to_string()))?;
        entry.observers.push(Arc::new(observer));
        Ok(())
    }

    /// Reloads the dictionary from disk. Values and observers are cleared.
    pub fn reload(&mut self) -> DictionaryResult<()> {
        let dictionary = KeysDictionary::load(self.actor(), true)?;
        *self = Self::new(dictionary);
        Ok(())
    }

    /// Key names mapped to their values; keys never received are `null`.
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .key_names()
            .into_iter()
            .map(|name| {
                let value = self
                    .get(&name)
                    .map(|values| JsonValue::Array(values.iter().map(typed_to_json).collect()))
                    .unwrap_or(JsonValue::Null);
                (name, value)
            })
            .collect::<Map<_, _>>();
        JsonValue::Object(map)
    }
}

fn typed_to_json(value: &TypedValue) -> JsonValue {
    match value {
        TypedValue::Float(v) | TypedValue::Double(v) => json!(v),
        TypedValue::Int(v) => json!(v),
        TypedValue::Long(v) => json!(v),
        TypedValue::UInt(v) | TypedValue::Bits(v) => json!(v),
        TypedValue::String(s) => json!(s),
        TypedValue::Enum { label, .. } => json!(label),
        TypedValue::Bool { value, .. } => json!(value),
        TypedValue::Compound(values) => JsonValue::Array(values.iter().map(typed_to_json).collect()),
        TypedValue::Pvt(pvt) => json!([pvt.position, pvt.velocity, pvt.time]),
        TypedValue::Invalid => JsonValue::Null,
    }
}

/// Models of every tracked actor.
pub struct ModelSet {
    models: HashMap<String, KeywordModel>,
    keys_prefix: String,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            models: HashMap::new(),
            keys_prefix: KEYS_ACTOR_PREFIX.to_string(),
        }
    }
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.keys_prefix = prefix.into();
        self
    }

    /// Loads and tracks the models of `actors`.
    pub fn load<I, S>(loader: &DictionaryLoader, actors: I) -> DictionaryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for actor in actors {
            set.insert(KeywordModel::load_with(loader, actor.as_ref())?);
        }
        Ok(set)
    }

    pub fn insert(&mut self, model: KeywordModel) {
        self.models.insert(model.actor().to_string(), model);
    }

    pub fn get(&self, actor: &str) -> Option<&KeywordModel> {
        self.models.get(actor)
    }

    pub fn get_mut(&mut self, actor: &str) -> Option<&mut KeywordModel> {
        self.models.get_mut(actor)
    }

    /// Tracked actors, sorted.
    pub fn actors(&self) -> Vec<&str> {
        let mut actors: Vec<&str> = self.models.keys().map(String::as_str).collect();
        actors.sort_unstable();
        actors
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// The tracked actor a reply from `actor` belongs to. Replies from
    /// `keys_<actor>` belong to `<actor>`.
    pub fn model_actor<'a>(&self, actor: &'a str) -> &'a str {
        match actor.strip_prefix(self.keys_prefix.as_str()) {
            Some(rest) if !self.keys_prefix.is_empty() => rest.split('_').next().unwrap_or(rest),
            _ => actor,
        }
    }

    /// Applies `reply` to the model of its actor and returns the number of
    /// keywords stored, or `None` when the actor is not tracked.
    pub fn apply_reply(&mut self, reply: &Reply) -> Option<usize> {
        let actor = self.model_actor(reply.header().actor()).to_string();
        self.models.get_mut(&actor).map(|model| model.apply_reply(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        keys::Key,
        message::{Keywords, MessageCode, ReplyHeader},
        types::ValueType,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn dictionary() -> Arc<KeysDictionary> {
        let mut dictionary = KeysDictionary::new("modeltest", (1, 0)).unwrap();
        dictionary
            .extend([
                Key::new("activeAlerts", [ValueType::string().repeat(0, None).unwrap()]).unwrap(),
                Key::new("temp", [ValueType::float().into()]).unwrap(),
            ])
            .unwrap();
        Arc::new(dictionary)
    }

    fn reply(actor: &str, keywords: Vec<Keyword>) -> Reply {
        let header = ReplyHeader::new("cmdr", "user", "", 12, actor, MessageCode::Information);
        Reply::new(header, Keywords::from(keywords))
    }

    #[test]
    fn test_apply_reply_types_values() {
        let mut model = KeywordModel::new(dictionary());
        assert!(model.last_update_time().is_none());
        assert!(model.get("activeAlerts").is_none());

        let applied = model.apply_reply(&reply(
            "modeltest",
            vec![Keyword::new("activeAlerts", ["Alert1", "Alert2"]).unwrap()],
        ));
        assert_eq!(applied, 1);
        let values = model.get("activealerts").unwrap();
        let labels: Vec<&str> = values.iter().filter_map(TypedValue::as_str).collect();
        assert_eq!(labels, vec!["Alert1", "Alert2"]);
        assert!(model.last_update_time().is_some());
        assert!(model.last_seen("activeAlerts").is_some());
        assert!(model.last_seen("temp").is_none());
    }

    #[test]
    fn test_bad_keywords_are_skipped() {
        let mut model = KeywordModel::new(dictionary());
        let applied = model.apply_reply(&reply(
            "modeltest",
            vec![
                Keyword::new("unknown", ["1"]).unwrap(),
                Keyword::new("temp", ["warm"]).unwrap(),
                Keyword::new("temp", ["21.5"]).unwrap(),
            ],
        ));
        assert_eq!(applied, 1);
        let temp = model.get("temp").unwrap();
        assert_eq!(temp[0].as_f64(), Some(21.5));
    }

    #[test]
    fn test_later_values_overwrite() {
        let mut model = KeywordModel::new(dictionary());
        for value in ["1.0", "2.0", "3.0"] {
            model.apply_reply(&reply("modeltest", vec![Keyword::new("temp", [value]).unwrap()]));
        }
        assert_eq!(model.get("temp").unwrap()[0].as_f64(), Some(3.0));
    }

    #[test]
    fn test_observers() {
        let mut model = KeywordModel::new(dictionary());
        let changed = Arc::new(Mutex::new(Vec::new()));
        let record = changed.clone();
        model.register_observer(move |model, name| {
            assert!(model.get(name).is_some());
            record.lock().unwrap().push(name.to_string());
        });
        let temps = Arc::new(Mutex::new(Vec::new()));
        let record = temps.clone();
        model
            .register_key_observer("TEMP", move |keyword| {
                record.lock().unwrap().push(keyword.values().len());
            })
            .unwrap();
        assert!(matches!(
            model.register_key_observer("nope", |_| {}),
            Err(DictionaryError::NoSuchKey(_))
        ));

        model.apply_reply(&reply(
            "modeltest",
            vec![
                Keyword::new("temp", ["1"]).unwrap(),
                Keyword::new("activeAlerts", Vec::<String>::new()).unwrap(),
            ],
        ));
        assert_eq!(*changed.lock().unwrap(), vec!["temp", "activealerts"]);
        assert_eq!(*temps.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_to_json() {
        let mut model = KeywordModel::new(dictionary());
        model.apply_reply(&reply("modeltest", vec![Keyword::new("temp", ["1.5"]).unwrap()]));
        assert_eq!(model.to_json(), json!({"activealerts": null, "temp": [1.5]}));
    }

    #[test]
    fn test_model_set_routes_keys_actor() {
        let mut set = ModelSet::new();
        set.insert(KeywordModel::new(dictionary()));
        let update = vec![Keyword::new("temp", ["4"]).unwrap()];

        assert_eq!(set.apply_reply(&reply("keys_modeltest", update.clone())), Some(1));
        assert_eq!(set.apply_reply(&reply("other", update)), None);
        assert_eq!(set.model_actor("keys_tcc"), "tcc");
        assert_eq!(set.actors(), vec!["modeltest"]);
        assert_eq!(
            set.get("modeltest").unwrap().get("temp").unwrap()[0].as_f64(),
            Some(4.0)
        );
    }
}
