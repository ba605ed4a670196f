//! Reads dictionaries from declarative JSON definitions.
//!
//! A definition lives in `<name>.json` inside one of the loader's search
//! directories:
//!
//! ```json
//! {
//!   "name": "alerts",
//!   "version": [1, 2],
//!   "keys": [
//!     { "name": "activeAlerts", "types": [{ "type": "String", "repeat": [0, null] }] },
//!     { "name": "axisPos", "types": [{ "type": "PVT", "name": "axisPVT" }] },
//!     { "name": "rotPos", "types": [{ "type": "ByName", "name": "axisPVT" }] }
//!   ]
//! }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;

use super::{
    dictionary::{KeysDictionary, Version},
    key::Key,
    registry, DictionaryError, DictionaryResult,
};
use crate::types::{CompoundValueType, ValueSpec, ValueType, ValueTypeError};

/// Extra search directories, separated like `PATH`.
pub const KEYS_PATH_ENV: &str = "LEGACY_HUB_KEYS_PATH";

const EXTENSION: &str = "json";

#[derive(Debug, Clone, Default)]
pub struct DictionaryLoader {
    search_paths: Vec<PathBuf>,
}

impl DictionaryLoader {
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// A loader searching only the directories named by the environment.
    pub fn from_env() -> Self {
        Self::default().with_env_paths()
    }

    /// Appends the directories named by the environment.
    pub fn with_env_paths(mut self) -> Self {
        if let Some(paths) = std::env::var_os(KEYS_PATH_ENV) {
            self.search_paths.extend(std::env::split_paths(&paths));
        }
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The first definition file for this name along the search path.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(format!("{}.{}", name, EXTENSION)))
            .find(|path| path.is_file())
    }

    /// Names of all definitions found along the search path.
    pub fn available_dictionaries(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .search_paths
            .iter()
            .filter_map(|dir| {
                let pattern = dir.join(format!("*.{}", EXTENSION));
                glob::glob(&pattern.to_string_lossy()).ok()
            })
            .flat_map(|paths| paths.filter_map(Result::ok))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// The registered dictionary, unless missing or `force_reload` is set,
    /// in which case it is read from its definition and registered.
    pub fn load(&self, name: &str, force_reload: bool) -> DictionaryResult<Arc<KeysDictionary>> {
        if !force_reload {
            if let Some(dictionary) = registry::get(name) {
                return Ok(dictionary);
            }
        }
        let dictionary = self.read(name)?;
        tracing::info!(
            "loaded keys dictionary {} version {:?} ({} keys)",
            dictionary.name(),
            dictionary.version(),
            dictionary.len()
        );
        Ok(registry::register(dictionary))
    }

    /// Reads a definition without touching the registry.
    pub fn read(&self, name: &str) -> DictionaryResult<KeysDictionary> {
        let path = self.locate(name).ok_or_else(|| DictionaryError::NotFound {
            name: name.to_string(),
            reason: format!("no {}.{} in {:?}", name, EXTENSION, self.search_paths),
        })?;
        read_file(name, &path)
    }
}

fn read_file(name: &str, path: &Path) -> DictionaryResult<KeysDictionary> {
    let source = fs::read_to_string(path).map_err(|e| DictionaryError::NotFound {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    parse_definition(name, &source)
}

/// Builds the dictionary a definition declares. The declared name must be
/// `name`. The result carries the checksum of `source`.
pub fn parse_definition(name: &str, source: &str) -> DictionaryResult<KeysDictionary> {
    let bad_format = |message: String| {
        let indent = "\n >> ";
        DictionaryError::BadFormat {
            name: name.to_string(),
            description: format!("{}{}", indent, message.split('\n').collect::<Vec<_>>().join(indent)),
        }
    };

    let definition: DictionaryDef =
        serde_json::from_str(source).map_err(|e| bad_format(e.to_string()))?;
    if definition.name != name {
        return Err(DictionaryError::NameMismatch {
            file: name.to_string(),
            name: definition.name,
        });
    }
    let mut dictionary = definition
        .build()
        .map_err(|e| bad_format(e.to_string()))?;
    dictionary.set_checksum(checksum(source));
    Ok(dictionary)
}

/// SHA-256 of the definition text, as lower case hex.
pub fn checksum(source: &str) -> String {
    ring::digest::digest(&ring::digest::SHA256, source.as_bytes())
        .as_ref()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DictionaryDef {
    name: String,
    version: Version,
    #[serde(default)]
    keys: Vec<KeyDef>,
}

impl DictionaryDef {
    fn build(self) -> DictionaryResult<KeysDictionary> {
        let mut dictionary = KeysDictionary::new(self.name, self.version)?;
        for key in self.keys {
            dictionary.add(key.build()?)?;
        }
        Ok(dictionary)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyDef {
    name: String,
    #[serde(default)]
    types: Vec<TypeDef>,
    help: Option<String>,
    refresh_cmd: Option<String>,
    do_cache: Option<bool>,
    unique: Option<String>,
}

impl KeyDef {
    fn build(self) -> DictionaryResult<Key> {
        let specs = self
            .types
            .into_iter()
            .map(TypeDef::into_spec)
            .collect::<DictionaryResult<Vec<_>>>()?;
        let mut key = Key::new(self.name, specs)?;
        if let Some(help) = self.help {
            key = key.with_help(help);
        }
        if let Some(refresh_cmd) = self.refresh_cmd {
            key = key.with_refresh_cmd(refresh_cmd);
        }
        if let Some(do_cache) = self.do_cache {
            key = key.with_do_cache(do_cache);
        }
        if let Some(unique) = self.unique {
            key = key.with_unique(unique);
        }
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
enum TypeKind {
    Float,
    Double,
    Int,
    Long,
    UInt,
    String,
    Enum,
    Bool,
    Bits,
    #[serde(rename = "PVT")]
    Pvt,
    Compound,
    ByName,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RepeatDef {
    Exactly(usize),
    Range(usize, Option<usize>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeDef {
    #[serde(rename = "type")]
    kind: TypeKind,
    name: Option<String>,
    help: Option<String>,
    units: Option<String>,
    invalid: Option<String>,
    repr_fmt: Option<String>,
    str_fmt: Option<String>,
    labels: Option<Vec<String>>,
    label_help: Option<Vec<String>>,
    #[serde(rename = "false")]
    false_label: Option<String>,
    #[serde(rename = "true")]
    true_label: Option<String>,
    fields: Option<Vec<String>>,
    types: Option<Vec<TypeDef>>,
    repeat: Option<RepeatDef>,
}

impl TypeDef {
    fn into_spec(self) -> DictionaryResult<ValueSpec> {
        match self.kind {
            TypeKind::ByName => {
                self.reject_repeat()?;
                let name = self
                    .name
                    .ok_or_else(|| DictionaryError::Definition("ByName requires a name".to_string()))?;
                Ok(ValueSpec::ByName(name))
            }
            TypeKind::Pvt | TypeKind::Compound => {
                self.reject_repeat()?;
                let mut compound = if self.kind == TypeKind::Pvt {
                    CompoundValueType::pvt()?
                } else {
                    let members = self
                        .types
                        .ok_or_else(|| {
                            DictionaryError::Definition("Compound requires member types".to_string())
                        })?
                        .into_iter()
                        .map(|member| member.into_value_type().map(Arc::new))
                        .collect::<DictionaryResult<Vec<_>>>()?;
                    CompoundValueType::new(members)
                };
                if let Some(name) = self.name {
                    compound = compound.with_name(name);
                }
                if let Some(help) = self.help {
                    compound = compound.with_help(help);
                }
                Ok(compound.into())
            }
            _ => {
                let mut scalar = self;
                let repeat = scalar.repeat.take();
                let vtype = scalar.into_value_type_inner()?;
                Ok(match repeat {
                    None => vtype.into(),
                    Some(RepeatDef::Exactly(count)) => vtype.times(count),
                    Some(RepeatDef::Range(min, max)) => vtype.repeat(min, max)?,
                })
            }
        }
    }

    /// A scalar member of a compound group.
    fn into_value_type(self) -> DictionaryResult<ValueType> {
        if matches!(self.kind, TypeKind::ByName | TypeKind::Pvt | TypeKind::Compound) {
            return Err(DictionaryError::Definition(format!(
                "{:?} cannot be a compound member",
                self.kind
            )));
        }
        self.reject_repeat()?;
        self.into_value_type_inner()
    }

    fn into_value_type_inner(self) -> DictionaryResult<ValueType> {
        let mut vtype = match self.kind {
            TypeKind::Float => ValueType::float(),
            TypeKind::Double => ValueType::double(),
            TypeKind::Int => ValueType::int(),
            TypeKind::Long => ValueType::long(),
            TypeKind::UInt => ValueType::uint(),
            TypeKind::String => ValueType::string(),
            TypeKind::Enum => ValueType::enumeration(self.labels.unwrap_or_default())?,
            TypeKind::Bool => match (self.false_label, self.true_label) {
                (Some(false_label), Some(true_label)) => ValueType::boolean(false_label, true_label),
                _ => return Err(ValueTypeError::MissingLabels.into()),
            },
            TypeKind::Bits => ValueType::bits(self.fields.unwrap_or_default())?,
            TypeKind::Pvt | TypeKind::Compound | TypeKind::ByName => {
                return Err(DictionaryError::Definition(format!(
                    "{:?} is not a value type",
                    self.kind
                )))
            }
        };
        if let Some(name) = self.name {
            vtype = vtype.with_name(name)?;
        }
        if let Some(help) = self.help {
            vtype = vtype.with_help(help);
        }
        if let Some(units) = self.units {
            vtype = vtype.with_units(units);
        }
        if let Some(invalid) = self.invalid {
            vtype = vtype.with_invalid(invalid);
        }
        if let Some(repr_fmt) = self.repr_fmt {
            vtype = vtype.with_repr_fmt(&repr_fmt)?;
        }
        if let Some(str_fmt) = self.str_fmt {
            vtype = vtype.with_str_fmt(&str_fmt)?;
        }
        if let Some(label_help) = self.label_help {
            vtype = vtype.with_label_help(label_help)?;
        }
        Ok(vtype)
    }

    fn reject_repeat(&self) -> DictionaryResult<()> {
        match self.repeat {
            Some(_) => Err(DictionaryError::Definition(format!(
                "{:?} cannot repeat",
                self.kind
            ))),
            None => Ok(()),
        }
    }
}
