//! Declared value types for legacy keywords and the typed values they
//! produce.
//!
//! A [`ValueType`] is declared once when a dictionary is loaded and shared
//! by every key that uses it. [`ValueSpec`] wraps it into the shapes a key
//! can expect: a single value, a repeated value or a fixed compound group.

pub mod describe;
pub mod format;
pub mod number;
pub mod pvt;
pub mod spec;
pub mod typed_value;
pub mod value_type;

use thiserror::Error;

pub use pvt::Pvt;
pub use spec::{CompoundValueType, CompoundWrapper, RepeatedValueType, ValueSpec};
pub use typed_value::TypedValue;
pub use value_type::{BitField, ValueKind, ValueType};

/// Malformed type declaration. Only raised while types are being declared.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueTypeError {
    #[error("invalid type name: {0}")]
    InvalidName(String),
    #[error("{0} cannot contain %r or %s")]
    CircularFormat(&'static str),
    #[error("unsupported format string: {0}")]
    UnsupportedFormat(String),
    #[error("missing enum labels in ctor")]
    MissingLabels,
    #[error("invalid metadata key \"{key}\" for {type_name}")]
    InvalidMetadata {
        key: String,
        type_name: &'static str,
    },
    #[error("wrong number of enum label help strings provided")]
    LabelHelpCount,
    #[error("missing bitfield specs in ctor")]
    MissingBitfields,
    #[error("invalid bitfield spec: {0}")]
    InvalidBitfieldSpec(String),
    #[error("'native' is not an allowed bitfield name")]
    NativeBitfield,
    #[error("total bitfield length > 32")]
    BitfieldTooWide,
    #[error("Expected min <= max for RepeatedValueType")]
    RepeatRange,
}

/// A single token that could not be converted to its declared type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// The token is the type's declared invalid sentinel.
    #[error("invalid value")]
    Invalid,
    #[error("Invalid literal for {type_name}: '{literal}'")]
    Overflow {
        type_name: &'static str,
        literal: String,
    },
    #[error("{0}")]
    Value(String),
    #[error("no such bitfield \"{0}\"")]
    NoSuchField(String),
}
