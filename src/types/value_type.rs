use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    describe::{self, Descriptor},
    format::PrintfFormat,
    number::{parse_float32, parse_float_literal, parse_int_literal},
    typed_value::{float_repr, TypedValue},
    ValueError, ValueTypeError,
};

lazy_static! {
    static ref TYPE_NAME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap();
    static ref BITFIELD_SPEC: Regex = Regex::new(r"^([a-zA-Z0-9_]+)?(?::([0-9]+))?$").unwrap();
}

const INT_LIMIT: i128 = 0x7FFF_FFFF;
const UINT_LIMIT: i128 = 0xFFFF_FFFF;
const MAX_BITS: u32 = 32;

/// A named run of bits inside a bitfield value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitField {
    pub name: String,
    pub offset: u32,
    pub width: u32,
}

impl BitField {
    pub fn mask(&self) -> u32 {
        ((1u64 << self.width) - 1) as u32
    }
}

/// `width` binary digits of `value`, most significant first.
pub fn binary(value: u64, width: u32) -> String {
    (0..width)
        .rev()
        .map(|shift| if (value >> shift) & 1 == 1 { '1' } else { '0' })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// Single precision range, double precision storage.
    Float,
    Double,
    Int,
    Long,
    UInt,
    String,
    Enum {
        labels: Vec<String>,
        label_help: Option<Vec<String>>,
    },
    Bool {
        false_label: String,
        true_label: String,
    },
    Bits {
        fields: Vec<BitField>,
        width: u32,
    },
}

impl ValueKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Float => "Float",
            ValueKind::Double => "Double",
            ValueKind::Int => "Int",
            ValueKind::Long => "Long",
            ValueKind::UInt => "UInt",
            ValueKind::String => "String",
            ValueKind::Enum { .. } => "Enum",
            ValueKind::Bool { .. } => "Bool",
            ValueKind::Bits { .. } => "Bits",
        }
    }

    fn base_type(&self) -> &'static str {
        match self {
            ValueKind::Float | ValueKind::Double => "float",
            ValueKind::String | ValueKind::Enum { .. } => "str",
            _ => "int",
        }
    }

    fn storage(&self) -> &'static str {
        match self {
            ValueKind::Float => "flt4",
            ValueKind::Double => "flt8",
            ValueKind::Int | ValueKind::UInt | ValueKind::Bits { .. } => "int4",
            ValueKind::Long => "int8",
            ValueKind::String => "text",
            ValueKind::Enum { .. } | ValueKind::Bool { .. } => "int2",
        }
    }
}

/// An immutable declaration of how a keyword value is parsed, shown and
/// described.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueType {
    kind: ValueKind,
    name: Option<String>,
    help: Option<String>,
    units: Option<String>,
    invalid: Option<String>,
    repr_fmt: Option<PrintfFormat>,
    str_fmt: Option<PrintfFormat>,
}

impl ValueType {
    fn of(kind: ValueKind) -> Self {
        Self {
            kind,
            name: None,
            help: None,
            units: None,
            invalid: None,
            repr_fmt: None,
            str_fmt: None,
        }
    }

    pub fn float() -> Self {
        Self::of(ValueKind::Float)
    }

    pub fn double() -> Self {
        Self::of(ValueKind::Double)
    }

    pub fn int() -> Self {
        Self::of(ValueKind::Int)
    }

    pub fn long() -> Self {
        Self::of(ValueKind::Long)
    }

    pub fn uint() -> Self {
        Self::of(ValueKind::UInt)
    }

    pub fn string() -> Self {
        Self::of(ValueKind::String)
    }

    pub fn enumeration<I, S>(labels: I) -> Result<Self, ValueTypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(ValueTypeError::MissingLabels);
        }
        Ok(Self::of(ValueKind::Enum {
            labels,
            label_help: None,
        }))
    }

    pub fn boolean(false_label: impl Into<String>, true_label: impl Into<String>) -> Self {
        Self::of(ValueKind::Bool {
            false_label: false_label.into(),
            true_label: true_label.into(),
        })
    }

    /// Declares a bitfield from `name:width` specs, least significant
    /// first. A spec without a name reserves padding bits.
    pub fn bits<I, S>(specs: I) -> Result<Self, ValueTypeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = Vec::new();
        let mut offset = 0u32;
        let mut any = false;

        for spec in specs {
            any = true;
            let spec = spec.as_ref();
            let caps = BITFIELD_SPEC
                .captures(spec)
                .ok_or_else(|| ValueTypeError::InvalidBitfieldSpec(spec.to_string()))?;
            let width = match caps.get(2) {
                Some(w) => w
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| ValueTypeError::BitfieldTooWide)?,
                None => 1,
            };
            if let Some(name) = caps.get(1) {
                if name.as_str() == "native" {
                    return Err(ValueTypeError::NativeBitfield);
                }
                fields.push(BitField {
                    name: name.as_str().to_string(),
                    offset,
                    width,
                });
            }
            offset = offset.saturating_add(width);
            if offset > MAX_BITS {
                return Err(ValueTypeError::BitfieldTooWide);
            }
        }
        if !any {
            return Err(ValueTypeError::MissingBitfields);
        }

        Ok(Self::of(ValueKind::Bits {
            fields,
            width: offset,
        }))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, ValueTypeError> {
        let name = name.into();
        if !TYPE_NAME.is_match(&name) {
            return Err(ValueTypeError::InvalidName(name));
        }
        self.name = Some(name);
        Ok(self)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// The sentinel is stored lower case and matched case-insensitively.
    pub fn with_invalid(mut self, invalid: impl Into<String>) -> Self {
        self.invalid = Some(invalid.into().to_lowercase());
        self
    }

    pub fn with_repr_fmt(mut self, fmt: &str) -> Result<Self, ValueTypeError> {
        self.repr_fmt = Some(PrintfFormat::parse(fmt, "reprFmt")?);
        Ok(self)
    }

    pub fn with_str_fmt(mut self, fmt: &str) -> Result<Self, ValueTypeError> {
        let parsed = PrintfFormat::parse(fmt, "strFmt")?;
        match self.kind {
            ValueKind::Bool { .. } | ValueKind::Bits { .. } => {
                tracing::warn!("{}: ignoring strFmt metadata", self.type_name());
            }
            _ => self.str_fmt = Some(parsed),
        }
        Ok(self)
    }

    /// Per-label help text. Only enumerations accept it and it must cover
    /// every label.
    pub fn with_label_help<I, S>(mut self, help: I) -> Result<Self, ValueTypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let type_name = self.type_name();
        match &mut self.kind {
            ValueKind::Enum { labels, label_help } => {
                let help: Vec<String> = help.into_iter().map(Into::into).collect();
                if help.len() != labels.len() {
                    return Err(ValueTypeError::LabelHelpCount);
                }
                *label_help = Some(help);
                Ok(self)
            }
            _ => Err(ValueTypeError::InvalidMetadata {
                key: "labelHelp".to_string(),
                type_name,
            }),
        }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn invalid(&self) -> Option<&str> {
        self.invalid.as_deref()
    }

    pub fn repr_fmt(&self) -> Option<&str> {
        self.repr_fmt.as_ref().map(PrintfFormat::as_str)
    }

    pub fn str_fmt(&self) -> Option<&str> {
        self.str_fmt.as_ref().map(PrintfFormat::as_str)
    }

    /// Rejects the invalid sentinel, passing anything else through.
    pub fn validate<'a>(&self, token: &'a str) -> Result<&'a str, ValueError> {
        match &self.invalid {
            Some(invalid) if token.to_lowercase() == *invalid => Err(ValueError::Invalid),
            _ => Ok(token),
        }
    }

    /// Converts a token to a value of this type.
    pub fn parse(&self, token: &str) -> Result<TypedValue, ValueError> {
        let token = self.validate(token)?;
        let overflow = || ValueError::Overflow {
            type_name: self.type_name(),
            literal: token.to_string(),
        };
        let int_literal = |text: &str| {
            parse_int_literal(text).map_err(|e| match e {
                ValueError::Overflow { .. } => overflow(),
                other => other,
            })
        };

        match &self.kind {
            ValueKind::Float => parse_float32(token).map(TypedValue::Float),
            ValueKind::Double => parse_float_literal(token).map(|(v, _)| TypedValue::Double(v)),
            ValueKind::Int => {
                let value = int_literal(token)?;
                if !(-INT_LIMIT..=INT_LIMIT).contains(&value) {
                    return Err(overflow());
                }
                Ok(TypedValue::Int(value as i32))
            }
            ValueKind::Long => {
                let value = int_literal(token)?;
                i64::try_from(value)
                    .map(TypedValue::Long)
                    .map_err(|_| overflow())
            }
            ValueKind::UInt => self.parse_unsigned(token, int_literal(token)?).map(TypedValue::UInt),
            ValueKind::Bits { .. } => {
                self.parse_unsigned(token, int_literal(token)?).map(TypedValue::Bits)
            }
            ValueKind::String => Ok(TypedValue::String(token.to_string())),
            ValueKind::Enum { labels, .. } => {
                if let Some(index) = labels.iter().position(|l| l.eq_ignore_ascii_case(token)) {
                    return Ok(TypedValue::Enum {
                        label: labels[index].clone(),
                        index,
                    });
                }
                match token.parse::<usize>() {
                    Ok(index) => self.enum_value(index),
                    Err(_) => Err(ValueError::Value(format!(
                        "Invalid label for Enum: \"{}\"",
                        token.to_lowercase()
                    ))),
                }
            }
            ValueKind::Bool {
                false_label,
                true_label,
            } => {
                if token == true_label {
                    Ok(TypedValue::Bool {
                        value: true,
                        label: true_label.clone(),
                    })
                } else if token == false_label {
                    Ok(TypedValue::Bool {
                        value: false,
                        label: false_label.clone(),
                    })
                } else {
                    Err(ValueError::Value(format!("Invalid Bool value: '{}'", token)))
                }
            }
        }
    }

    /// Accepts `[-0x7FFFFFFF, 0xFFFFFFFF]`. A negative value is taken as a
    /// sign bit plus magnitude: `0x80000000 | -v`.
    fn parse_unsigned(&self, token: &str, value: i128) -> Result<u32, ValueError> {
        if !(-INT_LIMIT..=UINT_LIMIT).contains(&value) {
            return Err(ValueError::Overflow {
                type_name: self.type_name(),
                literal: token.to_string(),
            });
        }
        if value < 0 {
            Ok(0x8000_0000 | (-value) as u32)
        } else {
            Ok(value as u32)
        }
    }

    /// The enumerated value at a label index.
    pub fn enum_value(&self, index: usize) -> Result<TypedValue, ValueError> {
        match &self.kind {
            ValueKind::Enum { labels, .. } => match labels.get(index) {
                Some(label) => Ok(TypedValue::Enum {
                    label: label.clone(),
                    index,
                }),
                None => Err(ValueError::Value(format!("Invalid index for Enum: {}", index))),
            },
            _ => Err(ValueError::Value(format!(
                "{} is not an enumeration",
                self.type_name()
            ))),
        }
    }

    pub fn bit_fields(&self) -> &[BitField] {
        match &self.kind {
            ValueKind::Bits { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn bit_width(&self) -> u32 {
        match &self.kind {
            ValueKind::Bits { width, .. } => *width,
            _ => 0,
        }
    }

    fn bit_field(&self, name: &str) -> Result<&BitField, ValueError> {
        self.bit_fields()
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ValueError::NoSuchField(name.to_string()))
    }

    /// Reads a named sub-field of a bitfield value.
    pub fn get_field(&self, value: u32, name: &str) -> Result<u32, ValueError> {
        let field = self.bit_field(name)?;
        Ok((value >> field.offset) & field.mask())
    }

    /// Returns `value` with a named sub-field replaced. Extra high bits of
    /// `field_value` are dropped.
    pub fn set_field(&self, value: u32, name: &str, field_value: u32) -> Result<u32, ValueError> {
        let field = self.bit_field(name)?;
        let mask = field.mask() << field.offset;
        Ok((value & !mask) | ((field_value & field.mask()) << field.offset))
    }

    /// `(a=01,b=1)`, each named field in binary.
    pub fn bits_repr(&self, value: u32) -> String {
        let parts: Vec<String> = self
            .bit_fields()
            .iter()
            .map(|f| {
                let bits = (value >> f.offset) & f.mask();
                format!("{}={}", f.name, binary(bits as u64, f.width))
            })
            .collect();
        format!("({})", parts.join(","))
    }

    /// The whole value in binary, as wide as the declared fields.
    pub fn bits_string(&self, value: u32) -> String {
        binary(value as u64, self.bit_width())
    }

    /// String form of a value: the string format, else the repr format,
    /// else the natural form.
    pub fn format_value(&self, value: &TypedValue) -> String {
        if matches!(self.kind, ValueKind::Bool { .. }) {
            return value.to_string();
        }
        let fmt = self.str_fmt.as_ref().or(self.repr_fmt.as_ref());
        match (fmt, value.format_arg()) {
            (Some(fmt), Some(arg)) => fmt.render(arg),
            _ => value.to_string(),
        }
    }

    /// Debugging form, such as `Float(25.0 deg)`.
    pub fn repr_value(&self, value: &TypedValue) -> String {
        match value {
            TypedValue::Invalid => return value.to_string(),
            TypedValue::Bits(bits) => return self.bits_repr(*bits),
            _ => {}
        }
        let inner = match (&self.repr_fmt, value.format_arg()) {
            (Some(fmt), Some(arg)) => fmt.render(arg),
            _ => match value {
                TypedValue::Float(v) | TypedValue::Double(v) => float_repr(*v),
                TypedValue::String(s) | TypedValue::Enum { label: s, .. } => format!("'{}'", s),
                TypedValue::Bool { value, .. } => (*value as u8).to_string(),
                other => other.to_string(),
            },
        };
        let units = self
            .units
            .as_ref()
            .map(|u| format!(" {}", u))
            .unwrap_or_default();
        format!("{}({}{})", self.type_name(), inner, units)
    }

    pub fn descriptors(&self) -> Vec<Descriptor> {
        let mut descriptors = Vec::new();
        if let Some(name) = &self.name {
            descriptors.push(("Name".to_string(), name.clone()));
        }
        if let Some(help) = &self.help {
            descriptors.push(("Description".to_string(), help.clone()));
        }
        descriptors.push((
            "Type".to_string(),
            format!(
                "{} ({},{})",
                self.type_name(),
                self.kind.base_type(),
                self.kind.storage()
            ),
        ));

        match &self.kind {
            ValueKind::Enum { labels, label_help } => {
                for (index, label) in labels.iter().enumerate() {
                    let text = match label_help.as_ref().and_then(|h| h.get(index)) {
                        Some(help) => format!("{} ({})", label, help),
                        None => label.clone(),
                    };
                    descriptors.push((format!("Value-{}", index), text));
                }
            }
            ValueKind::Bool {
                false_label,
                true_label,
            } => {
                descriptors.push(("False".to_string(), false_label.clone()));
                descriptors.push(("True".to_string(), true_label.clone()));
            }
            ValueKind::Bits { fields, width } => {
                for (index, field) in fields.iter().enumerate() {
                    let shifted = (field.mask() as u64) << field.offset;
                    descriptors.push((
                        format!("Field-{}", index),
                        format!("{} {}", binary(shifted, *width), field.name),
                    ));
                }
            }
            _ => {
                if let Some(units) = &self.units {
                    descriptors.push(("Units".to_string(), units.clone()));
                }
            }
        }

        if let Some(invalid) = &self.invalid {
            descriptors.push(("Invalid".to_string(), invalid.clone()));
        }
        descriptors
    }

    pub fn describe(&self) -> String {
        describe::render(&self.descriptors())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}
