use std::fmt;

use super::{format::FormatArg, pvt::Pvt};

/// A value converted from a token by its declared [`ValueType`].
///
/// [`ValueType`]: super::ValueType
#[derive(Debug, Clone)]
pub enum TypedValue {
    Float(f64),
    Double(f64),
    Int(i32),
    Long(i64),
    UInt(u32),
    String(String),
    /// The declared spelling of the matched label and its position.
    Enum { label: String, index: usize },
    Bool { value: bool, label: String },
    Bits(u32),
    /// The values of a compound group, in declaration order.
    Compound(Vec<TypedValue>),
    Pvt(Pvt),
    /// The token was the type's invalid sentinel.
    Invalid,
}

impl TypedValue {
    pub fn is_invalid(&self) -> bool {
        matches!(self, TypedValue::Invalid)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(v) | TypedValue::Double(v) => Some(*v),
            TypedValue::Int(v) => Some(*v as f64),
            TypedValue::Long(v) => Some(*v as f64),
            TypedValue::UInt(v) | TypedValue::Bits(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(v) => Some(*v as i64),
            TypedValue::Long(v) => Some(*v),
            TypedValue::UInt(v) | TypedValue::Bits(v) => Some(*v as i64),
            TypedValue::Enum { index, .. } => Some(*index as i64),
            TypedValue::Bool { value, .. } => Some(*value as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            TypedValue::Enum { label, .. } | TypedValue::Bool { label, .. } => Some(label),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_pvt(&self) -> Option<&Pvt> {
        match self {
            TypedValue::Pvt(pvt) => Some(pvt),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Compound(values) => Some(values),
            _ => None,
        }
    }

    pub(crate) fn format_arg(&self) -> Option<FormatArg> {
        match self {
            TypedValue::Float(v) | TypedValue::Double(v) => Some(FormatArg::Float(*v)),
            TypedValue::Int(v) => Some(FormatArg::Int(*v as i64)),
            TypedValue::Long(v) => Some(FormatArg::Int(*v)),
            TypedValue::UInt(v) | TypedValue::Bits(v) => Some(FormatArg::Int(*v as i64)),
            _ => None,
        }
    }
}

/// Full precision float text, `25.0` rather than `25`.
pub(crate) fn float_repr(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format!("{:?}", value)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Float(v) | TypedValue::Double(v) => write!(f, "{}", float_repr(*v)),
            TypedValue::Int(v) => write!(f, "{}", v),
            TypedValue::Long(v) => write!(f, "{}", v),
            TypedValue::UInt(v) | TypedValue::Bits(v) => write!(f, "{}", v),
            TypedValue::String(s) => write!(f, "{}", s),
            TypedValue::Enum { label, .. } | TypedValue::Bool { label, .. } => {
                write!(f, "{}", label)
            }
            TypedValue::Compound(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            TypedValue::Pvt(pvt) => write!(f, "{}", pvt),
            TypedValue::Invalid => write!(f, "(invalid)"),
        }
    }
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        use TypedValue::*;
        match (self, other) {
            (Float(a), Float(b)) | (Double(a), Double(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (UInt(a), UInt(b)) | (Bits(a), Bits(b)) => a == b,
            (String(a), String(b)) => a == b,
            // enumerated labels compare case-insensitively
            (Enum { label: a, .. }, Enum { label: b, .. }) => a.eq_ignore_ascii_case(b),
            (Bool { value: a, .. }, Bool { value: b, .. }) => a == b,
            (Compound(a), Compound(b)) => a == b,
            (Pvt(a), Pvt(b)) => a == b,
            (Invalid, Invalid) => true,
            _ => false,
        }
    }
}

impl PartialEq<str> for TypedValue {
    fn eq(&self, other: &str) -> bool {
        match self {
            TypedValue::Enum { label, .. } => label.eq_ignore_ascii_case(other),
            TypedValue::String(s) => s == other,
            TypedValue::Bool { label, .. } => label == other,
            value => value.to_string() == other,
        }
    }
}

impl PartialEq<&str> for TypedValue {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl From<Pvt> for TypedValue {
    fn from(pvt: Pvt) -> Self {
        TypedValue::Pvt(pvt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(TypedValue::Float(25.0).to_string(), "25.0");
        assert_eq!(TypedValue::Double(1000.5).to_string(), "1000.5");
        assert_eq!(TypedValue::Float(f64::NAN).to_string(), "nan");
        assert_eq!(TypedValue::Int(-3).to_string(), "-3");
        assert_eq!(TypedValue::Invalid.to_string(), "(invalid)");
        assert_eq!(
            TypedValue::Compound(vec![TypedValue::Int(1), TypedValue::String("a".into())])
                .to_string(),
            "(1, a)"
        );
    }

    #[test]
    fn test_enum_comparison_ignores_case() {
        let ok = TypedValue::Enum {
            label: "OK".to_string(),
            index: 0,
        };
        let lower = TypedValue::Enum {
            label: "ok".to_string(),
            index: 0,
        };
        assert_eq!(ok, lower);
        assert!(ok == "Ok");
        assert!(TypedValue::String("Ok".to_string()) != "ok");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(TypedValue::UInt(7).as_i64(), Some(7));
        assert_eq!(TypedValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(TypedValue::String("x".into()).as_str(), Some("x"));
        assert_eq!(
            TypedValue::Bool {
                value: true,
                label: "on".into()
            }
            .as_bool(),
            Some(true)
        );
        assert!(TypedValue::Invalid.is_invalid());
        assert_eq!(TypedValue::Invalid.as_f64(), None);
    }
}
