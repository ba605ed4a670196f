use std::{fmt, sync::Arc};

use super::{
    describe::{self, Descriptor},
    pvt::Pvt,
    typed_value::TypedValue,
    value_type::ValueType,
    ValueTypeError,
};

/// A value type expected between `min` and `max` times in a row. No `max`
/// means unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatedValueType {
    vtype: Arc<ValueType>,
    min: usize,
    max: Option<usize>,
}

impl RepeatedValueType {
    pub fn new(
        vtype: Arc<ValueType>,
        min: usize,
        max: Option<usize>,
    ) -> Result<Self, ValueTypeError> {
        if matches!(max, Some(max) if max < min) {
            return Err(ValueTypeError::RepeatRange);
        }
        Ok(Self { vtype, min, max })
    }

    pub fn exactly(vtype: Arc<ValueType>, count: usize) -> Self {
        Self {
            vtype,
            min: count,
            max: Some(count),
        }
    }

    pub fn vtype(&self) -> &Arc<ValueType> {
        &self.vtype
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn is_fixed(&self) -> bool {
        self.max == Some(self.min)
    }

    fn repeat_text(&self) -> String {
        let times = if self.min == 1 {
            "once".to_string()
        } else {
            format!("{} times", self.min)
        };
        match self.max {
            Some(max) if max == self.min => times,
            None => format!("at least {}", times),
            Some(max) => format!("{}-{} times", self.min, max),
        }
    }

    pub fn descriptors(&self) -> Vec<Descriptor> {
        let mut descriptors = vec![("Repeated".to_string(), self.repeat_text())];
        descriptors.extend(self.vtype.descriptors());
        descriptors
    }
}

impl fmt::Display for RepeatedValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}*{}", self.vtype, self.min),
            None => write!(f, "{}*({},)", self.vtype, self.min),
            Some(max) => write!(f, "{}*({},{})", self.vtype, self.min, max),
        }
    }
}

/// Folds the values of a compound group into one value.
#[derive(Clone, Default)]
pub enum CompoundWrapper {
    #[default]
    Tuple,
    Pvt,
    Custom(Arc<dyn Fn(Vec<TypedValue>) -> TypedValue + Send + Sync>),
}

impl fmt::Debug for CompoundWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundWrapper::Tuple => write!(f, "Tuple"),
            CompoundWrapper::Pvt => write!(f, "Pvt"),
            CompoundWrapper::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// A fixed, ordered group of value types consumed together.
#[derive(Debug, Clone)]
pub struct CompoundValueType {
    vtypes: Vec<Arc<ValueType>>,
    name: Option<String>,
    help: Option<String>,
    wrapper: CompoundWrapper,
}

impl CompoundValueType {
    pub fn new(vtypes: Vec<Arc<ValueType>>) -> Self {
        Self {
            vtypes,
            name: None,
            help: None,
            wrapper: CompoundWrapper::Tuple,
        }
    }

    /// Position (deg), velocity (deg/s) and TAI time, wrapped as a [`Pvt`].
    pub fn pvt() -> Result<Self, ValueTypeError> {
        let vtypes = vec![
            Arc::new(ValueType::float().with_name("position")?.with_units("deg")),
            Arc::new(ValueType::float().with_name("velocity")?.with_units("deg/s")),
            Arc::new(ValueType::double().with_name("time")?.with_units("MJD-secs(TAI)")),
        ];
        Ok(Self::new(vtypes).with_wrapper(CompoundWrapper::Pvt))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_wrapper(mut self, wrapper: CompoundWrapper) -> Self {
        self.wrapper = wrapper;
        self
    }

    pub fn vtypes(&self) -> &[Arc<ValueType>] {
        &self.vtypes
    }

    pub fn len(&self) -> usize {
        self.vtypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vtypes.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Wraps one consumed value per member type.
    pub fn wrap(&self, values: Vec<TypedValue>) -> TypedValue {
        match &self.wrapper {
            CompoundWrapper::Tuple => TypedValue::Compound(values),
            CompoundWrapper::Pvt => {
                let component = |i: usize| {
                    values
                        .get(i)
                        .and_then(TypedValue::as_f64)
                        .unwrap_or(f64::NAN)
                };
                TypedValue::Pvt(Pvt::new(component(0), component(1), component(2)))
            }
            CompoundWrapper::Custom(wrap) => wrap(values),
        }
    }

    pub fn descriptors(&self) -> Vec<Descriptor> {
        let mut descriptors = Vec::new();
        if let Some(name) = &self.name {
            descriptors.push(("Name".to_string(), name.clone()));
        }
        if let Some(help) = &self.help {
            descriptors.push(("Description".to_string(), help.clone()));
        }
        for (index, vtype) in self.vtypes.iter().enumerate() {
            descriptors.push((format!("Subtype-{}", index), "-".repeat(40)));
            descriptors.extend(vtype.descriptors());
        }
        descriptors
    }
}

impl fmt::Display for CompoundValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.vtypes.iter().map(|v| v.to_string()).collect();
        write!(f, "CompoundValueType({})", names.join(", "))
    }
}

/// One entry of a key's expected value sequence.
#[derive(Debug, Clone)]
pub enum ValueSpec {
    Single(Arc<ValueType>),
    Repeated(RepeatedValueType),
    Compound(Arc<CompoundValueType>),
    /// A type declared under this name by an earlier key of the same
    /// dictionary.
    ByName(String),
}

impl ValueSpec {
    /// The declared name other keys may refer to. Repeated entries are
    /// never named.
    pub fn name(&self) -> Option<&str> {
        match self {
            ValueSpec::Single(vtype) => vtype.name(),
            ValueSpec::Compound(compound) => compound.name(),
            ValueSpec::Repeated(_) | ValueSpec::ByName(_) => None,
        }
    }

    pub fn descriptors(&self) -> Vec<Descriptor> {
        match self {
            ValueSpec::Single(vtype) => vtype.descriptors(),
            ValueSpec::Repeated(repeated) => repeated.descriptors(),
            ValueSpec::Compound(compound) => compound.descriptors(),
            ValueSpec::ByName(name) => vec![("Type".to_string(), format!("ByName(\"{}\")", name))],
        }
    }

    pub fn describe(&self) -> String {
        describe::render(&self.descriptors())
    }
}

impl fmt::Display for ValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSpec::Single(vtype) => write!(f, "{}", vtype),
            ValueSpec::Repeated(repeated) => write!(f, "{}", repeated),
            ValueSpec::Compound(compound) => write!(f, "{}", compound),
            ValueSpec::ByName(name) => write!(f, "ByName(\"{}\")", name),
        }
    }
}

impl From<ValueType> for ValueSpec {
    fn from(vtype: ValueType) -> Self {
        ValueSpec::Single(Arc::new(vtype))
    }
}

impl From<Arc<ValueType>> for ValueSpec {
    fn from(vtype: Arc<ValueType>) -> Self {
        ValueSpec::Single(vtype)
    }
}

impl From<RepeatedValueType> for ValueSpec {
    fn from(repeated: RepeatedValueType) -> Self {
        ValueSpec::Repeated(repeated)
    }
}

impl From<CompoundValueType> for ValueSpec {
    fn from(compound: CompoundValueType) -> Self {
        ValueSpec::Compound(Arc::new(compound))
    }
}

impl ValueType {
    /// Exactly `count` values of this type.
    pub fn times(self, count: usize) -> ValueSpec {
        RepeatedValueType::exactly(Arc::new(self), count).into()
    }

    /// Between `min` and `max` values of this type, `None` for no upper
    /// bound.
    pub fn repeat(self, min: usize, max: Option<usize>) -> Result<ValueSpec, ValueTypeError> {
        Ok(RepeatedValueType::new(Arc::new(self), min, max)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_repeat_text_and_display() {
        let string = Arc::new(ValueType::string());
        let cases = [
            (1, Some(1), "once", "String*1"),
            (3, Some(3), "3 times", "String*3"),
            (0, None, "at least 0 times", "String*(0,)"),
            (1, None, "at least once", "String*(1,)"),
            (1, Some(4), "1-4 times", "String*(1,4)"),
        ];
        for (min, max, text, shown) in cases {
            let repeated = RepeatedValueType::new(string.clone(), min, max).unwrap();
            assert_eq!(repeated.repeat_text(), text);
            assert_eq!(repeated.to_string(), shown);
        }
    }

    #[test]
    fn test_repeated_descriptors_lead_with_range() {
        let spec = ValueType::int().with_units("s").times(2);
        assert_eq!(
            spec.describe(),
            "    Repeated: 2 times\n        Type: Int (int,int4)\n       Units: s"
        );
    }

    #[test]
    fn test_pvt_wrapper() {
        let pvt = CompoundValueType::pvt().unwrap();
        assert_eq!(pvt.len(), 3);
        let wrapped = pvt.wrap(vec![
            TypedValue::Float(25.0),
            TypedValue::Float(0.5),
            TypedValue::Double(1000.0),
        ]);
        assert_eq!(wrapped, TypedValue::Pvt(Pvt::new(25.0, 0.5, 1000.0)));
    }

    #[test]
    fn test_custom_wrapper() {
        let compound = CompoundValueType::new(vec![
            Arc::new(ValueType::int()),
            Arc::new(ValueType::int()),
        ])
        .with_wrapper(CompoundWrapper::Custom(Arc::new(|values: Vec<TypedValue>| {
            TypedValue::Long(values.iter().filter_map(TypedValue::as_i64).sum())
        })));
        assert_eq!(
            compound.wrap(vec![TypedValue::Int(2), TypedValue::Int(3)]),
            TypedValue::Long(5)
        );
    }

    #[test]
    fn test_compound_descriptors() {
        let compound = CompoundValueType::new(vec![Arc::new(ValueType::string())])
            .with_name("pair")
            .with_help("A thing");
        assert_eq!(
            compound.descriptors(),
            vec![
                ("Name".to_string(), "pair".to_string()),
                ("Description".to_string(), "A thing".to_string()),
                ("Subtype-0".to_string(), "-".repeat(40)),
                ("Type".to_string(), "String (str,text)".to_string()),
            ]
        );
        assert_eq!(ValueSpec::from(compound).name(), Some("pair"));
    }

    proptest! {
        #[test]
        fn prop_repeat_range_requires_min_le_max(min in 0usize..20, max in 0usize..20) {
            let result = RepeatedValueType::new(Arc::new(ValueType::float()), min, Some(max));
            prop_assert_eq!(result.is_ok(), min <= max);
            prop_assert!(RepeatedValueType::new(Arc::new(ValueType::float()), min, None).is_ok());
        }
    }
}
