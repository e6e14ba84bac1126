//! Declarative unit construction metadata.
//!
//! A [`UnitSpec`] is the complete, code-free description of how a unit may
//! be constructed: named conversion functions with accepted-type unions,
//! an optional constructor with named (possibly optional, defaultable)
//! fields, and post-construction setters. How these descriptors are
//! discovered is the caller's business — static tables, config files, or
//! hand-written builders all work; the engine only consumes the data.
//!
//! Specs are immutable once built and cached for the lifetime of the
//! engine; changing a unit's shape means building a new spec.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use leaven_value::Value;

use crate::casing::Casing;
use crate::engine::Engine;
use crate::errors::ExpandError;

/// Constructor callback: receives matched field values keyed by internal
/// field name (defaults already filled in) and produces the unit value.
pub type BuildFn = Arc<dyn Fn(&FieldSet) -> Result<Value, ExpandError> + Send + Sync>;

/// Conversion callback: receives the resolved input value (raw for a
/// primitive match, expanded for a complex match) and produces the unit
/// value directly.
pub type ConvertFn = Arc<dyn Fn(Value, &Engine) -> Result<Value, ExpandError> + Send + Sync>;

/// Setter callback: applies one field value to an already-constructed
/// unit value.
pub type ApplyFn = Arc<dyn Fn(&mut Value, Value) -> Result<(), ExpandError> + Send + Sync>;

/// The field values handed to a constructor callback, keyed by internal
/// field name.
#[derive(Clone, Debug, Default)]
pub struct FieldSet {
    values: FxHashMap<String, Value>,
}

impl FieldSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn insert(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A declared field: a constructor parameter or a setter target.
///
/// `accepts` is a union type string like `"int|string|Service<T>"`; bare
/// generic variables of the owning unit are allowed.
#[derive(Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) rename: Option<String>,
    pub(crate) description: String,
    pub(crate) accepts: String,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
}

impl FieldSpec {
    /// A required field accepting `types` (a `|`-separated union).
    pub fn new(name: impl Into<String>, types: impl Into<String>) -> Self {
        FieldSpec {
            name: name.into(),
            rename: None,
            description: String::new(),
            accepts: types.into(),
            optional: false,
            default: None,
        }
    }

    /// Mark the field optional: absent input keys are skipped.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Declare a default, used when an optional constructor field is
    /// absent. Implies optional.
    pub fn default_value(mut self, value: Value) -> Self {
        self.optional = true;
        self.default = Some(value);
        self
    }

    /// Override the external key this field is looked up under,
    /// bypassing any casing convention.
    pub fn rename(mut self, external: impl Into<String>) -> Self {
        self.rename = Some(external.into());
        self
    }

    /// Describe the field for schema output.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// The internal field name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A named conversion function: accepts one of several input shapes and
/// produces the unit value directly, bypassing field-by-field
/// construction.
#[derive(Clone)]
pub struct ConversionSpec {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) accepts: String,
    pub(crate) build: ConvertFn,
}

impl ConversionSpec {
    pub fn new(
        name: impl Into<String>,
        types: impl Into<String>,
        build: impl Fn(Value, &Engine) -> Result<Value, ExpandError> + Send + Sync + 'static,
    ) -> Self {
        ConversionSpec {
            name: name.into(),
            description: String::new(),
            accepts: types.into(),
            build: Arc::new(build),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }
}

/// A constructor: an ordered field list plus the callback that builds the
/// unit value from the matched fields.
#[derive(Clone)]
pub struct ConstructorSpec {
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) build: BuildFn,
}

/// A setter applied after construction.
#[derive(Clone)]
pub struct SetterSpec {
    pub(crate) field: FieldSpec,
    pub(crate) apply: ApplyFn,
}

/// The complete construction metadata for one unit.
#[derive(Clone)]
pub struct UnitSpec {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) generics: Vec<String>,
    pub(crate) casing: Option<Casing>,
    pub(crate) conversions: Vec<ConversionSpec>,
    pub(crate) constructor: Option<ConstructorSpec>,
    pub(crate) setters: Vec<SetterSpec>,
}

impl UnitSpec {
    pub fn builder(name: impl Into<String>) -> UnitSpecBuilder {
        UnitSpecBuilder {
            spec: UnitSpec {
                name: name.into(),
                description: String::new(),
                generics: Vec::new(),
                casing: None,
                conversions: Vec::new(),
                constructor: None,
                setters: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generics(&self) -> &[String] {
        &self.generics
    }
}

/// Fluent builder for [`UnitSpec`].
pub struct UnitSpecBuilder {
    spec: UnitSpec,
}

impl UnitSpecBuilder {
    /// Describe the unit for schema output.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = text.into();
        self
    }

    /// Declare a generic type variable, in order.
    pub fn generic(mut self, var: impl Into<String>) -> Self {
        self.spec.generics.push(var.into());
        self
    }

    /// Override the engine-level casing for this unit's fields.
    pub fn casing(mut self, casing: Casing) -> Self {
        self.spec.casing = Some(casing);
        self
    }

    /// Add a conversion function; declaration order is match order.
    pub fn conversion(mut self, conversion: ConversionSpec) -> Self {
        self.spec.conversions.push(conversion);
        self
    }

    /// Declare the constructor with an explicit build callback.
    pub fn constructor(
        mut self,
        fields: Vec<FieldSpec>,
        build: impl Fn(&FieldSet) -> Result<Value, ExpandError> + Send + Sync + 'static,
    ) -> Self {
        self.spec.constructor = Some(ConstructorSpec { fields, build: Arc::new(build) });
        self
    }

    /// Declare a constructor that builds a [`Value::record`] of this unit,
    /// with fields keyed by internal name and declared defaults filled in
    /// for absent optional fields.
    pub fn record_constructor(self, fields: Vec<FieldSpec>) -> Self {
        let unit = self.spec.name.clone();
        let names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
        self.constructor(fields, move |set: &FieldSet| {
            let mut record = leaven_value::Record::new(unit.clone());
            for name in &names {
                if let Some(value) = set.get(name) {
                    record.set(name.clone(), value.clone());
                }
            }
            Ok(Value::Record(Arc::new(record)))
        })
    }

    /// Add a setter with an explicit apply callback. Setter fields are
    /// always matched by presence; a declared-required setter field makes
    /// the whole unit require that key.
    pub fn setter(
        mut self,
        field: FieldSpec,
        apply: impl Fn(&mut Value, Value) -> Result<(), ExpandError> + Send + Sync + 'static,
    ) -> Self {
        self.spec.setters.push(SetterSpec { field, apply: Arc::new(apply) });
        self
    }

    /// Add a setter that stores the value into the constructed record
    /// under the field's internal name.
    pub fn record_setter(self, field: FieldSpec) -> Self {
        let name = field.name.clone();
        self.setter(field, move |target: &mut Value, value: Value| {
            match target {
                Value::Record(record) => {
                    Arc::make_mut(record).set(name.clone(), value);
                    Ok(())
                }
                other => Err(ExpandError::no_match(
                    other.type_name(),
                    "setter target is not a record",
                )),
            }
        })
    }

    pub fn build(self) -> UnitSpec {
        self.spec
    }
}
