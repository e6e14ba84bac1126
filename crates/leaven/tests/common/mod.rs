//! Shared fixture units for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use leaven::{
    Casing, ConversionSpec, Engine, EngineBuilder, ExpandError, FieldSpec, UnitSpec, Value,
};

/// A service description: constructible from a bare name string or an
/// object with generically-typed endpoints and an optionally-nested
/// backend.
pub fn service() -> UnitSpec {
    UnitSpec::builder("Service")
        .description("A named service")
        .generic("T")
        .conversion(
            ConversionSpec::new("from_name", "string", |value, _| {
                Ok(Value::record("Service", vec![("name", value)]))
            })
            .description("Shorthand: just the service name"),
        )
        .record_constructor(vec![
            FieldSpec::new("name", "string").description("Display name"),
            FieldSpec::new("replicas", "int|string").default_value(Value::Int(1)),
            FieldSpec::new("backend", "int|string|Service<T>").optional(),
            FieldSpec::new("endpoints", "list<T>").default_value(Value::list(Vec::new())),
        ])
        .build()
}

/// Conversion-only unit: wraps any value of its element type.
pub fn endpoint() -> UnitSpec {
    UnitSpec::builder("Endpoint")
        .generic("T")
        .conversion(ConversionSpec::new("of", "T", |value, _| {
            Ok(Value::record("Endpoint", vec![("value", value)]))
        }))
        .build()
}

/// Self-referential with an escape: a `Wrapper<T>` also accepts a
/// `Wrapper<int>` wholesale.
pub fn wrapper() -> UnitSpec {
    UnitSpec::builder("Wrapper")
        .generic("T")
        .conversion(ConversionSpec::new("nested", "Wrapper<int>", |value, _| Ok(value)))
        .record_constructor(vec![FieldSpec::new("value", "T")])
        .build()
}

/// Self-referential with no escape; matches nothing, ever.
pub fn ouroboros() -> UnitSpec {
    UnitSpec::builder("Ouroboros")
        .conversion(ConversionSpec::new("same", "Ouroboros", |value, _| Ok(value)))
        .build()
}

/// All fields optional with defaults; the empty object matches.
pub fn defaults_unit() -> UnitSpec {
    UnitSpec::builder("Defaults")
        .record_constructor(vec![
            FieldSpec::new("mode", "string").default_value(Value::from("auto")),
        ])
        .build()
}

/// Explicit renames on a constructor field and a setter field.
pub fn aliased() -> UnitSpec {
    UnitSpec::builder("Aliased")
        .record_constructor(vec![
            FieldSpec::new("players", "list<string>").rename("professionals"),
        ])
        .record_setter(FieldSpec::new("text", "string").rename("book").optional())
        .build()
}

/// Setter-driven unit: empty constructor, fields applied afterwards,
/// including one with a custom apply function.
pub fn sidecar() -> UnitSpec {
    UnitSpec::builder("Sidecar")
        .record_constructor(Vec::new())
        .record_setter(FieldSpec::new("name", "string"))
        .record_setter(FieldSpec::new("endpoint", "Endpoint<string>|null").optional())
        .record_setter(FieldSpec::new("id", "uuid").optional())
        .setter(FieldSpec::new("active", "bool").optional(), |target, value| match target {
            Value::Record(record) => {
                Arc::make_mut(record).set("enabled", value);
                Ok(())
            }
            other => Err(ExpandError::NoMatch {
                type_name: other.type_name().to_owned(),
                reason: "setter target is not a record".to_owned(),
            }),
        })
        .build()
}

/// Required constructor field plus an optional setter.
pub fn job() -> UnitSpec {
    UnitSpec::builder("Job")
        .record_constructor(vec![FieldSpec::new("task", "string")])
        .record_setter(FieldSpec::new("priority", "int").optional())
        .build()
}

/// A conversion whose accepted union spans two other units.
pub fn variants() -> UnitSpec {
    UnitSpec::builder("Variants")
        .conversion(ConversionSpec::new("source", "Endpoint<string>|Sidecar", |value, _| Ok(value)))
        .build()
}

/// Unit-level casing override.
pub fn snake_cased() -> UnitSpec {
    UnitSpec::builder("SnakeCased")
        .casing(Casing::Snake)
        .record_constructor(vec![FieldSpec::new("displayName", "string")])
        .build()
}

/// No rename and no unit casing; follows whatever the engine says.
pub fn weight() -> UnitSpec {
    UnitSpec::builder("Weight")
        .record_constructor(vec![FieldSpec::new("maxLoad", "int")])
        .build()
}

pub fn builder() -> EngineBuilder {
    Engine::builder()
        .unit(service())
        .unit(endpoint())
        .unit(wrapper())
        .unit(ouroboros())
        .unit(defaults_unit())
        .unit(aliased())
        .unit(sidecar())
        .unit(job())
        .unit(variants())
        .unit(snake_cased())
        .unit(weight())
}

pub fn engine() -> Engine {
    builder().build()
}
