//! End-to-end validate/expand behavior through the public engine surface.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use leaven::{
    Casing, ConversionSpec, Engine, Entries, ExpandError, FieldSpec, Handler, JsonVisitor, Key,
    Path, SchemaBuilder, TypeExpr, UnitCatalog, UnitSpec, Value, VisitorRef,
};

#[test]
fn conversion_expands_bare_string() {
    let engine = common::engine();
    let expanded = engine.expand("Service<int>", &Value::from("api")).unwrap();
    assert_eq!(expanded, Value::record("Service", vec![("name", Value::from("api"))]));
}

#[test]
fn constructor_fills_defaults() {
    let engine = common::engine();
    let input = Value::object(vec![("name", Value::from("api"))]);
    let expanded = engine.expand("Service<int>", &input).unwrap();
    assert_eq!(
        expanded,
        Value::record(
            "Service",
            vec![
                ("name", Value::from("api")),
                ("replicas", Value::Int(1)),
                ("endpoints", Value::list(Vec::new())),
            ],
        )
    );
}

#[test]
fn union_field_keeps_raw_alternative() {
    let engine = common::engine();
    let input = Value::object(vec![
        ("name", Value::from("api")),
        ("replicas", Value::from("many")),
    ]);
    let expanded = engine.expand("Service<int>", &input).unwrap();
    let record = expanded.as_record().unwrap();
    assert_eq!(record.get("replicas"), Some(&Value::from("many")));
}

#[test]
fn generic_argument_flows_into_list_elements() {
    let engine = common::engine();
    let ints = Value::object(vec![
        ("name", Value::from("api")),
        ("endpoints", Value::list(vec![Value::Int(1), Value::Int(2)])),
    ]);
    let strings = Value::object(vec![
        ("name", Value::from("api")),
        ("endpoints", Value::list(vec![Value::from("x")])),
    ]);
    assert!(engine.validate("Service<int>", &ints).unwrap());
    assert!(!engine.validate("Service<int>", &strings).unwrap());
    assert!(engine.validate("Service<string>", &strings).unwrap());
}

#[test]
fn nested_unit_in_union_field() {
    let engine = common::engine();
    let input = Value::object(vec![
        ("name", Value::from("api")),
        ("backend", Value::object(vec![("name", Value::from("db"))])),
    ]);
    let expanded = engine.expand("Service<int>", &input).unwrap();
    let backend = expanded.as_record().unwrap().get("backend").unwrap();
    assert_eq!(backend.as_record().unwrap().get("name"), Some(&Value::from("db")));
}

#[test]
fn primitives_win_over_units_in_unions() {
    let engine = common::engine();
    assert_eq!(engine.expand("int|Endpoint<int>", &Value::Int(5)).unwrap(), Value::Int(5));
    // Declaration order does not matter: the primitive is probed first.
    assert_eq!(engine.expand("Endpoint<int>|int", &Value::Int(5)).unwrap(), Value::Int(5));

    let expanded = engine.expand("Endpoint<int>|int", &Value::Float(1.5));
    assert!(matches!(expanded, Err(ExpandError::NoMatch { .. })));
}

#[test]
fn conversion_only_unit_wraps_its_element() {
    let engine = common::engine();
    let expanded = engine.expand("Endpoint<int>", &Value::Int(7)).unwrap();
    assert_eq!(expanded, Value::record("Endpoint", vec![("value", Value::Int(7))]));
    assert!(!engine.validate("Endpoint<int>", &Value::from("x")).unwrap());
}

#[test]
fn lists_nest() {
    let engine = common::engine();
    let input = Value::list(vec![Value::list(vec![Value::Int(1)]), Value::list(Vec::new())]);
    let expanded = engine.expand("list<list<int>>", &input).unwrap();
    assert_eq!(expanded, input);

    let ragged = Value::list(vec![Value::list(vec![Value::from("x")])]);
    assert!(!engine.validate("list<list<int>>", &ragged).unwrap());
}

#[test]
fn list_of_uuids_parses_each_element() {
    let engine = common::engine();
    let id = "8c4a1a9e-98a1-4e29-87a7-10421bbb65c7";
    let input = Value::list(vec![Value::from(id)]);
    let expanded = engine.expand("list<uuid>", &input).unwrap();
    assert_eq!(expanded, Value::list(vec![Value::Uuid(Uuid::parse_str(id).unwrap())]));
}

#[test]
fn map_value_type_only() {
    let engine = common::engine();
    let input = Value::object(vec![("a", Value::from("x")), ("b", Value::from("y"))]);
    let expanded = engine.expand("map<string>", &input).unwrap();
    assert_eq!(expanded, input);
    assert!(!engine.validate("map<int>", &input).unwrap());
}

#[test]
fn map_key_type_constrains_keys() {
    let engine = common::engine();
    let input = Value::object(vec![("10", Value::from("x")), ("20", Value::from("y"))]);
    let expanded = engine.expand("map<int,string>", &input).unwrap();

    let mut expected = Entries::new();
    expected.insert(Key::Int(10), Value::from("x"));
    expected.insert(Key::Int(20), Value::from("y"));
    assert_eq!(expanded, Value::Array(expected));

    let named = Value::object(vec![("a", Value::from("x"))]);
    assert!(!engine.validate("map<int,string>", &named).unwrap());
    assert!(engine.validate("map<string,string>", &named).unwrap());
}

#[test]
fn timestamp_and_its_alias_parse_rfc3339() {
    let engine = common::engine();
    let text = "2024-05-01T12:00:00Z";
    let expected = Value::Timestamp(OffsetDateTime::parse(text, &Rfc3339).unwrap());
    assert_eq!(engine.expand("timestamp", &Value::from(text)).unwrap(), expected);
    assert_eq!(engine.expand("datetime", &Value::from(text)).unwrap(), expected);
    assert!(!engine.validate("timestamp", &Value::from("yesterday")).unwrap());
}

#[test]
fn self_reference_without_escape_never_matches() {
    let engine = common::engine();
    assert!(!engine.validate("Ouroboros", &Value::Int(1)).unwrap());
    assert!(!engine.validate("Ouroboros", &Value::object(vec![("x", Value::Int(1))])).unwrap());
    let err = engine.expand("Ouroboros", &Value::Int(1)).unwrap_err();
    assert!(matches!(err, ExpandError::NoMatch { .. }));
}

#[test]
fn self_reference_escapes_through_other_instantiation() {
    let engine = common::engine();

    let own = Value::object(vec![("value", Value::from("x"))]);
    let expanded = engine.expand("Wrapper<string>", &own).unwrap();
    assert_eq!(expanded, Value::record("Wrapper", vec![("value", Value::from("x"))]));

    // The constructor rejects an int value, but the conversion accepting
    // `Wrapper<int>` picks it up; same input position, extended path.
    let nested = Value::object(vec![("value", Value::Int(3))]);
    let expanded = engine.expand("Wrapper<string>", &nested).unwrap();
    assert_eq!(expanded, Value::record("Wrapper", vec![("value", Value::Int(3))]));

    assert!(!engine.validate("Wrapper<string>", &Value::object(vec![("value", Value::Bool(true))])).unwrap());
}

#[test]
fn empty_object_matches_pure_optional_constructor() {
    let engine = common::engine();
    let empty = Value::object(Vec::<(&str, Value)>::new());
    let expanded = engine.expand("Defaults", &empty).unwrap();
    assert_eq!(expanded, Value::record("Defaults", vec![("mode", Value::from("auto"))]));

    // An empty list is the same input: empty containers are both shapes.
    let expanded = engine.expand("Defaults", &Value::list(Vec::new())).unwrap();
    assert_eq!(expanded, Value::record("Defaults", vec![("mode", Value::from("auto"))]));
}

#[test]
fn setter_driven_unit() {
    let engine = common::engine();
    let input = Value::object(vec![("name", Value::from("s")), ("active", Value::Bool(true))]);
    let expanded = engine.expand("Sidecar", &input).unwrap();
    assert_eq!(
        expanded,
        Value::record(
            "Sidecar",
            vec![("name", Value::from("s")), ("enabled", Value::Bool(true))],
        )
    );

    // The required setter field gates the whole unit.
    let empty = Value::object(Vec::<(&str, Value)>::new());
    assert!(!engine.validate("Sidecar", &empty).unwrap());
}

#[test]
fn explicit_null_satisfies_a_null_alternative() {
    let engine = common::engine();
    let input = Value::object(vec![("name", Value::from("s")), ("endpoint", Value::Null)]);
    let expanded = engine.expand("Sidecar", &input).unwrap();
    assert_eq!(expanded.as_record().unwrap().get("endpoint"), Some(&Value::Null));
}

#[test]
fn constructor_field_plus_setter() {
    let engine = common::engine();
    let input = Value::object(vec![("task", Value::from("build")), ("priority", Value::Int(3))]);
    let expanded = engine.expand("Job", &input).unwrap();
    assert_eq!(
        expanded,
        Value::record("Job", vec![("task", Value::from("build")), ("priority", Value::Int(3))])
    );

    // A present field that matches no alternative fails the whole unit
    // even though the field is optional.
    let bad = Value::object(vec![("task", Value::from("build")), ("priority", Value::from("high"))]);
    assert!(!engine.validate("Job", &bad).unwrap());
}

#[test]
fn renames_bypass_casing() {
    let engine = common::builder().casing(Casing::Kebab).build();
    let input = Value::object(vec![
        ("professionals", Value::list(vec![Value::from("ada")])),
        ("book", Value::from("tome")),
    ]);
    let expanded = engine.expand("Aliased", &input).unwrap();
    assert_eq!(
        expanded,
        Value::record(
            "Aliased",
            vec![
                ("players", Value::list(vec![Value::from("ada")])),
                ("text", Value::from("tome")),
            ],
        )
    );
}

#[test]
fn engine_casing_maps_external_keys() {
    let engine = common::builder().casing(Casing::Kebab).build();
    let input = Value::object(vec![("max-load", Value::Int(5))]);
    let expanded = engine.expand("Weight", &input).unwrap();
    assert_eq!(expanded, Value::record("Weight", vec![("maxLoad", Value::Int(5))]));

    // The internal spelling is not accepted once a casing is set.
    let internal = Value::object(vec![("maxLoad", Value::Int(5))]);
    assert!(!engine.validate("Weight", &internal).unwrap());
}

#[test]
fn unit_casing_overrides_engine_casing() {
    let engine = common::builder().casing(Casing::Kebab).build();
    let input = Value::object(vec![("display_name", Value::from("x"))]);
    let expanded = engine.expand("SnakeCased", &input).unwrap();
    assert_eq!(expanded, Value::record("SnakeCased", vec![("displayName", Value::from("x"))]));
}

#[test]
fn conversion_union_spanning_units() {
    let engine = common::engine();
    let expanded = engine.expand("Variants", &Value::from("hello")).unwrap();
    assert_eq!(expanded, Value::record("Endpoint", vec![("value", Value::from("hello"))]));

    let input = Value::object(vec![("name", Value::from("side"))]);
    let expanded = engine.expand("Variants", &input).unwrap();
    assert_eq!(expanded.as_record().unwrap().unit(), "Sidecar");
}

#[test]
fn undeclared_input_keys_are_ignored() {
    let engine = common::engine();
    let input = Value::object(vec![("name", Value::from("api")), ("extra", Value::Bool(true))]);
    let expanded = engine.expand("Service<int>", &input).unwrap();
    assert!(expanded.as_record().unwrap().get("extra").is_none());
}

#[test]
fn json_input_agrees_with_native_input() {
    let engine = common::engine();
    let document = json!({
        "name": "api",
        "replicas": 2,
        "endpoints": [1, 2],
    });
    let from_json = engine.expand_json("Service<int>", &document).unwrap();
    let from_native = engine.expand("Service<int>", &Value::from_json(&document)).unwrap();
    assert_eq!(from_json, from_native);

    assert!(engine.validate_json("Service<int>", &document).unwrap());
    assert!(!engine.validate_json("Service<int>", &json!({"replicas": 2})).unwrap());
}

#[test]
fn visitors_plug_in_directly() {
    let engine = common::engine();
    let visitor = JsonVisitor::new(json!("api"));
    let expanded = engine.expand_visitor("Service<int>", &visitor).unwrap();
    assert_eq!(expanded, Value::record("Service", vec![("name", Value::from("api"))]));
}

#[test]
fn unknown_types_validate_false_but_fail_expansion() {
    let engine = common::engine();
    assert!(!engine.validate("Nope", &Value::Int(1)).unwrap());
    let err = engine.expand("Nope", &Value::Int(1)).unwrap_err();
    assert!(matches!(err, ExpandError::Unsupported { .. }));
}

#[test]
fn malformed_type_strings_error_out() {
    let engine = common::engine();
    assert!(matches!(
        engine.expand("Service<", &Value::Int(1)),
        Err(ExpandError::Malformed(_))
    ));
    assert!(matches!(
        engine.validate("Service<", &Value::Int(1)),
        Err(ExpandError::Malformed(_))
    ));
}

#[test]
fn support_is_recursive() {
    let engine = common::engine();
    assert!(engine.has_support("Service<int>"));
    assert!(engine.has_support("list<map<string,Endpoint<int>>>"));
    assert!(engine.has_support("Ouroboros"));
    assert!(engine.has_support("*"));
    assert!(!engine.has_support("Nope"));
    assert!(!engine.has_support("list<Nope>"));
    assert!(!engine.has_support("Service<"));
    // Wrong arity is unsupported too.
    assert!(!engine.has_support("Service"));
    assert!(!engine.has_support("list<int,int>"));
}

#[test]
fn unit_referencing_unknown_type_is_unsupported() {
    let engine = Engine::builder()
        .unit(
            UnitSpec::builder("Broken")
                .record_constructor(vec![FieldSpec::new("x", "Nope")])
                .build(),
        )
        .build();
    let err = engine.expand("Broken", &Value::object(vec![("x", Value::Int(1))])).unwrap_err();
    match err {
        ExpandError::Unsupported { name, reasons } => {
            assert_eq!(name, "Broken");
            assert!(reasons.contains("field `x`"), "unexpected reasons: {reasons}");
        }
        other => panic!("expected Unsupported, got {other}"),
    }
}

#[test]
fn unit_with_no_strategy_is_unsupported() {
    let engine = Engine::builder().unit(UnitSpec::builder("Inert").build()).build();
    let err = engine.expand("Inert", &Value::Int(1)).unwrap_err();
    assert!(matches!(err, ExpandError::Unsupported { .. }));
}

#[test]
fn expand_into_composes_generic_arguments() {
    let engine = common::engine();
    let input = Value::object(vec![
        ("name", Value::from("api")),
        ("endpoints", Value::list(vec![Value::Int(8080)])),
    ]);
    let composed = engine.expand_into("Service", &["Endpoint<int>"], &input).unwrap();
    let spelled = engine.expand("Service<Endpoint<int>>", &input).unwrap();
    assert_eq!(composed, spelled);
}

#[test]
fn caller_bindings_resolve_before_matching() {
    let engine = common::engine();
    let bindings: leaven::Bindings = [(
        "T".to_owned(),
        leaven::TypeExpr::simple("int"),
    )]
    .into_iter()
    .collect();
    let input = Value::list(vec![Value::Int(1)]);
    assert_eq!(engine.expand_with("list<T>", &bindings, &input).unwrap(), input);
    assert!(engine.validate_with("list<T>", &bindings, &input).unwrap());
    assert!(!engine.validate_with("T", &bindings, &Value::from("x")).unwrap());
}

#[test]
fn bare_list_takes_any_elements() {
    let engine = common::engine();
    let input = Value::list(vec![Value::Int(1), Value::from("x")]);
    assert_eq!(engine.expand("list", &input).unwrap(), input);
    assert!(engine.has_support("list"));
    assert!(!engine.validate("list", &Value::Int(1)).unwrap());
}

struct Doubler;

impl Handler for Doubler {
    fn name(&self) -> &str {
        "double"
    }

    fn validate(
        &self,
        _engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        _path: &Path,
    ) -> bool {
        generics.is_empty() && visitor.is_integer()
    }

    fn expand(
        &self,
        _engine: &Engine,
        visitor: &VisitorRef,
        _generics: &[TypeExpr],
        _path: &Path,
    ) -> Result<Value, ExpandError> {
        visitor.value().as_int().map(|i| Value::Int(i * 2)).ok_or_else(|| {
            ExpandError::NoMatch {
                type_name: "double".to_owned(),
                reason: "not an integer".to_owned(),
            }
        })
    }

    fn build_schema(
        &self,
        _builder: &mut SchemaBuilder<'_>,
        _generics: &[TypeExpr],
        _definition_name: &str,
    ) -> Result<serde_json::Value, ExpandError> {
        Ok(json!({ "type": "integer" }))
    }
}

#[test]
fn hand_written_handlers_register() {
    let engine = common::builder().handler(Arc::new(Doubler)).build();
    assert_eq!(engine.expand("double", &Value::Int(21)).unwrap(), Value::Int(42));
    assert!(engine.has_support("list<double>"));
    assert!(!engine.validate("double", &Value::from("x")).unwrap());
}

struct LazyCatalog;

impl UnitCatalog for LazyCatalog {
    fn lookup(&self, name: &str) -> Option<UnitSpec> {
        (name == "Lazy").then(|| {
            UnitSpec::builder("Lazy")
                .conversion(ConversionSpec::new("of", "string", |value, _| Ok(value)))
                .build()
        })
    }
}

#[test]
fn catalog_supplies_units_on_demand() {
    let engine = Engine::builder().catalog(Arc::new(LazyCatalog)).build();
    assert_eq!(engine.expand("Lazy", &Value::from("x")).unwrap(), Value::from("x"));
    assert!(engine.has_support("Lazy"));
    assert!(!engine.has_support("Eager"));
}
