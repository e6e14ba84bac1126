//! Compilation of unit metadata into a handler.
//!
//! Compilation happens once per base name: accepted-type strings are
//! parsed, external field keys are resolved through renames and casing,
//! and every referenced type is checked for support. The resulting
//! [`CompiledHandler`] then matches inputs by trying conversions in
//! declaration order and falling back to field-by-field construction.
//!
//! Within any accepted-type union, primitive alternatives are probed
//! before unit alternatives, so `int|Endpoint<int>` never expands an
//! `Endpoint` out of a plain integer.

use std::sync::Arc;

use leaven_expr::{Bindings, TypeExpr};
use leaven_value::{Value, VisitorRef};
use tracing::trace;

use crate::casing::Casing;
use crate::engine::{Engine, Expanded};
use crate::errors::ExpandError;
use crate::handler::Handler;
use crate::path::Path;
use crate::primitive::Primitive;
use crate::schema::SchemaBuilder;
use crate::unit::{ApplyFn, ConvertFn, FieldSet, FieldSpec, UnitSpec};

/// A parsed accepted-type union, probed primitive-first.
pub(crate) struct UnionMatcher {
    exprs: Vec<TypeExpr>,
}

impl UnionMatcher {
    pub(crate) fn new(exprs: Vec<TypeExpr>) -> Self {
        UnionMatcher { exprs }
    }

    /// The alternatives in declaration order, for schema output.
    pub(crate) fn exprs(&self) -> &[TypeExpr] {
        &self.exprs
    }

    /// Resolve generic variables; classification is redone afterwards
    /// since a bare variable may substitute to a primitive.
    pub(crate) fn substitute(&self, bindings: &Bindings) -> UnionMatcher {
        UnionMatcher { exprs: self.exprs.iter().map(|e| e.substitute(bindings)).collect() }
    }

    /// Primitive alternatives first, then the rest, both in declaration
    /// order.
    fn ordered(&self) -> impl Iterator<Item = &TypeExpr> {
        let (primitive, complex): (Vec<_>, Vec<_>) = self
            .exprs
            .iter()
            .partition(|e| Primitive::from_name(e.base()).is_some());
        primitive.into_iter().chain(complex)
    }

    pub(crate) fn validate(&self, engine: &Engine, visitor: &VisitorRef, path: &Path) -> bool {
        self.ordered().any(|expr| engine.validate_expr(expr, visitor, path))
    }

    pub(crate) fn expand(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        path: &Path,
    ) -> Result<Expanded, ExpandError> {
        for expr in self.ordered() {
            if let Expanded::Value(value) = engine.expand_guarded(expr, visitor, path)? {
                return Ok(Expanded::Value(value));
            }
        }
        Ok(Expanded::Unsatisfied)
    }
}

/// Every accepted-type union a unit declares, labeled for diagnostics.
pub(crate) fn accepted_unions(spec: &UnitSpec) -> impl Iterator<Item = (String, &str)> {
    let conversions = spec
        .conversions
        .iter()
        .map(|c| (format!("conversion `{}`", c.name), c.accepts.as_str()));
    let fields = spec
        .constructor
        .iter()
        .flat_map(|ctor| ctor.fields.iter())
        .map(|f| (format!("field `{}`", f.name), f.accepts.as_str()));
    let setters = spec
        .setters
        .iter()
        .map(|s| (format!("setter `{}`", s.field.name), s.field.accepts.as_str()));
    conversions.chain(fields).chain(setters)
}

struct CompiledConversion {
    name: String,
    description: String,
    accepts: UnionMatcher,
    build: ConvertFn,
}

struct CompiledField {
    name: String,
    external: String,
    description: String,
    accepts: UnionMatcher,
    optional: bool,
    default: Option<Value>,
}

struct CompiledSetter {
    field: CompiledField,
    apply: ApplyFn,
}

/// A handler compiled from declarative unit metadata.
///
/// One compiled handler serves every generic instantiation of its unit;
/// the caller's generic arguments are substituted into the accepted-type
/// unions on each call.
pub(crate) struct CompiledHandler {
    spec: Arc<UnitSpec>,
    conversions: Vec<CompiledConversion>,
    fields: Vec<CompiledField>,
    setters: Vec<CompiledSetter>,
}

/// Compile a unit's metadata, collecting every defect into a single
/// [`ExpandError::Unsupported`] rather than stopping at the first.
pub(crate) fn compile(engine: &Engine, spec: &Arc<UnitSpec>) -> Result<CompiledHandler, ExpandError> {
    let mut reasons = Vec::new();

    if spec.conversions.is_empty() && spec.constructor.is_none() {
        reasons.push("unit declares no conversions and no constructor".to_owned());
    }
    if spec.constructor.is_none() && !spec.setters.is_empty() {
        reasons.push("setters require a constructor to produce their target".to_owned());
    }

    // Self-reference is legal during the support check.
    let mut in_progress = vec![spec.name.clone()];
    for (label, accepts) in accepted_unions(spec) {
        match leaven_expr::parse_union(accepts, &Bindings::default()) {
            Ok(exprs) => {
                for expr in &exprs {
                    if !engine.has_support_expr(expr, &spec.generics, &mut in_progress) {
                        reasons.push(format!("{label} accepts unsupported type `{expr}`"));
                    }
                }
            }
            Err(err) => reasons.push(format!("{label} has malformed type `{accepts}`: {err}")),
        }
    }
    if !reasons.is_empty() {
        return Err(ExpandError::unsupported(&spec.name, reasons));
    }

    let casing = spec.casing.or(engine.casing());
    let conversions = spec
        .conversions
        .iter()
        .map(|c| {
            Ok(CompiledConversion {
                name: c.name.clone(),
                description: c.description.clone(),
                accepts: parse_accepts(&c.accepts)?,
                build: c.build.clone(),
            })
        })
        .collect::<Result<Vec<_>, ExpandError>>()?;
    let fields = spec
        .constructor
        .iter()
        .flat_map(|ctor| ctor.fields.iter())
        .map(|f| compile_field(f, casing))
        .collect::<Result<Vec<_>, ExpandError>>()?;
    let setters = spec
        .setters
        .iter()
        .map(|s| {
            Ok(CompiledSetter { field: compile_field(&s.field, casing)?, apply: s.apply.clone() })
        })
        .collect::<Result<Vec<_>, ExpandError>>()?;

    Ok(CompiledHandler { spec: spec.clone(), conversions, fields, setters })
}

fn parse_accepts(accepts: &str) -> Result<UnionMatcher, ExpandError> {
    Ok(UnionMatcher::new(leaven_expr::parse_union(accepts, &Bindings::default())?))
}

fn compile_field(field: &FieldSpec, casing: Option<Casing>) -> Result<CompiledField, ExpandError> {
    let external = match (&field.rename, casing) {
        (Some(rename), _) => rename.clone(),
        (None, Some(casing)) => casing.apply(&field.name),
        (None, None) => field.name.clone(),
    };
    Ok(CompiledField {
        name: field.name.clone(),
        external,
        description: field.description.clone(),
        accepts: parse_accepts(&field.accepts)?,
        optional: field.optional,
        default: field.default.clone(),
    })
}

/// One field's outcome during all-or-nothing matching.
enum FieldOutcome {
    Matched(Value),
    Absent,
    Fail,
}

impl CompiledHandler {
    /// Bind the unit's generic variables positionally; a caller passing
    /// the wrong number of arguments matches nothing.
    fn bindings(&self, generics: &[TypeExpr]) -> Option<Bindings> {
        if generics.len() != self.spec.generics.len() {
            return None;
        }
        Some(
            self.spec
                .generics
                .iter()
                .cloned()
                .zip(generics.iter().cloned())
                .collect(),
        )
    }

    /// Probe one field of an object input. The field's value is a new
    /// input position, so its probes start from a fresh path.
    fn probe_field(&self, engine: &Engine, visitor: &VisitorRef, field: &CompiledField, bindings: &Bindings) -> bool {
        if !visitor.has_key(&field.external) {
            return field.optional;
        }
        let child = visitor.enter_object(&field.external);
        field.accepts.substitute(bindings).validate(engine, &child, &Path::root())
    }

    /// Expand one field of an object input, or report why it cannot.
    fn expand_field(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        field: &CompiledField,
        bindings: &Bindings,
    ) -> Result<FieldOutcome, ExpandError> {
        if !visitor.has_key(&field.external) {
            return Ok(if field.optional { FieldOutcome::Absent } else { FieldOutcome::Fail });
        }
        let child = visitor.enter_object(&field.external);
        match field.accepts.substitute(bindings).expand(engine, &child, &Path::root())? {
            Expanded::Value(value) => Ok(FieldOutcome::Matched(value)),
            Expanded::Unsatisfied => Ok(FieldOutcome::Fail),
        }
    }

    /// Whether the object input satisfies every constructor and setter
    /// field at once.
    fn fields_match(&self, engine: &Engine, visitor: &VisitorRef, bindings: &Bindings) -> bool {
        self.spec.constructor.is_some()
            && visitor.is_object()
            && self
                .fields
                .iter()
                .chain(self.setters.iter().map(|s| &s.field))
                .all(|field| self.probe_field(engine, visitor, field, bindings))
    }

    /// Expand the object input through the constructor and setters.
    /// `Ok(None)` means some field failed to match.
    fn expand_fields(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        bindings: &Bindings,
    ) -> Result<Option<Value>, ExpandError> {
        let Some(ctor) = &self.spec.constructor else {
            return Ok(None);
        };
        if !visitor.is_object() {
            return Ok(None);
        }

        let mut set = FieldSet::default();
        for field in &self.fields {
            match self.expand_field(engine, visitor, field, bindings)? {
                FieldOutcome::Matched(value) => set.insert(field.name.clone(), value),
                FieldOutcome::Absent => {
                    if let Some(default) = &field.default {
                        set.insert(field.name.clone(), default.clone());
                    }
                }
                FieldOutcome::Fail => return Ok(None),
            }
        }
        let mut pending = Vec::new();
        for setter in &self.setters {
            match self.expand_field(engine, visitor, &setter.field, bindings)? {
                FieldOutcome::Matched(value) => pending.push((&setter.apply, value)),
                FieldOutcome::Absent => {}
                FieldOutcome::Fail => return Ok(None),
            }
        }

        let mut value = (ctor.build)(&set)?;
        for (apply, field_value) in pending {
            apply(&mut value, field_value)?;
        }
        Ok(Some(value))
    }
}

impl Handler for CompiledHandler {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn generic_params(&self) -> &[String] {
        &self.spec.generics
    }

    fn validate(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        path: &Path,
    ) -> bool {
        let Some(bindings) = self.bindings(generics) else {
            return false;
        };
        // Conversions probe the same input position, so the path threads
        // through them; that is what lets a self-referential unit escape
        // through a differently-parameterized alternative.
        self.conversions
            .iter()
            .any(|c| c.accepts.substitute(&bindings).validate(engine, visitor, path))
            || self.fields_match(engine, visitor, &bindings)
    }

    fn expand(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        path: &Path,
    ) -> Result<Value, ExpandError> {
        self.validate_expand(engine, visitor, generics, path)
    }

    fn validate_expand(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        path: &Path,
    ) -> Result<Value, ExpandError> {
        let bindings = self.bindings(generics).ok_or_else(|| {
            ExpandError::no_match(
                &self.spec.name,
                format!(
                    "expected {} generic argument(s), got {}",
                    self.spec.generics.len(),
                    generics.len()
                ),
            )
        })?;

        for conversion in &self.conversions {
            if let Expanded::Value(value) =
                conversion.accepts.substitute(&bindings).expand(engine, visitor, path)?
            {
                trace!(unit = %self.spec.name, conversion = %conversion.name, "conversion matched");
                return (conversion.build)(value, engine);
            }
        }
        if let Some(value) = self.expand_fields(engine, visitor, &bindings)? {
            trace!(unit = %self.spec.name, "constructor matched");
            return Ok(value);
        }
        Err(ExpandError::no_match(
            &self.spec.name,
            format!("input of type {} matched no conversion or constructor", visitor.value().type_name()),
        ))
    }

    fn build_schema(
        &self,
        builder: &mut SchemaBuilder<'_>,
        generics: &[TypeExpr],
        _definition_name: &str,
    ) -> Result<serde_json::Value, ExpandError> {
        let bindings = self.bindings(generics).ok_or_else(|| {
            ExpandError::format(&self.spec.name, "wrong number of generic arguments")
        })?;

        let mut options = Vec::new();
        for conversion in &self.conversions {
            let exprs: Vec<TypeExpr> = conversion
                .accepts
                .exprs()
                .iter()
                .map(|e| e.substitute(&bindings))
                .collect();
            let mut fragment = builder.union_fragment(&exprs)?;
            annotate(&mut fragment, &conversion.description);
            options.push(fragment);
        }

        if self.spec.constructor.is_some() {
            let mut properties = serde_json::Map::new();
            let mut required = Vec::new();
            for field in self.fields.iter().chain(self.setters.iter().map(|s| &s.field)) {
                let exprs: Vec<TypeExpr> =
                    field.accepts.exprs().iter().map(|e| e.substitute(&bindings)).collect();
                let mut fragment = builder.union_fragment(&exprs)?;
                annotate(&mut fragment, &field.description);
                properties.insert(field.external.clone(), fragment);
                if !field.optional {
                    required.push(serde_json::Value::String(field.external.clone()));
                }
            }
            let mut object = serde_json::Map::new();
            object.insert("type".to_owned(), "object".into());
            object.insert("properties".to_owned(), serde_json::Value::Object(properties));
            if !required.is_empty() {
                object.insert("required".to_owned(), serde_json::Value::Array(required));
            }
            options.push(serde_json::Value::Object(object));
        }

        let mut schema = match options.len() {
            0 => serde_json::json!({}),
            1 => options.pop().unwrap_or_default(),
            _ => serde_json::json!({ "oneOf": options }),
        };
        annotate(&mut schema, &self.spec.description);
        Ok(schema)
    }
}

/// Attach a description to an object-shaped fragment, leaving existing
/// descriptions (and non-object fragments like `true`) alone.
fn annotate(fragment: &mut serde_json::Value, description: &str) {
    if description.is_empty() {
        return;
    }
    if let serde_json::Value::Object(map) = fragment {
        map.entry("description".to_owned()).or_insert_with(|| description.into());
    }
}
