//! JSON Schema derivation.
//!
//! Each referenced unit instantiation gets one entry under `definitions`,
//! keyed by its canonical type name, and is referred to by `$ref`
//! everywhere it appears. A placeholder is parked under the key before the
//! body is built, so self-referential units terminate: the recursive
//! reference sees the key already present and emits the `$ref` without
//! descending again.

use serde_json::json;

use leaven_expr::TypeExpr;

use crate::engine::Engine;
use crate::errors::ExpandError;
use crate::primitive::Primitive;

/// Accumulates the `definitions` table while schema fragments are built.
pub struct SchemaBuilder<'e> {
    engine: &'e Engine,
    definitions: serde_json::Map<String, serde_json::Value>,
}

impl<'e> SchemaBuilder<'e> {
    pub(crate) fn new(engine: &'e Engine) -> Self {
        SchemaBuilder { engine, definitions: serde_json::Map::new() }
    }

    /// The schema fragment standing for `expr`: the primitive fragment
    /// inline, or a `$ref` into `definitions` with the definition built on
    /// first sight.
    pub fn reference(&mut self, expr: &TypeExpr) -> Result<serde_json::Value, ExpandError> {
        if let Some(primitive) = Primitive::from_name(expr.base()) {
            return Ok(primitive.schema());
        }
        let canonical = expr.canonical();
        if !self.definitions.contains_key(&canonical) {
            // Park a placeholder so recursive references short-circuit.
            self.definitions.insert(canonical.clone(), serde_json::Value::Bool(false));
            let handler = self.engine.handler(expr.base())?;
            let body = handler.build_schema(self, expr.args(), &canonical)?;
            self.definitions.insert(canonical.clone(), body);
        }
        Ok(json!({ "$ref": format!("#/definitions/{canonical}") }))
    }

    /// The fragment for a union of alternatives: the sole alternative
    /// inline, or `anyOf` over all of them in declaration order.
    pub fn union_fragment(&mut self, exprs: &[TypeExpr]) -> Result<serde_json::Value, ExpandError> {
        if let [single] = exprs {
            return self.reference(single);
        }
        let options = exprs
            .iter()
            .map(|expr| self.reference(expr))
            .collect::<Result<Vec<_>, ExpandError>>()?;
        Ok(json!({ "anyOf": options }))
    }

    /// Assemble the final document around the root fragment.
    pub(crate) fn finish(self, root: serde_json::Value) -> serde_json::Value {
        let mut document = serde_json::Map::new();
        document.insert(
            "$schema".to_owned(),
            "https://json-schema.org/draft/2020-12/schema".into(),
        );
        if !self.definitions.is_empty() {
            document.insert("definitions".to_owned(), serde_json::Value::Object(self.definitions));
        }
        if let serde_json::Value::Object(fields) = root {
            document.extend(fields);
        }
        serde_json::Value::Object(document)
    }
}
