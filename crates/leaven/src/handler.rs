//! The pluggable type-handler contract.

use leaven_expr::TypeExpr;
use leaven_value::{Value, VisitorRef};

use crate::engine::Engine;
use crate::errors::ExpandError;
use crate::path::Path;
use crate::schema::SchemaBuilder;

/// One handler per unit base name: validate input against the unit,
/// expand input into a value, and describe the unit as a schema fragment.
///
/// Handlers hold no per-call state; all of it travels in the visitor,
/// generic arguments, and path, so a handler is safe to share across
/// concurrent calls. Generic arguments arrive already resolved and are
/// threaded unchanged into every recursive call, positionally bound to
/// the names in [`Handler::generic_params`].
pub trait Handler: Send + Sync {
    /// The unit base name this handler answers for.
    fn name(&self) -> &str;

    /// Ordered type-variable names declared by the unit, e.g. `["T"]`.
    fn generic_params(&self) -> &[String] {
        &[]
    }

    /// Whether the handler answers for `count` generic arguments. The
    /// builtin map overrides this to take either a value type alone or a
    /// key and value pair.
    fn accepts_arity(&self, count: usize) -> bool {
        count == self.generic_params().len()
    }

    /// Pure predicate: can this input expand into the unit?
    ///
    /// Never fails and has no side effects; probing a branch that will
    /// not be chosen must be harmless.
    fn validate(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        path: &Path,
    ) -> bool;

    /// Expand the input into a fully-constructed value.
    fn expand(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        path: &Path,
    ) -> Result<Value, ExpandError>;

    /// Combined validate-and-expand; the engine prefers this form so a
    /// handler can avoid matching the input twice.
    fn validate_expand(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        path: &Path,
    ) -> Result<Value, ExpandError> {
        if self.validate(engine, visitor, generics, path) {
            self.expand(engine, visitor, generics, path)
        } else {
            Err(ExpandError::no_match(
                self.name(),
                format!("input of type {} did not match", visitor.value().type_name()),
            ))
        }
    }

    /// Build the schema fragment for this unit. Pure and memo-friendly;
    /// recursive references go through the builder.
    fn build_schema(
        &self,
        builder: &mut SchemaBuilder<'_>,
        generics: &[TypeExpr],
        definition_name: &str,
    ) -> Result<serde_json::Value, ExpandError>;
}
