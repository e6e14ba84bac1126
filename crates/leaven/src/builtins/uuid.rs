//! The builtin `uuid` handler.

use serde_json::json;
use uuid::Uuid;

use leaven_expr::TypeExpr;
use leaven_value::{Value, VisitorRef};

use crate::engine::Engine;
use crate::errors::ExpandError;
use crate::handler::Handler;
use crate::path::Path;
use crate::schema::SchemaBuilder;

/// Expands a hyphenated UUID string into a parsed UUID value.
#[derive(Default)]
pub struct UuidHandler;

impl UuidHandler {
    pub fn new() -> Self {
        UuidHandler
    }
}

fn parse(visitor: &VisitorRef) -> Option<Uuid> {
    let value = visitor.value();
    Uuid::parse_str(value.as_str()?).ok()
}

impl Handler for UuidHandler {
    fn name(&self) -> &str {
        "uuid"
    }

    fn validate(
        &self,
        _engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        _path: &Path,
    ) -> bool {
        generics.is_empty() && visitor.is_string() && parse(visitor).is_some()
    }

    fn expand(
        &self,
        _engine: &Engine,
        visitor: &VisitorRef,
        _generics: &[TypeExpr],
        _path: &Path,
    ) -> Result<Value, ExpandError> {
        parse(visitor)
            .map(Value::Uuid)
            .ok_or_else(|| ExpandError::format("uuid", "input is not a UUID string"))
    }

    fn build_schema(
        &self,
        _builder: &mut SchemaBuilder<'_>,
        _generics: &[TypeExpr],
        _definition_name: &str,
    ) -> Result<serde_json::Value, ExpandError> {
        Ok(json!({ "type": "string", "format": "uuid" }))
    }
}
