//! The builtin `timestamp` handler (aliased as `datetime`).

use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use leaven_expr::TypeExpr;
use leaven_value::{Value, VisitorRef};

use crate::engine::Engine;
use crate::errors::ExpandError;
use crate::handler::Handler;
use crate::path::Path;
use crate::schema::SchemaBuilder;

/// Expands an RFC 3339 string into a timestamp value.
pub struct TimestampHandler {
    name: &'static str,
}

impl TimestampHandler {
    /// Both `timestamp` and its `datetime` alias share this
    /// implementation; only the registered name differs.
    pub fn named(name: &'static str) -> Self {
        TimestampHandler { name }
    }
}

fn parse(visitor: &VisitorRef) -> Option<OffsetDateTime> {
    let value = visitor.value();
    let text = value.as_str()?;
    OffsetDateTime::parse(text, &Rfc3339).ok()
}

impl Handler for TimestampHandler {
    fn name(&self) -> &str {
        self.name
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
        parse(visitor).map(Value::Timestamp).ok_or_else(|| {
            ExpandError::format(self.name, "input is not an RFC 3339 date-time string")
        })
    }

    fn build_schema(
        &self,
        _builder: &mut SchemaBuilder<'_>,
        _generics: &[TypeExpr],
        _definition_name: &str,
    ) -> Result<serde_json::Value, ExpandError> {
        Ok(json!({ "type": "string", "format": "date-time" }))
    }
}
