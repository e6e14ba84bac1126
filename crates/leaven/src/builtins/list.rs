//! The builtin `list<T>` handler.

use serde_json::json;

use leaven_expr::TypeExpr;
use leaven_value::{Value, VisitorRef};

use crate::engine::Engine;
use crate::errors::ExpandError;
use crate::handler::Handler;
use crate::path::Path;
use crate::schema::SchemaBuilder;

/// Expands list-shaped input into a list, with every element expanded
/// into the element type. `list` without an argument takes any elements.
pub struct ListHandler {
    params: Vec<String>,
}

impl ListHandler {
    pub fn new() -> Self {
        ListHandler { params: vec!["T".to_owned()] }
    }
}

fn element(generics: &[TypeExpr]) -> Option<Option<&TypeExpr>> {
    match generics {
        [] => Some(None),
        [element] => Some(Some(element)),
        _ => None,
    }
}

impl Default for ListHandler {
    fn default() -> Self {
        ListHandler::new()
    }
}

impl Handler for ListHandler {
    fn name(&self) -> &str {
        "list"
    }

    fn generic_params(&self) -> &[String] {
        &self.params
    }

    fn accepts_arity(&self, count: usize) -> bool {
        count <= 1
    }

    fn validate(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        _path: &Path,
    ) -> bool {
        let Some(element) = element(generics) else { return false };
        visitor.is_list()
            && element.map_or(true, |element| {
                (0..visitor.length()).all(|index| {
                    engine.validate_expr(element, &visitor.enter_array(index), &Path::root())
                })
            })
    }

    fn expand(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        _path: &Path,
    ) -> Result<Value, ExpandError> {
        let Some(element) = element(generics) else {
            return Err(ExpandError::no_match("list", "expected at most one element type"));
        };
        if !visitor.is_list() {
            return Err(ExpandError::no_match(
                "list",
                format!("input of type {} is not a list", visitor.value().type_name()),
            ));
        }
        let items = (0..visitor.length())
            .map(|index| {
                let child = visitor.enter_array(index);
                match element {
                    Some(element) => engine.expand_expr(element, &child, &Path::root()),
                    None => Ok(child.value()),
                }
            })
            .collect::<Result<Vec<_>, ExpandError>>()?;
        Ok(Value::list(items))
    }

    fn build_schema(
        &self,
        builder: &mut SchemaBuilder<'_>,
        generics: &[TypeExpr],
        _definition_name: &str,
    ) -> Result<serde_json::Value, ExpandError> {
        let Some(element) = element(generics) else {
            return Err(ExpandError::format("list", "expected at most one element type"));
        };
        Ok(match element {
            Some(element) => {
                let items = builder.reference(element)?;
                json!({ "type": "array", "items": items })
            }
            None => json!({ "type": "array" }),
        })
    }
}
