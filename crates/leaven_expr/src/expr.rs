//! The parsed type-expression tree and its canonical form.

use std::fmt;

use rustc_hash::FxHashMap;

/// Mapping from type-variable name (e.g. `"T"`) to the concrete expression
/// bound to it, scoped to one unit's resolution.
///
/// Created fresh per outer call, propagated unchanged into nested
/// generic-parameter positions, never mutated after creation.
pub type Bindings = FxHashMap<String, TypeExpr>;

/// A parsed type expression: a base name plus ordered generic arguments.
///
/// The canonical string form (`canonical()` / `Display`) is the identity
/// key used for cycle detection, handler caching, and schema definitions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    base: String,
    args: Vec<TypeExpr>,
}

impl TypeExpr {
    /// Build an expression from parts.
    pub fn new(base: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr { base: base.into(), args }
    }

    /// An expression with no generic arguments.
    pub fn simple(base: impl Into<String>) -> Self {
        TypeExpr::new(base, Vec::new())
    }

    /// The base type name, without generic arguments.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The ordered generic arguments.
    pub fn args(&self) -> &[TypeExpr] {
        &self.args
    }

    /// The canonical, fully-substituted text form, e.g. `map<string,int>`.
    ///
    /// Unique per (base, resolved args) combination; no whitespace.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Replace bare identifiers bound in `bindings`, recursing into
    /// generic arguments.
    ///
    /// Only an identifier with no arguments of its own is a variable
    /// occurrence; `T<int>` never substitutes its base. Bound expressions
    /// are already concrete and are inserted as-is.
    pub fn substitute(&self, bindings: &Bindings) -> TypeExpr {
        if self.args.is_empty() {
            if let Some(bound) = bindings.get(&self.base) {
                return bound.clone();
            }
            return self.clone();
        }

        TypeExpr {
            base: self.base.clone(),
            args: self.args.iter().map(|arg| arg.substitute(bindings)).collect(),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_round_trip() {
        let expr = TypeExpr::new(
            "map",
            vec![
                TypeExpr::simple("string"),
                TypeExpr::new("list", vec![TypeExpr::simple("int")]),
            ],
        );
        assert_eq!(expr.canonical(), "map<string,list<int>>");
    }

    #[test]
    fn substitute_bare_variable() {
        let mut bindings = Bindings::default();
        bindings.insert("T".to_owned(), TypeExpr::simple("int"));

        let expr = TypeExpr::new("list", vec![TypeExpr::simple("T")]);
        assert_eq!(expr.substitute(&bindings).canonical(), "list<int>");
    }

    #[test]
    fn substitute_leaves_parameterized_base_alone() {
        let mut bindings = Bindings::default();
        bindings.insert("T".to_owned(), TypeExpr::simple("int"));

        let expr = TypeExpr::new("T", vec![TypeExpr::simple("string")]);
        assert_eq!(expr.substitute(&bindings).canonical(), "T<string>");
    }
}
