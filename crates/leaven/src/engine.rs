//! The expansion engine: unit registry, handler cache, and the recursive
//! validate/expand entry points.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use leaven_expr::{Bindings, TypeExpr};
use leaven_value::{JsonVisitor, Value, ValueVisitor, VisitorRef};

use crate::builtins;
use crate::casing::Casing;
use crate::compile::{self, UnionMatcher};
use crate::errors::ExpandError;
use crate::handler::Handler;
use crate::path::Path;
use crate::primitive::Primitive;
use crate::schema::SchemaBuilder;
use crate::unit::UnitSpec;

/// Lazy source of unit metadata, consulted when a base name is not
/// registered up front. Lookups are cached, so a catalog is asked about
/// each name at most once per engine.
pub trait UnitCatalog: Send + Sync {
    fn lookup(&self, name: &str) -> Option<UnitSpec>;
}

/// The outcome of one guarded expansion probe.
///
/// `Unsatisfied` covers both "input did not match" and "the cycle guard
/// cut the branch"; either way the caller moves on to its next
/// alternative, and only the outermost request turns it into an error.
pub(crate) enum Expanded {
    Value(Value),
    Unsatisfied,
}

/// The expansion engine.
///
/// Immutable after build apart from its caches, so it is freely shared
/// behind an `Arc` across threads. Handlers compile from unit metadata at
/// most once per base name; the compiled strategy is reused for every
/// generic instantiation of that unit.
pub struct Engine {
    casing: Option<Casing>,
    catalog: Option<Arc<dyn UnitCatalog>>,
    units: RwLock<FxHashMap<String, Arc<UnitSpec>>>,
    registered: RwLock<FxHashMap<String, Arc<dyn Handler>>>,
    compiled: RwLock<FxHashMap<String, Arc<dyn Handler>>>,
    compile_lock: Mutex<()>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The engine-wide casing convention, if one is set.
    pub fn casing(&self) -> Option<Casing> {
        self.casing
    }

    /// Register a hand-written handler at runtime, overriding any compiled
    /// strategy for the same base name.
    pub fn register_handler(&self, handler: Arc<dyn Handler>) {
        let name = handler.name().to_owned();
        debug!(unit = %name, "registering handler");
        self.registered.write().insert(name, handler);
    }

    /// Expand a native value into `types` (a `|`-separated union).
    pub fn expand(&self, types: &str, value: &Value) -> Result<Value, ExpandError> {
        self.expand_visitor(types, &ValueVisitor::new(value.clone()))
    }

    /// Expand a JSON document into `types` without converting the whole
    /// tree up front.
    pub fn expand_json(
        &self,
        types: &str,
        document: &serde_json::Value,
    ) -> Result<Value, ExpandError> {
        self.expand_visitor(types, &JsonVisitor::new(document.clone()))
    }

    /// Expand whatever input a visitor exposes into `types`.
    pub fn expand_visitor(&self, types: &str, visitor: &VisitorRef) -> Result<Value, ExpandError> {
        self.expand_matched(types, &self.matcher(types, &Bindings::default())?, visitor)
    }

    /// Expand with caller-supplied type-variable bindings resolved into
    /// `types` before matching.
    pub fn expand_with(
        &self,
        types: &str,
        bindings: &Bindings,
        value: &Value,
    ) -> Result<Value, ExpandError> {
        let visitor = ValueVisitor::new(value.clone());
        self.expand_matched(types, &self.matcher(types, bindings)?, &visitor)
    }

    /// Expand into a base type with pre-parsed generic arguments;
    /// equivalent to expanding into `base<a,b,...>` spelled out.
    pub fn expand_into(
        &self,
        base: &str,
        generics: &[&str],
        value: &Value,
    ) -> Result<Value, ExpandError> {
        let args = generics
            .iter()
            .map(|text| leaven_expr::parse(text, &Bindings::default()))
            .collect::<Result<Vec<_>, _>>()?;
        let expr = TypeExpr::new(base, args);
        trace!(types = %expr, "expand");
        self.expand_expr(&expr, &ValueVisitor::new(value.clone()), &Path::root())
    }

    /// Whether a native value would expand into `types`.
    pub fn validate(&self, types: &str, value: &Value) -> Result<bool, ExpandError> {
        self.validate_visitor(types, &ValueVisitor::new(value.clone()))
    }

    /// Whether a JSON document would expand into `types`.
    pub fn validate_json(
        &self,
        types: &str,
        document: &serde_json::Value,
    ) -> Result<bool, ExpandError> {
        self.validate_visitor(types, &JsonVisitor::new(document.clone()))
    }

    /// Whether a visitor's input would expand into `types`. Errs only on a
    /// malformed type string; an unknown type merely answers false.
    pub fn validate_visitor(&self, types: &str, visitor: &VisitorRef) -> Result<bool, ExpandError> {
        trace!(%types, "validate");
        let matcher = self.matcher(types, &Bindings::default())?;
        Ok(matcher.validate(self, visitor, &Path::root()))
    }

    /// Whether a native value would expand into `types` with the given
    /// type-variable bindings resolved first.
    pub fn validate_with(
        &self,
        types: &str,
        bindings: &Bindings,
        value: &Value,
    ) -> Result<bool, ExpandError> {
        let visitor = ValueVisitor::new(value.clone());
        let matcher = self.matcher(types, bindings)?;
        Ok(matcher.validate(self, &visitor, &Path::root()))
    }

    /// Whether every alternative in `types` resolves to a known primitive,
    /// handler, or compilable unit, recursively through generic arguments.
    pub fn has_support(&self, types: &str) -> bool {
        let Ok(exprs) = leaven_expr::parse_union(types, &Bindings::default()) else {
            return false;
        };
        let mut in_progress = Vec::new();
        exprs.iter().all(|expr| self.has_support_expr(expr, &[], &mut in_progress))
    }

    /// Derive the JSON Schema for `types`, with every referenced unit
    /// collected under `definitions`.
    pub fn json_schema(&self, types: &str) -> Result<serde_json::Value, ExpandError> {
        let exprs = leaven_expr::parse_union(types, &Bindings::default())?;
        let mut builder = SchemaBuilder::new(self);
        let root = builder.union_fragment(&exprs)?;
        Ok(builder.finish(root))
    }

    /// Validate one already-parsed type expression at one input position.
    ///
    /// This is the recursion entry handlers use for their field and
    /// element probes. A cycle on `path` answers false; an unknown base
    /// name answers false with a warning.
    pub fn validate_expr(&self, expr: &TypeExpr, visitor: &VisitorRef, path: &Path) -> bool {
        if let Some(primitive) = Primitive::from_name(expr.base()) {
            return primitive.check(visitor.as_ref());
        }
        let canonical = expr.canonical();
        if path.contains(&canonical) {
            trace!(%canonical, "cycle guard cut validation branch");
            return false;
        }
        let handler = match self.handler(expr.base()) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(%canonical, error = %err, "validation against unresolvable type");
                return false;
            }
        };
        handler.validate(self, visitor, expr.args(), &path.with(&canonical))
    }

    /// Expand one already-parsed type expression at one input position.
    pub fn expand_expr(
        &self,
        expr: &TypeExpr,
        visitor: &VisitorRef,
        path: &Path,
    ) -> Result<Value, ExpandError> {
        match self.expand_guarded(expr, visitor, path)? {
            Expanded::Value(value) => Ok(value),
            Expanded::Unsatisfied => Err(ExpandError::no_match(
                expr.canonical(),
                format!("input of type {} did not match", visitor.value().type_name()),
            )),
        }
    }

    /// Like [`Engine::expand_expr`] but reports a non-matching or
    /// cycle-cut input as `Unsatisfied` instead of an error, so union
    /// probes can fall through to their next alternative.
    pub(crate) fn expand_guarded(
        &self,
        expr: &TypeExpr,
        visitor: &VisitorRef,
        path: &Path,
    ) -> Result<Expanded, ExpandError> {
        if let Some(primitive) = Primitive::from_name(expr.base()) {
            return Ok(if primitive.check(visitor.as_ref()) {
                Expanded::Value(visitor.value())
            } else {
                Expanded::Unsatisfied
            });
        }
        let canonical = expr.canonical();
        if path.contains(&canonical) {
            trace!(%canonical, "cycle guard cut expansion branch");
            return Ok(Expanded::Unsatisfied);
        }
        let handler = self.handler(expr.base())?;
        match handler.validate_expand(self, visitor, expr.args(), &path.with(&canonical)) {
            Ok(value) => Ok(Expanded::Value(value)),
            Err(ExpandError::NoMatch { .. }) => Ok(Expanded::Unsatisfied),
            Err(err) => Err(err),
        }
    }

    /// The handler for a base name: registered handlers win, then the
    /// compiled cache, then compilation from unit metadata.
    pub fn handler(&self, name: &str) -> Result<Arc<dyn Handler>, ExpandError> {
        if let Some(handler) = self.registered.read().get(name) {
            return Ok(handler.clone());
        }
        if let Some(handler) = self.compiled.read().get(name) {
            return Ok(handler.clone());
        }
        let spec = self.spec(name).ok_or_else(|| {
            ExpandError::unsupported(name, vec!["no unit or handler registered".to_owned()])
        })?;

        // Serialize compilation so each unit compiles at most once, and
        // recheck under the lock. Recursive support checks during
        // compilation go through `spec`/`has_support_expr`, not through
        // `handler`, so this does not re-enter.
        let _guard = self.compile_lock.lock();
        if let Some(handler) = self.compiled.read().get(name) {
            return Ok(handler.clone());
        }
        debug!(unit = %name, "compiling handler");
        let handler: Arc<dyn Handler> = Arc::new(compile::compile(self, &spec)?);
        self.compiled.write().insert(name.to_owned(), handler.clone());
        Ok(handler)
    }

    /// The unit metadata for a base name, consulting the catalog on a
    /// registry miss and caching its answer.
    pub(crate) fn spec(&self, name: &str) -> Option<Arc<UnitSpec>> {
        if let Some(spec) = self.units.read().get(name) {
            return Some(spec.clone());
        }
        let catalog = self.catalog.as_ref()?;
        let spec = Arc::new(catalog.lookup(name)?);
        self.units.write().insert(name.to_owned(), spec.clone());
        Some(spec)
    }

    /// Recursive support check for one expression. `allowed_vars` holds
    /// the generic variable names of the unit under compilation;
    /// `in_progress` breaks recursion through self-referential units.
    pub(crate) fn has_support_expr(
        &self,
        expr: &TypeExpr,
        allowed_vars: &[String],
        in_progress: &mut Vec<String>,
    ) -> bool {
        if Primitive::from_name(expr.base()).is_some() {
            return expr.args().is_empty();
        }
        if allowed_vars.iter().any(|var| var == expr.base()) {
            return expr.args().is_empty();
        }
        if !expr.args().iter().all(|arg| self.has_support_expr(arg, allowed_vars, in_progress)) {
            return false;
        }

        if let Some(handler) = self.registered.read().get(expr.base()) {
            return handler.accepts_arity(expr.args().len());
        }
        let arity = if let Some(spec) = self.spec(expr.base()) {
            let name = spec.name().to_owned();
            if in_progress.contains(&name) {
                return true;
            }
            in_progress.push(name);
            let supported = spec_accepts_supported(self, &spec, in_progress);
            in_progress.pop();
            if !supported {
                return false;
            }
            spec.generics().len()
        } else {
            return false;
        };
        expr.args().len() == arity
    }

    fn matcher(&self, types: &str, bindings: &Bindings) -> Result<UnionMatcher, ExpandError> {
        let exprs = leaven_expr::parse_union(types, bindings)?;
        Ok(UnionMatcher::new(exprs))
    }

    fn expand_matched(
        &self,
        types: &str,
        matcher: &UnionMatcher,
        visitor: &VisitorRef,
    ) -> Result<Value, ExpandError> {
        trace!(%types, "expand");
        match matcher.expand(self, visitor, &Path::root())? {
            Expanded::Value(value) => Ok(value),
            Expanded::Unsatisfied => Err(ExpandError::no_match(
                types,
                format!("input of type {} matched no alternative", visitor.value().type_name()),
            )),
        }
    }
}

/// Whether every type a unit's conversions, constructor, and setters
/// accept is itself supported (its own generic variables allowed).
fn spec_accepts_supported(
    engine: &Engine,
    spec: &UnitSpec,
    in_progress: &mut Vec<String>,
) -> bool {
    compile::accepted_unions(spec).all(|(_, accepts)| {
        match leaven_expr::parse_union(accepts, &Bindings::default()) {
            Ok(exprs) => exprs
                .iter()
                .all(|expr| engine.has_support_expr(expr, spec.generics(), in_progress)),
            Err(_) => false,
        }
    })
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    casing: Option<Casing>,
    catalog: Option<Arc<dyn UnitCatalog>>,
    units: Vec<UnitSpec>,
    handlers: Vec<Arc<dyn Handler>>,
    skip_default_handlers: bool,
}

impl EngineBuilder {
    /// Set the engine-wide field-name casing convention.
    pub fn casing(mut self, casing: Casing) -> Self {
        self.casing = Some(casing);
        self
    }

    /// Register a unit's construction metadata.
    pub fn unit(mut self, spec: UnitSpec) -> Self {
        self.units.push(spec);
        self
    }

    /// Register a hand-written handler.
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Attach a lazy unit catalog for names not registered up front.
    pub fn catalog(mut self, catalog: Arc<dyn UnitCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Leave out the builtin `list`, `map`, `timestamp`, and `uuid`
    /// handlers.
    pub fn without_default_handlers(mut self) -> Self {
        self.skip_default_handlers = true;
        self
    }

    pub fn build(self) -> Engine {
        let mut registered: FxHashMap<String, Arc<dyn Handler>> = FxHashMap::default();
        if !self.skip_default_handlers {
            builtins::register_defaults(&mut registered);
        }
        for handler in self.handlers {
            registered.insert(handler.name().to_owned(), handler);
        }
        let units = self
            .units
            .into_iter()
            .map(|spec| (spec.name().to_owned(), Arc::new(spec)))
            .collect();
        Engine {
            casing: self.casing,
            catalog: self.catalog,
            units: RwLock::new(units),
            registered: RwLock::new(registered),
            compiled: RwLock::new(FxHashMap::default()),
            compile_lock: Mutex::new(()),
        }
    }
}
