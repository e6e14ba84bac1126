//! Leaven expands loosely-typed input (JSON documents, native value
//! trees) into structured values, driven by declarative type expressions
//! like `list<Service<int|string>>`.
//!
//! The pieces:
//!
//! - [`Engine`] holds registered units and handlers and answers
//!   [`Engine::validate`], [`Engine::expand`], and
//!   [`Engine::json_schema`] for any type-expression string.
//! - [`UnitSpec`] declares how one named unit is constructed: conversion
//!   functions tried in order, then a constructor with named fields plus
//!   setters, matched all-or-nothing against object input.
//! - [`Handler`] is the escape hatch: a hand-written strategy registered
//!   under a base name, with the builtin `list`, `map`, `timestamp`, and
//!   `uuid` handlers as examples.
//!
//! Validation is a pure probe and expansion replays the same match, so
//! the two always agree. Self-referential types are safe: each input
//! position tracks the chain of type names being attempted against it and
//! cuts any branch that revisits one.

pub mod builtins;
mod casing;
mod compile;
mod engine;
mod errors;
mod handler;
mod path;
mod primitive;
mod schema;
mod unit;

pub use casing::{Casing, UnknownCasing};
pub use engine::{Engine, EngineBuilder, UnitCatalog};
pub use errors::ExpandError;
pub use handler::Handler;
pub use path::Path;
pub use primitive::Primitive;
pub use schema::SchemaBuilder;
pub use unit::{
    ApplyFn, BuildFn, ConstructorSpec, ConversionSpec, ConvertFn, FieldSet, FieldSpec, SetterSpec,
    UnitSpec, UnitSpecBuilder,
};

pub use leaven_expr::{Bindings, ParseError, TypeExpr};
pub use leaven_value::{Entries, JsonVisitor, Key, Record, Value, ValueVisitor, Visitor, VisitorRef};
