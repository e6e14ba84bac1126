//! The field-name casing collaborator.
//!
//! A pure `(name, convention) -> name` transform. The engine applies it
//! when deriving the external key a declared field is looked up under;
//! explicit renames bypass it entirely.

use std::str::FromStr;

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToTitleCase, ToTrainCase, ToUpperCamelCase,
};
use thiserror::Error;

/// A naming convention for external field keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Casing {
    /// `camelCase`
    Camel,
    /// `PascalCase`
    Pascal,
    /// `snake_case`
    Snake,
    /// `kebab-case`
    Kebab,
    /// `MACRO_CASE`
    Macro,
    /// `COBOL-CASE`
    Cobol,
    /// `Train-Case`
    Train,
    /// `Title Case`
    Title,
}

/// An unrecognized casing spelling.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("no casing known by `{0}`")]
pub struct UnknownCasing(pub String);

impl Casing {
    /// Convert an internal field name to its external spelling.
    pub fn apply(self, name: &str) -> String {
        match self {
            Casing::Camel => name.to_lower_camel_case(),
            Casing::Pascal => name.to_upper_camel_case(),
            Casing::Snake => name.to_snake_case(),
            Casing::Kebab => name.to_kebab_case(),
            Casing::Macro => name.to_shouty_snake_case(),
            Casing::Cobol => name.to_shouty_kebab_case(),
            Casing::Train => name.to_train_case(),
            Casing::Title => name.to_title_case(),
        }
    }
}

impl FromStr for Casing {
    type Err = UnknownCasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camelCase" => Ok(Casing::Camel),
            "PascalCase" => Ok(Casing::Pascal),
            "snake_case" => Ok(Casing::Snake),
            "kebab-case" => Ok(Casing::Kebab),
            "MACRO_CASE" => Ok(Casing::Macro),
            "COBOL-CASE" => Ok(Casing::Cobol),
            "Train-Case" => Ok(Casing::Train),
            "Title Case" => Ok(Casing::Title),
            other => Err(UnknownCasing(other.to_owned())),
        }
    }
}
