//! Transform configuration.

use crate::VariableMap;
use cssvars_parser::ast::CUSTOM_PROPERTY_PREFIX;
use cssvars_parser::Format;
use serde::{Deserialize, Serialize};

/// Options recognized by [`transform`](crate::transform) and friends.
///
/// Deserializes from camelCase keys; every key is optional:
///
/// ```
/// let options: cssvars_transform::Options =
///     serde_json::from_str(r#"{ "preserveOriginals": false }"#).unwrap();
/// assert!(options.only_variables);
/// assert!(!options.preserve_originals);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Prune rules and declarations unrelated to custom properties.
    pub only_variables: bool,

    /// Keep definitions and `var()` declarations next to their resolved copies.
    pub preserve_originals: bool,

    /// Caller-supplied values. Keys may omit the `--` prefix; these always win.
    pub override_variables: VariableMap,

    /// Flatten `calc()` nested inside `calc()` after substitution.
    pub fix_nested_calc: bool,

    /// Serialize with indentation instead of the compact layout.
    pub pretty: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            only_variables: true,
            preserve_originals: true,
            override_variables: VariableMap::new(),
            fix_nested_calc: true,
            pretty: false,
        }
    }
}

impl Options {
    pub fn format(&self) -> Format {
        if self.pretty {
            Format::Pretty
        } else {
            Format::Compact
        }
    }
}

/// Normalize a caller-supplied variable name to exactly one `--` prefix.
pub fn normalize_name(name: &str) -> String {
    format!("{CUSTOM_PROPERTY_PREFIX}{}", name.trim().trim_start_matches('-'))
}
