//! Variable collection.
//!
//! Builds the name → value map from `:root` definitions and caller overrides.
//! Runs to completion before any value is resolved, so a reference may appear
//! before its definition in source order.

use crate::options::normalize_name;
use crate::VariableMap;
use cssvars_parser::ast::{Declaration, Rule, StyleRule, Stylesheet};

/// Collect custom property definitions.
///
/// Only top-level rules whose selector list is exactly `:root` are variable
/// scopes. Later definitions of a name overwrite earlier ones; overrides are
/// merged last and always win.
///
/// Without `preserve`, consumed definitions are removed from their rules, and a
/// `:root` rule left empty by that removal is dropped. With `preserve`, any
/// overrides are appended as a trailing `:root` rule so they stay visible to
/// live custom-property evaluation downstream.
pub fn collect_variables(
    stylesheet: &mut Stylesheet,
    overrides: &VariableMap,
    preserve: bool,
) -> VariableMap {
    let mut variables = VariableMap::new();

    stylesheet.rules.retain_mut(|rule| {
        let Rule::Style(style) = rule else {
            return true;
        };
        if !style.is_root_scope() {
            return true;
        }

        let mut consumed = Vec::new();
        for (index, declaration) in style.declarations.iter().enumerate() {
            if declaration.is_definition() {
                variables.insert(declaration.property.clone(), declaration.value.clone());
                consumed.push(index);
            }
        }

        if preserve || consumed.is_empty() {
            return true;
        }
        // Highest index first so earlier indices stay valid.
        for index in consumed.into_iter().rev() {
            style.declarations.remove(index);
        }
        !style.declarations.is_empty()
    });

    log::debug!("collected {} root variable(s)", variables.len());

    if overrides.is_empty() {
        return variables;
    }

    let mut declarations = Vec::with_capacity(overrides.len());
    for (name, value) in overrides {
        let name = normalize_name(name);
        declarations.push(Declaration::new(name.clone(), value.clone()));
        variables.insert(name, value.clone());
    }
    log::debug!("merged {} override variable(s)", declarations.len());

    if preserve {
        stylesheet.rules.push(Rule::Style(StyleRule {
            selectors: vec![":root".to_string()],
            declarations,
        }));
    }

    variables
}
