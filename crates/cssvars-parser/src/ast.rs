//! Rule tree for CSS stylesheets.
//!
//! Declaration values are kept as opaque source text. Only the rule structure
//! is modeled, which is all the custom-property passes need.

/// Prefix shared by every custom property name.
pub const CUSTOM_PROPERTY_PREFIX: &str = "--";

/// The variable function token, including its opening parenthesis.
pub const VAR_FUNCTION: &str = "var(";

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

/// A node in the rule tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `selector, selector { declarations }`
    Style(StyleRule),

    /// A conditional group (`@media`, `@supports`, …) holding nested rules.
    Container(ContainerRule),

    /// `@keyframes name { step { declarations } … }`
    Keyframes(KeyframesRule),

    /// `@font-face { declarations }`
    FontFace(FontFaceRule),

    /// `/* comment */`, content without delimiters.
    Comment(String),

    /// Any other at-rule, passed through untouched.
    Other(OtherRule),
}

/// A declaration-bearing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

/// A conditional group rule. `name` is the at-keyword without `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRule {
    pub name: String,
    pub condition: String,
    pub rules: Vec<Rule>,
}

/// A keyframes rule. `name` is the at-keyword (vendor prefix included),
/// `ident` the animation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyframesRule {
    pub name: String,
    pub ident: String,
    pub keyframes: Vec<Keyframe>,
}

/// One step inside a keyframes rule (`from`, `50%`, `0%, 100%`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyframe {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontFaceRule {
    pub declarations: Vec<Declaration>,
}

/// An unrecognized at-rule. `block` holds the raw text between the braces,
/// or `None` for statement at-rules such as `@import`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherRule {
    pub name: String,
    pub prelude: String,
    pub block: Option<String>,
}

/// `property: value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// True when this declaration defines a custom property (`--name: …`).
    pub fn is_definition(&self) -> bool {
        self.property.starts_with(CUSTOM_PROPERTY_PREFIX)
    }

    /// True when the value calls `var(…)`.
    pub fn is_reference(&self) -> bool {
        find_var_function(&self.value).is_some()
    }

    /// Definitions and reference sites are the only declarations that matter
    /// to custom-property resolution.
    pub fn involves_variables(&self) -> bool {
        self.is_definition() || self.is_reference()
    }
}

impl StyleRule {
    /// True for a rule whose selector list is exactly `:root`.
    pub fn is_root_scope(&self) -> bool {
        matches!(self.selectors.as_slice(), [only] if only == ":root")
    }
}

/// Byte offset of the first `var(` token in `value`.
///
/// A match preceded by an identifier character (`somevar(`) is not the
/// variable function and is skipped.
pub fn find_var_function(value: &str) -> Option<usize> {
    value.match_indices(VAR_FUNCTION).map(|(index, _)| index).find(|&index| {
        value[..index]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '-' || c == '_'))
    })
}
