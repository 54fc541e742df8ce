//! Rule filter.
//!
//! Prunes everything that cannot take part in custom-property resolution, so
//! the output only carries the static copies a consumer actually needs.

use cssvars_parser::ast::{Declaration, Rule};

/// Keep only rules and declarations that define or reference custom properties.
///
/// - style rules keep their definitions and reference sites, and are dropped when
///   none remain;
/// - font faces and keyframes are kept whole or dropped whole;
/// - conditional groups are filtered recursively and kept while a non-comment
///   rule survives inside them;
/// - comments and unrecognized at-rules pass through.
///
/// Returns the number of rules removed.
pub fn filter_rules(rules: &mut Vec<Rule>) -> usize {
    let before = rules.len();
    let mut removed = 0;

    rules.retain_mut(|rule| match rule {
        Rule::Style(style) => {
            style.declarations.retain(Declaration::involves_variables);
            !style.declarations.is_empty()
        }
        Rule::FontFace(font_face) => font_face
            .declarations
            .iter()
            .any(Declaration::involves_variables),
        Rule::Keyframes(keyframes) => keyframes
            .keyframes
            .iter()
            .flat_map(|keyframe| &keyframe.declarations)
            .any(Declaration::involves_variables),
        Rule::Container(container) => {
            removed += filter_rules(&mut container.rules);
            container
                .rules
                .iter()
                .any(|nested| !matches!(nested, Rule::Comment(_)))
        }
        Rule::Comment(_) | Rule::Other(_) => true,
    });

    removed + before - rules.len()
}
