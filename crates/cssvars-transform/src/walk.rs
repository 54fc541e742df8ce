//! Declaration-list traversal.
//!
//! Visits every declaration list in a rule tree: style rules, rules nested in
//! conditional groups (recursively), keyframe steps and font faces. The visitor
//! gets the list mutably and may insert or remove entries.

use cssvars_parser::ast::{Declaration, Rule};
use std::fmt;

/// The node that owns a visited declaration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner<'a> {
    Style { selectors: &'a [String] },
    Keyframe { ident: &'a str, selectors: &'a [String] },
    FontFace,
}

impl fmt::Display for Owner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Style { selectors } => write!(f, "{}", selectors.join(",")),
            Owner::Keyframe { ident, selectors } => {
                write!(f, "@keyframes {ident} {}", selectors.join(","))
            }
            Owner::FontFace => write!(f, "@font-face"),
        }
    }
}

/// Invoke `visitor` once per declaration list under `rules`, in document order.
pub fn walk_declarations<F>(rules: &mut [Rule], visitor: &mut F)
where
    F: FnMut(&mut Vec<Declaration>, Owner<'_>),
{
    for rule in rules {
        match rule {
            Rule::Style(style) => {
                visitor(
                    &mut style.declarations,
                    Owner::Style {
                        selectors: &style.selectors,
                    },
                );
            }
            Rule::Container(container) => walk_declarations(&mut container.rules, visitor),
            Rule::Keyframes(keyframes) => {
                for keyframe in &mut keyframes.keyframes {
                    visitor(
                        &mut keyframe.declarations,
                        Owner::Keyframe {
                            ident: &keyframes.ident,
                            selectors: &keyframe.selectors,
                        },
                    );
                }
            }
            Rule::FontFace(font_face) => visitor(&mut font_face.declarations, Owner::FontFace),
            Rule::Comment(_) | Rule::Other(_) => {}
        }
    }
}
