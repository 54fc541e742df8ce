//! Value resolution.
//!
//! `var()` is treated as a textual pattern inside an opaque value string. Each
//! occurrence is replaced by the mapped value, or by its fallback when the name
//! is not defined, and substituted text is expanded again until no reference
//! remains.

use crate::options::Options;
use crate::walk::Owner;
use crate::{VariableMap, Warning};
use cssvars_parser::ast::{find_var_function, Declaration, VAR_FUNCTION};

/// Upper bound on the text substituted into one value. Definitions that
/// reference each other several times per value grow exponentially.
pub const MAX_SUBSTITUTED_BYTES: usize = 64 * 1024;

/// Resolve every `var()` reference in `value`.
///
/// Malformed or unresolvable references are reported through `on_warning` and
/// left as written; resolution always produces a best-effort string.
pub fn resolve_value(
    value: &str,
    variables: &VariableMap,
    on_warning: &mut dyn FnMut(Warning),
) -> String {
    let mut expansion = Expansion {
        variables,
        active: Vec::new(),
        budget: MAX_SUBSTITUTED_BYTES,
        exhausted: false,
        on_warning,
    };
    expansion.expand(value)
}

/// State of one `resolve_value` call.
struct Expansion<'a> {
    variables: &'a VariableMap,
    /// Names currently being expanded, innermost last.
    active: Vec<String>,
    /// Bytes of definition text that may still be substituted.
    budget: usize,
    exhausted: bool,
    on_warning: &'a mut dyn FnMut(Warning),
}

impl Expansion<'_> {
    fn expand(&mut self, value: &str) -> String {
        let Some(start) = find_var_function(value) else {
            return value.to_string();
        };

        let body_start = start + VAR_FUNCTION.len();
        let (body_end, end) = match closing_paren(value, body_start) {
            Some(close) => (close, close + 1),
            None => {
                self.warn(Warning::MissingClosingParen {
                    value: value.to_string(),
                });
                (value.len(), value.len())
            }
        };

        let literal = &value[start..end];
        let body = &value[body_start..body_end];

        let replacement = if body.trim().is_empty() {
            self.warn(Warning::EmptyName {
                value: value.to_string(),
            });
            literal.to_string()
        } else {
            let (name, fallback) = split_fallback(body);
            self.substitute(name, fallback, literal)
        };

        let tail = self.expand(&value[end..]);
        format!("{}{replacement}{tail}", &value[..start])
    }

    fn substitute(&mut self, name: &str, fallback: Option<&str>, literal: &str) -> String {
        if self.active.iter().any(|outer| outer == name) {
            self.warn(Warning::CircularReference {
                name: name.to_string(),
            });
            return match fallback {
                Some(fallback) => self.expand(fallback),
                None => literal.to_string(),
            };
        }

        // A defined name never consults its fallback, even when the value is empty.
        let variables = self.variables;
        if let Some(defined) = variables.get(name) {
            if defined.len() > self.budget {
                if !self.exhausted {
                    self.exhausted = true;
                    self.warn(Warning::ExpansionLimit {
                        name: name.to_string(),
                    });
                }
                return literal.to_string();
            }
            self.budget -= defined.len();

            self.active.push(name.to_string());
            let expanded = self.expand(defined);
            self.active.pop();
            return expanded;
        }

        match fallback {
            Some(fallback) => self.expand(fallback),
            None => {
                self.warn(Warning::Undefined {
                    name: name.to_string(),
                });
                literal.to_string()
            }
        }
    }

    fn warn(&mut self, warning: Warning) {
        (self.on_warning)(warning);
    }
}

/// Split a `var()` body into its name and the text after the first top-level comma.
fn split_fallback(body: &str) -> (&str, Option<&str>) {
    match top_level_comma(body) {
        Some(comma) => (body[..comma].trim(), Some(body[comma + 1..].trim())),
        None => (body.trim(), None),
    }
}

/// Index of the `)` balancing an already-open `(` before `from`.
fn closing_paren(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    scan_unquoted(text, from, |byte| match byte {
        b'(' => {
            depth += 1;
            false
        }
        b')' => {
            depth -= 1;
            depth == 0
        }
        _ => false,
    })
}

fn top_level_comma(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    scan_unquoted(text, 0, |byte| match byte {
        b'(' => {
            depth += 1;
            false
        }
        b')' => {
            depth = depth.saturating_sub(1);
            false
        }
        b',' => depth == 0,
        _ => false,
    })
}

/// Feed each byte outside quoted strings to `stop`; return the first index it accepts.
/// Delimiters are ASCII, so byte indices always land on char boundaries.
fn scan_unquoted<F>(text: &str, from: usize, mut stop: F) -> Option<usize>
where
    F: FnMut(u8) -> bool,
{
    let bytes = text.as_bytes();
    let mut quote = None;
    let mut escaped = false;

    for (index, &byte) in bytes.iter().enumerate().skip(from) {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == open {
                quote = None;
            }
            continue;
        }
        if byte == b'"' || byte == b'\'' {
            quote = Some(byte);
            continue;
        }
        if stop(byte) {
            return Some(index);
        }
    }
    None
}

// =========================================================================
// Nested calc()
// =========================================================================

const CALC_PREFIXES: &[&str] = &["-webkit-", "-moz-"];
const CALC_FUNCTION: &str = "calc(";

/// Rewrite `calc()` calls nested inside another `calc()` as plain parentheses:
/// `calc(1px + calc(2px * 3))` → `calc(1px + (2px * 3))`.
pub fn fix_nested_calc(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some((start, len)) = find_calc(rest) {
        let body_start = start + len;
        let Some(close) = closing_paren(rest, body_start) else {
            break;
        };
        out.push_str(&rest[..body_start]);
        out.push_str(&strip_calc(&rest[body_start..close]));
        out.push(')');
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

fn strip_calc(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some((start, len)) = find_calc(rest) {
        out.push_str(&rest[..start]);
        out.push('(');
        rest = &rest[start + len..];
    }
    out.push_str(rest);
    out
}

/// Start and length of the first `calc(` token, vendor prefix included.
fn find_calc(text: &str) -> Option<(usize, usize)> {
    text.match_indices(CALC_FUNCTION).find_map(|(index, _)| {
        let head = &text[..index];
        let prefix = CALC_PREFIXES
            .iter()
            .find(|prefix| head.ends_with(**prefix))
            .map_or(0, |prefix| prefix.len());
        let start = index - prefix;
        let standalone = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '-' || c == '_'));
        standalone.then_some((start, index + CALC_FUNCTION.len() - start))
    })
}

// =========================================================================
// Declaration lists
// =========================================================================

/// Resolve every reference site in one declaration list. Returns how many
/// declarations changed.
///
/// With `preserve_originals`, the resolved copy is inserted right after the
/// original and skipped by the cursor; otherwise the value is replaced in place.
/// A value that resolves to itself produces no copy.
pub fn resolve_declarations(
    declarations: &mut Vec<Declaration>,
    owner: Owner<'_>,
    variables: &VariableMap,
    options: &Options,
    on_warning: &mut dyn FnMut(Warning),
) -> usize {
    let mut changed = 0;
    let mut index = 0;

    while index < declarations.len() {
        if declarations[index].is_reference() {
            let original = &declarations[index];
            let mut resolved = resolve_value(&original.value, variables, on_warning);

            if resolved != original.value {
                if options.fix_nested_calc {
                    resolved = fix_nested_calc(&resolved);
                }
                log::trace!("{owner}: {} resolved to {resolved:?}", original.property);

                if options.preserve_originals {
                    let copy = Declaration::new(original.property.clone(), resolved);
                    declarations.insert(index + 1, copy);
                    index += 1;
                } else {
                    declarations[index].value = resolved;
                }
                changed += 1;
            }
        }
        index += 1;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(entries: &[(&str, &str)]) -> VariableMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Helper: resolve and collect warnings.
    fn resolve(value: &str, entries: &[(&str, &str)]) -> (String, Vec<Warning>) {
        let mut warnings = Vec::new();
        let resolved = resolve_value(value, &vars(entries), &mut |w| warnings.push(w));
        (resolved, warnings)
    }

    // =========================================================================
    // Substitution
    // =========================================================================

    #[test]
    fn test_no_reference_is_identity() {
        assert_eq!(resolve("1px solid red", &[]), ("1px solid red".into(), vec![]));
    }

    #[test]
    fn test_simple_substitution() {
        assert_eq!(resolve("var(--a)", &[("--a", "1px")]).0, "1px");
    }

    #[test]
    fn test_substitution_in_context() {
        assert_eq!(
            resolve("0 var(--x) 0 var( --y )", &[("--x", "1px"), ("--y", "2px")]).0,
            "0 1px 0 2px"
        );
    }

    #[test]
    fn test_chain_unwinds() {
        let entries = [("--a", "value"), ("--b", "var(--a)"), ("--c", "var(--b)")];
        assert_eq!(resolve("var(--c)", &entries).0, "value");
    }

    #[test]
    fn test_repeated_reference() {
        assert_eq!(resolve("var(--a) var(--a)", &[("--a", "x")]).0, "x x");
    }

    // =========================================================================
    // Fallbacks
    // =========================================================================

    #[test]
    fn test_fallback_when_undefined() {
        assert_eq!(resolve("var(--undefined, red)", &[]), ("red".into(), vec![]));
    }

    #[test]
    fn test_fallback_ignored_when_defined() {
        assert_eq!(resolve("var(--a, red)", &[("--a", "blue")]).0, "blue");
    }

    #[test]
    fn test_fallback_ignored_when_defined_empty() {
        assert_eq!(resolve("a var(--a, red) b", &[("--a", "")]).0, "a  b");
    }

    #[test]
    fn test_fallback_with_commas_and_functions() {
        assert_eq!(
            resolve("var(--f, rgba(0, 0, 0, .5), blue)", &[]).0,
            "rgba(0, 0, 0, .5), blue"
        );
    }

    #[test]
    fn test_nested_var_in_fallback() {
        assert_eq!(
            resolve("var(--missing, var(--b, 3px))", &[("--b", "2px")]).0,
            "2px"
        );
        assert_eq!(resolve("var(--missing, var(--b, 3px))", &[]).0, "3px");
    }

    #[test]
    fn test_quoted_paren_in_fallback() {
        assert_eq!(resolve("var(--q, \")\")", &[]).0, "\")\"");
    }

    // =========================================================================
    // Warnings
    // =========================================================================

    #[test]
    fn test_undefined_without_fallback_keeps_literal() {
        let (resolved, warnings) = resolve("1px var(--nope)", &[]);
        assert_eq!(resolved, "1px var(--nope)");
        assert_eq!(
            warnings,
            vec![Warning::Undefined {
                name: "--nope".into()
            }]
        );
    }

    #[test]
    fn test_empty_name() {
        let (resolved, warnings) = resolve("var( ) var(--a)", &[("--a", "1")]);
        assert_eq!(resolved, "var( ) 1");
        assert_eq!(
            warnings,
            vec![Warning::EmptyName {
                value: "var( ) var(--a)".into()
            }]
        );
    }

    #[test]
    fn test_missing_closing_paren_best_effort() {
        let (resolved, warnings) = resolve("calc(var(--a", &[("--a", "1px")]);
        assert_eq!(resolved, "calc(1px");
        assert_eq!(
            warnings,
            vec![Warning::MissingClosingParen {
                value: "calc(var(--a".into()
            }]
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let entries = [("--a", "var(--b)"), ("--b", "var(--a)")];
        let (resolved, warnings) = resolve("var(--a)", &entries);
        assert_eq!(resolved, "var(--a)");
        assert_eq!(
            warnings,
            vec![Warning::CircularReference { name: "--a".into() }]
        );
    }

    #[test]
    fn test_exponential_chain_is_capped() {
        let mut entries = vec![("--v0".to_string(), "x".to_string())];
        for level in 1..=40 {
            let previous = format!("var(--v{})", level - 1);
            entries.push((format!("--v{level}"), format!("{previous} {previous}")));
        }
        let variables: VariableMap = entries.into_iter().collect();

        let mut warnings = Vec::new();
        let resolved = resolve_value("var(--v40)", &variables, &mut |w| warnings.push(w));

        assert!(resolved.len() <= MAX_SUBSTITUTED_BYTES + "var(--v40)".len());
        assert!(resolved.contains("var(--v"));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Warning::ExpansionLimit { .. }));
    }

    #[test]
    fn test_cycle_uses_fallback() {
        let (resolved, _) = resolve("var(--a)", &[("--a", "var(--a, 4px)")]);
        assert_eq!(resolved, "4px");
    }

    // =========================================================================
    // Nested calc
    // =========================================================================

    #[test]
    fn test_fix_nested_calc() {
        assert_eq!(fix_nested_calc("calc(10px + calc(2px * 3))"), "calc(10px + (2px * 3))");
        assert_eq!(
            fix_nested_calc("calc(1px + -webkit-calc(2px + calc(3px))) calc(4px)"),
            "calc(1px + (2px + (3px))) calc(4px)"
        );
        assert_eq!(fix_nested_calc("mycalc(calc(1px))"), "mycalc(calc(1px))");
        assert_eq!(fix_nested_calc("1px"), "1px");
    }

    // =========================================================================
    // Declaration lists
    // =========================================================================

    fn run(
        declarations: &mut Vec<Declaration>,
        entries: &[(&str, &str)],
        options: &Options,
    ) -> usize {
        let variables = vars(entries);
        let selectors = vec!["a".to_string()];
        resolve_declarations(
            declarations,
            Owner::Style {
                selectors: &selectors,
            },
            &variables,
            options,
            &mut |_| {},
        )
    }

    #[test]
    fn test_preserve_inserts_resolved_sibling() {
        let mut declarations = vec![
            Declaration::new("width", "var(--w)"),
            Declaration::new("height", "var(--h)"),
            Declaration::new("color", "red"),
        ];
        let changed = run(
            &mut declarations,
            &[("--w", "1px"), ("--h", "2px")],
            &Options::default(),
        );
        assert_eq!(changed, 2);
        assert_eq!(
            declarations,
            vec![
                Declaration::new("width", "var(--w)"),
                Declaration::new("width", "1px"),
                Declaration::new("height", "var(--h)"),
                Declaration::new("height", "2px"),
                Declaration::new("color", "red"),
            ]
        );
    }

    #[test]
    fn test_replace_in_place_without_preserve() {
        let options = Options {
            preserve_originals: false,
            ..Options::default()
        };
        let mut declarations = vec![Declaration::new("width", "calc(var(--w) + 1px)")];
        run(&mut declarations, &[("--w", "calc(2px * 2)")], &options);
        assert_eq!(
            declarations,
            vec![Declaration::new("width", "calc((2px * 2) + 1px)")]
        );
    }

    #[test]
    fn test_unresolvable_adds_no_copy() {
        let mut declarations = vec![Declaration::new("width", "var(--nope)")];
        assert_eq!(run(&mut declarations, &[], &Options::default()), 0);
        assert_eq!(declarations.len(), 1);
    }
}
