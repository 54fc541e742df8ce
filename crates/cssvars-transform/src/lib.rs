//! CSS Custom-Property Resolver
//!
//! Rewrites stylesheets so that every `var()` reference is replaced by a static
//! value, for consumers that cannot evaluate custom properties.
//!
//! ```text
//! text → parse → filter → collect variables → resolve declarations → serialize
//! ```
//!
//! The variable map is complete before any value is resolved, so a reference
//! may precede its definition. Only `:root` definitions and caller overrides
//! contribute to the map.
//!
//! ```
//! use cssvars_transform::{transform, Options};
//!
//! let out = transform(":root{--c:1px} a{width:var(--c)}", &Options::default()).unwrap();
//! assert!(out.css.contains("a{width:var(--c);width:1px}"));
//! ```

pub mod chunks;
pub mod collect;
pub mod filter;
pub mod options;
pub mod resolve;
pub mod walk;

pub use options::Options;

use cssvars_parser::{serialize, ParseError, Parser};
use serde::Serialize;
use std::collections::BTreeMap;

/// Custom property name (with `--`) → raw value.
pub type VariableMap = BTreeMap<String, String>;

/// A non-fatal anomaly found while resolving a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("missing closing \")\" in the value \"{value}\"")]
    MissingClosingParen { value: String },

    #[error("var() must contain a non-whitespace name in the value \"{value}\"")]
    EmptyName { value: String },

    #[error("variable \"{name}\" is undefined")]
    Undefined { name: String },

    #[error("variable \"{name}\" references itself")]
    CircularReference { name: String },

    #[error("expanding variable \"{name}\" exceeds the substitution limit; kept as written")]
    ExpansionLimit { name: String },
}

/// A fatal failure: the input could not be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("{source} (near `{context}`)")]
    Parse { source: ParseError, context: String },

    #[error("source #{index}: {source} (near `{context}`)")]
    Chunk {
        index: usize,
        source: ParseError,
        context: String,
    },
}

/// The result of a transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformed {
    pub css: String,
    /// Every variable known to the resolver, overrides included.
    pub variables: VariableMap,
}

/// Transform one stylesheet, logging warnings at `warn` level.
pub fn transform(css: &str, options: &Options) -> Result<Transformed, TransformError> {
    transform_with(css, options, |warning| log::warn!("{warning}"))
}

/// Transform one stylesheet, reporting warnings to `on_warning`.
pub fn transform_with<F>(
    css: &str,
    options: &Options,
    mut on_warning: F,
) -> Result<Transformed, TransformError>
where
    F: FnMut(Warning),
{
    let mut stylesheet = Parser::parse(css).map_err(|source| TransformError::Parse {
        context: context_line(css, source.line),
        source,
    })?;

    if options.only_variables {
        let removed = filter::filter_rules(&mut stylesheet.rules);
        log::debug!("filtered out {removed} rule(s) without custom properties");
    }

    let variables = collect::collect_variables(
        &mut stylesheet,
        &options.override_variables,
        options.preserve_originals,
    );

    let mut changed = 0;
    walk::walk_declarations(&mut stylesheet.rules, &mut |declarations, owner| {
        changed += resolve::resolve_declarations(
            declarations,
            owner,
            &variables,
            options,
            &mut on_warning,
        );
    });
    log::debug!("resolved {changed} declaration(s)");

    Ok(Transformed {
        css: serialize(&stylesheet, options.format()),
        variables,
    })
}

/// Transform several stylesheets as one, in order.
///
/// Sources without variable syntax skip the parser and come back verbatim.
/// When the combined text fails to parse, each remaining source is parsed on its
/// own and the first failing one is reported as [`TransformError::Chunk`].
pub fn transform_sources<F>(
    sources: &[&str],
    options: &Options,
    on_warning: F,
) -> Result<Transformed, TransformError>
where
    F: FnMut(Warning),
{
    let coalesced = chunks::coalesce(sources);
    log::debug!(
        "coalesced {} source(s), {} skipped as inert",
        sources.len(),
        coalesced.skipped_count()
    );

    match transform_with(coalesced.text(), options, on_warning) {
        Ok(mut transformed) => {
            transformed.css = coalesced.restore(&transformed.css);
            Ok(transformed)
        }
        Err(error) => Err(locate_failure(sources, &coalesced).unwrap_or(error)),
    }
}

fn locate_failure(sources: &[&str], coalesced: &chunks::Coalesced<'_>) -> Option<TransformError> {
    sources
        .iter()
        .enumerate()
        .filter(|(index, _)| !coalesced.is_skipped(*index))
        .find_map(|(index, text)| {
            Parser::parse(text).err().map(|source| TransformError::Chunk {
                index,
                context: context_line(text, source.line),
                source,
            })
        })
}

/// The trimmed source line an error points at, shortened for messages.
fn context_line(text: &str, line: usize) -> String {
    let line = text.lines().nth(line.saturating_sub(1)).unwrap_or("").trim();
    line.chars().take(60).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: transform and collect warnings.
    fn run(css: &str, options: &Options) -> (String, Vec<Warning>) {
        let mut warnings = Vec::new();
        let out = transform_with(css, options, |w| warnings.push(w)).unwrap();
        (out.css, warnings)
    }

    fn keep_all() -> Options {
        Options {
            only_variables: false,
            ..Options::default()
        }
    }

    fn overrides(entries: &[(&str, &str)]) -> VariableMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // =========================================================================
    // Identity and defaults
    // =========================================================================

    #[test]
    fn test_no_references_is_identity() {
        let css = "a{color:red}\n@media print{b{margin:0}}\n@font-face{font-family:f}";
        let (out, warnings) = run(css, &keep_all());
        assert_eq!(out, css);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_default_scenario() {
        let (out, _) = run(":root{--c:1px} a{width:var(--c)}", &Options::default());
        assert_eq!(out, ":root{--c:1px}\na{width:var(--c);width:1px}");
    }

    #[test]
    fn test_discard_originals() {
        let options = Options {
            preserve_originals: false,
            ..Options::default()
        };
        let (out, _) = run(":root{--c:1px} a{width:var(--c);color:red}", &options);
        assert_eq!(out, "a{width:1px}");
    }

    #[test]
    fn test_reference_before_definition() {
        let options = Options {
            preserve_originals: false,
            ..Options::default()
        };
        let (out, _) = run("a{width:var(--late)} :root{--late:3px}", &options);
        assert_eq!(out, "a{width:3px}");
    }

    #[test]
    fn test_chain_resolves() {
        let options = Options {
            preserve_originals: false,
            ..Options::default()
        };
        let (out, _) = run(
            ":root{--a:value;--b:var(--a);--c:var(--b)} x{y:var(--c)}",
            &options,
        );
        assert_eq!(out, "x{y:value}");
    }

    // =========================================================================
    // Overrides and fallbacks
    // =========================================================================

    #[test]
    fn test_override_precedence() {
        let options = Options {
            preserve_originals: false,
            override_variables: overrides(&[("x", "2px")]),
            ..Options::default()
        };
        let (out, _) = run(":root{--x:1px} a{w:var(--x)} b{w:var(--x, 9px)}", &options);
        assert_eq!(out, "a{w:2px}\nb{w:2px}");
    }

    #[test]
    fn test_fallback_until_overridden() {
        let discard = Options {
            preserve_originals: false,
            ..Options::default()
        };
        let (out, _) = run("a{color:var(--undefined, red)}", &discard);
        assert_eq!(out, "a{color:red}");

        let overridden = Options {
            override_variables: overrides(&[("--undefined", "blue")]),
            ..discard
        };
        let (out, _) = run("a{color:var(--undefined, red)}", &overridden);
        assert_eq!(out, "a{color:blue}");
    }

    #[test]
    fn test_preserve_appends_overrides() {
        let options = Options {
            override_variables: overrides(&[("x", "2px")]),
            ..Options::default()
        };
        let (out, _) = run(":root{--x:1px} a{w:var(--x)}", &options);
        assert_eq!(out, ":root{--x:1px}\na{w:var(--x);w:2px}\n:root{--x:2px}");
    }

    #[test]
    fn test_returned_variables() {
        let options = Options {
            override_variables: overrides(&[("y", "2")]),
            ..Options::default()
        };
        let out = transform_with(":root{--x:1}", &options, |_| {}).unwrap();
        assert_eq!(out.variables, overrides(&[("--x", "1"), ("--y", "2")]));
    }

    // =========================================================================
    // Preserve mode
    // =========================================================================

    #[test]
    fn test_preserve_keeps_definitions_and_order() {
        let (out, _) = run(
            ":root{--a:1px;--b:var(--a)} a{margin:var(--a) var(--b);color:red}",
            &keep_all(),
        );
        assert_eq!(
            out,
            ":root{--a:1px;--b:var(--a);--b:1px}\na{margin:var(--a) var(--b);margin:1px 1px;color:red}"
        );
    }

    #[test]
    fn test_nested_containers_resolved() {
        let (out, _) = run(
            ":root{--c:red} @media print{@supports (x:y){a{color:var(--c)}}}",
            &Options::default(),
        );
        assert_eq!(
            out,
            ":root{--c:red}\n@media print{@supports (x:y){a{color:var(--c);color:red}}}"
        );
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    #[test]
    fn test_only_variables_prunes() {
        let (out, _) = run(
            ":root{--c:1px;color:red} a{color:red} b{w:var(--c);h:1px} @font-face{src:url(x);font-family:var(--f,f)}",
            &Options::default(),
        );
        assert_eq!(
            out,
            ":root{--c:1px}\nb{w:var(--c);w:1px}\n@font-face{src:url(x);font-family:var(--f,f);font-family:f}"
        );
    }

    #[test]
    fn test_keyframes_scenario() {
        let (out, warnings) = run(
            "@keyframes k{from{opacity:var(--o)} to{opacity:1}}",
            &Options::default(),
        );
        assert_eq!(out, "@keyframes k{from{opacity:var(--o)}to{opacity:1}}");
        assert_eq!(warnings, vec![Warning::Undefined { name: "--o".into() }]);
    }

    // =========================================================================
    // Output format and nested calc
    // =========================================================================

    #[test]
    fn test_pretty_output() {
        let options = Options {
            pretty: true,
            preserve_originals: false,
            ..Options::default()
        };
        let (out, _) = run(":root{--c:1px} a{width:var(--c)}", &options);
        assert_eq!(out, "a {\n  width: 1px;\n}\n");
    }

    #[test]
    fn test_nested_calc_flattened() {
        let options = Options {
            preserve_originals: false,
            ..Options::default()
        };
        let css = ":root{--w:calc(2px * 2)} a{width:calc(var(--w) + 1px)}";
        assert_eq!(run(css, &options).0, "a{width:calc((2px * 2) + 1px)}");

        let raw = Options {
            fix_nested_calc: false,
            ..options
        };
        assert_eq!(run(css, &raw).0, "a{width:calc(calc(2px * 2) + 1px)}");
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_parse_error_carries_context() {
        let err = transform("a{color:red}\nb{ color red }", &Options::default()).unwrap_err();
        match err {
            TransformError::Parse { source, context } => {
                assert_eq!(source.line, 2);
                assert_eq!(context, "b{ color red }");
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    // =========================================================================
    // Multiple sources
    // =========================================================================

    #[test]
    fn test_inert_chunk_verbatim() {
        let sources = ["a{color:red}", ":root{--x:1px} b{w:var(--x)}"];
        let out = transform_sources(&sources, &Options::default(), |_| {}).unwrap();
        assert_eq!(out.css, "a{color:red}\n:root{--x:1px}\nb{w:var(--x);w:1px}");
    }

    #[test]
    fn test_inert_chunk_keeps_original_formatting() {
        let sources = ["a {\n  color: red;\n}", "b{w:var(--x, 1px)}"];
        let options = Options {
            preserve_originals: false,
            ..Options::default()
        };
        let out = transform_sources(&sources, &options, |_| {}).unwrap();
        assert!(out.css.starts_with("a {\n  color: red;\n}"));
        assert!(out.css.ends_with("b{w:1px}"));
    }

    #[test]
    fn test_definitions_shared_across_sources() {
        let sources = [":root{--x:5px}", "b{w:var(--x)}"];
        let options = Options {
            preserve_originals: false,
            ..Options::default()
        };
        let out = transform_sources(&sources, &options, |_| {}).unwrap();
        assert_eq!(out.css, "b{w:5px}");
    }

    #[test]
    fn test_failing_source_located() {
        let sources = ["a{color:red}", "b{w:var(--x)}", "c{w:var(--y)"];
        let err = transform_sources(&sources, &Options::default(), |_| {}).unwrap_err();
        match err {
            TransformError::Chunk { index, context, .. } => {
                assert_eq!(index, 2);
                assert_eq!(context, "c{w:var(--y)");
            }
            other => panic!("Expected chunk error, got {other:?}"),
        }
    }

    #[test]
    fn test_warning_messages() {
        assert_eq!(
            Warning::Undefined { name: "--x".into() }.to_string(),
            "variable \"--x\" is undefined"
        );
        assert!(Warning::MissingClosingParen { value: "var(--a".into() }
            .to_string()
            .contains("missing closing"));
        assert!(Warning::EmptyName { value: "var()".into() }
            .to_string()
            .contains("non-whitespace name"));
    }
}
