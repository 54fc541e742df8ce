//! Stylesheet serializer.
//!
//! Turns a rule tree back into CSS text, either compact (one top-level rule
//! per line) or pretty-printed with two-space indentation.

use crate::ast::{Declaration, Keyframe, Rule, Stylesheet};

/// Output layout for [`serialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// `a{color:red;margin:0}`, top-level rules separated by newlines.
    #[default]
    Compact,
    /// Indented blocks, one declaration per line, blank line between rules.
    Pretty,
}

/// Serialize a stylesheet.
pub fn serialize(stylesheet: &Stylesheet, format: Format) -> String {
    let mut out = String::new();

    for (index, rule) in stylesheet.rules.iter().enumerate() {
        match format {
            Format::Compact => {
                if index > 0 {
                    out.push('\n');
                }
                write_compact(rule, &mut out);
            }
            Format::Pretty => {
                if index > 0 {
                    out.push_str("\n\n");
                }
                write_pretty(rule, &mut out, 0);
            }
        }
    }

    if format == Format::Pretty && !out.is_empty() {
        out.push('\n');
    }
    out
}

fn write_at_prelude(out: &mut String, name: &str, prelude: &str) {
    out.push('@');
    out.push_str(name);
    if !prelude.is_empty() {
        out.push(' ');
        out.push_str(prelude);
    }
}

// =========================================================================
// Compact
// =========================================================================

fn write_compact(rule: &Rule, out: &mut String) {
    match rule {
        Rule::Style(style) => {
            out.push_str(&style.selectors.join(","));
            write_compact_declarations(&style.declarations, out);
        }
        Rule::Container(container) => {
            write_at_prelude(out, &container.name, &container.condition);
            out.push('{');
            for nested in &container.rules {
                write_compact(nested, out);
            }
            out.push('}');
        }
        Rule::Keyframes(keyframes) => {
            write_at_prelude(out, &keyframes.name, &keyframes.ident);
            out.push('{');
            for keyframe in &keyframes.keyframes {
                out.push_str(&keyframe.selectors.join(","));
                write_compact_declarations(&keyframe.declarations, out);
            }
            out.push('}');
        }
        Rule::FontFace(font_face) => {
            out.push_str("@font-face");
            write_compact_declarations(&font_face.declarations, out);
        }
        Rule::Comment(text) => {
            out.push_str("/*");
            out.push_str(text);
            out.push_str("*/");
        }
        Rule::Other(other) => {
            write_at_prelude(out, &other.name, &other.prelude);
            match &other.block {
                Some(block) => {
                    out.push('{');
                    out.push_str(block);
                    out.push('}');
                }
                None => out.push(';'),
            }
        }
    }
}

fn write_compact_declarations(declarations: &[Declaration], out: &mut String) {
    out.push('{');
    for (index, declaration) in declarations.iter().enumerate() {
        if index > 0 {
            out.push(';');
        }
        out.push_str(&declaration.property);
        out.push(':');
        out.push_str(&declaration.value);
    }
    out.push('}');
}

// =========================================================================
// Pretty
// =========================================================================

fn write_pretty(rule: &Rule, out: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);

    match rule {
        Rule::Style(style) => {
            out.push_str(&style.selectors.join(", "));
            out.push(' ');
            write_pretty_declarations(&style.declarations, out, depth);
        }
        Rule::Container(container) => {
            write_at_prelude(out, &container.name, &container.condition);
            out.push_str(" {");
            for nested in &container.rules {
                out.push('\n');
                write_pretty(nested, out, depth + 1);
            }
            close_pretty_group(container.rules.is_empty(), &indent, out);
        }
        Rule::Keyframes(keyframes) => {
            write_at_prelude(out, &keyframes.name, &keyframes.ident);
            out.push_str(" {");
            for keyframe in &keyframes.keyframes {
                out.push('\n');
                write_pretty_keyframe(keyframe, out, depth + 1);
            }
            close_pretty_group(keyframes.keyframes.is_empty(), &indent, out);
        }
        Rule::FontFace(font_face) => {
            out.push_str("@font-face ");
            write_pretty_declarations(&font_face.declarations, out, depth);
        }
        Rule::Comment(text) => {
            out.push_str("/*");
            out.push_str(text);
            out.push_str("*/");
        }
        Rule::Other(other) => {
            write_at_prelude(out, &other.name, &other.prelude);
            match &other.block {
                Some(block) => {
                    out.push_str(" {");
                    out.push_str(block);
                    out.push('}');
                }
                None => out.push(';'),
            }
        }
    }
}

fn write_pretty_keyframe(keyframe: &Keyframe, out: &mut String, depth: usize) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&keyframe.selectors.join(", "));
    out.push(' ');
    write_pretty_declarations(&keyframe.declarations, out, depth);
}

fn close_pretty_group(empty: bool, indent: &str, out: &mut String) {
    if empty {
        out.push('}');
    } else {
        out.push('\n');
        out.push_str(indent);
        out.push('}');
    }
}

fn write_pretty_declarations(declarations: &[Declaration], out: &mut String, depth: usize) {
    if declarations.is_empty() {
        out.push_str("{}");
        return;
    }

    let inner = "  ".repeat(depth + 1);
    out.push_str("{\n");
    for declaration in declarations {
        out.push_str(&inner);
        out.push_str(&declaration.property);
        out.push(':');
        if !declaration.value.is_empty() {
            out.push(' ');
            out.push_str(&declaration.value);
        }
        out.push_str(";\n");
    }
    out.push_str(&"  ".repeat(depth));
    out.push('}');
}
