//! Chunk coalescing.
//!
//! Several source stylesheets are transformed in one parse pass. Sources that
//! a quick textual test proves free of variable syntax are swapped for a marker
//! comment before parsing and swapped back, untouched, afterwards.

use cssvars_parser::ast::{CUSTOM_PROPERTY_PREFIX, VAR_FUNCTION};

const MARKER_PREFIX: &str = "cssvars-chunk:";
const ROOT_SELECTOR: &str = ":root";

/// Combined text of several sources, with inert sources replaced by markers.
#[derive(Debug, Clone)]
pub struct Coalesced<'a> {
    text: String,
    sources: Vec<&'a str>,
    skipped: Vec<bool>,
}

/// Join `sources` into one buffer, one source per line group.
pub fn coalesce<'a>(sources: &[&'a str]) -> Coalesced<'a> {
    let mut parts = Vec::with_capacity(sources.len());
    let mut skipped = Vec::with_capacity(sources.len());

    for (index, source) in sources.iter().enumerate() {
        if source.trim().is_empty() {
            // Nothing to restore, so no marker and no separator either.
            skipped.push(true);
        } else if is_inert(source) {
            parts.push(marker(index));
            skipped.push(true);
        } else {
            parts.push(source.to_string());
            skipped.push(false);
        }
    }

    Coalesced {
        text: parts.join("\n"),
        sources: sources.to_vec(),
        skipped,
    }
}

impl Coalesced<'_> {
    /// The buffer to parse.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_skipped(&self, index: usize) -> bool {
        self.skipped.get(index).copied().unwrap_or(false)
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.iter().filter(|skipped| **skipped).count()
    }

    /// Put the original text of every skipped source back in place of its marker.
    pub fn restore(&self, output: &str) -> String {
        let mut restored = output.to_string();
        for (index, source) in self.sources.iter().enumerate() {
            if self.skipped[index] {
                restored = restored.replacen(&marker(index), source, 1);
            }
        }
        restored
    }
}

fn marker(index: usize) -> String {
    format!("/*{MARKER_PREFIX}{index}*/")
}

/// True when transforming `text` cannot change it: no `var(` call anywhere,
/// and no `--` after a `:root` once comments are removed.
///
/// The test errs toward "not inert"; a false negative only costs a parse.
pub fn is_inert(text: &str) -> bool {
    if text.contains(VAR_FUNCTION) {
        return false;
    }
    let text = strip_comments(text);
    match text.find(ROOT_SELECTOR) {
        Some(index) => !text[index..].contains(CUSTOM_PROPERTY_PREFIX),
        None => true,
    }
}

/// Remove `/* ... */` comments outside quoted strings.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote = None;

    while let Some(c) = chars.next() {
        if let Some(open) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for c in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        break;
                    }
                    previous = c;
                }
            }
            _ => out.push(c),
        }
    }
    out
}
