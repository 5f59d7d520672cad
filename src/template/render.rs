//! `{dotted.path}` scanner and renderer.
//!
//! Placeholders are resolved through [`DataRecord::lookup`]. A path that does
//! not end on a printable leaf renders as `{<path>_NAO_ENCONTRADO}` so a
//! template/data drift shows up as greppable text instead of an error.

use crate::record::{DataRecord, Lookup};

/// Suffix appended to a path that could not be resolved.
pub const MISSING_SUFFIX: &str = "_NAO_ENCONTRADO";

/// Output of [`render`]: the substituted text plus every unresolved path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Text with every placeholder substituted.
    pub text: String,
    /// Paths that rendered as missing placeholders, in order of appearance.
    pub missing: Vec<String>,
}

/// Visible placeholder for a path that did not resolve.
pub fn placeholder(path: &str) -> String {
    format!("{{{path}{MISSING_SUFFIX}}}")
}

/// Whether `candidate` is a well-formed dotted path (`seg(.seg)*`, segments
/// of ASCII alphanumerics and `_`).
pub fn is_valid_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Substitute every `{dotted.path}` token in `template` from `record`.
///
/// `{{` and `}}` produce literal braces. Brace sequences that do not form a
/// valid token are copied through unchanged. Never fails.
pub fn render(template: &str, record: &DataRecord) -> Rendered {
    let mut out = Rendered {
        text: String::with_capacity(template.len()),
        missing: Vec::new(),
    };

    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        let (literal, tail) = rest.split_at(pos);
        out.text.push_str(literal);

        if let Some(after) = tail.strip_prefix("{{") {
            out.text.push('{');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix("}}") {
            out.text.push('}');
            rest = after;
            continue;
        }
        let Some(body) = tail.strip_prefix('{') else {
            // Lone closing brace.
            out.text.push('}');
            rest = tail.get(1..).unwrap_or_default();
            continue;
        };

        match body.split_once('}') {
            Some((path, after)) if is_valid_path(path) => {
                substitute(&mut out, path, record);
                rest = after;
            }
            _ => {
                out.text.push('{');
                rest = body;
            }
        }
    }
    out.text.push_str(rest);
    out
}

/// Render and keep only the text.
pub fn render_text(template: &str, record: &DataRecord) -> String {
    render(template, record).text
}

fn substitute(out: &mut Rendered, path: &str, record: &DataRecord) {
    match record.lookup(path) {
        Lookup::Found(field) => match field.render() {
            Some(value) => out.text.push_str(&value),
            None => push_missing(out, path),
        },
        Lookup::Missing { .. } => push_missing(out, path),
    }
}

fn push_missing(out: &mut Rendered, path: &str) {
    out.text.push_str(&placeholder(path));
    out.missing.push(path.to_owned());
}
