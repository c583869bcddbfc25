//! Template rendering for fragment xpaths and content.
//!
//! Placeholders use Tera's Jinja2-style syntax (`{{ VARIABLE }}`). Each call
//! renders with a fresh `Tera` instance via `render_str` - the engine is
//! stateless, which keeps renders of independent stacks trivially safe to
//! run side by side.
//!
//! Missing variables fail loudly: a placeholder referencing a variable the
//! context does not define produces [`SnipstackError::MissingVariable`] with
//! the fragment and variable names, never a silently substituted blank. The
//! variable name is recovered from Tera's error chain.

pub mod filters;

use std::collections::HashMap;

use regex::Regex;
use tera::Tera;

use crate::core::{Result, SnipstackError};

/// Render `text` against a flat variable context.
///
/// `fragment` is only used to label errors. Rendering is idempotent on its
/// own output: once every placeholder is substituted the result contains no
/// template syntax, so rendering it again with the same context is the
/// identity.
pub fn render(fragment: &str, text: &str, context: &HashMap<String, String>) -> Result<String> {
    let mut tera = Tera::default();
    tera.register_filter("password_hash", filters::password_hash);

    let mut ctx = tera::Context::new();
    for (name, value) in context {
        ctx.insert(name.as_str(), value);
    }

    tera.render_str(text, &ctx).map_err(|e| classify_error(fragment, &e))
}

/// Turn a Tera error into the matching typed error.
fn classify_error(fragment: &str, error: &tera::Error) -> SnipstackError {
    if let Some(variable) = extract_missing_variable(error) {
        return SnipstackError::MissingVariable { fragment: fragment.to_string(), variable };
    }
    SnipstackError::Render { fragment: fragment.to_string(), reason: format_tera_error(error) }
}

/// Walk the error chain looking for "Variable `x` not found".
fn extract_missing_variable(error: &tera::Error) -> Option<String> {
    let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
    let mut current: Option<&dyn std::error::Error> = Some(error);
    while let Some(err) = current {
        if let Some(caps) = re.captures(&err.to_string()) {
            return Some(caps[1].to_string());
        }
        current = err.source();
    }
    None
}

/// Collapse a Tera error chain into one readable line, dropping the
/// unhelpful internal template name.
fn format_tera_error(error: &tera::Error) -> String {
    let mut messages = Vec::new();
    let mut current: Option<&dyn std::error::Error> = Some(error);
    while let Some(err) = current {
        let cleaned = err
            .to_string()
            .replace("while rendering '__tera_one_off'", "")
            .replace("Failed to render '__tera_one_off'", "")
            .replace("Failed to parse '__tera_one_off'", "template syntax error")
            .replace("'__tera_one_off'", "template")
            .trim()
            .to_string();
        if !cleaned.is_empty() {
            messages.push(cleaned);
        }
        current = err.source();
    }
    if messages.is_empty() {
        "template rendering failed".to_string()
    } else {
        messages.join(": ")
    }
}
