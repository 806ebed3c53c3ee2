//! Evaluator verdict extraction.
//!
//! Evaluators are asked for a bare JSON object but often wrap it in fences or
//! prose, and the prose itself may contain braces. Every `{` is tried in
//! order and the first object that reads as a verdict wins. An unbalanced
//! object falls back to everything up to the last closing brace.

use thiserror::Error;

use crate::domain::Feedback;

/// Why a raw verdict could not be turned into `Feedback`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerdictParseError {
    #[error("no JSON object found in evaluator response")]
    NoJsonObject,

    #[error("invalid evaluator JSON: {0}")]
    InvalidJson(String),
}

/// Parse an evaluator response into structured feedback.
pub fn parse_verdict(raw: &str) -> Result<Feedback, VerdictParseError> {
    let text = strip_json_fences(raw);

    let mut first_error = None;
    for (start, _) in text.match_indices('{') {
        let Some(candidate) = extract_object(text, start) else {
            continue;
        };
        match serde_json::from_str::<Feedback>(candidate) {
            Ok(feedback) => return Ok(feedback),
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    Err(first_error.map_or(VerdictParseError::NoJsonObject, VerdictParseError::InvalidJson))
}

fn strip_json_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Slice of `text` holding the JSON object that opens at `start`.
fn extract_object(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    // Unbalanced; take through the last closing brace
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
