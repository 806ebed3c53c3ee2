//! Markdown fence stripping for generated code

const FENCE: &str = "```";

/// Strip markdown code fences from generated source.
///
/// Removes a leading fence (with optional language tag) and a trailing
/// fence, trimming surrounding whitespace, repeatedly until nothing changes.
/// Text between the fences is never altered, so the result is a fixpoint:
/// `sanitize_code(&sanitize_code(x)) == sanitize_code(x)`.
pub fn sanitize_code(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let next = strip_once(current);
        if next.len() == current.len() {
            return current.to_string();
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    let mut text = text;

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = match rest.split_once('\n') {
            Some((tag, body)) if is_language_tag(tag) => body,
            None if is_language_tag(rest) => "",
            _ => rest,
        };
    }

    if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

fn is_language_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '.'))
}
