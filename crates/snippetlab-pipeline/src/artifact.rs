//! Normalization of raw model output into artifacts.

use serde_json::Value;

use snippetlab_core::Language;

use crate::error::GatewayError;

/// Strips a surrounding Markdown code fence and rejects empty output.
pub fn clean_code(raw: &str) -> Result<String, GatewayError> {
    let trimmed = raw.trim();
    let body = match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Drop the info string ("```python") along with the opening fence.
            let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
            rest.trim_end().strip_suffix("```").unwrap_or(rest)
        }
        None => trimmed,
    };
    let body = body.trim_matches('\n').trim_end();
    if body.trim().is_empty() {
        return Err(GatewayError::Malformed("model returned no code".to_string()));
    }
    Ok(body.to_string())
}

/// Reduces model output to a single-line title.
pub fn clean_title(raw: &str) -> Result<String, GatewayError> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let title = line
        .trim_start_matches('#')
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();
    if title.is_empty() {
        return Err(GatewayError::Malformed("model returned no title".to_string()));
    }
    Ok(title.to_string())
}

/// Parses a language detection answer.
///
/// Accepts a JSON object `{"language": "<tag>"}` or a bare tag.
pub fn parse_language(raw: &str) -> Result<Language, GatewayError> {
    let trimmed = raw.trim();
    let tag = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match map.get("language") {
            Some(Value::String(tag)) => tag.clone(),
            Some(Value::Null) | None => {
                return Err(GatewayError::Malformed(
                    "model could not determine the language".to_string(),
                ))
            }
            Some(other) => {
                return Err(GatewayError::Malformed(format!(
                    "language field is not a string: {}",
                    other
                )))
            }
        },
        Ok(Value::String(tag)) => tag,
        _ => trimmed
            .trim_matches(|c: char| c == '"' || c == '`' || c == '.' || c.is_whitespace())
            .to_string(),
    };
    tag.parse()
        .map_err(|err| GatewayError::Malformed(format!("{}", err)))
}
