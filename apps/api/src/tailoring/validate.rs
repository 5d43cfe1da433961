use serde_yaml::Value;

use crate::errors::AppError;

/// How much of the offending document is echoed back in an error.
const EXCERPT_CHARS: usize = 500;

/// Checks that a generated document is a YAML mapping the renderer can read.
pub fn validate_yaml(document: &'static str, yaml: &str) -> Result<Value, AppError> {
    let malformed = |message: String| AppError::MalformedGeneratedYaml {
        document,
        message,
        excerpt: truncate(yaml, EXCERPT_CHARS),
    };

    let value: Value = serde_yaml::from_str(yaml).map_err(|e| malformed(e.to_string()))?;

    if !value.is_mapping() {
        return Err(malformed("top level must be a mapping".to_string()));
    }

    Ok(value)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
