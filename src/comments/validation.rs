//! Submission validation.
//!
//! Rules are checked in order and the first failure wins:
//! honeypot, required fields, name length, message length, website scheme.
//! Lengths are counted in characters after trimming.

use serde_json::Value;
use thiserror::Error;

pub const MAX_NAME_CHARS: usize = 60;
pub const MAX_MESSAGE_CHARS: usize = 3000;
pub const MAX_POST_CHARS: usize = 256;
pub const DEFAULT_POST: &str = "/";

/// Reasons a submission is refused. The `Display` text is returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Bot detected")]
    BotDetected,

    #[error("name and message are required")]
    MissingField,

    #[error("{0} too long")]
    FieldTooLong(&'static str),

    #[error("{0} must be http(s)")]
    InvalidFormat(&'static str),
}

impl ValidationError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::BotDetected => "bot",
            ValidationError::MissingField => "missing_field",
            ValidationError::FieldTooLong(_) => "too_long",
            ValidationError::InvalidFormat(_) => "invalid_format",
        }
    }
}

/// Raw submission fields as they arrive on the wire.
///
/// Every field is optional; string fields accept any JSON scalar so that a
/// numeric `name` is coerced the same way a string would be.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub post: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub website: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub hp: Option<Value>,
}

/// Validated and trimmed fields, not yet escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSubmission {
    pub post: String,
    pub name: String,
    pub website: Option<String>,
    pub message: String,
}

pub fn validate_submission(input: &Submission) -> Result<NormalizedSubmission, ValidationError> {
    if input.hp.as_ref().is_some_and(is_truthy) {
        return Err(ValidationError::BotDetected);
    }

    let name = field_text(input.name.as_ref());
    let name = name.trim();
    let message = field_text(input.message.as_ref());
    let message = message.trim();

    if name.is_empty() || message.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::FieldTooLong("name"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ValidationError::FieldTooLong("message"));
    }

    let website = field_text(input.website.as_ref());
    let website = website.trim();
    let website = if website.is_empty() {
        None
    } else if has_http_scheme(website) {
        Some(website.to_string())
    } else {
        return Err(ValidationError::InvalidFormat("website"));
    };

    Ok(NormalizedSubmission {
        post: normalize_post(&field_text(input.post.as_ref())),
        name: name.to_string(),
        website,
        message: message.to_string(),
    })
}

/// Trim, default to `/` when empty, and keep at most 256 characters.
pub fn normalize_post(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_POST.to_string();
    }
    trimmed.chars().take(MAX_POST_CHARS).collect()
}

/// Case-insensitive `^https?://`.
fn has_http_scheme(url: &str) -> bool {
    let lower: String = url.chars().take(8).collect::<String>().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// A honeypot value trips the check unless it is null, false, zero or an empty string.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Absent, null and false read as empty; other scalars use their text form.
fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(value: Value) -> Submission {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_submission() {
        let out = validate_submission(&submission(json!({
            "post": "  /blog/hello  ",
            "name": "  Ann ",
            "website": " https://ann.example ",
            "message": " hi there ",
        })))
        .unwrap();

        assert_eq!(out.post, "/blog/hello");
        assert_eq!(out.name, "Ann");
        assert_eq!(out.website.as_deref(), Some("https://ann.example"));
        assert_eq!(out.message, "hi there");
    }

    #[test]
    fn test_honeypot_wins_over_everything() {
        let err = validate_submission(&submission(json!({ "hp": "x" }))).unwrap_err();
        assert_eq!(err, ValidationError::BotDetected);

        let err = validate_submission(&submission(json!({
            "name": "a", "message": "b", "hp": 1
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::BotDetected);
    }

    #[test]
    fn test_falsy_honeypot_is_ignored() {
        for hp in [json!(""), json!(null), json!(false), json!(0)] {
            let out = validate_submission(&submission(json!({
                "name": "a", "message": "b", "hp": hp
            })));
            assert!(out.is_ok());
        }
    }

    #[test]
    fn test_missing_fields() {
        let err = validate_submission(&submission(json!({ "name": "   ", "message": "x" }))).unwrap_err();
        assert_eq!(err, ValidationError::MissingField);
        assert_eq!(err.to_string(), "name and message are required");

        let err = validate_submission(&submission(json!({ "name": "a" }))).unwrap_err();
        assert_eq!(err, ValidationError::MissingField);
    }

    #[test]
    fn test_name_length_boundary() {
        let ok = validate_submission(&submission(json!({
            "name": "n".repeat(60), "message": "m"
        })));
        assert!(ok.is_ok());

        let err = validate_submission(&submission(json!({
            "name": "n".repeat(61), "message": "m"
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::FieldTooLong("name"));
        assert_eq!(err.to_string(), "name too long");
    }

    #[test]
    fn test_message_length_counts_chars() {
        let ok = validate_submission(&submission(json!({
            "name": "n", "message": "é".repeat(3000)
        })));
        assert!(ok.is_ok());

        let err = validate_submission(&submission(json!({
            "name": "n", "message": "m".repeat(3001)
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "message too long");
    }

    #[test]
    fn test_website_scheme() {
        let err = validate_submission(&submission(json!({
            "name": "n", "message": "m", "website": "ftp://x.com"
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidFormat("website"));
        assert_eq!(err.to_string(), "website must be http(s)");

        let out = validate_submission(&submission(json!({
            "name": "n", "message": "m", "website": "HTTPS://x.com"
        })))
        .unwrap();
        assert_eq!(out.website.as_deref(), Some("HTTPS://x.com"));

        let out = validate_submission(&submission(json!({
            "name": "n", "message": "m", "website": "   "
        })))
        .unwrap();
        assert_eq!(out.website, None);
    }

    #[test]
    fn test_post_normalization() {
        assert_eq!(normalize_post(""), "/");
        assert_eq!(normalize_post("   "), "/");
        assert_eq!(normalize_post(&"p".repeat(300)).chars().count(), 256);

        let out = validate_submission(&submission(json!({ "name": "n", "message": "m" }))).unwrap();
        assert_eq!(out.post, "/");
    }
}
