//! services/app/src/adapters/payload.rs
//!
//! Decodes the generation backend's response bodies. Depending on the
//! deployment, the backend returns either the target object directly or a
//! chat-completion envelope whose `choices[0].message.content` holds the
//! object — itself either inline JSON or a JSON-encoded string. Each shape
//! gets an explicit branch; anything else is a typed error, never a panic.

use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The backend answered with an explicit `error` field.
    #[error("backend reported an error: {0}")]
    Backend(String),
    /// The envelope's content string was not valid JSON for the target type.
    #[error("envelope content could not be parsed: {0}")]
    BadContent(String),
    /// Neither the direct shape, the envelope shape, nor an error field.
    #[error("unrecognized response shape: {0}")]
    Unrecognized(String),
}

/// Extracts `choices[0].message.content` when the body is a chat envelope.
fn envelope_content(body: &Value) -> Option<&Value> {
    body.get("choices")?.get(0)?.get("message")?.get("content")
}

/// Models sometimes wrap their JSON answer in a markdown code fence.
fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

/// Decodes a backend response body into `T`, trying each known shape in
/// turn: direct object, envelope with inline object, envelope with a
/// JSON-encoded string, explicit error field.
pub fn decode<T: DeserializeOwned>(body: &Value) -> Result<T, PayloadError> {
    // Shape 1: the target object, unwrapped.
    if let Ok(parsed) = serde_json::from_value::<T>(body.clone()) {
        return Ok(parsed);
    }

    // Shapes 2 and 3: chat-completion envelope.
    if let Some(content) = envelope_content(body) {
        return match content {
            Value::Object(_) => serde_json::from_value::<T>(content.clone())
                .map_err(|e| PayloadError::BadContent(e.to_string())),
            Value::String(text) => serde_json::from_str::<T>(strip_fences(text))
                .map_err(|e| PayloadError::BadContent(e.to_string())),
            other => Err(PayloadError::BadContent(format!(
                "envelope content has unexpected type: {other}"
            ))),
        };
    }

    // Shape 4: explicit error report.
    if let Some(error) = body.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(PayloadError::Backend(message));
    }

    Err(PayloadError::Unrecognized(
        serde_json::to_string(body).unwrap_or_else(|_| "<unserializable>".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmarkd_core::domain::{StoryChapter, StoryPreview};
    use serde_json::json;

    #[test]
    fn decodes_a_direct_object() {
        let body = json!({
            "summary": "s", "plotTwist": "t", "vibeRating": "v"
        });
        let preview: StoryPreview = decode(&body).unwrap();
        assert_eq!(preview.summary, "s");
    }

    #[test]
    fn decodes_an_envelope_with_inline_object() {
        let body = json!({
            "choices": [{"message": {"content": {
                "content": "Once upon a time...",
                "choices": [{"text": "Go", "impact": "Bold"}],
                "isEnding": false
            }}}]
        });
        let chapter: StoryChapter = decode(&body).unwrap();
        assert_eq!(chapter.choices.len(), 1);
        assert!(!chapter.is_ending);
    }

    #[test]
    fn decodes_an_envelope_with_json_string() {
        let inner = r#"{"content":"The end.","choices":[],"isEnding":true,"unlockedBadge":"Finisher"}"#;
        let body = json!({
            "choices": [{"message": {"content": inner}}]
        });
        let chapter: StoryChapter = decode(&body).unwrap();
        assert!(chapter.is_ending);
        assert_eq!(chapter.unlocked_badge.as_deref(), Some("Finisher"));
    }

    #[test]
    fn decodes_an_envelope_with_fenced_json_string() {
        let inner = "```json\n{\"content\":\"Hi.\",\"choices\":[]}\n```";
        let body = json!({
            "choices": [{"message": {"content": inner}}]
        });
        let chapter: StoryChapter = decode(&body).unwrap();
        assert_eq!(chapter.content, "Hi.");
    }

    #[test]
    fn missing_required_fields_in_the_envelope_are_reported() {
        let body = json!({
            "choices": [{"message": {"content": {"isEnding": true}}}]
        });
        let result: Result<StoryChapter, _> = decode(&body);
        assert!(matches!(result, Err(PayloadError::BadContent(_))));
    }

    #[test]
    fn explicit_error_field_is_surfaced() {
        let body = json!({"error": "API Key missing"});
        let result: Result<StoryPreview, _> = decode(&body);
        match result {
            Err(PayloadError::Backend(msg)) => assert_eq!(msg, "API Key missing"),
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn anything_else_is_unrecognized() {
        let body = json!({"status": "AI endpoint is live. Use POST to chat."});
        let result: Result<StoryPreview, _> = decode(&body);
        assert!(matches!(result, Err(PayloadError::Unrecognized(_))));
    }
}
