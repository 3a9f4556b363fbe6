//! services/app/src/adapters/generation.rs
//!
//! This module contains the adapter for the story generation backend.
//! It implements the `StoryGenerationService` port from the `core` crate
//! over a single POST endpoint accepting `{prompt, style?}` JSON.
//!
//! Failure policy: network failures, malformed responses, and validation
//! gaps are all absorbed here. Previews and chapters fall back to canned
//! content, definitions to `None` — callers always receive something they
//! can render.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use bookmarkd_core::domain::{ReadingLevel, StoryChapter, StoryPreview, WordDefinition};
use bookmarkd_core::ports::{ChapterRequest, PortError, PortResult, StoryGenerationService};

use crate::adapters::payload;
use crate::config::Config;

const CLASSIC_INSTRUCTION: &str = r#"
STRICT FIDELITY FOR CLASSIC ABRIDGMENTS:
- For books marked "Abridged" or under the "Inspired By Classics" theme:
- ADHERE TO THE ORIGINAL PLOT OF THE SOURCE MATERIAL.
- Use the original character names, settings, and major plot beats from authors like Jane Austen, Arthur Conan Doyle, F. Scott Fitzgerald, etc.
- Do not add sci-fi or fantasy elements unless the original story already has them.
- Focus on maintaining the author's original voice while condensing the narrative for an interactive digital experience.
"#;

/// Only the most recent slice of history is sent: later chapters are the
/// ones influencing the next, and the request size stays bounded.
const CONTEXT_WINDOW_CHARS: usize = 1500;

fn style_instruction(level: ReadingLevel) -> &'static str {
    match level {
        ReadingLevel::Chill => {
            "Use simple, snappy vocabulary and short sentences. Direct and high energy."
        }
        ReadingLevel::Standard => {
            "Use engaging, modern prose suitable for a general teen audience."
        }
        ReadingLevel::Academic => {
            "Use sophisticated, evocative vocabulary, complex sentence structures, and literary depth."
        }
    }
}

/// Keeps the trailing `max` characters of `text`, on a char boundary.
fn tail_chars(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    text.char_indices()
        .nth(count - max)
        .map(|(idx, _)| &text[idx..])
        .unwrap_or(text)
}

fn preview_prompt(title: &str, author: &str, vibe: &str) -> String {
    format!(
        "Generate an interactive preview for the book \"{title}\" by {author}. Vibe: \"{vibe}\". \
         Provide a snappy summary, a shocking potential plot twist, and a Gen-Z style vibe rating. \
         Respond as JSON with keys summary, plotTwist, vibeRating.{CLASSIC_INSTRUCTION}"
    )
}

fn chapter_prompt(request: &ChapterRequest) -> String {
    let style = style_instruction(request.level);
    let schema = "Respond as JSON with keys content, choices (array of {text, impact}), isEnding, unlockedBadge.";
    let title = &request.title;

    if request.is_final {
        let choice = request.choice.as_deref().unwrap_or("to witness the resolution");
        format!(
            "Conclude the story for \"{title}\".{CLASSIC_INSTRUCTION}\
             The reader chose: \"{choice}\". \
             Write a final, climactic resolution of approx 300 words. {style} \
             Provide an \"unlockedBadge\" name (string). Set isEnding to true and choices to an empty array. {schema}"
        )
    } else if let Some(choice) = &request.choice {
        let context = tail_chars(&request.prior_context, CONTEXT_WINDOW_CHARS);
        format!(
            "Continue the story for \"{title}\".{CLASSIC_INSTRUCTION}\
             Reader choice: \"{choice}\". Write a detailed chapter segment of approx 300 words. {style} \
             Provide two distinct, high-impact choices for the next move that align with the original plot. {schema} \
             Context summary: {context}"
        )
    } else {
        format!(
            "Start the immersive story for \"{title}\".{CLASSIC_INSTRUCTION}\
             Describe the opening scene with rich detail (approx 300 words). {style} \
             Provide two enticing choices to begin that fit the original narrative flow. {schema}"
        )
    }
}

fn definition_prompt(word: &str, context: &str, level: ReadingLevel) -> String {
    format!(
        "Provide a concise, teen-friendly definition for the word \"{word}\" as used in this \
         context: \"{context}\". Tailor the tone for a {level:?} reading level. Keep it under \
         25 words. Respond as JSON with keys definition and example."
    )
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StoryGenerationService` against the
/// `{prompt, style?}` generation proxy.
#[derive(Clone)]
pub struct HttpGenerationAdapter {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpGenerationAdapter {
    /// Creates a new `HttpGenerationAdapter` from the loaded configuration.
    pub fn new(config: &Config) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            client,
            url: config.backend_url.clone(),
            model: config.generation_model.clone(),
            api_key: config.backend_api_key.clone(),
        })
    }

    async fn post_prompt(&self, prompt: String, style: Option<String>) -> PortResult<Value> {
        let mut body = json!({ "prompt": prompt, "model": self.model });
        if let Some(style) = style {
            body["style"] = Value::String(style);
        }

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Network(format!("backend returned {status}")));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| PortError::MalformedResponse(e.to_string()))
    }

    async fn request_decoded<T: serde::de::DeserializeOwned>(
        &self,
        prompt: String,
        style: Option<String>,
    ) -> PortResult<T> {
        let body = self.post_prompt(prompt, style).await?;
        payload::decode::<T>(&body).map_err(|e| PortError::MalformedResponse(e.to_string()))
    }
}

//=========================================================================================
// `StoryGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoryGenerationService for HttpGenerationAdapter {
    /// Generates a book preview, substituting the canned fallback on any failure.
    async fn generate_preview(
        &self,
        title: &str,
        author: &str,
        vibe: &str,
    ) -> PortResult<StoryPreview> {
        let prompt = preview_prompt(title, author, vibe);
        match self.request_decoded::<StoryPreview>(prompt, None).await {
            Ok(preview) => Ok(preview),
            Err(e) => {
                warn!(%title, error = %e, "preview generation failed; using fallback");
                Ok(StoryPreview::fallback())
            }
        }
    }

    /// Generates the next story chapter. On failure the fallback chapter is
    /// returned with the request's terminality preserved, so the session can
    /// always proceed or terminate.
    async fn generate_chapter(&self, request: ChapterRequest) -> PortResult<StoryChapter> {
        let is_final = request.is_final;
        let prompt = chapter_prompt(&request);
        let style = Some(style_instruction(request.level).to_string());
        match self.request_decoded::<StoryChapter>(prompt, style).await {
            Ok(chapter) => Ok(chapter),
            Err(e) => {
                warn!(title = %request.title, error = %e, "chapter generation failed; using fallback");
                Ok(StoryChapter::fallback(is_final))
            }
        }
    }

    /// Looks up a word definition; any failure suppresses the tooltip.
    async fn define_word(
        &self,
        word: &str,
        context: &str,
        level: ReadingLevel,
    ) -> PortResult<Option<WordDefinition>> {
        let prompt = definition_prompt(word, tail_chars(context, 500), level);
        match self.request_decoded::<WordDefinition>(prompt, None).await {
            Ok(definition) => Ok(Some(definition)),
            Err(e) => {
                warn!(%word, error = %e, "definition lookup failed; suppressing tooltip");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_adapter() -> HttpGenerationAdapter {
        let config = Config {
            backend_url: "http://127.0.0.1:9/api/ai".to_string(),
            backend_api_key: None,
            generation_model: "llama3.2:1b".to_string(),
            request_timeout: Duration::from_millis(500),
            data_dir: std::env::temp_dir(),
            log_level: tracing::Level::INFO,
        };
        HttpGenerationAdapter::new(&config).unwrap()
    }

    #[test]
    fn tail_keeps_the_most_recent_characters() {
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("abc", 10), "abc");
        // Multi-byte text must split on char boundaries.
        assert_eq!(tail_chars("héllo", 2), "lo");
    }

    #[test]
    fn opening_prompt_has_no_choice_or_context() {
        let prompt = chapter_prompt(&ChapterRequest {
            title: "Test".to_string(),
            prior_context: String::new(),
            is_final: false,
            level: ReadingLevel::Standard,
            choice: None,
        });
        assert!(prompt.contains("Start the immersive story"));
        assert!(!prompt.contains("Context summary"));
    }

    #[test]
    fn continuation_prompt_windows_the_context() {
        let long_context = "x".repeat(5000);
        let prompt = chapter_prompt(&ChapterRequest {
            title: "Test".to_string(),
            prior_context: long_context,
            is_final: false,
            level: ReadingLevel::Chill,
            choice: Some("Go left".to_string()),
        });
        let context_part = prompt.split("Context summary: ").nth(1).unwrap();
        assert_eq!(context_part.chars().count(), CONTEXT_WINDOW_CHARS);
        assert!(prompt.contains("Reader choice: \"Go left\""));
    }

    #[test]
    fn final_prompt_demands_an_ending() {
        let prompt = chapter_prompt(&ChapterRequest {
            title: "Test".to_string(),
            prior_context: "earlier".to_string(),
            is_final: true,
            level: ReadingLevel::Academic,
            choice: None,
        });
        assert!(prompt.contains("Conclude the story"));
        assert!(prompt.contains("to witness the resolution"));
        assert!(prompt.contains("Set isEnding to true"));
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back_to_canned_preview() {
        let adapter = unreachable_adapter();
        let preview = adapter.generate_preview("T", "A", "V").await.unwrap();
        assert_eq!(preview, StoryPreview::fallback());
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back_to_error_chapter() {
        let adapter = unreachable_adapter();
        let chapter = adapter
            .generate_chapter(ChapterRequest {
                title: "T".to_string(),
                prior_context: String::new(),
                is_final: false,
                level: ReadingLevel::Standard,
                choice: None,
            })
            .await
            .unwrap();
        assert_eq!(chapter.choices.len(), 2);
        assert!(!chapter.is_ending);
    }

    #[tokio::test]
    async fn unreachable_backend_suppresses_definitions() {
        let adapter = unreachable_adapter();
        let result = adapter
            .define_word("ineffable", "an ineffable glow", ReadingLevel::Chill)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
