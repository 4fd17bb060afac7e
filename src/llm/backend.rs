//! Text completion backends
//!
//! A backend turns one prompt into one completion. Backends are blocking:
//! [`GenerativeClient`](super::client::GenerativeClient) runs each call on a
//! helper thread and bounds it with a timeout. The HTTP backend supports both
//! Anthropic and OpenAI-compatible APIs and owns a small tokio runtime so the
//! rest of the game stays synchronous.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use crate::core::error::{Result, VaultError};

/// What a completion is for; selects the system prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationKind {
    Enemy,
    Quiz,
}

impl GenerationKind {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            GenerationKind::Enemy => ENEMY_SYSTEM_PROMPT,
            GenerationKind::Quiz => QUIZ_SYSTEM_PROMPT,
        }
    }
}

const ENEMY_SYSTEM_PROMPT: &str = "You are a creative fantasy writer who transforms any content into magical encounters.
Transform mundane notes into atmospheric fantasy adventures with vivid descriptions.
Use the labeled output format you are given so the reply can be parsed.";

const QUIZ_SYSTEM_PROMPT: &str = "You are a helpful assistant that creates quiz questions from notes.
Generate clear, educational questions that test understanding of key concepts.
Be concise and focused.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub kind: GenerationKind,
    pub prompt: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(kind: GenerationKind, prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            max_tokens,
        }
    }

    pub fn system(&self) -> &'static str {
        self.kind.system_prompt()
    }
}

/// A blocking text completion source
pub trait GenerativeBackend: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Short label for logs
    fn name(&self) -> &str;
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    /// Pull the completion text out of a raw response body
    pub fn extract_text(&self, body: &str) -> Result<String> {
        let parse_err = |e: serde_json::Error| VaultError::Parse(e.to_string());
        let text = match self {
            ApiFormat::Anthropic => serde_json::from_str::<AnthropicResponse>(body)
                .map_err(parse_err)?
                .content
                .into_iter()
                .next()
                .map(|c| c.text),
            ApiFormat::OpenAI => serde_json::from_str::<OpenAIResponse>(body)
                .map_err(parse_err)?
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content),
        };
        text.ok_or_else(|| VaultError::Parse("response held no completion".into()))
    }
}

/// HTTP completion backend
pub struct HttpBackend {
    client: Client,
    runtime: Runtime,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    request_timeout: Duration,
}

impl HttpBackend {
    pub fn new(api_key: String, api_url: String, model: String) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| VaultError::Backend(format!("runtime: {}", e)))?;

        let api_format = Self::detect_api_format(&api_url);
        Ok(Self {
            client: Client::new(),
            runtime,
            api_key,
            api_url,
            model,
            api_format,
            request_timeout: Duration::from_secs(30),
        })
    }

    /// Bound on the HTTP round trip itself
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    /// Configure from the environment
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to the Anthropic messages API)
    /// Optional: LLM_MODEL (defaults to claude-3-haiku-20240307)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| VaultError::Backend("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".into());
        let model =
            std::env::var("LLM_MODEL").unwrap_or_else(|_| "claude-3-haiku-20240307".into());

        Self::new(api_key, api_url, model)
    }

    async fn complete_anthropic(&self, request: &CompletionRequest) -> Result<String> {
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            system: request.system().into(),
            messages: vec![Message {
                role: "user".into(),
                content: request.prompt.clone(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| VaultError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VaultError::Backend(format!("API error: {}", error_text)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VaultError::Backend(e.to_string()))?;
        ApiFormat::Anthropic.extract_text(&body)
    }

    async fn complete_openai(&self, request: &CompletionRequest) -> Result<String> {
        let body = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: request.system().into(),
                },
                Message {
                    role: "user".into(),
                    content: request.prompt.clone(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| VaultError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VaultError::Backend(format!("API error: {}", error_text)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VaultError::Backend(e.to_string()))?;
        ApiFormat::OpenAI.extract_text(&body)
    }
}

impl GenerativeBackend for HttpBackend {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.runtime.block_on(async {
            let call = async {
                match self.api_format {
                    ApiFormat::Anthropic => self.complete_anthropic(request).await,
                    ApiFormat::OpenAI => self.complete_openai(request).await,
                }
            };
            tokio::time::timeout(self.request_timeout, call)
                .await
                .map_err(|_| VaultError::GenerationTimeout(self.request_timeout))?
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Canned completions for offline play and tests
///
/// Replies are served in order; once the queue is empty the repeating reply
/// (if any) is used, otherwise the call fails.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Always answers with the same reply
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            repeat: Some(reply.into()),
            ..Default::default()
        }
    }

    /// Every call fails
    pub fn failing() -> Self {
        Self::default()
    }

    /// Parse a script file: replies separated by lines holding only `---`
    pub fn from_script(text: &str) -> Self {
        let mut replies = Vec::new();
        let mut current = Vec::new();
        for line in text.lines() {
            if line.trim() == "---" {
                replies.push(current.join("\n"));
                current.clear();
            } else {
                current.push(line);
            }
        }
        replies.push(current.join("\n"));

        let replies: Vec<String> = replies
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        // A single reply serves every call
        if replies.len() == 1 {
            return Self::repeating(replies[0].clone());
        }
        Self::new(replies)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl GenerativeBackend for ScriptedBackend {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let queued = self
            .replies
            .lock()
            .map_err(|_| VaultError::Backend("script lock poisoned".into()))?
            .pop_front();

        queued
            .or_else(|| self.repeat.clone())
            .ok_or_else(|| VaultError::Backend("script exhausted".into()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_format_detection() {
        let anthropic = HttpBackend::new(
            "k".into(),
            "https://api.anthropic.com/v1/messages".into(),
            "m".into(),
        )
        .unwrap();
        assert_eq!(anthropic.api_format(), &ApiFormat::Anthropic);

        let openai = HttpBackend::new(
            "k".into(),
            "https://api.deepseek.com/chat/completions".into(),
            "m".into(),
        )
        .unwrap();
        assert_eq!(openai.api_format(), &ApiFormat::OpenAI);
    }

    #[test]
    fn test_extract_text_by_format() {
        let anthropic = r#"{"content":[{"type":"text","text":"NAME: Wraith"}]}"#;
        assert_eq!(ApiFormat::Anthropic.extract_text(anthropic).unwrap(), "NAME: Wraith");

        let openai = r#"{"choices":[{"message":{"role":"assistant","content":"ANSWER: b"}}]}"#;
        assert_eq!(ApiFormat::OpenAI.extract_text(openai).unwrap(), "ANSWER: b");
    }

    #[test]
    fn test_extract_text_malformed_is_parse_error() {
        assert!(matches!(
            ApiFormat::Anthropic.extract_text(r#"{"content":[]}"#),
            Err(VaultError::Parse(_))
        ));
        assert!(matches!(
            ApiFormat::OpenAI.extract_text("<html>bad gateway</html>"),
            Err(VaultError::Parse(_))
        ));
    }

    #[test]
    fn test_from_env_missing_key() {
        let result = HttpBackend::from_env();
        if std::env::var("LLM_API_KEY").is_err() {
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_scripted_serves_in_order_then_fails() {
        let backend = ScriptedBackend::new(vec!["one".to_string(), "two".to_string()]);
        let req = CompletionRequest::new(GenerationKind::Quiz, "p", 10);

        assert_eq!(backend.complete(&req).unwrap(), "one");
        assert_eq!(backend.complete(&req).unwrap(), "two");
        assert!(backend.complete(&req).is_err());
        assert_eq!(backend.calls(), 3);
        assert_eq!(backend.requests().len(), 3);
    }

    #[test]
    fn test_script_parsing() {
        let backend = ScriptedBackend::from_script("QUESTION: a?\nANSWER: b\n---\nNAME: Wraith\n");
        let req = CompletionRequest::new(GenerationKind::Enemy, "p", 10);
        assert_eq!(backend.complete(&req).unwrap(), "QUESTION: a?\nANSWER: b");
        assert_eq!(backend.complete(&req).unwrap(), "NAME: Wraith");

        let single = ScriptedBackend::from_script("same every time");
        assert_eq!(single.complete(&req).unwrap(), "same every time");
        assert_eq!(single.complete(&req).unwrap(), "same every time");
    }

    #[test]
    fn test_system_prompt_by_kind() {
        let req = CompletionRequest::new(GenerationKind::Enemy, "p", 10);
        assert!(req.system().contains("fantasy"));
        assert_ne!(
            GenerationKind::Quiz.system_prompt(),
            GenerationKind::Enemy.system_prompt()
        );
    }
}
