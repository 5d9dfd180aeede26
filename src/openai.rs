//! Minimal chat-completions client used as the tutor behind hints and chat.
//!
//! Any OpenAI-compatible endpoint works (set OPENAI_BASE_URL). Calls are instrumented and
//! log model names, latencies and response sizes, never contents or the API key.
//! Every request is bounded by the client timeout; callers turn failures into fallback text.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::util::fill_template;

#[derive(Debug, Error)]
pub enum AiError {
  /// Connect/read failures, including timeouts.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("provider HTTP {status}: {message}")]
  Status { status: u16, message: String },
  #[error("empty completion")]
  Empty,
}

/// Context attached to a chat question.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatContext {
  #[serde(default)]
  pub exercise: Option<String>,
  #[serde(default)]
  pub code: Option<String>,
  #[serde(default)]
  pub error: Option<String>,
}

impl ChatContext {
  /// Non-empty context lines, in a fixed order.
  pub fn render(&self) -> String {
    let mut parts: Vec<String> = vec![];
    if let Some(e) = self.exercise.as_deref().filter(|s| !s.trim().is_empty()) {
      parts.push(format!("Ejercicio actual: {}", e));
    }
    if let Some(c) = self.code.as_deref().filter(|s| !s.trim().is_empty()) {
      parts.push(format!("Código del estudiante: {}", c));
    }
    if let Some(err) = self.error.as_deref().filter(|s| !s.trim().is_empty()) {
      parts.push(format!("Error encontrado: {}", err));
    }
    parts.join("\n")
  }
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  pub fn new(api_key: String, base_url: String, model: String, timeout: Duration) -> Result<Self, AiError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, api_key, base_url, model })
  }

  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  /// A key with an unbuildable HTTP client is logged and also yields None.
  pub fn from_env(timeout: Duration) -> Option<Self> {
    Self::from_vars(|k| std::env::var(k).ok(), timeout)
  }

  fn from_vars(var: impl Fn(&str) -> Option<String>, timeout: Duration) -> Option<Self> {
    let api_key = var("OPENAI_API_KEY")?;
    let base_url = var("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".into());
    let model = var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".into());
    match Self::new(api_key, base_url, model, timeout) {
      Ok(client) => Some(client),
      Err(e) => {
        error!(target: "codequest", error = %e, "Failed to build tutor HTTP client; tutor disabled.");
        None
      }
    }
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_plain(&self, system: &str, user: &str, temperature: f32) -> Result<String, AiError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
    };

    let start = Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "codequest-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(AiError::Status { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Tutor usage");
    }
    let text = body
      .choices
      .first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default()
      .trim()
      .to_string();
    info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Tutor reply received");

    if text.is_empty() {
      return Err(AiError::Empty);
    }
    Ok(text)
  }

  // --- High-level helpers ---

  #[instrument(level = "info", skip(self, prompts, exercise_prompt, code, error), fields(code_len = code.len(), has_error = error.is_some()))]
  pub async fn hint(
    &self,
    prompts: &Prompts,
    exercise_prompt: &str,
    code: &str,
    error: Option<&str>,
    level: u8,
  ) -> Result<String, AiError> {
    let code = if code.trim().is_empty() { "No ha escrito código aún" } else { code };
    let error_line = error
      .filter(|e| !e.trim().is_empty())
      .map(|e| format!("Error que encontró: {}", e))
      .unwrap_or_default();
    let level_str = level.to_string();
    let user = fill_template(
      &prompts.hint_user_template,
      &[
        ("level", level_str.as_str()),
        ("level_guidance", prompts.hint_level_guidance(level)),
        ("exercise", exercise_prompt),
        ("code", code),
        ("error", error_line.as_str()),
      ],
    );
    self.chat_plain(&prompts.hint_system, &user, 0.3).await
  }

  #[instrument(level = "info", skip(self, prompts, message, context), fields(message_len = message.len()))]
  pub async fn chat(&self, prompts: &Prompts, message: &str, context: &ChatContext) -> Result<String, AiError> {
    let context_text = context.render();
    let user = fill_template(
      &prompts.chat_user_template,
      &[("context", context_text.as_str()), ("message", message)],
    );
    self.chat_plain(&prompts.chat_system, user.trim(), 0.5).await
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)]
  usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens: Option<u32>,
  #[serde(default)]
  completion_tokens: Option<u32>,
  #[serde(default)]
  total_tokens: Option<u32>,
}

/// Try to extract a clean error message from the provider's error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn provider_error_message_is_extracted() {
    let body = r#"{"error": {"message": "Invalid API key", "type": "auth"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Invalid API key"));
    assert_eq!(extract_openai_error("<html>502</html>"), None);
  }

  #[test]
  fn completion_request_carries_only_model_messages_and_temperature() {
    let req = ChatCompletionRequest {
      model: "m".into(),
      messages: vec![ChatMessageReq { role: "user".into(), content: "hola".into() }],
      temperature: 0.5,
    };
    let v = serde_json::to_value(&req).unwrap();
    let mut keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, ["messages", "model", "temperature"]);
    assert_eq!(v["messages"][0]["role"], "user");
  }

  #[test]
  fn client_is_built_only_with_a_key() {
    let timeout = Duration::from_secs(1);
    assert!(OpenAI::from_vars(|_| None, timeout).is_none());

    let oa = OpenAI::from_vars(|k| (k == "OPENAI_API_KEY").then(|| "sk-test".to_string()), timeout).unwrap();
    assert_eq!(oa.base_url, "https://api.openai.com/v1");
    assert_eq!(oa.model, "gpt-4o-mini");

    let oa = OpenAI::from_vars(
      |k| match k {
        "OPENAI_API_KEY" => Some("sk-test".into()),
        "OPENAI_BASE_URL" => Some("http://localhost:8080/v1".into()),
        "OPENAI_MODEL" => Some("tiny".into()),
        _ => None,
      },
      timeout,
    )
    .unwrap();
    assert_eq!(oa.base_url, "http://localhost:8080/v1");
    assert_eq!(oa.model, "tiny");
  }

  #[test]
  fn chat_context_skips_blank_parts() {
    let ctx = ChatContext {
      exercise: Some("Suma a y b".into()),
      code: Some("  ".into()),
      error: Some("NameError".into()),
    };
    assert_eq!(ctx.render(), "Ejercicio actual: Suma a y b\nError encontrado: NameError");
    assert_eq!(ChatContext::default().render(), "");
  }
}
