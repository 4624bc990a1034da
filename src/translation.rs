use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TranslationProvider {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "claude")]
    Claude,
}

impl Default for TranslationProvider {
    fn default() -> Self {
        TranslationProvider::None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    #[serde(default)]
    pub provider: TranslationProvider,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_claude_model")]
    pub claude_model: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_claude_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_target_language() -> String {
    "English".to_string()
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::None,
            api_key: String::new(),
            openai_model: default_openai_model(),
            claude_model: default_claude_model(),
            target_language: default_target_language(),
        }
    }
}

/// System prompt for the chat APIs. The transcript arrives as the user
/// message; the reply must be the bare translation.
fn translation_prompt(target_language: &str) -> String {
    format!(
        "You are an interpreter. The user message is a Japanese speech transcript. \
Translate it into {}. Keep the register of the original.\n\
- Output ONLY the translation, no explanations, no quotes\n\
- Do not add or drop content\n\
- If the transcript is already in {}, return it unchanged",
        target_language, target_language
    )
}

/// Translate a transcript using the configured provider. Returns the
/// original text if the provider is None or the request fails; translation
/// has no user-visible error channel.
pub async fn translate_text(text: &str, settings: &TranslationSettings) -> String {
    if settings.provider == TranslationProvider::None || text.trim().is_empty() {
        return text.to_string();
    }

    log::info!(
        "Translating {} chars to {} via {:?}",
        text.len(),
        settings.target_language,
        settings.provider
    );

    let result = match settings.provider {
        TranslationProvider::OpenAi => translate_with_openai(text, settings).await,
        TranslationProvider::Claude => translate_with_claude(text, settings).await,
        TranslationProvider::None => return text.to_string(),
    };

    match result {
        Ok(translated) => {
            log::info!("Translated: {} chars -> {} chars", text.len(), translated.len());
            translated
        }
        Err(e) => {
            log::error!("Translation failed: {}, passing transcript through", e);
            text.to_string()
        }
    }
}

/// OpenAI Chat Completions API
async fn translate_with_openai(text: &str, settings: &TranslationSettings) -> Result<String, String> {
    if settings.api_key.is_empty() {
        return Err("OpenAI API key not set".to_string());
    }

    let body = serde_json::json!({
        "model": settings.openai_model,
        "messages": [
            { "role": "system", "content": translation_prompt(&settings.target_language) },
            { "role": "user", "content": text }
        ],
        "temperature": 0.1
    });

    let client = Client::new();
    let resp = client
        .post("https://api.openai.com/v1/chat/completions")
        .header("Authorization", format!("Bearer {}", settings.api_key))
        .json(&body)
        .timeout(std::time::Duration::from_secs(30))
        .send()
        .await
        .map_err(|e| format!("OpenAI request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(format!("OpenAI error {}: {}", status, body));
    }

    let json: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| format!("Failed to parse OpenAI response: {}", e))?;

    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| "No content in OpenAI response".to_string())
}

/// Anthropic Messages API
async fn translate_with_claude(text: &str, settings: &TranslationSettings) -> Result<String, String> {
    if settings.api_key.is_empty() {
        return Err("Claude API key not set".to_string());
    }

    let body = serde_json::json!({
        "model": settings.claude_model,
        "max_tokens": 4096,
        "system": translation_prompt(&settings.target_language),
        "messages": [
            { "role": "user", "content": text }
        ],
        "temperature": 0.1
    });

    let client = Client::new();
    let resp = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", &settings.api_key)
        .header("anthropic-version", "2023-06-01")
        .header("content-type", "application/json")
        .json(&body)
        .timeout(std::time::Duration::from_secs(30))
        .send()
        .await
        .map_err(|e| format!("Claude request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(format!("Claude error {}: {}", status, body));
    }

    let json: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| format!("Failed to parse Claude response: {}", e))?;

    json["content"][0]["text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| "No content in Claude response".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_passthrough() {
        let settings = TranslationSettings::default();
        assert_eq!(settings.provider, TranslationProvider::None);
        assert_eq!(settings.target_language, "English");
    }

    #[tokio::test]
    async fn none_provider_passes_text_through() {
        let settings = TranslationSettings::default();
        let out = translate_text("こんにちは、元気ですか", &settings).await;
        assert_eq!(out, "こんにちは、元気ですか");
    }

    #[tokio::test]
    async fn missing_api_key_falls_back_to_input() {
        let settings = TranslationSettings {
            provider: TranslationProvider::OpenAi,
            ..Default::default()
        };
        let out = translate_text("ありがとう", &settings).await;
        assert_eq!(out, "ありがとう");
    }

    #[test]
    fn settings_tolerate_partial_json() {
        let parsed: TranslationSettings =
            serde_json::from_str(r#"{ "provider": "claude" }"#).unwrap();
        assert_eq!(parsed.provider, TranslationProvider::Claude);
        assert_eq!(parsed.target_language, "English");
        assert!(!parsed.claude_model.is_empty());
    }

    #[test]
    fn prompt_names_target_language() {
        let prompt = translation_prompt("German");
        assert!(prompt.contains("German"));
        assert!(prompt.contains("Japanese"));
    }
}
