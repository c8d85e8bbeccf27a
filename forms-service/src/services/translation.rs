//! Translation collaborator: LLM-backed text and JSON translation.

use serde::{Deserialize, Serialize};
use service_core::axum::async_trait;
use std::time::Duration;

use crate::services::error::ServiceError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Languages the translation endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum SupportedLanguage {
    English,
    French,
    Chinese,
    Japanese,
    Spanish,
    German,
}

impl SupportedLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedLanguage::English => "English",
            SupportedLanguage::French => "French",
            SupportedLanguage::Chinese => "Chinese",
            SupportedLanguage::Japanese => "Japanese",
            SupportedLanguage::Spanish => "Spanish",
            SupportedLanguage::German => "German",
        }
    }
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate free text.
    async fn translate_text(
        &self,
        text: &str,
        language: SupportedLanguage,
    ) -> Result<String, ServiceError>;

    /// Translate a JSON document, preserving its structure. Only
    /// human-readable values (labels, descriptions, possible answers) are
    /// expected to change.
    async fn translate_json(
        &self,
        json_data: &str,
        language: SupportedLanguage,
    ) -> Result<String, ServiceError>;
}

/// Gemini REST implementation.
#[derive(Clone)]
pub struct GeminiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiTranslator {
    pub fn new(api_key: String, model: String) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    async fn ask(&self, prompt: String) -> Result<String, ServiceError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key,
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::TranslationError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, "translation provider returned an error");
            return Err(ServiceError::TranslationError(format!(
                "provider returned {}",
                status
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::TranslationError(e.to_string()))?;

        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                ServiceError::TranslationError("empty completion from provider".to_string())
            })
    }
}

#[async_trait]
impl TranslationProvider for GeminiTranslator {
    async fn translate_text(
        &self,
        text: &str,
        language: SupportedLanguage,
    ) -> Result<String, ServiceError> {
        self.ask(format!(
            "Translate this text into {}. Do not comment and be straightforward.\n\"{}\"",
            language.as_str(),
            text,
        ))
        .await
    }

    async fn translate_json(
        &self,
        json_data: &str,
        language: SupportedLanguage,
    ) -> Result<String, ServiceError> {
        self.ask(format!(
            "Translate this json into {} in the same json format. \
             Only translate titles, labels, descriptions and possible answers. \
             You are a translator. ONLY return raw JSON. \
             Do NOT use markdown formatting or code blocks. \
             Do not comment and be straightforward.\n{}",
            language.as_str(),
            json_data,
        ))
        .await
    }
}

/// Echo implementation for tests and offline development.
#[derive(Clone)]
pub struct MockTranslator;

#[async_trait]
impl TranslationProvider for MockTranslator {
    async fn translate_text(
        &self,
        text: &str,
        _language: SupportedLanguage,
    ) -> Result<String, ServiceError> {
        Ok(text.to_string())
    }

    async fn translate_json(
        &self,
        json_data: &str,
        _language: SupportedLanguage,
    ) -> Result<String, ServiceError> {
        Ok(json_data.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_names_match_provider_prompts() {
        assert_eq!(SupportedLanguage::French.as_str(), "French");
        assert_eq!(SupportedLanguage::Chinese.as_str(), "Chinese");
    }

    #[tokio::test]
    async fn mock_translator_echoes() {
        let mock = MockTranslator;
        let out = mock
            .translate_text("bonjour", SupportedLanguage::English)
            .await
            .unwrap();
        assert_eq!(out, "bonjour");
    }
}
