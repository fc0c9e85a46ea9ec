//! AI Narrative Client
//!
//! Client for the text generation service that turns a scored evaluation
//! into a written tasting narrative.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::Language;

use crate::config::NarrativeConfig;
use crate::error::{AppError, AppResult};

/// Client for the narrative generation service
#[derive(Clone)]
pub struct NarrativeClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Request to generate a narrative
#[derive(Debug, Serialize)]
pub struct NarrativeRequest<'a> {
    /// Evaluation serialized by `shared::narrative_payload`
    pub evaluation: &'a str,
    /// ISO 639-1 code of the language to write in
    pub language: &'static str,
}

/// Response from the narrative service
#[derive(Debug, Deserialize)]
pub struct NarrativeResponse {
    pub text: String,
}

impl NarrativeClient {
    /// Create a new narrative client
    pub fn new(api_endpoint: String, api_key: String, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_endpoint,
            api_key,
            http_client,
        })
    }

    /// Create a client from configuration, or `None` when no endpoint is set
    pub fn from_config(config: &NarrativeConfig) -> AppResult<Option<Self>> {
        if !config.is_enabled() {
            return Ok(None);
        }

        Self::new(
            config.endpoint.trim().to_string(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    /// Generate a narrative for a serialized evaluation
    pub async fn generate(&self, evaluation: &str, language: Language) -> AppResult<String> {
        let request = NarrativeRequest {
            evaluation,
            language: language.code(),
        };

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::NarrativeService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::NarrativeService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: NarrativeResponse = response
            .json()
            .await
            .map_err(|e| AppError::NarrativeService(format!("Failed to parse response: {}", e)))?;

        Ok(result.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> NarrativeConfig {
        NarrativeConfig {
            endpoint: endpoint.to_string(),
            api_key: "key".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_disabled_without_endpoint() {
        assert!(NarrativeClient::from_config(&config("  ")).unwrap().is_none());
    }

    #[test]
    fn test_enabled_with_endpoint() {
        let client = NarrativeClient::from_config(&config(" https://narrative.local/generate "))
            .unwrap()
            .unwrap();
        assert_eq!(client.api_endpoint, "https://narrative.local/generate");
    }

    #[test]
    fn test_request_shape() {
        let request = NarrativeRequest {
            evaluation: "{\"coffee_name\":\"Kenya AA\"}",
            language: Language::Spanish.code(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["language"], "es");
        assert_eq!(value["evaluation"], "{\"coffee_name\":\"Kenya AA\"}");
    }
}
