//! Gemini API reviewer implementation.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ModelForgeError, Result};

use super::prompts;
use super::provider::{ReviewerConfig, ScriptReviewer, MAX_REVIEW_ATTEMPTS};
use super::types::{ReviewRequest, ReviewResponse};

/// Gemini generateContent endpoint base.
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini script reviewer.
pub struct GeminiReviewer {
    client: Client,
    api_key: String,
    config: ReviewerConfig,
}

impl GeminiReviewer {
    /// Create a new Gemini reviewer with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, ReviewerConfig::default())
    }

    /// Create a new Gemini reviewer with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: ReviewerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                ModelForgeError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            ModelForgeError::Config("GEMINI_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.config.model)
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| ModelForgeError::Config(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    /// Send the prompt and extract the first candidate's text.
    fn send_prompt(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_output_tokens
            }
        });

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| ModelForgeError::Config(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(ModelForgeError::Config(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: ApiResponse = response.json().map_err(|e| {
            ModelForgeError::Config(format!("Failed to parse API response: {}", e))
        })?;

        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ModelForgeError::Config("No text in API response".to_string()))
    }

    /// Parse JSON from the reviewer response, handling markdown code blocks.
    fn parse_json_response(&self, response: &str) -> Result<ReviewResponse> {
        let json_str = if response.contains("```json") {
            response
                .split("```json")
                .nth(1)
                .and_then(|s| s.split("```").next())
                .map(|s| s.trim())
                .unwrap_or(response)
        } else if response.contains("```") {
            response
                .split("```")
                .nth(1)
                .map(|s| s.trim())
                .unwrap_or(response)
        } else {
            response.trim()
        };

        serde_json::from_str(json_str).map_err(|e| {
            ModelForgeError::Config(format!("Failed to parse review JSON response: {}", e))
        })
    }
}

impl ScriptReviewer for GeminiReviewer {
    fn name(&self) -> &str {
        "gemini"
    }

    fn review(&self, request: &ReviewRequest) -> Result<ReviewResponse> {
        let prompt = prompts::review_prompt(request);

        let mut last_error = None;
        for _ in 0..MAX_REVIEW_ATTEMPTS {
            match self
                .send_prompt(&prompt)
                .and_then(|text| self.parse_json_response(&text))
            {
                Ok(response) => return Ok(response),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ModelForgeError::Config("Review failed with no recorded error".to_string())
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: String,
}
