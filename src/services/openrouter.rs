use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

use crate::config::OpenRouterSettings;
use crate::error::CompletionError;
use crate::models::{CompletionRequest, CompletionResponse};
use crate::services::CompletionProvider;

/// Chat-completions client for OpenRouter.
pub struct OpenRouterClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    referer: String,
    title: String,
}

impl OpenRouterClient {
    pub fn new(settings: &OpenRouterSettings, api_key: SecretString) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(CompletionError::Client)?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url),
            api_key,
            referer: settings.referer.clone(),
            title: settings.title.clone(),
        })
    }

    /// Builds a client only when a credential is configured.
    pub fn from_settings(settings: &OpenRouterSettings) -> Result<Option<Self>, CompletionError> {
        match &settings.api_key {
            Some(key) => {
                let key = SecretString::from(key.expose_secret().to_string());
                Self::new(settings, key).map(Some)
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        debug!(model = %request.model, messages = request.messages.len(), "calling OpenRouter");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .header("HTTP-Referer", self.referer.as_str())
            .header("X-Title", self.title.as_str())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Logged by the chat handler through the error's Display.
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response.json::<CompletionResponse>().await?;
        payload.into_reply().ok_or(CompletionError::EmptyReply)
    }
}
