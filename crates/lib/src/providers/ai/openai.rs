use crate::{errors::ProviderError, providers::ai::AiProvider};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

const SERVICE: &str = "Chat completion API";

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// --- Provider implementation ---

/// A provider for the OpenAI chat completions API, or any compatible server.
#[derive(Clone, Debug)]
pub struct OpenAiChatProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiChatProvider {
    /// Creates a new `OpenAiChatProvider`.
    ///
    /// `api_base` is the API root (e.g. `https://api.openai.com/v1`); the
    /// `/chat/completions` path is appended.
    pub fn new(
        api_base: &str,
        api_key: Option<String>,
        model: String,
        temperature: f32,
    ) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ProviderError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key,
            model,
            temperature,
        })
    }
}

#[async_trait]
impl AiProvider for OpenAiChatProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        debug!(model = %self.model, "--> Sending chat completion request");
        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|source| ProviderError::Deserialization {
                    service: SERVICE,
                    source,
                })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderError::EmptyResponse(SERVICE))
    }
}
