//! OpenAI chat-completion and image-generation clients.
//!
//! Both collaborator traits live here so the rest of the engine only ever
//! depends on [`TextGenerator`] and [`ImageGenerator`], never on the vendor.

use bot_logging::{bot_debug, bot_info};
use quote_core::{ChatMessage, CompletionRequest};
use serde::{Deserialize, Serialize};

use crate::http::{build_client, endpoint, error_body, HttpSettings};
use crate::GenerationError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}

#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns a URL for the generated image. `prompt` is expected to be pre-truncated.
    async fn create_image(&self, prompt: &str, size: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    /// `None` lets the API pick its default image model.
    pub image_model: Option<String>,
    pub http: HttpSettings,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: None,
            http: HttpSettings::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self, GenerationError> {
        let client =
            build_client(&settings.http).map_err(|err| GenerationError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, GenerationError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(endpoint(&self.settings.base_url, path))
            .bearer_auth(&self.settings.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| GenerationError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|err| GenerationError::Malformed(err.to_string()))
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.settings.chat_model,
            messages: &request.messages,
            temperature: request.temperature,
            n: 1,
            max_tokens: request.max_tokens,
        };
        bot_debug!(
            "Chat completion: model={} messages={} temperature={}",
            body.model,
            body.messages.len(),
            body.temperature
        );

        let response: ChatResponse = self.post_json("chat/completions", &body).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerationError::Malformed("no completion content".into()))?;
        Ok(content)
    }
}

#[async_trait::async_trait]
impl ImageGenerator for OpenAiClient {
    async fn create_image(&self, prompt: &str, size: &str) -> Result<String, GenerationError> {
        let body = ImageRequest {
            model: self.settings.image_model.as_deref(),
            prompt,
            n: 1,
            size,
            response_format: "url",
        };
        bot_info!("Requesting {} image ({} prompt chars)", size, prompt.chars().count());

        let response: ImageResponse = self.post_json("images/generations", &body).await?;
        response
            .data
            .into_iter()
            .find_map(|image| image.url)
            .ok_or_else(|| GenerationError::Malformed("no image url in response".into()))
    }
}
