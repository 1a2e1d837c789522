//! Microblog (Twitter/X) publishing: chunked media upload, then a post referencing it.
use bot_logging::{bot_debug, bot_info};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::http::{build_client, endpoint, error_body, HttpSettings};
use crate::publish::{malformed, network_error, Publisher};
use crate::{GeneratedImage, MediaHandle, Platform, PostId, PublishError, RejectionKind};

pub const DEFAULT_TWITTER_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_TWITTER_UPLOAD_BASE: &str = "https://upload.twitter.com";

const MEDIA_UPLOAD_PATH: &str = "1.1/media/upload.json";

/// Error code the platform returns for invalid or expired tokens.
const INVALID_TOKEN_CODE: &str = "\"code\":89";

#[derive(Debug, Clone)]
pub struct TwitterSettings {
    pub bearer_token: String,
    pub api_base: String,
    pub upload_base: String,
    pub http: HttpSettings,
}

impl TwitterSettings {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            api_base: DEFAULT_TWITTER_API_BASE.to_string(),
            upload_base: DEFAULT_TWITTER_UPLOAD_BASE.to_string(),
            http: HttpSettings::default(),
        }
    }
}

const AUTH_PROBLEMS: &[&str] = &["unsupported-authentication", "client-forbidden"];

#[derive(Debug, Deserialize)]
struct Problem {
    #[serde(rename = "type")]
    problem_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InitResponse {
    media_id_string: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: Option<TweetData>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

/// Posts the full quote text with an attached image.
#[derive(Debug, Clone)]
pub struct TwitterPublisher {
    client: reqwest::Client,
    settings: TwitterSettings,
}

impl TwitterPublisher {
    pub fn new(settings: TwitterSettings) -> Result<Self, PublishError> {
        let client =
            build_client(&settings.http).map_err(|err| network_error(Platform::Twitter, err))?;
        Ok(Self { client, settings })
    }

    fn upload_url(&self) -> String {
        endpoint(&self.settings.upload_base, MEDIA_UPLOAD_PATH)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        stage: &str,
    ) -> Result<reqwest::Response, PublishError> {
        let response = request
            .bearer_auth(&self.settings.bearer_token)
            .send()
            .await
            .map_err(|err| network_error(Platform::Twitter, err))?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = error_body(response).await;
        Err(rejection(status, format!("{stage} failed: {body}"), &body))
    }
}

pub(crate) fn rejection(status: u16, message: String, body: &str) -> PublishError {
    let kind = if body.replace(' ', "").contains(INVALID_TOKEN_CODE) || is_auth_problem(body) {
        RejectionKind::Unauthorized
    } else {
        RejectionKind::from_status(status)
    };
    PublishError::new(Platform::Twitter, kind, message)
}

/// v2 problem documents that reject the credentials rather than the content.
fn is_auth_problem(body: &str) -> bool {
    let Ok(problem) = serde_json::from_str::<Problem>(body) else {
        return false;
    };
    problem
        .problem_type
        .as_deref()
        .and_then(|url| url.rsplit('/').next())
        .is_some_and(|name| AUTH_PROBLEMS.contains(&name))
}

#[async_trait::async_trait]
impl Publisher for TwitterPublisher {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    fn needs_image_bytes(&self) -> bool {
        true
    }

    async fn upload(&self, image: &GeneratedImage) -> Result<MediaHandle, PublishError> {
        let bytes = image.bytes.as_ref().ok_or_else(|| {
            PublishError::new(
                Platform::Twitter,
                RejectionKind::MediaUnavailable,
                format!("image at {} was not downloaded", image.url),
            )
        })?;
        let media_type = image.content_type.as_deref().unwrap_or("image/png");
        let total_bytes = bytes.len().to_string();

        let init = self
            .send(
                self.client.post(self.upload_url()).form(&[
                    ("command", "INIT"),
                    ("media_type", media_type),
                    ("total_bytes", total_bytes.as_str()),
                ]),
                "INIT",
            )
            .await?;
        let media_id = init
            .json::<InitResponse>()
            .await
            .map_err(|err| malformed(Platform::Twitter, err.to_string()))?
            .media_id_string
            .ok_or_else(|| malformed(Platform::Twitter, "INIT returned no media id"))?;
        bot_debug!("Media upload INIT ok, media_id={}", media_id);

        let part = Part::bytes(bytes.clone())
            .file_name("quote_image.png")
            .mime_str(media_type)
            .map_err(|err| malformed(Platform::Twitter, err.to_string()))?;
        let form = Form::new()
            .text("command", "APPEND")
            .text("media_id", media_id.clone())
            .text("segment_index", "0")
            .part("media", part);
        self.send(self.client.post(self.upload_url()).multipart(form), "APPEND")
            .await?;

        self.send(
            self.client
                .post(self.upload_url())
                .form(&[("command", "FINALIZE"), ("media_id", media_id.as_str())]),
            "FINALIZE",
        )
        .await?;

        bot_info!("Uploaded {} bytes as media {}", bytes.len(), media_id);
        Ok(MediaHandle(media_id))
    }

    async fn post(&self, text: &str, media: &MediaHandle) -> Result<PostId, PublishError> {
        let body = json!({
            "text": text,
            "media": { "media_ids": [media.0] },
        });
        let response = self
            .send(
                self.client
                    .post(endpoint(&self.settings.api_base, "2/tweets"))
                    .json(&body),
                "post",
            )
            .await?;
        let id = response
            .json::<TweetResponse>()
            .await
            .map_err(|err| malformed(Platform::Twitter, err.to_string()))?
            .data
            .map(|data| data.id)
            .ok_or_else(|| malformed(Platform::Twitter, "post response without id"))?;
        Ok(PostId(id))
    }
}
