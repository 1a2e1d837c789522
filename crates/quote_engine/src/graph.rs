//! Instagram and Threads publishing through their Graph APIs.
//!
//! Both platforms fetch the image themselves from a public URL, so `upload`
//! only checks the URL and `post` runs the two-step container flow:
//! create a media container, then publish it.

use bot_logging::{bot_debug, bot_info};
use quote_core::strip_hashtags;
use serde::Deserialize;
use url::Url;

use crate::http::{build_client, endpoint, error_body, HttpSettings};
use crate::publish::{malformed, network_error, Publisher};
use crate::{GeneratedImage, MediaHandle, Platform, PostId, PublishError, RejectionKind};

pub const DEFAULT_INSTAGRAM_GRAPH_BASE: &str = "https://graph.facebook.com/v19.0";
pub const DEFAULT_THREADS_GRAPH_BASE: &str = "https://graph.threads.net/v1.0";

#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub user_id: String,
    pub access_token: String,
    pub base_url: String,
    pub http: HttpSettings,
}

impl GraphSettings {
    pub fn instagram(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_base(user_id, access_token, DEFAULT_INSTAGRAM_GRAPH_BASE)
    }

    pub fn threads(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_base(user_id, access_token, DEFAULT_THREADS_GRAPH_BASE)
    }

    fn with_base(user_id: impl Into<String>, access_token: impl Into<String>, base: &str) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
            base_url: base.to_string(),
            http: HttpSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<GraphErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    message: Option<String>,
    code: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct GraphPublisher {
    platform: Platform,
    client: reqwest::Client,
    settings: GraphSettings,
}

impl GraphPublisher {
    pub fn instagram(settings: GraphSettings) -> Result<Self, PublishError> {
        Self::new(Platform::Instagram, settings)
    }

    /// Threads captions are posted without hashtags.
    pub fn threads(settings: GraphSettings) -> Result<Self, PublishError> {
        Self::new(Platform::Threads, settings)
    }

    fn new(platform: Platform, settings: GraphSettings) -> Result<Self, PublishError> {
        let client = build_client(&settings.http).map_err(|err| network_error(platform, err))?;
        Ok(Self {
            platform,
            client,
            settings,
        })
    }

    fn container_path(&self) -> String {
        match self.platform {
            Platform::Threads => format!("{}/threads", self.settings.user_id),
            _ => format!("{}/media", self.settings.user_id),
        }
    }

    fn publish_path(&self) -> String {
        match self.platform {
            Platform::Threads => format!("{}/threads_publish", self.settings.user_id),
            _ => format!("{}/media_publish", self.settings.user_id),
        }
    }

    fn caption(&self, text: &str) -> String {
        match self.platform {
            Platform::Threads => strip_hashtags(text),
            _ => text.to_string(),
        }
    }

    async fn post_form(&self, path: &str, params: &[(&str, &str)]) -> Result<String, PublishError> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("access_token", self.settings.access_token.as_str()));

        let response = self
            .client
            .post(endpoint(&self.settings.base_url, path))
            .form(&form)
            .send()
            .await
            .map_err(|err| network_error(self.platform, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(self.rejection(status.as_u16(), &body));
        }

        response
            .json::<IdResponse>()
            .await
            .map_err(|err| malformed(self.platform, err.to_string()))?
            .id
            .ok_or_else(|| malformed(self.platform, format!("{path} returned no id")))
    }

    fn rejection(&self, status: u16, body: &str) -> PublishError {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error);
        let kind = match detail.as_ref().and_then(|d| d.code) {
            // Graph "application request limit" and "user request limit".
            Some(4) | Some(17) | Some(32) | Some(613) => RejectionKind::RateLimited,
            Some(190) => RejectionKind::Unauthorized,
            _ => RejectionKind::from_status(status),
        };
        let message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| body.to_string());
        PublishError::new(self.platform, kind, message)
    }
}

#[async_trait::async_trait]
impl Publisher for GraphPublisher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn upload(&self, image: &GeneratedImage) -> Result<MediaHandle, PublishError> {
        let url = Url::parse(&image.url).map_err(|err| {
            PublishError::new(self.platform, RejectionKind::MediaUnavailable, err.to_string())
        })?;
        Ok(MediaHandle(url.to_string()))
    }

    async fn post(&self, text: &str, media: &MediaHandle) -> Result<PostId, PublishError> {
        let caption = self.caption(text);
        let container_path = self.container_path();
        let params: Vec<(&str, &str)> = match self.platform {
            Platform::Threads => vec![
                ("media_type", "IMAGE"),
                ("image_url", media.0.as_str()),
                ("text", caption.as_str()),
            ],
            _ => vec![("image_url", media.0.as_str()), ("caption", caption.as_str())],
        };

        let creation_id = self.post_form(&container_path, &params).await?;
        bot_debug!("{} container {} created", self.platform, creation_id);

        let post_id = self
            .post_form(&self.publish_path(), &[("creation_id", creation_id.as_str())])
            .await?;
        bot_info!("{} published post {}", self.platform, post_id);
        Ok(PostId(post_id))
    }
}
