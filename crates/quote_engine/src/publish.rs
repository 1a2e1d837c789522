use crate::{GeneratedImage, MediaHandle, Platform, PostId, PublishError, RejectionKind};

/// One social platform. Failures stay local to the platform that produced them.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Whether `upload` needs the downloaded image bytes rather than just its URL.
    fn needs_image_bytes(&self) -> bool {
        false
    }

    async fn upload(&self, image: &GeneratedImage) -> Result<MediaHandle, PublishError>;

    async fn post(&self, text: &str, media: &MediaHandle) -> Result<PostId, PublishError>;
}

pub(crate) fn network_error(platform: Platform, err: reqwest::Error) -> PublishError {
    PublishError::new(platform, RejectionKind::Network, err.to_string())
}

pub(crate) fn malformed(platform: Platform, detail: impl Into<String>) -> PublishError {
    PublishError::new(platform, RejectionKind::MalformedResponse, detail)
}
