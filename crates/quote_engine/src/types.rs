use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Twitter,
    Instagram,
    Threads,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Twitter => write!(f, "twitter"),
            Platform::Instagram => write!(f, "instagram"),
            Platform::Threads => write!(f, "threads"),
        }
    }
}

/// Platform-specific reference to uploaded (or referenceable) media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId(pub String);

/// Image produced for a quote. `bytes` is `None` when the download failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    pub bytes: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation api returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("generation request failed: {0}")]
    Network(String),
    #[error("malformed generation response: {0}")]
    Malformed(String),
}

impl GenerationError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{platform} rejected the post ({kind}): {message}")]
pub struct PublishError {
    pub platform: Platform,
    pub kind: RejectionKind,
    pub message: String,
}

impl PublishError {
    pub(crate) fn new(platform: Platform, kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            platform,
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    DuplicateContent,
    Unauthorized,
    RateLimited,
    HttpStatus(u16),
    Network,
    MalformedResponse,
    MediaUnavailable,
}

impl RejectionKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => RejectionKind::Unauthorized,
            403 => RejectionKind::DuplicateContent,
            429 => RejectionKind::RateLimited,
            other => RejectionKind::HttpStatus(other),
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionKind::DuplicateContent => {
                write!(f, "duplicate content or another rules violation")
            }
            RejectionKind::Unauthorized => write!(f, "invalid or expired credentials"),
            RejectionKind::RateLimited => write!(f, "rate limited"),
            RejectionKind::HttpStatus(code) => write!(f, "http status {code}"),
            RejectionKind::Network => write!(f, "network error"),
            RejectionKind::MalformedResponse => write!(f, "malformed response"),
            RejectionKind::MediaUnavailable => write!(f, "media unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub final_url: String,
    pub redirect_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
