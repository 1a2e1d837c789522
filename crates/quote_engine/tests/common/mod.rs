#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use quote_core::CompletionRequest;
use quote_engine::{
    FailureKind, FetchError, FetchOutput, Fetcher, GeneratedImage, GenerationError,
    HistoryStore, ImageGenerator, MediaHandle, Platform, PostId, PublishError, Publisher,
    RejectionKind, StoreError, TextGenerator,
};

/// Answers completion requests from a script, one entry per call.
#[derive(Default)]
pub struct ScriptedText {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedText {
    pub fn new(script: Vec<Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedText {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Network("script exhausted".into())))
    }
}

/// Always fails, counting calls.
#[derive(Default)]
pub struct FailingText {
    calls: Mutex<usize>,
}

impl FailingText {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl TextGenerator for FailingText {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        Err(GenerationError::Api {
            status: 429,
            body: "rate limited".into(),
        })
    }
}

pub struct StaticImage {
    pub result: Result<String, GenerationError>,
    pub prompts: Mutex<Vec<String>>,
}

impl StaticImage {
    pub fn ok(url: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(url.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Err(GenerationError::Api {
                status: 400,
                body: "content policy".into(),
            }),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl ImageGenerator for StaticImage {
    async fn create_image(&self, prompt: &str, _size: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.result.clone()
    }
}

pub struct StaticFetcher {
    pub ok: bool,
}

#[async_trait::async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        if self.ok {
            Ok(FetchOutput {
                bytes: vec![0x89, b'P', b'N', b'G'],
                content_type: Some("image/png".into()),
                final_url: url.to_string(),
                redirect_count: 0,
            })
        } else {
            Err(FetchError {
                kind: FailureKind::HttpStatus(404),
                message: "gone".into(),
            })
        }
    }
}

pub struct UnavailableStore;

#[async_trait::async_trait]
impl HistoryStore for UnavailableStore {
    async fn fetch_recent(&self, _limit: usize) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn record(&self, _text: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// Records what it was asked to publish; optionally refuses at `post`.
pub struct RecordingPublisher {
    pub platform: Platform,
    pub needs_bytes: bool,
    pub reject: Option<RejectionKind>,
    pub posts: Mutex<Vec<(String, GeneratedImage)>>,
}

impl RecordingPublisher {
    pub fn accepting(platform: Platform, needs_bytes: bool) -> Arc<Self> {
        Arc::new(Self {
            platform,
            needs_bytes,
            reject: None,
            posts: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting(platform: Platform, kind: RejectionKind) -> Arc<Self> {
        Arc::new(Self {
            platform,
            needs_bytes: false,
            reject: Some(kind),
            posts: Mutex::new(Vec::new()),
        })
    }

    pub fn posted_texts(&self) -> Vec<String> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Publisher for RecordingPublisher {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn needs_image_bytes(&self) -> bool {
        self.needs_bytes
    }

    async fn upload(&self, image: &GeneratedImage) -> Result<MediaHandle, PublishError> {
        if self.needs_bytes && image.bytes.is_none() {
            return Err(PublishError {
                platform: self.platform,
                kind: RejectionKind::MediaUnavailable,
                message: "no bytes".into(),
            });
        }
        self.posts
            .lock()
            .unwrap()
            .push((String::new(), image.clone()));
        Ok(MediaHandle(image.url.clone()))
    }

    async fn post(&self, text: &str, _media: &MediaHandle) -> Result<PostId, PublishError> {
        if let Some(kind) = &self.reject {
            return Err(PublishError {
                platform: self.platform,
                kind: kind.clone(),
                message: "refused".into(),
            });
        }
        let mut posts = self.posts.lock().unwrap();
        if let Some(last) = posts.last_mut() {
            last.0 = text.to_string();
        }
        Ok(PostId(format!("{}-1", self.platform)))
    }
}
