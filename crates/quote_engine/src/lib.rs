//! Quote engine: collaborator clients, history stores and the publish cycle.
mod cycle;
mod fetch;
mod generator;
mod graph;
mod history_store;
mod http;
mod openai;
mod persist;
mod publish;
mod timeline;
mod twitter;
mod types;

pub use cycle::{Collaborators, CycleError, CycleReport, CycleSettings, PublishCycle};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use generator::{GeneratorError, UniqueContentGenerator};
pub use graph::{
    GraphPublisher, GraphSettings, DEFAULT_INSTAGRAM_GRAPH_BASE, DEFAULT_THREADS_GRAPH_BASE,
};
pub use history_store::{utc_clock, Clock, FileHistoryStore, HistoryStore, MemoryHistoryStore};
pub use http::HttpSettings;
pub use openai::{
    ImageGenerator, OpenAiClient, OpenAiSettings, TextGenerator, DEFAULT_CHAT_MODEL,
    DEFAULT_IMAGE_SIZE, DEFAULT_OPENAI_BASE_URL,
};
pub use persist::{ensure_parent_dir, write_atomically, PersistError};
pub use publish::Publisher;
pub use timeline::TimelineHistoryStore;
pub use twitter::{
    TwitterPublisher, TwitterSettings, DEFAULT_TWITTER_API_BASE, DEFAULT_TWITTER_UPLOAD_BASE,
};
pub use types::{
    FailureKind, FetchError, FetchOutput, GeneratedImage, GenerationError, MediaHandle, Platform,
    PostId, PublishError, RejectionKind, StoreError,
};
