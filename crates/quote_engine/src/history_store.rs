use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bot_logging::{bot_debug, bot_info};
use chrono::Utc;
use quote_core::HistoryWindow;

use crate::persist::{write_atomically, PersistError};
use crate::StoreError;

/// Remembers published quotes for duplicate detection.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Up to `limit` quote texts, most recent first. No side effects.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<String>, StoreError>;

    /// Stores `text` as the most recent entry, evicting the oldest beyond capacity.
    async fn record(&self, text: &str) -> Result<(), StoreError>;
}

/// Produces the `posted_at` stamp for new records.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

pub fn utc_clock() -> Clock {
    Arc::new(|| Utc::now().to_rfc3339())
}

impl From<PersistError> for StoreError {
    fn from(err: PersistError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Process-local history, lost on exit.
pub struct MemoryHistoryStore {
    window: Mutex<HistoryWindow>,
    clock: Clock,
}

impl MemoryHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: Mutex::new(HistoryWindow::new(capacity)),
            clock: utc_clock(),
        }
    }

    /// Seeds the store, oldest text first.
    pub fn with_texts<I, S>(capacity: usize, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut window = HistoryWindow::new(capacity);
        for text in texts {
            window.record(text, None);
        }
        Self {
            window: Mutex::new(window),
            clock: utc_clock(),
        }
    }

    pub fn snapshot(&self) -> HistoryWindow {
        self.window
            .lock()
            .map(|window| window.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        let window = self
            .window
            .lock()
            .map_err(|_| StoreError::Unavailable("history lock poisoned".into()))?;
        Ok(window.recent(limit))
    }

    async fn record(&self, text: &str) -> Result<(), StoreError> {
        let mut window = self
            .window
            .lock()
            .map_err(|_| StoreError::Unavailable("history lock poisoned".into()))?;
        window.record(text, Some((self.clock)()));
        Ok(())
    }
}

/// History persisted as a RON document, rewritten atomically on each record.
pub struct FileHistoryStore {
    path: PathBuf,
    capacity: usize,
    clock: Clock,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            clock: utc_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty window; an unreadable one is an error.
    pub fn load(&self) -> Result<HistoryWindow, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                bot_debug!("No history file at {:?}; starting empty", self.path);
                return Ok(HistoryWindow::new(self.capacity));
            }
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to read {:?}: {}",
                    self.path, err
                )));
            }
        };

        let window: HistoryWindow = ron::from_str(&content).map_err(|err| {
            StoreError::Unavailable(format!("failed to parse {:?}: {}", self.path, err))
        })?;
        Ok(window.with_capacity(self.capacity))
    }

    fn save(&self, window: &HistoryWindow) -> Result<(), StoreError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(window, pretty)
            .map_err(|err| StoreError::Unavailable(format!("failed to serialize history: {err}")))?;
        write_atomically(&self.path, &content)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl HistoryStore for FileHistoryStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.recent(limit))
    }

    async fn record(&self, text: &str) -> Result<(), StoreError> {
        // A corrupt file is reported rather than overwritten with a fresh window.
        let mut window = self.load()?;
        if let Some(evicted) = window.record(text, Some((self.clock)())) {
            bot_debug!("Evicted oldest history entry #{}", evicted.sequence);
        }
        self.save(&window)?;
        bot_info!(
            "Recorded quote in {:?} ({} of {} entries)",
            self.path,
            window.len(),
            window.capacity()
        );
        Ok(())
    }
}
