use std::sync::Arc;

use bot_logging::{bot_error, bot_info, bot_warn};
use quote_core::{
    truncate_chars, GeneratorSettings, UniqueQuote, DEFAULT_HISTORY_CAPACITY,
    MAX_IMAGE_PROMPT_CHARS,
};
use thiserror::Error;

use crate::fetch::Fetcher;
use crate::generator::{GeneratorError, UniqueContentGenerator};
use crate::history_store::HistoryStore;
use crate::openai::{ImageGenerator, TextGenerator, DEFAULT_IMAGE_SIZE};
use crate::publish::Publisher;
use crate::{GeneratedImage, GenerationError, Platform, PostId, PublishError};

#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// How many past quotes are checked for duplicates.
    pub history_limit: usize,
    pub image_size: String,
    /// Generate everything but publish and record nothing.
    pub dry_run: bool,
    pub generator: GeneratorSettings,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_CAPACITY,
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            dry_run: false,
            generator: GeneratorSettings::default(),
        }
    }
}

/// Everything a cycle talks to, behind the collaborator traits.
#[derive(Clone)]
pub struct Collaborators {
    pub history: Arc<dyn HistoryStore>,
    pub text: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    pub fetcher: Arc<dyn Fetcher>,
    pub publishers: Vec<Arc<dyn Publisher>>,
}

/// Errors that end a cycle before anything is published.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Generation(#[from] GeneratorError),
    #[error("image generation failed: {0}")]
    ImageFailed(GenerationError),
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub quote: UniqueQuote,
    pub image_url: String,
    pub published: Vec<(Platform, PostId)>,
    pub rejected: Vec<PublishError>,
    /// Whether the accepted quote made it into history.
    pub recorded: bool,
    pub dry_run: bool,
}

impl CycleReport {
    /// A dry run succeeds by generating; a real run needs at least one platform.
    pub fn succeeded(&self) -> bool {
        self.dry_run || !self.published.is_empty()
    }
}

/// One publish cycle: history → unique quote → image → platforms → history.
pub struct PublishCycle {
    collaborators: Collaborators,
    settings: CycleSettings,
}

impl PublishCycle {
    pub fn new(collaborators: Collaborators, settings: CycleSettings) -> Self {
        Self {
            collaborators,
            settings,
        }
    }

    pub fn settings(&self) -> &CycleSettings {
        &self.settings
    }

    pub async fn run(&self) -> Result<CycleReport, CycleError> {
        let history = self.load_history().await;

        let generator =
            UniqueContentGenerator::new(self.collaborators.text.clone(), self.settings.generator);
        let quote = generator.generate_unique_quote(history).await?;
        bot_info!("Generated post: {}", quote.display_text);

        let prompt = match truncate_chars(&quote.image_prompt, MAX_IMAGE_PROMPT_CHARS) {
            "" => quote.quote_text.as_str(),
            prompt => prompt,
        };
        let image_url = self
            .collaborators
            .images
            .create_image(prompt, &self.settings.image_size)
            .await
            .map_err(CycleError::ImageFailed)?;
        bot_info!("Generated image URL: {}", image_url);

        let mut report = CycleReport {
            quote,
            image_url,
            published: Vec::new(),
            rejected: Vec::new(),
            recorded: false,
            dry_run: self.settings.dry_run,
        };

        if self.settings.dry_run {
            bot_info!("Dry run: skipping publishing and history");
            return Ok(report);
        }

        let image = self.download_image(&report.image_url).await;
        for publisher in &self.collaborators.publishers {
            match publish_one(publisher.as_ref(), &image, &report.quote.display_text).await {
                Ok(post_id) => {
                    bot_info!("Posted to {}: {}", publisher.platform(), post_id.0);
                    report.published.push((publisher.platform(), post_id));
                }
                Err(err) => {
                    bot_error!("{}", err);
                    report.rejected.push(err);
                }
            }
        }

        if !report.published.is_empty() {
            match self
                .collaborators
                .history
                .record(&report.quote.quote_text)
                .await
            {
                Ok(()) => report.recorded = true,
                Err(err) => bot_warn!("Quote was posted but not recorded: {}", err),
            }
        }

        Ok(report)
    }

    async fn load_history(&self) -> Vec<String> {
        match self
            .collaborators
            .history
            .fetch_recent(self.settings.history_limit)
            .await
        {
            Ok(history) => {
                bot_info!("Loaded {} previous quotes", history.len());
                history
            }
            Err(err) => {
                bot_warn!("{}; continuing with empty history", err);
                Vec::new()
            }
        }
    }

    async fn download_image(&self, url: &str) -> GeneratedImage {
        let wanted = self
            .collaborators
            .publishers
            .iter()
            .any(|publisher| publisher.needs_image_bytes());
        if !wanted {
            return GeneratedImage {
                url: url.to_string(),
                bytes: None,
                content_type: None,
            };
        }

        match self.collaborators.fetcher.fetch(url).await {
            Ok(output) => GeneratedImage {
                url: url.to_string(),
                bytes: Some(output.bytes),
                content_type: output.content_type,
            },
            Err(err) => {
                bot_warn!("Image download failed: {}", err);
                GeneratedImage {
                    url: url.to_string(),
                    bytes: None,
                    content_type: None,
                }
            }
        }
    }
}

async fn publish_one(
    publisher: &dyn Publisher,
    image: &GeneratedImage,
    text: &str,
) -> Result<PostId, PublishError> {
    let media = publisher.upload(image).await?;
    publisher.post(text, &media).await
}
