//! Wires configuration into engine collaborators and runs one cycle.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bot_logging::{bot_error, bot_info, bot_warn, redact};
use quote_engine::{
    Collaborators, CycleReport, CycleSettings, FetchSettings, FileHistoryStore, GraphPublisher,
    HistoryStore, MemoryHistoryStore, OpenAiClient, Publisher, PublishCycle, ReqwestFetcher,
    TimelineHistoryStore, TwitterPublisher,
};

use crate::config::{BotConfig, HistoryBackend};

pub fn build_cycle(config: &BotConfig) -> Result<PublishCycle> {
    log_config(config);

    let openai = Arc::new(
        OpenAiClient::new(config.openai.clone()).context("building the OpenAI client")?,
    );

    Ok(PublishCycle::new(
        Collaborators {
            history: history_store(config)?,
            text: openai.clone(),
            images: openai,
            fetcher: Arc::new(ReqwestFetcher::new(FetchSettings::default())),
            publishers: publishers(config)?,
        },
        CycleSettings {
            history_limit: config.history_capacity,
            image_size: config.image_size.clone(),
            dry_run: config.dry_run,
            generator: config.generator,
        },
    ))
}

fn history_store(config: &BotConfig) -> Result<Arc<dyn HistoryStore>> {
    let store: Arc<dyn HistoryStore> = match config.history {
        HistoryBackend::File => Arc::new(FileHistoryStore::new(
            &config.history_path,
            config.history_capacity,
        )),
        HistoryBackend::Memory => Arc::new(MemoryHistoryStore::new(config.history_capacity)),
        HistoryBackend::Timeline => {
            let Some(twitter) = config.twitter.clone() else {
                bail!("timeline history needs Twitter credentials");
            };
            Arc::new(
                TimelineHistoryStore::new(twitter, config.twitter_username.as_str())
                    .context("building the timeline history store")?,
            )
        }
    };
    Ok(store)
}

fn publishers(config: &BotConfig) -> Result<Vec<Arc<dyn Publisher>>> {
    let mut publishers: Vec<Arc<dyn Publisher>> = Vec::new();
    if let Some(twitter) = &config.twitter {
        publishers.push(Arc::new(
            TwitterPublisher::new(twitter.clone()).context("building the Twitter publisher")?,
        ));
    }
    if let Some(instagram) = &config.instagram {
        publishers.push(Arc::new(
            GraphPublisher::instagram(instagram.clone())
                .context("building the Instagram publisher")?,
        ));
    }
    if let Some(threads) = &config.threads {
        publishers.push(Arc::new(
            GraphPublisher::threads(threads.clone()).context("building the Threads publisher")?,
        ));
    }
    Ok(publishers)
}

fn log_config(config: &BotConfig) {
    bot_info!(
        "OpenAI: base={} model={} key={} image_size={}",
        config.openai.base_url,
        config.openai.chat_model,
        redact(&config.openai.api_key),
        config.image_size
    );
    if let Some(twitter) = &config.twitter {
        bot_info!("Twitter enabled: token={}", redact(&twitter.bearer_token));
    }
    if let Some(instagram) = &config.instagram {
        bot_info!(
            "Instagram enabled: user={} token={}",
            instagram.user_id,
            redact(&instagram.access_token)
        );
    }
    if let Some(threads) = &config.threads {
        bot_info!(
            "Threads enabled: user={} token={}",
            threads.user_id,
            redact(&threads.access_token)
        );
    }
    match config.history {
        HistoryBackend::File => bot_info!(
            "History: file {:?} (capacity {})",
            config.history_path,
            config.history_capacity
        ),
        HistoryBackend::Timeline => bot_info!("History: timeline of @{}", config.twitter_username),
        HistoryBackend::Memory => bot_warn!("History: in-memory only; nothing survives this run"),
    }
    bot_info!(
        "Generator: threshold={} max_attempts={} dry_run={}",
        config.generator.similarity_threshold,
        config.generator.max_attempts,
        config.dry_run
    );
}

/// Logs the cycle result and turns "nothing published" into an error.
pub fn conclude(report: &CycleReport) -> Result<()> {
    for (platform, post) in &report.published {
        bot_info!("{} post id: {}", platform, post.0);
    }
    for rejection in &report.rejected {
        bot_warn!("{} rejected the post ({})", rejection.platform, rejection.kind);
    }

    if report.dry_run {
        bot_info!("Dry run finished: {}", report.quote.display_text);
        return Ok(());
    }
    if !report.succeeded() {
        bot_error!("Every platform rejected the post");
        bail!(
            "all {} platform(s) rejected the post",
            report.rejected.len()
        );
    }
    if !report.recorded {
        bot_warn!("Posted, but the quote is missing from history");
    }
    bot_info!(
        "Cycle complete: {} published, {} rejected",
        report.published.len(),
        report.rejected.len()
    );
    Ok(())
}
