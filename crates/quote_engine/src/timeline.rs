use bot_logging::{bot_debug, bot_info};
use quote_core::extract_quote;
use serde::Deserialize;

use crate::http::{build_client, endpoint, error_body};
use crate::history_store::HistoryStore;
use crate::twitter::TwitterSettings;
use crate::StoreError;

/// Page size bounds accepted by the user timeline endpoint.
const MIN_PAGE: usize = 5;
const MAX_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct UserLookup {
    data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(default)]
    data: Vec<TimelinePost>,
}

#[derive(Debug, Deserialize)]
struct TimelinePost {
    text: String,
}

/// Uses the account's own recent posts as history.
///
/// The platform is the source of truth here, so `record` does nothing.
#[derive(Debug, Clone)]
pub struct TimelineHistoryStore {
    client: reqwest::Client,
    settings: TwitterSettings,
    username: String,
}

impl TimelineHistoryStore {
    pub fn new(settings: TwitterSettings, username: impl Into<String>) -> Result<Self, StoreError> {
        let client = build_client(&settings.http)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self {
            client,
            settings,
            username: username.into().trim_start_matches('@').to_string(),
        })
    }

    async fn get_json<T>(&self, url: String, query: &[(&str, String)]) -> Result<T, StoreError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.settings.bearer_token)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "timeline request returned {}: {}",
                status.as_u16(),
                error_body(response).await
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| StoreError::Unavailable(format!("malformed timeline response: {err}")))
    }

    async fn user_id(&self) -> Result<String, StoreError> {
        let url = endpoint(
            &self.settings.api_base,
            &format!("2/users/by/username/{}", self.username),
        );
        let lookup: UserLookup = self.get_json(url, &[]).await?;
        lookup
            .data
            .map(|user| user.id)
            .ok_or_else(|| StoreError::Unavailable(format!("unknown account @{}", self.username)))
    }
}

#[async_trait::async_trait]
impl HistoryStore for TimelineHistoryStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let user_id = self.user_id().await?;
        bot_debug!("Resolved @{} to user id {}", self.username, user_id);

        let url = endpoint(&self.settings.api_base, &format!("2/users/{user_id}/tweets"));
        let page = limit.clamp(MIN_PAGE, MAX_PAGE);
        let timeline: Timeline = self
            .get_json(
                url,
                &[
                    ("tweet.fields", "created_at,text".to_string()),
                    ("max_results", page.to_string()),
                ],
            )
            .await?;

        let quotes: Vec<String> = timeline
            .data
            .iter()
            .map(|post| extract_quote(&post.text))
            .filter(|quote| !quote.is_empty())
            .take(limit)
            .collect();
        bot_info!(
            "Loaded {} quotes from {} recent posts of @{}",
            quotes.len(),
            timeline.data.len(),
            self.username
        );
        Ok(quotes)
    }

    async fn record(&self, _text: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
