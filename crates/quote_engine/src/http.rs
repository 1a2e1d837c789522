use std::time::Duration;

/// Timeouts shared by every API client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            // Image generation routinely takes tens of seconds.
            request_timeout: Duration::from_secs(120),
        }
    }
}

pub(crate) fn build_client(settings: &HttpSettings) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .user_agent(concat!("quote_bot/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Joins a base URL and a path without doubling or dropping the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Response body for error messages, cut short so logs stay readable.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    const MAX_ERROR_BODY: usize = 500;
    let body = response.text().await.unwrap_or_default();
    quote_core::truncate_chars(body.trim(), MAX_ERROR_BODY).to_string()
}

#[cfg(test)]
mod tests {
    use super::endpoint;

    #[test]
    fn endpoint_normalizes_slashes() {
        assert_eq!(endpoint("https://a.test/v1/", "/chat"), "https://a.test/v1/chat");
        assert_eq!(endpoint("https://a.test/v1", "chat"), "https://a.test/v1/chat");
    }
}
