//! Synchronous GitHub API client — ureq, no async runtime.
//!
//! Status handling is done here so the facet fetchers stay simple:
//! 404/409 mean "known empty", 202 means "stats still computing", rate limits
//! are retried with a bounded sleep, everything else is a typed error the
//! caller may degrade.

use crate::error::{AnalyzerError, Result};
use crate::github::api::SearchCount;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;

const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("repoqual/", env!("CARGO_PKG_VERSION"));
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
/// Pagination safety stop: 100 pages of 100 items.
const MAX_PAGES: u32 = 100;

pub struct GitHubClient {
    agent: ureq::Agent,
    token: String,
    base_url: String,
}

fn make_agent(verify_tls: bool) -> ureq::Agent {
    let mut builder = ureq::config::Config::builder()
        .http_status_as_error(false) // status codes are handled in get_json
        .timeout_global(Some(Duration::from_secs(30)));
    if !verify_tls {
        builder = builder.tls_config(
            ureq::tls::TlsConfig::builder()
                .disable_verification(true)
                .build(),
        );
    }
    builder.build().new_agent()
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>, verify_tls: bool) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: make_agent(verify_tls),
            token: token.into(),
            base_url,
        }
    }

    /// GET a JSON resource under the API base URL.
    ///
    /// `Ok(None)` marks a known-empty facet: 404 (missing/empty repo), 409
    /// (empty repository commit listing), 202 (statistics still being
    /// computed server-side).
    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;
        loop {
            let mut request = self
                .agent
                .get(&url)
                .header("Authorization", &format!("token {}", self.token))
                .header("Accept", ACCEPT)
                .header("User-Agent", USER_AGENT);
            for (key, value) in query {
                request = request.query(*key, value);
            }

            let response = request.call().map_err(|e| AnalyzerError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

            let status = response.status().as_u16();
            match status {
                200..=201 | 203..=299 => {
                    return response
                        .into_body()
                        .read_json::<T>()
                        .map(Some)
                        .map_err(|e| AnalyzerError::Transport {
                            url: url.clone(),
                            message: e.to_string(),
                        });
                }
                202 | 404 | 409 => {
                    debug!("{url} returned {status}; treating facet as empty");
                    return Ok(None);
                }
                403 | 429 => {
                    if attempt >= MAX_RATE_LIMIT_RETRIES {
                        return Err(AnalyzerError::RateLimitExhausted(url));
                    }
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|value| value.to_str().ok())
                        .and_then(|value| value.parse::<u64>().ok());
                    let wait = retry_delay(retry_after, attempt);
                    warn!(
                        "rate limited on {url}; retrying in {}s (attempt {}/{MAX_RATE_LIMIT_RETRIES})",
                        wait.as_secs(),
                        attempt + 1
                    );
                    std::thread::sleep(wait);
                    attempt += 1;
                }
                _ => return Err(AnalyzerError::ApiStatus { status, url }),
            }
        }
    }

    /// Page through a list endpoint until a short page or the safety cap.
    pub fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        extra: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut all = Vec::new();
        for page in 1..=MAX_PAGES {
            let mut query = vec![
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            query.extend(extra.iter().map(|(key, value)| (*key, value.clone())));

            let Some(batch) = self.get_json::<Vec<T>>(path, &query)? else {
                break;
            };
            let fetched = batch.len();
            all.extend(batch);
            if fetched < PER_PAGE as usize {
                break;
            }
        }
        Ok(all)
    }

    /// Total-count probe against the issues Search API (`per_page=1`).
    pub fn search_issue_count(&self, q: &str) -> Result<u64> {
        let query = [("q", q.to_string()), ("per_page", "1".to_string())];
        Ok(self
            .get_json::<SearchCount>("/search/issues", &query)?
            .map(|count| count.total_count)
            .unwrap_or(0))
    }
}

fn retry_delay(retry_after_secs: Option<u64>, attempt: u32) -> Duration {
    match retry_after_secs {
        // The server told us how long; trust it within reason.
        Some(secs) => Duration::from_secs(secs.min(120)),
        None => Duration::from_secs(2u64.pow(attempt + 1)),
    }
}
