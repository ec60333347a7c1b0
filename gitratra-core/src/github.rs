//! HTTP client for the GitHub repository traffic API
//!
//! Fetches the trailing ~two weeks of daily clone and view records that
//! GitHub retains per repository. Traffic endpoints require push access, so
//! every request is authenticated with the credential passed on the command
//! line.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::types::{DailyRecord, MetricKind};

/// Environment variable holding the basic-auth password for
/// `username:<value>` credentials.
pub const PASSWORD_ENV: &str = "GITRATRA_PASSWORD";

/// Response from GET /user
#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: String,
}

/// One element of a traffic response's `clones`/`views` array.
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: DateTime<Utc>,
    count: u64,
    uniques: u64,
}

/// Response from GET /repos/{owner}/{repo}/traffic/{clones,views}.
///
/// Only the per-day array matters; the rolled-up `count`/`uniques` totals
/// GitHub also returns are recomputed locally from the store.
#[derive(Debug, Deserialize)]
struct TrafficResponse {
    #[serde(default)]
    clones: Vec<RawRecord>,
    #[serde(default)]
    views: Vec<RawRecord>,
}

/// How requests authenticate.
enum Auth {
    /// `Authorization: token <value>`
    Token(HeaderValue),
    /// HTTP basic auth
    Basic { username: String, password: String },
}

/// HTTP client for the GitHub traffic API
pub struct TrafficClient {
    http_client: reqwest::Client,
    base_url: String,
    auth: Auth,
    max_retries: usize,
}

impl TrafficClient {
    /// Create a new client from a parsed credential and API configuration.
    ///
    /// For `username:` credentials the password is read from
    /// [`PASSWORD_ENV`]; a missing password is a configuration error.
    pub fn new(credential: &Credential, config: &ApiConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let auth = match credential {
            Credential::Token(token) => {
                let value = HeaderValue::from_str(&format!("token {}", token))
                    .map_err(|e| Error::Config(format!("invalid token: {}", e)))?;
                Auth::Token(value)
            }
            Credential::Username(username) => {
                let password = std::env::var(PASSWORD_ENV).map_err(|_| {
                    Error::Config(format!(
                        "username credential requires the {} environment variable",
                        PASSWORD_ENV
                    ))
                })?;
                Auth::Basic {
                    username: username.clone(),
                    password,
                }
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("gitratra"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            auth,
            max_retries: config.max_retries,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http_client.get(url);
        match &self.auth {
            Auth::Token(value) => builder.header(AUTHORIZATION, value.clone()),
            Auth::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        }
    }

    /// Login of the authenticated user, used to qualify bare repository
    /// names from the list file.
    pub async fn authenticated_login(&self) -> Result<String> {
        let url = format!("{}/user", self.base_url);
        let user: AuthenticatedUser = self.get_json_with_retry(&url).await?;
        debug!(login = %user.login, "Resolved authenticated user");
        Ok(user.login)
    }

    /// Fetch the daily records for one repository and metric kind.
    ///
    /// `full_name` is `owner/repo`. Records come back in the order GitHub
    /// reports them (ascending by day).
    pub async fn fetch_traffic(
        &self,
        full_name: &str,
        kind: MetricKind,
    ) -> Result<Vec<DailyRecord>> {
        let url = format!(
            "{}/repos/{}/traffic/{}",
            self.base_url,
            full_name,
            kind.as_str()
        );
        let response: TrafficResponse = self.get_json_with_retry(&url).await?;
        let raw = match kind {
            MetricKind::Clones => response.clones,
            MetricKind::Views => response.views,
        };
        Ok(raw
            .into_iter()
            .map(|r| DailyRecord {
                day: r.timestamp.date_naive(),
                count: r.count,
                uniques: r.uniques,
            })
            .collect())
    }

    /// GET a JSON resource, retrying transient failures (5xx, timeouts)
    /// with exponential backoff.
    async fn get_json_with_retry<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T> {
        let mut last_error = None;
        let mut delay = Duration::from_millis(500);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(
                    "Retrying {} (attempt {}/{}), waiting {:?}",
                    url,
                    attempt + 1,
                    self.max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(30));
            }

            match self.get_json(url).await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable_error(&e) => {
                    warn!("Transient error fetching {}: {}", url, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Api("max retries exceeded".to_string())))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Api(format!(
                "GET {} failed ({}): {}",
                url, status, error_text
            )))
        }
    }
}

/// Qualify a repository name from the list file with the authenticated
/// login when it carries no owner of its own.
pub fn qualify_repo_name(name: &str, login: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", login, name)
    }
}

/// Check if an error is retryable (transient)
fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Api(msg) => msg.contains("(500") || msg.contains("(502") || msg.contains("(503"),
        Error::Http(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}
