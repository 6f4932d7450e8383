// GitHub API HTTP client.
// Handles authentication, rate limiting, and request/response processing.

use std::sync::Mutex;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Serialize;

use crate::error::{AppError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client with authentication and rate limit tracking.
///
/// All request methods take `&self` so one client can drive many
/// concurrent requests; the last seen rate limit headers sit behind a mutex.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    graphql_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client for a REST API root, either the public API or a
    /// GitHub Enterprise `https://host/api/v3`.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Other(e.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ghfolio/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(AppError::Api)?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            graphql_url: graphql_url_for(&base_url),
            base_url,
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Last rate limit snapshot seen in response headers.
    pub fn last_rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|guard| *guard)
            .unwrap_or_default()
    }

    /// Build an absolute URL for an API path.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GraphQL endpoint paired with the REST root.
    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Make a GET request to the GitHub API.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let response = self.send_unchecked(&self.url(endpoint)).await?;
        self.check_response(response).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(params)
            .send()
            .await
            .map_err(AppError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// GET an absolute URL without converting non-success statuses into errors.
    ///
    /// Used for hypermedia links such as `languages_url` where the caller
    /// decides how to treat a failed status.
    pub async fn send_unchecked(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await.map_err(AppError::Api)?;
        self.update_rate_limit(&response);
        Ok(response)
    }

    /// POST a JSON body to an absolute URL.
    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(AppError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };

        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => Ok(response),
            StatusCode::UNAUTHORIZED => Err(AppError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(AppError::NotFound(url))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if self.last_rate_limit().remaining == 0 =>
            {
                Err(AppError::RateLimited {
                    reset_at: format_reset_time(self.last_rate_limit().reset),
                })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::debug!(status = status.as_u16(), %body, "GitHub request failed");
                Err(AppError::Http {
                    status: status.as_u16(),
                })
            }
        }
    }
}

/// GraphQL lives at `/graphql` on the public API but at `/api/graphql`
/// next to an Enterprise `/api/v3` REST root.
fn graphql_url_for(base_url: &str) -> String {
    match base_url.strip_suffix("/api/v3") {
        Some(host) => format!("{}/api/graphql", host),
        None => format!("{}/graphql", base_url),
    }
}

/// Format a rate limit reset epoch (seconds) as a local wall-clock time.
pub fn format_reset_time(reset: u64) -> String {
    chrono::DateTime::from_timestamp(reset as i64, 0)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = GitHubClient::with_base_url("token", "https://ghe.example.com/api/v3/").unwrap();
        assert_eq!(
            client.url("/users/octocat"),
            "https://ghe.example.com/api/v3/users/octocat"
        );
    }

    #[test]
    fn test_graphql_url_public_api() {
        let client = GitHubClient::with_base_url("token", GITHUB_API_BASE).unwrap();
        assert_eq!(client.graphql_url(), "https://api.github.com/graphql");
    }

    #[test]
    fn test_graphql_url_enterprise() {
        let client = GitHubClient::with_base_url("token", "https://ghe.example.com/api/v3/").unwrap();
        assert_eq!(client.graphql_url(), "https://ghe.example.com/api/graphql");
    }

    #[test]
    fn test_format_reset_time() {
        let formatted = format_reset_time(1_700_000_000);
        assert_eq!(formatted.len(), 8);
        assert_eq!(formatted.matches(':').count(), 2);
    }

    #[test]
    fn test_format_reset_time_out_of_range() {
        assert_eq!(format_reset_time(i64::MAX as u64), "unknown");
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!(matches!(
            GitHubClient::with_base_url("bad\ntoken", GITHUB_API_BASE),
            Err(AppError::Other(_))
        ));
    }
}
