//! HTTP client session for the portal backend.
//!
//! One `reqwest::Client` is built per run and reused for every request, so
//! connection pooling works the way a browser session would. No retries, no
//! backoff: a transport failure surfaces as a case failure.

pub mod error;
pub mod response;

use std::time::Duration;

use serde_json::Value;

pub use error::CheckError;
pub use response::ApiResponse;

use crate::config::Config;

/// HTTP client bound to the portal API base URL
pub struct ApiClient {
    /// Base URL including the `/api` prefix, without a trailing slash
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, CheckError> {
        let url = self.url(path);
        let resp = self.client.get(&url).send().await?;
        Self::read("GET", &url, resp).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, CheckError> {
        let url = self.url(path);
        let resp = self.client.post(&url).json(body).send().await?;
        Self::read("POST", &url, resp).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, CheckError> {
        let url = self.url(path);
        let resp = self.client.put(&url).json(body).send().await?;
        Self::read("PUT", &url, resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, CheckError> {
        let url = self.url(path);
        let resp = self.client.delete(&url).send().await?;
        Self::read("DELETE", &url, resp).await
    }

    async fn read(
        method: &str,
        url: &str,
        resp: reqwest::Response,
    ) -> Result<ApiResponse, CheckError> {
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        log::debug!("{} {} -> {} ({} bytes)", method, url, status, text.len());
        Ok(ApiResponse::from_parts(status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> ApiClient {
        let config = Config {
            base_url: base.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config)
    }

    #[test]
    fn test_url_join() {
        let client = client_for("http://localhost:3000/api");
        assert_eq!(
            client.url("/students"),
            "http://localhost:3000/api/students"
        );
    }

    #[test]
    fn test_url_join_trailing_slash() {
        let client = client_for("http://localhost:3000/api/");
        assert_eq!(client.url("/"), "http://localhost:3000/api/");
        assert_eq!(
            client.url("/requests?studentId=abc"),
            "http://localhost:3000/api/requests?studentId=abc"
        );
    }
}
