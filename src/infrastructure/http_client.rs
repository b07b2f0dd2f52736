//! HTTP client seam for provider backends
//!
//! Transport failures and non-success statuses are classified into the
//! provider error taxonomy here, so every HTTP-backed provider shares one
//! mapping: 401/403 mean a rejected credential, 404 an unknown model or
//! endpoint, 429 a rate limit, and everything else (including timeouts) a
//! connection failure.

use async_trait::async_trait;

use crate::domain::provider::ProviderError;

/// Trait for HTTP operations, mockable in tests
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::connection_with_source("failed to build HTTP client", e))?;

        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.json(body).send().await.map_err(|e| {
            ProviderError::connection_with_source(format!("request to {url} failed"), e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &error_body));
        }

        response.json().await.map_err(|e| {
            ProviderError::connection_with_source("failed to parse response body", e)
        })
    }
}

/// Map an HTTP status to a provider error kind
fn classify_status(status: u16, body: &str) -> ProviderError {
    let message = format!("HTTP {status}: {body}");

    match status {
        401 | 403 => ProviderError::invalid_api_key(message),
        404 => ProviderError::model_not_found(message),
        429 => ProviderError::rate_limit_exceeded(message),
        _ => ProviderError::connection(message),
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Scripted HTTP client keyed by URL
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, serde_json::Value>>,
        errors: RwLock<HashMap<String, u16>>,
        requests: RwLock<Vec<serde_json::Value>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        /// Fail requests to this URL with an HTTP status
        pub fn with_status_error(self, url: impl Into<String>, status: u16) -> Self {
            self.errors.write().unwrap().insert(url.into(), status);
            self
        }

        /// Bodies of every request made through this client
        pub fn requests(&self) -> Vec<serde_json::Value> {
            self.requests.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            _headers: Vec<(&str, &str)>,
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, ProviderError> {
            self.requests.write().unwrap().push(body.clone());

            if let Some(status) = self.errors.read().unwrap().get(url) {
                return Err(super::classify_status(*status, "mock error"));
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| ProviderError::connection(format!("no mock response for {url}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(401, "").code(), "invalid_api_key");
        assert_eq!(classify_status(403, "").code(), "invalid_api_key");
        assert_eq!(classify_status(404, "").code(), "model_not_found");
        assert_eq!(classify_status(429, "").code(), "rate_limit_exceeded");
        assert_eq!(classify_status(500, "").code(), "connection_failure");
        assert_eq!(classify_status(502, "").code(), "connection_failure");
    }

    #[test]
    fn test_classification_preserves_body() {
        let error = classify_status(401, "key revoked");
        assert!(error.to_string().contains("key revoked"));
    }
}
