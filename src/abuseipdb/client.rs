//! HTTP client wrapper for the AbuseIPDB v2 API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

use super::types::{API_KEY_ENV, AbuseIpDbError, IpReputationApi};
use crate::config::Config;

/// Report age window sent with every `check` call.
pub const MAX_AGE_IN_DAYS: &str = "90";

/// Stateless AbuseIPDB client. Each call makes exactly one request and never retries.
pub struct AbuseIpDbClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key_var: String,
}

impl AbuseIpDbClient {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AbuseIpDbError> {
        let client = Client::builder()
            .user_agent(concat!("mcptool/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!(url = %base_url, timeout_secs = timeout.as_secs(), "Initialized AbuseIPDB HTTP client");
        Ok(Self {
            client,
            base_url,
            api_key_var: API_KEY_ENV.to_string(),
        })
    }

    /// Construct a client from runtime configuration.
    pub fn from_config(config: &Config) -> Result<Self, AbuseIpDbError> {
        Self::new(
            &config.abuseipdb_base_url,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    /// Read the credential from a different environment variable.
    pub fn with_api_key_var(mut self, variable: impl Into<String>) -> Self {
        self.api_key_var = variable.into();
        self
    }

    fn require_api_key(&self) -> Result<String, AbuseIpDbError> {
        std::env::var(&self.api_key_var)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AbuseIpDbError::CredentialMissing {
                variable: self.api_key_var.clone(),
            })
    }

    fn request(
        &self,
        method: Method,
        endpoint: &str,
    ) -> Result<reqwest::RequestBuilder, AbuseIpDbError> {
        let api_key = self.require_api_key()?;
        let url = format!("{}/{endpoint}", self.base_url);
        Ok(self
            .client
            .request(method, url)
            .header("Key", api_key)
            .header("Accept", "application/json"))
    }

    async fn parse_response(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<Value, AbuseIpDbError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = AbuseIpDbError::RemoteCallFailed {
                operation,
                status,
                body,
            };
            tracing::warn!(operation, error = %error, "AbuseIPDB request failed");
            return Err(error);
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IpReputationApi for AbuseIpDbClient {
    /// Query the `check` endpoint for information about an IP address.
    async fn check_ip(&self, ip: &str) -> Result<Value, AbuseIpDbError> {
        let response = self
            .request(Method::GET, "check")?
            .query(&[("ipAddress", ip), ("maxAgeInDays", MAX_AGE_IN_DAYS)])
            .send()
            .await?;
        Self::parse_response("check", response).await
    }

    /// Report an IP address through the `report` endpoint.
    async fn report_ip(
        &self,
        ip: &str,
        categories: &str,
        comment: &str,
    ) -> Result<Value, AbuseIpDbError> {
        let response = self
            .request(Method::POST, "report")?
            .form(&[("ip", ip), ("categories", categories), ("comment", comment)])
            .send()
            .await?;
        Self::parse_response("report", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use serde_json::json;

    fn client_for(server: &MockServer, api_key_var: &str) -> AbuseIpDbClient {
        AbuseIpDbClient::new(&server.base_url(), Duration::from_secs(10))
            .expect("client")
            .with_api_key_var(api_key_var)
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: each test uses its own variable name, so no other thread reads it concurrently.
        unsafe { std::env::set_var(key, value) }
    }

    #[tokio::test]
    async fn check_ip_sends_key_and_query() {
        let server = MockServer::start_async().await;
        set_env("MCPTOOL_TEST_KEY_CHECK_OK", "test-key");
        let body = json!({ "data": { "ipAddress": "1.2.3.4", "abuseConfidenceScore": 5 } });

        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/check")
                    .header("key", "test-key")
                    .header("accept", "application/json")
                    .query_param("ipAddress", "1.2.3.4")
                    .query_param("maxAgeInDays", "90");
                then.status(200).json_body(body.clone());
            })
            .await;

        let result = client_for(&server, "MCPTOOL_TEST_KEY_CHECK_OK")
            .check_ip("1.2.3.4")
            .await
            .expect("check succeeds");

        mock.assert_async().await;
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn check_ip_requires_credential() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/check");
                then.status(200).json_body(json!({}));
            })
            .await;

        let err = client_for(&server, "MCPTOOL_TEST_KEY_NEVER_SET")
            .check_ip("1.2.3.4")
            .await
            .expect_err("missing key must fail");

        assert!(matches!(err, AbuseIpDbError::CredentialMissing { .. }));
        assert!(err.to_string().contains("MCPTOOL_TEST_KEY_NEVER_SET"));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn report_ip_posts_form_body() {
        let server = MockServer::start_async().await;
        set_env("MCPTOOL_TEST_KEY_REPORT_OK", "test-key");
        let body = json!({ "data": { "ipAddress": "1.2.3.4", "abuseConfidenceScore": 52 } });

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/report")
                    .header("key", "test-key")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body_contains("ip=1.2.3.4")
                    .body_contains("categories=14%2C18")
                    .body_contains("comment=Brute+force");
                then.status(200).json_body(body.clone());
            })
            .await;

        let result = client_for(&server, "MCPTOOL_TEST_KEY_REPORT_OK")
            .report_ip("1.2.3.4", "14,18", "Brute force")
            .await
            .expect("report succeeds");

        mock.assert_async().await;
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn report_ip_surfaces_status_and_body() {
        let server = MockServer::start_async().await;
        set_env("MCPTOOL_TEST_KEY_REPORT_FAIL", "test-key");
        server
            .mock_async(|when, then| {
                when.method(POST).path("/report");
                then.status(500).body("boom");
            })
            .await;

        let err = client_for(&server, "MCPTOOL_TEST_KEY_REPORT_FAIL")
            .report_ip("1.2.3.4", "14", "Bad actor")
            .await
            .expect_err("500 must fail");

        match &err {
            AbuseIpDbError::RemoteCallFailed { status, body, .. } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected remote failure, got {other:?}"),
        }
        assert_eq!(err.to_string(), "AbuseIPDB report failed: 500 boom");
    }
}
