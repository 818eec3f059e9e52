//! Error and trait definitions shared by the AbuseIPDB client and its callers.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Environment variable holding the AbuseIPDB API key.
pub const API_KEY_ENV: &str = "ABUSEIPDB_API_KEY";

/// Errors returned while talking to AbuseIPDB.
#[derive(Debug, Error)]
pub enum AbuseIpDbError {
    /// API key absent from the environment at call time.
    #[error("AbuseIPDB API key not set in environment variable '{variable}'.")]
    CredentialMissing {
        /// Variable that was consulted.
        variable: String,
    },
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// AbuseIPDB answered with a non-success status.
    #[error("AbuseIPDB {operation} failed: {} {body}", .status.as_u16())]
    RemoteCallFailed {
        /// Endpoint that failed (`check` or `report`).
        operation: &'static str,
        /// HTTP status returned by the API.
        status: StatusCode,
        /// Body text returned with the status.
        body: String,
    },
}

/// Reputation lookups used by the AbuseIPDB tools.
#[async_trait]
pub trait IpReputationApi: Send + Sync {
    /// Query reputation data for `ip`.
    async fn check_ip(&self, ip: &str) -> Result<Value, AbuseIpDbError>;

    /// File an abuse report for `ip`.
    async fn report_ip(
        &self,
        ip: &str,
        categories: &str,
        comment: &str,
    ) -> Result<Value, AbuseIpDbError>;
}
