//! AbuseIPDB reputation service integration.

pub mod client;
pub mod types;

pub use client::AbuseIpDbClient;
pub use types::{API_KEY_ENV, AbuseIpDbError, IpReputationApi};
