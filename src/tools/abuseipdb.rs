//! AbuseIPDB check/report tools.

use serde_json::Value;

use crate::abuseipdb::IpReputationApi;

use super::{
    arguments::{self, TriggerPayload},
    spec::{
        ABUSEIPDB_CHECK_IP, ABUSEIPDB_REPORT_IP, CATEGORIES_PROPERTY, COMMENT_PROPERTY,
        IP_PROPERTY,
    },
};

/// Look up an IP and return the API response as JSON text.
///
/// Client failures, including a missing API key, become `Error checking IP: ...`.
pub async fn abuseipdb_check_ip(api: &dyn IpReputationApi, payload: &TriggerPayload) -> String {
    let args = match arguments::extract_for(payload, &ABUSEIPDB_CHECK_IP) {
        Ok(args) => args,
        Err(err) => return err.to_string(),
    };
    let ip = args.required(IP_PROPERTY);

    match api.check_ip(ip).await {
        Ok(body) => json_response(&body),
        Err(err) => {
            tracing::warn!(ip, error = %err, "IP check failed");
            format!("Error checking IP: {err}")
        }
    }
}

/// Report an IP and return the API response as JSON text.
pub async fn abuseipdb_report_ip(api: &dyn IpReputationApi, payload: &TriggerPayload) -> String {
    let args = match arguments::extract_for(payload, &ABUSEIPDB_REPORT_IP) {
        Ok(args) => args,
        Err(err) => return err.to_string(),
    };
    let ip = args.required(IP_PROPERTY);
    let categories = args.required(CATEGORIES_PROPERTY);
    let comment = args.required(COMMENT_PROPERTY);

    match api.report_ip(ip, categories, comment).await {
        Ok(body) => {
            tracing::info!(ip, categories, "Reported IP");
            json_response(&body)
        }
        Err(err) => {
            tracing::warn!(ip, error = %err, "IP report failed");
            format!("Error reporting IP: {err}")
        }
    }
}

fn json_response(body: &Value) -> String {
    body.to_string()
}
