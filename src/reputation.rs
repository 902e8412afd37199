//! VirusTotal domain reputation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::dns::ascii_host;
use crate::error::ReputationError;
use crate::probe::{ReputationProber, ReputationReport};

const API_BASE: &str = "https://www.virustotal.com/api/v3";

/// The service indexes internationalised names by their punycode form.
fn service_name(name: &str) -> String {
    ascii_host(name).unwrap_or_else(|| name.to_string())
}

/// Public report page for `name`; used when no lookup was spent on it.
pub fn report_url(name: &str) -> String {
    format!("https://www.virustotal.com/gui/domain/{}", service_name(name))
}

#[derive(Deserialize)]
struct DomainResponse {
    data: DomainData,
}

#[derive(Deserialize)]
struct DomainData {
    #[serde(default)]
    attributes: ReputationReport,
}

/// Parses a `/domains/{name}` response body.
pub fn parse_report(name: &str, body: &str) -> Result<ReputationReport, ReputationError> {
    let response: DomainResponse = serde_json::from_str(body)?;
    let mut report = response.data.attributes;
    report.domain = name.to_string();
    Ok(report)
}

pub struct VirusTotalClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl VirusTotalClient {
    pub fn new(api_key: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(request_timeout)
                .user_agent(concat!("typowatch/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Points the client at another API root (self-hosted proxy, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ReputationProber for VirusTotalClient {
    async fn lookup(&self, name: &str) -> Result<ReputationReport, ReputationError> {
        if self.api_key.is_empty() {
            return Err(ReputationError::MissingApiKey);
        }

        debug!(name, "querying VirusTotal");
        let url = format!("{}/domains/{}", self.base_url, service_name(name));
        let response = self
            .http_client
            .get(&url)
            .header("x-apikey", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReputationError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_report(name, &body)
    }

    fn report_url(&self, name: &str) -> String {
        report_url(name)
    }
}
