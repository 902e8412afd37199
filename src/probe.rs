//! Contracts for the network collaborators a scan consumes.
//!
//! Implementations swallow their own failures: existence probes degrade to
//! `false` / [`NO_ADDRESS`], WHOIS lookups to [`WhoisRecord::unknown`]. Only the
//! reputation lookup reports an error, which the scan records per candidate.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReputationError;

/// Placeholder for any WHOIS field that could not be determined.
pub const UNKNOWN: &str = "---";
/// Address placeholder when a live name cannot be resolved.
pub const NO_ADDRESS: &str = "N/A";

#[async_trait]
pub trait ExistenceProber: Send + Sync {
    /// Whether `name` is registered and resolves.
    async fn exists(&self, name: &str) -> bool;

    /// First address of `name`, or [`NO_ADDRESS`].
    async fn resolve(&self, name: &str) -> String;
}

#[async_trait]
pub trait WhoisProber: Send + Sync {
    async fn lookup(&self, name: &str) -> WhoisRecord;
}

#[async_trait]
pub trait ReputationProber: Send + Sync {
    async fn lookup(&self, name: &str) -> Result<ReputationReport, ReputationError>;

    /// Human-facing report link, attached when no lookup was spent on `name`.
    fn report_url(&self, name: &str) -> String;
}

/// Owner-scoped sets of domains exempt from alerting.
pub trait WhitelistProvider: Send + Sync {
    fn entries(&self, owner_scope: &str) -> HashSet<String>;
}

/// Registration data; every field defaults to [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisRecord {
    pub registrar: String,
    pub country: String,
    pub creation_date: String,
    pub expiration_date: String,
    pub name_servers: String,
    pub emails: String,
}

impl WhoisRecord {
    pub fn unknown() -> Self {
        Self {
            registrar: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            creation_date: UNKNOWN.to_string(),
            expiration_date: UNKNOWN.to_string(),
            name_servers: UNKNOWN.to_string(),
            emails: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }
}

impl Default for WhoisRecord {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Reputation data for one domain as returned by the reputation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationReport {
    pub domain: String,
    /// Service-defined score; sign convention belongs to the service.
    pub reputation: Option<i64>,
    pub categories: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub total_votes: BTreeMap<String, i64>,
    pub last_analysis_stats: BTreeMap<String, i64>,
    pub last_modification_date: Option<i64>,
    pub last_dns_records_date: Option<i64>,
    pub last_https_certificate_date: Option<i64>,
    pub whois: Option<String>,
}

/// What the enrichment stage learned about a candidate's reputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReputationStatus {
    Checked { report: ReputationReport },
    Failed { error: String },
    /// No lookup spent on this candidate.
    NotChecked { report_url: String },
}

impl ReputationStatus {
    /// Numeric reputation used by the alert rule; anything but a reported score is 0.
    pub fn score(&self) -> i64 {
        match self {
            ReputationStatus::Checked { report } => report.reputation.unwrap_or(0),
            _ => 0,
        }
    }

    pub fn was_queried(&self) -> bool {
        !matches!(self, ReputationStatus::NotChecked { .. })
    }
}
