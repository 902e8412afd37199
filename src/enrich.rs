//! Enrichment of live candidates: WHOIS, address, scores and budgeted reputation.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::ReputationError;
use crate::probe::{
    ExistenceProber, ReputationProber, ReputationStatus, WhoisProber, WhoisRecord, NO_ADDRESS,
};
use crate::reputation;
use crate::similarity::{score, similarity_percent};

/// Everything known about one live candidate after enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub domain: String,
    pub exists: bool,
    pub ip_address: String,
    pub whois: WhoisRecord,
    /// Damerau-Levenshtein distance to the monitored domain
    pub score: usize,
    pub similarity_percent: f64,
    pub reputation: ReputationStatus,
}

/// Scan-scoped cap on reputation lookups. Shared by reference between the
/// concurrent enrichment futures of one scan, never across scans.
#[derive(Debug)]
pub struct ReputationBudget {
    limit: usize,
    used: AtomicUsize,
}

impl ReputationBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Claims one lookup; false once the limit is reached.
    pub fn try_acquire(&self) -> bool {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < self.limit).then_some(used + 1)
            })
            .is_ok()
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }
}

pub struct Enricher<'a> {
    existence: &'a dyn ExistenceProber,
    whois: &'a dyn WhoisProber,
    reputation: Option<&'a dyn ReputationProber>,
    config: &'a ScanConfig,
}

impl<'a> Enricher<'a> {
    pub fn new(
        existence: &'a dyn ExistenceProber,
        whois: &'a dyn WhoisProber,
        reputation: Option<&'a dyn ReputationProber>,
        config: &'a ScanConfig,
    ) -> Self {
        Self {
            existence,
            whois,
            reputation,
            config,
        }
    }

    /// Enriches `live` in order. Reputation eligibility (score within
    /// `reputation_max_score` and budget left) is decided in iteration order, so
    /// the first eligible candidates consume the budget.
    pub async fn enrich(
        &self,
        original: &str,
        live: &[String],
        budget: &ReputationBudget,
    ) -> Vec<ScanResult> {
        stream::iter(live)
            .map(|candidate| {
                let distance = score(original, candidate);
                let reputation = self
                    .reputation
                    .filter(|_| distance <= self.config.reputation_max_score && budget.try_acquire());
                self.enrich_one(original, candidate, distance, reputation)
            })
            .buffered(self.config.concurrency)
            .collect()
            .await
    }

    async fn enrich_one(
        &self,
        original: &str,
        candidate: &str,
        distance: usize,
        reputation: Option<&dyn ReputationProber>,
    ) -> ScanResult {
        let whois = async {
            timeout(self.config.lookup_timeout, self.whois.lookup(candidate))
                .await
                .unwrap_or_else(|_| {
                    warn!(candidate, "WHOIS lookup timed out");
                    WhoisRecord::unknown()
                })
        };

        let ip_address = async {
            timeout(self.config.dns_timeout, self.existence.resolve(candidate))
                .await
                .unwrap_or_else(|_| NO_ADDRESS.to_string())
        };

        let reputation = async {
            let Some(prober) = reputation else {
                return ReputationStatus::NotChecked {
                    report_url: self.report_url(candidate),
                };
            };
            let outcome = timeout(self.config.lookup_timeout, prober.lookup(candidate))
                .await
                .unwrap_or(Err(ReputationError::Timeout));
            match outcome {
                Ok(report) => ReputationStatus::Checked { report },
                Err(err) => {
                    warn!(candidate, error = %err, "reputation lookup failed");
                    ReputationStatus::Failed {
                        error: err.to_string(),
                    }
                }
            }
        };

        let (whois, ip_address, reputation) = tokio::join!(whois, ip_address, reputation);
        debug!(candidate, distance, %ip_address, "candidate enriched");

        ScanResult {
            domain: candidate.to_string(),
            exists: true,
            ip_address,
            whois,
            score: distance,
            similarity_percent: similarity_percent(original, candidate),
            reputation,
        }
    }

    fn report_url(&self, candidate: &str) -> String {
        match self.reputation {
            Some(prober) => prober.report_url(candidate),
            None => reputation::report_url(candidate),
        }
    }
}
