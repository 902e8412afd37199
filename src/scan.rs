//! End-to-end scans: generate -> probe -> enrich -> score -> sort -> alert.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::alert::{evaluate_alerts, Alert};
use crate::candidates::{generate_candidates, normalize_domain};
use crate::config::ScanConfig;
use crate::dns::DnsProber;
use crate::enrich::{Enricher, ReputationBudget, ScanResult};
use crate::error::{Error, Result};
use crate::lists::AuxLists;
use crate::probe::{ExistenceProber, ReputationProber, WhitelistProvider, WhoisProber};
use crate::reputation::VirusTotalClient;
use crate::whitelist::StaticWhitelist;
use crate::whois::WhoisClient;

/// Outcome of one scan. Results are sorted by similarity, most similar first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub domain: String,
    /// Valid candidates generated
    pub permutations_checked: usize,
    /// Candidates that exist
    pub existing_domains: usize,
    pub reputation_lookups: usize,
    pub results: Vec<ScanResult>,
    /// Empty for quick scans
    pub alerts: Vec<Alert>,
}

impl ScanReport {
    /// Alerted domain names in decision order.
    pub fn alerted(&self) -> Vec<String> {
        self.alerts.iter().map(|alert| alert.domain.clone()).collect()
    }
}

pub struct Scanner {
    config: ScanConfig,
    lists: Arc<AuxLists>,
    existence: Arc<dyn ExistenceProber>,
    whois: Arc<dyn WhoisProber>,
    reputation: Option<Arc<dyn ReputationProber>>,
    whitelist: Arc<dyn WhitelistProvider>,
    progress: Option<ProgressBar>,
}

impl Scanner {
    pub fn new(
        config: ScanConfig,
        lists: AuxLists,
        existence: Arc<dyn ExistenceProber>,
        whois: Arc<dyn WhoisProber>,
    ) -> Self {
        Self {
            config,
            lists: Arc::new(lists),
            existence,
            whois,
            reputation: None,
            whitelist: Arc::new(StaticWhitelist::new()),
            progress: None,
        }
    }

    /// Scanner wired to DNS, WHOIS and (with a key) VirusTotal, lists loaded from
    /// `config.lists`.
    pub fn networked(config: ScanConfig, virustotal_key: Option<String>) -> Self {
        let lists = AuxLists::load(&config.lists);
        let existence = Arc::new(DnsProber::new(config.dns_timeout));
        let whois = Arc::new(WhoisClient::new(config.lookup_timeout));
        let reputation = virustotal_key
            .filter(|key| !key.is_empty())
            .map(|key| VirusTotalClient::new(key, config.lookup_timeout));

        let scanner = Self::new(config, lists, existence, whois);
        match reputation {
            Some(client) => scanner.with_reputation(Arc::new(client)),
            None => scanner,
        }
    }

    pub fn with_reputation(mut self, reputation: Arc<dyn ReputationProber>) -> Self {
        self.reputation = Some(reputation);
        self
    }

    pub fn with_whitelist(mut self, whitelist: Arc<dyn WhitelistProvider>) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn lists(&self) -> &AuxLists {
        &self.lists
    }

    /// Candidate generation only; no network access.
    pub fn generate_candidates(&self, domain: &str) -> Result<Vec<String>> {
        let domain = normalize_domain(domain)?;
        generate_candidates(&domain, &self.lists)
    }

    /// Scan without whitelist or alert evaluation.
    pub async fn quick_scan(&self, domain: &str) -> Result<ScanReport> {
        let domain = normalize_domain(domain)?;
        info!(%domain, "starting quick scan");
        self.with_deadline(&domain, self.scan(&domain)).await
    }

    /// Full scan. The whitelist is read for `owner_scope`, defaulting to the
    /// scanned domain itself.
    pub async fn run_scan(
        &self,
        domain: &str,
        owner_scope: Option<&str>,
        last_scan: NaiveDateTime,
    ) -> Result<ScanReport> {
        let domain = normalize_domain(domain)?;
        info!(%domain, %last_scan, "starting full scan");
        let mut report = self.with_deadline(&domain, self.scan(&domain)).await?;

        let whitelist = self.whitelist.entries(owner_scope.unwrap_or(&domain));
        report.alerts = evaluate_alerts(&report.results, last_scan, &whitelist);
        info!(
            %domain,
            alerted = report.alerts.len(),
            whitelisted = whitelist.len(),
            "alert evaluation finished"
        );
        Ok(report)
    }

    async fn with_deadline(
        &self,
        domain: &str,
        scan: impl Future<Output = Result<ScanReport>>,
    ) -> Result<ScanReport> {
        match self.config.scan_deadline {
            Some(deadline) => timeout(deadline, scan)
                .await
                .map_err(|elapsed| Error::scan_failure(domain, elapsed))?,
            None => scan.await,
        }
    }

    async fn scan(&self, domain: &str) -> Result<ScanReport> {
        let lists = Arc::clone(&self.lists);
        let owned = domain.to_string();
        let candidates = tokio::task::spawn_blocking(move || generate_candidates(&owned, &lists))
            .await
            .map_err(|err| Error::scan_failure(domain, err))??;

        let live = self.probe_existence(&candidates).await;
        info!(
            domain,
            candidates = candidates.len(),
            existing = live.len(),
            "existence probing finished"
        );

        let budget = ReputationBudget::new(self.config.reputation_budget);
        let enricher = Enricher::new(
            self.existence.as_ref(),
            self.whois.as_ref(),
            self.reputation.as_deref(),
            &self.config,
        );
        let mut results = enricher.enrich(domain, &live, &budget).await;
        results.sort_by(|a, b| b.similarity_percent.total_cmp(&a.similarity_percent));
        info!(
            domain,
            enriched = results.len(),
            reputation_lookups = budget.used(),
            "enrichment finished"
        );

        Ok(ScanReport {
            domain: domain.to_string(),
            permutations_checked: candidates.len(),
            existing_domains: live.len(),
            reputation_lookups: budget.used(),
            results,
            alerts: Vec::new(),
        })
    }

    /// Live candidates in their original order. A stalled probe counts as absent.
    async fn probe_existence(&self, candidates: &[String]) -> Vec<String> {
        if let Some(bar) = &self.progress {
            bar.set_length(candidates.len() as u64);
        }

        let checked: Vec<Option<String>> = stream::iter(candidates)
            .map(|candidate| async move {
                let exists = timeout(self.config.dns_timeout, self.existence.exists(candidate))
                    .await
                    .unwrap_or(false);
                if let Some(bar) = &self.progress {
                    bar.inc(1);
                }
                debug!(candidate = %candidate, exists, "existence probed");
                exists.then(|| candidate.clone())
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
        checked.into_iter().flatten().collect()
    }
}
