use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lookups performed per scan before the reputation budget is exhausted.
pub const DEFAULT_REPUTATION_BUDGET: usize = 4;
/// Highest edit distance still eligible for a reputation lookup.
pub const DEFAULT_REPUTATION_MAX_SCORE: usize = 1;

/// Locations of the five auxiliary list files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPaths {
    pub tlds: PathBuf,
    pub subdomains: PathBuf,
    pub keyboard: PathBuf,
    pub similar_chars: PathBuf,
    pub affixes: PathBuf,
}

impl ListPaths {
    /// Standard file names inside one directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            tlds: dir.join("tlds.txt"),
            subdomains: dir.join("subdomains.txt"),
            keyboard: dir.join("keyboard_proximity.txt"),
            similar_chars: dir.join("similar_chars.txt"),
            affixes: dir.join("prefixes_suffixes.txt"),
        }
    }
}

impl Default for ListPaths {
    fn default() -> Self {
        Self::in_dir("lists")
    }
}

/// Tunables for one scanner instance.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub lists: ListPaths,
    /// Maximum in-flight existence / enrichment lookups
    pub concurrency: usize,
    /// Deadline for a single DNS query
    pub dns_timeout: Duration,
    /// Deadline for a single WHOIS or reputation query
    pub lookup_timeout: Duration,
    pub reputation_budget: usize,
    pub reputation_max_score: usize,
    /// Whole-scan deadline; expiry aborts the scan
    pub scan_deadline: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lists: ListPaths::default(),
            concurrency: 32,
            dns_timeout: Duration::from_secs(5),
            lookup_timeout: Duration::from_secs(10),
            reputation_budget: DEFAULT_REPUTATION_BUDGET,
            reputation_max_score: DEFAULT_REPUTATION_MAX_SCORE,
            scan_deadline: None,
        }
    }
}

impl ScanConfig {
    pub fn with_lists(mut self, lists: ListPaths) -> Self {
        self.lists = lists;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_reputation_budget(mut self, budget: usize) -> Self {
        self.reputation_budget = budget;
        self
    }

    pub fn with_scan_deadline(mut self, deadline: Duration) -> Self {
        self.scan_deadline = Some(deadline);
        self
    }
}
