//! Typosquatting monitor.
//!
//! Generates confusable variants of a domain, keeps the ones that exist, enriches
//! them with WHOIS, address and (budgeted) reputation data, scores their
//! similarity to the original and decides which ones raise an alert.
//!
//! ```no_run
//! # async fn demo() -> typowatch::Result<()> {
//! use typowatch::{ScanConfig, Scanner};
//!
//! let scanner = Scanner::networked(ScanConfig::default(), None);
//! let report = scanner.quick_scan("example.com").await?;
//! for result in &report.results {
//!     println!("{:.2}% {}", result.similarity_percent, result.domain);
//! }
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod candidates;
pub mod config;
pub mod dns;
pub mod enrich;
pub mod error;
pub mod lists;
pub mod logging;
pub mod mutations;
pub mod phonetic;
pub mod probe;
pub mod reputation;
pub mod scan;
pub mod similarity;
pub mod validate;
pub mod whitelist;
pub mod whois;

pub use alert::{evaluate_alerts, Alert, AlertReason};
pub use candidates::{generate_candidates, generate_candidates_with, normalize_domain, split_domain};
pub use config::{ListPaths, ScanConfig};
pub use enrich::{ReputationBudget, ScanResult};
pub use error::{Error, ReputationError, Result};
pub use lists::AuxLists;
pub use mutations::Strategy;
pub use probe::{
    ExistenceProber, ReputationProber, ReputationReport, ReputationStatus, WhitelistProvider,
    WhoisProber, WhoisRecord,
};
pub use scan::{ScanReport, Scanner};
pub use similarity::{score, similarity_percent};
pub use validate::is_valid_domain;
pub use whitelist::StaticWhitelist;
