//! Alert decisions over enriched, scored candidates.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enrich::ScanResult;

/// Highest edit distance that alerts on its own.
pub const ALERT_MAX_SCORE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AlertReason {
    /// WHOIS creation date falls after the previous scan.
    RegisteredSinceLastScan { created: NaiveDate },
    CloseMatch { score: usize },
    PositiveReputation { reputation: i64 },
}

impl std::fmt::Display for AlertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertReason::RegisteredSinceLastScan { created } => {
                write!(f, "registered {} after last scan", created)
            }
            AlertReason::CloseMatch { score } => write!(f, "edit distance {}", score),
            AlertReason::PositiveReputation { reputation } => {
                write!(f, "reputation {}", reputation)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub domain: String,
    #[serde(flatten)]
    pub reason: AlertReason,
}

fn parse_creation_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Decides which candidates raise an alert, preserving list order.
///
/// Whitelisted names are skipped outright. A creation date newer than
/// `last_scan` alerts without further checks; otherwise a candidate alerts when
/// its score is at most [`ALERT_MAX_SCORE`] or its reputation is above zero.
pub fn evaluate_alerts(
    results: &[ScanResult],
    last_scan: NaiveDateTime,
    whitelist: &HashSet<String>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for result in results {
        // Whitelist entries are stored lower-cased; user lookalike lists may not be.
        if whitelist.contains(&result.domain.to_lowercase()) {
            debug!(domain = %result.domain, "whitelisted, alert skipped");
            continue;
        }

        if let Some(created) = parse_creation_date(&result.whois.creation_date) {
            // Midnight of `created` is after `last_scan` exactly when the day is.
            if created > last_scan.date() {
                alerts.push(Alert {
                    domain: result.domain.clone(),
                    reason: AlertReason::RegisteredSinceLastScan { created },
                });
                continue;
            }
        }

        let reputation = result.reputation.score();
        let reason = if result.score <= ALERT_MAX_SCORE {
            Some(AlertReason::CloseMatch {
                score: result.score,
            })
        } else if reputation > 0 {
            Some(AlertReason::PositiveReputation { reputation })
        } else {
            None
        };

        if let Some(reason) = reason {
            alerts.push(Alert {
                domain: result.domain.clone(),
                reason,
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ReputationReport, ReputationStatus, WhoisRecord};

    fn candidate(domain: &str, created: &str, score: usize, reputation: i64) -> ScanResult {
        ScanResult {
            domain: domain.to_string(),
            exists: true,
            ip_address: "192.0.2.1".to_string(),
            whois: WhoisRecord {
                creation_date: created.to_string(),
                ..WhoisRecord::unknown()
            },
            score,
            similarity_percent: 90.0,
            reputation: ReputationStatus::Checked {
                report: ReputationReport {
                    domain: domain.to_string(),
                    reputation: Some(reputation),
                    ..ReputationReport::default()
                },
            },
        }
    }

    fn last_scan() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn alert_rule_scenarios() {
        let results = vec![
            candidate("alerted-domain1.com", "2025-01-10", 1, 5),
            candidate("clean-domain.com", "2023-01-01", 5, 0),
            candidate("alerted-domain2.com", "2024-12-15", 2, 6),
            candidate("invalid-date-domain.com", "invalid-date", 1, 7),
        ];
        let whitelist = HashSet::from(["clean-domain.com".to_string()]);

        let alerts = evaluate_alerts(&results, last_scan(), &whitelist);
        let alerted: Vec<&str> = alerts.iter().map(|a| a.domain.as_str()).collect();

        assert_eq!(
            alerted,
            vec!["alerted-domain1.com", "alerted-domain2.com", "invalid-date-domain.com"]
        );
        assert_eq!(
            alerts[1].reason,
            AlertReason::RegisteredSinceLastScan {
                created: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap()
            }
        );
        assert_eq!(alerts[2].reason, AlertReason::CloseMatch { score: 1 });
    }

    #[test]
    fn whitelist_beats_every_condition() {
        let results = vec![candidate("exampel.com", "2025-06-01", 1, 9)];
        let whitelist = HashSet::from(["exampel.com".to_string()]);
        assert!(evaluate_alerts(&results, last_scan(), &whitelist).is_empty());
    }

    #[test]
    fn whitelist_match_ignores_candidate_case() {
        let results = vec![candidate("helIo.com", "2020-01-01", 1, 0)];
        let whitelist = HashSet::from(["helio.com".to_string()]);
        assert!(evaluate_alerts(&results, last_scan(), &whitelist).is_empty());
    }

    #[test]
    fn positive_reputation_alerts_distant_names() {
        let results = vec![
            candidate("example-login.com", "2020-01-01", 6, 3),
            candidate("example-shop.com", "2020-01-01", 5, -20),
        ];
        let alerts = evaluate_alerts(&results, last_scan(), &HashSet::new());
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].reason,
            AlertReason::PositiveReputation { reputation: 3 }
        );
    }

    #[test]
    fn creation_on_scan_day_is_not_newer() {
        let results = vec![candidate("example-pay.com", "2024-01-01", 7, 0)];
        assert!(evaluate_alerts(&results, last_scan(), &HashSet::new()).is_empty());
    }

    #[test]
    fn unknown_creation_falls_through() {
        let mut result = candidate("exampl.com", "---", 1, 0);
        result.reputation = ReputationStatus::NotChecked {
            report_url: String::new(),
        };
        let alerts = evaluate_alerts(&[result], last_scan(), &HashSet::new());
        assert_eq!(alerts[0].reason, AlertReason::CloseMatch { score: 1 });
    }

    #[test]
    fn timestamps_are_not_dates() {
        assert_eq!(parse_creation_date("2025-01-10 00:00:00"), None);
        assert_eq!(
            parse_creation_date("2025-01-10"),
            NaiveDate::from_ymd_opt(2025, 1, 10)
        );
    }
}
