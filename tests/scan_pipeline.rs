use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use typowatch::{
    AlertReason, AuxLists, Error, ExistenceProber, ReputationError, ReputationProber,
    ReputationReport, ScanConfig, Scanner, StaticWhitelist, WhoisProber, WhoisRecord,
};

const LIVE: [&str; 7] = [
    "exampel.com",
    "exampl.com",
    "example-login.com",
    "example.net",
    "examplee.com",
    "exmple.com",
    "xeample.com",
];

struct FakeDns {
    live: HashSet<String>,
    probes: AtomicUsize,
}

impl FakeDns {
    fn new(live: &[&str]) -> Self {
        Self {
            live: live.iter().map(|s| s.to_string()).collect(),
            probes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ExistenceProber for FakeDns {
    async fn exists(&self, name: &str) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.live.contains(name)
    }

    async fn resolve(&self, _name: &str) -> String {
        "192.0.2.7".to_string()
    }
}

struct StalledDns;

#[async_trait]
impl ExistenceProber for StalledDns {
    async fn exists(&self, _name: &str) -> bool {
        std::future::pending().await
    }

    async fn resolve(&self, _name: &str) -> String {
        std::future::pending().await
    }
}

/// Creation dates by name; everything else is unknown.
struct FakeWhois(HashMap<&'static str, &'static str>);

#[async_trait]
impl WhoisProber for FakeWhois {
    async fn lookup(&self, name: &str) -> WhoisRecord {
        match self.0.get(name) {
            Some(created) => WhoisRecord {
                registrar: "Example Registrar".to_string(),
                creation_date: created.to_string(),
                ..WhoisRecord::unknown()
            },
            None => WhoisRecord::unknown(),
        }
    }
}

struct CountingReputation {
    calls: AtomicUsize,
    reputation: i64,
}

#[async_trait]
impl ReputationProber for CountingReputation {
    async fn lookup(&self, name: &str) -> Result<ReputationReport, ReputationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ReputationReport {
            domain: name.to_string(),
            reputation: Some(self.reputation),
            ..ReputationReport::default()
        })
    }

    fn report_url(&self, name: &str) -> String {
        format!("https://reputation.test/{}", name)
    }
}

fn small_lists() -> AuxLists {
    AuxLists {
        tlds: vec!["com".into(), "net".into(), "org".into()],
        affixes: vec!["login".into()],
        ..AuxLists::default()
    }
}

fn whois() -> Arc<FakeWhois> {
    Arc::new(FakeWhois(HashMap::from([
        ("example-login.com", "2024-06-01"),
        ("example.net", "2020-03-15"),
        ("exmple.com", "2019-11-02"),
    ])))
}

fn last_scan() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn scanner(reputation: Arc<CountingReputation>) -> (Scanner, Arc<FakeDns>) {
    let dns = Arc::new(FakeDns::new(&LIVE));
    let scanner = Scanner::new(
        ScanConfig::default().with_lookup_timeout(Duration::from_secs(1)),
        small_lists(),
        dns.clone(),
        whois(),
    )
    .with_reputation(reputation);
    (scanner, dns)
}

fn reputation(score: i64) -> Arc<CountingReputation> {
    Arc::new(CountingReputation {
        calls: AtomicUsize::new(0),
        reputation: score,
    })
}

#[tokio::test]
async fn reputation_budget_goes_to_first_close_matches() {
    let reputation = reputation(0);
    let (scanner, _) = scanner(reputation.clone());

    let report = scanner.quick_scan("example.com").await.unwrap();

    assert_eq!(report.existing_domains, LIVE.len());
    assert_eq!(report.reputation_lookups, 4);
    assert_eq!(reputation.calls.load(Ordering::SeqCst), 4);

    let queried: HashSet<&str> = report
        .results
        .iter()
        .filter(|r| r.reputation.was_queried())
        .map(|r| r.domain.as_str())
        .collect();
    assert!(report
        .results
        .iter()
        .filter(|r| r.reputation.was_queried())
        .all(|r| r.score <= 1));
    // candidates are visited alphabetically; xeample.com is the fifth close match
    assert_eq!(
        queried,
        HashSet::from(["exampel.com", "exampl.com", "examplee.com", "exmple.com"])
    );
}

#[tokio::test]
async fn results_are_sorted_by_similarity() {
    let (scanner, _) = scanner(reputation(0));
    let report = scanner.quick_scan("example.com").await.unwrap();

    assert!(report
        .results
        .windows(2)
        .all(|pair| pair[0].similarity_percent >= pair[1].similarity_percent));
    assert_eq!(
        report.results.last().map(|r| r.domain.as_str()),
        Some("example-login.com")
    );
    assert!(report.results.iter().all(|r| r.exists && r.ip_address == "192.0.2.7"));
}

#[tokio::test]
async fn quick_scan_never_alerts() {
    let (scanner, _) = scanner(reputation(10));
    let report = scanner.quick_scan("example.com").await.unwrap();
    assert!(report.alerts.is_empty());
}

#[tokio::test]
async fn full_scan_applies_alert_rules() {
    let (scanner, _) = scanner(reputation(0));
    let scanner = scanner.with_whitelist(Arc::new(
        StaticWhitelist::new()
            .allow_for("example.com", "exampel.com")
            .allow_for("other.org", "exmple.com"),
    ));

    let report = scanner
        .run_scan("example.com", None, last_scan())
        .await
        .unwrap();
    let alerted: HashSet<String> = report.alerted().into_iter().collect();

    assert!(!alerted.contains("exampel.com"), "whitelisted in scope");
    assert!(alerted.contains("exmple.com"), "other scope's whitelist ignored");
    assert!(!alerted.contains("example.net"), "distant and old");
    assert!(alerted.contains("xeample.com"));

    let login = report
        .alerts
        .iter()
        .find(|alert| alert.domain == "example-login.com")
        .expect("recently registered name alerts");
    assert_eq!(
        login.reason,
        AlertReason::RegisteredSinceLastScan {
            created: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        }
    );
}

#[tokio::test]
async fn explicit_scope_selects_whitelist() {
    let (scanner, _) = scanner(reputation(0));
    let scanner = scanner.with_whitelist(Arc::new(
        StaticWhitelist::new().allow_for("acme", "xeample.com"),
    ));

    let report = scanner
        .run_scan("example.com", Some("acme"), last_scan())
        .await
        .unwrap();

    assert!(!report.alerted().contains(&"xeample.com".to_string()));
    assert!(report.alerted().contains(&"exampel.com".to_string()));
}

#[tokio::test]
async fn invalid_domain_is_rejected_before_probing() {
    let (scanner, dns) = scanner(reputation(0));

    let err = scanner
        .run_scan("localhost", None, last_scan())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidDomainFormat(_)));
    assert_eq!(dns.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stalled_existence_probes_count_as_absent() {
    let scanner = Scanner::new(
        ScanConfig::default().with_dns_timeout(Duration::from_millis(20)),
        small_lists(),
        Arc::new(StalledDns),
        whois(),
    );

    let report = scanner.quick_scan("example.com").await.unwrap();

    assert!(report.permutations_checked > 0);
    assert_eq!(report.existing_domains, 0);
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn scan_deadline_fails_the_whole_scan() {
    let scanner = Scanner::new(
        ScanConfig::default().with_scan_deadline(Duration::from_millis(50)),
        small_lists(),
        Arc::new(StalledDns),
        whois(),
    );

    let err = scanner
        .run_scan("example.com", None, last_scan())
        .await
        .unwrap_err();

    match err {
        Error::ScanFailure { domain, .. } => assert_eq!(domain, "example.com"),
        other => panic!("expected scan failure, got {other:?}"),
    }
}
