use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use typowatch::{
    generate_candidates_with, logging, normalize_domain, AuxLists, ListPaths, ReputationStatus,
    ScanConfig, ScanReport, Scanner, StaticWhitelist, Strategy,
};

#[derive(Parser)]
#[command(name = "typowatch")]
#[command(version, about = "Find registered typosquatting variants of a domain and flag the risky ones")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the auxiliary list files
    #[arg(long, env = "TYPOWATCH_LISTS", default_value = "lists", global = true)]
    lists: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print candidate variations without touching the network
    Generate {
        /// Domain to generate variations for
        domain: String,

        #[command(flatten)]
        strategies: StrategyFlags,

        /// Maximum number of variations to output (unlimited if not specified)
        #[arg(long)]
        max_variations: Option<usize>,
    },
    /// Probe, enrich and score live variations, then evaluate alerts
    Scan(ScanArgs),
}

#[derive(Args)]
struct StrategyFlags {
    /// Enable prefix/suffix token variations
    #[arg(long)]
    prefix_suffix: bool,

    /// Enable TLD replacement variations
    #[arg(long)]
    tld: bool,

    /// Enable keyboard proximity variations
    #[arg(long)]
    keyboard: bool,

    /// Enable visually similar character variations
    #[arg(long)]
    visual: bool,

    /// Enable character removal and insertion variations
    #[arg(long)]
    removal_insertion: bool,

    /// Enable adjacent character transposition variations
    #[arg(long)]
    transposition: bool,

    /// Enable subdomain insertion variations
    #[arg(long)]
    subdomain: bool,

    /// Enable hyphen/dot manipulation variations
    #[arg(long)]
    hyphen_dot: bool,

    /// Enable soundsquatting variations
    #[arg(long)]
    soundsquatting: bool,

    /// Enable bitsquatting variations
    #[arg(long)]
    bitsquatting: bool,

    /// Enable all variation types
    #[arg(long)]
    all: bool,
}

impl StrategyFlags {
    fn selected(&self) -> Vec<Strategy> {
        let flags = [
            (self.prefix_suffix, Strategy::PrefixSuffix),
            (self.tld, Strategy::TldReplacement),
            (self.keyboard, Strategy::KeyboardProximity),
            (self.visual, Strategy::VisualSubstitution),
            (self.removal_insertion, Strategy::RemovalInsertion),
            (self.transposition, Strategy::Transposition),
            (self.subdomain, Strategy::SubdomainInsertion),
            (self.hyphen_dot, Strategy::HyphenDot),
            (self.soundsquatting, Strategy::Soundsquatting),
            (self.bitsquatting, Strategy::Bitsquatting),
        ];
        let enable_all = self.all || flags.iter().all(|(enabled, _)| !enabled);

        flags
            .into_iter()
            .filter(|(enabled, _)| enable_all || *enabled)
            .map(|(_, strategy)| strategy)
            .collect()
    }
}

#[derive(Args)]
struct ScanArgs {
    /// Domain to monitor
    domain: String,

    /// Skip whitelist and alert evaluation
    #[arg(long)]
    quick: bool,

    /// Whitelist file (`domain` or `scope,domain` per line)
    #[arg(long)]
    whitelist: Option<PathBuf>,

    /// Whitelist scope (defaults to the scanned domain)
    #[arg(long)]
    scope: Option<String>,

    /// Previous scan time, YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS (default: now, UTC)
    #[arg(long, value_parser = parse_last_scan)]
    last_scan: Option<NaiveDateTime>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Concurrent network lookups
    #[arg(long, default_value = "32")]
    concurrency: usize,

    /// Per-lookup timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// Abort the whole scan after this many seconds
    #[arg(long)]
    deadline: Option<u64>,

    /// VirusTotal API key; without one no reputation lookups are made
    #[arg(long, env = "VIRUSTOTAL_API_KEY", hide_env_values = true)]
    vt_api_key: Option<String>,
}

fn parse_last_scan(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got {:?}", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let list_paths = ListPaths::in_dir(&cli.lists);

    match cli.command {
        Commands::Generate {
            domain,
            strategies,
            max_variations,
        } => generate(&domain, &list_paths, &strategies.selected(), max_variations),
        Commands::Scan(args) => scan(args, list_paths).await,
    }
}

fn generate(
    domain: &str,
    list_paths: &ListPaths,
    strategies: &[Strategy],
    max_variations: Option<usize>,
) -> Result<()> {
    let domain = normalize_domain(domain)?;
    let lists = AuxLists::load(list_paths);
    let variations = generate_candidates_with(&domain, &lists, strategies)?;

    let output_count = max_variations
        .map(|max| max.min(variations.len()))
        .unwrap_or(variations.len());
    for variation in variations.iter().take(output_count) {
        println!("{}", variation);
    }

    eprintln!("Generated {} variations", variations.len());
    Ok(())
}

async fn scan(args: ScanArgs, list_paths: ListPaths) -> Result<()> {
    let lookup_timeout = Duration::from_secs(args.timeout);
    let mut config = ScanConfig::default()
        .with_lists(list_paths)
        .with_concurrency(args.concurrency)
        .with_lookup_timeout(lookup_timeout)
        .with_dns_timeout(lookup_timeout.min(Duration::from_secs(5)));
    if let Some(deadline) = args.deadline {
        config = config.with_scan_deadline(Duration::from_secs(deadline));
    }

    let mut scanner = Scanner::networked(config, args.vt_api_key);
    if let Some(path) = &args.whitelist {
        let whitelist = StaticWhitelist::from_file(path).into_inner();
        scanner = scanner.with_whitelist(Arc::new(whitelist));
    }
    if std::io::stderr().is_terminal() && !args.json {
        scanner = scanner.with_progress(probe_progress_bar());
    }

    let outcome = if args.quick {
        scanner.quick_scan(&args.domain).await
    } else {
        let last_scan = args.last_scan.unwrap_or_else(|| Utc::now().naive_utc());
        scanner
            .run_scan(&args.domain, args.scope.as_deref(), last_scan)
            .await
    };
    let report = outcome.with_context(|| format!("scan of {} failed", args.domain))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn probe_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} probing [{bar:40}] {pos}/{len} ({eta})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn print_report(report: &ScanReport) {
    for result in &report.results {
        let reputation = match &result.reputation {
            ReputationStatus::Checked { report } => report
                .reputation
                .map(|score| score.to_string())
                .unwrap_or_else(|| "---".to_string()),
            ReputationStatus::Failed { .. } => "error".to_string(),
            ReputationStatus::NotChecked { report_url } => report_url.clone(),
        };
        println!(
            "{:.2}%, {}, {}, {}, {}, {}",
            result.similarity_percent,
            result.domain,
            result.ip_address,
            result.whois.registrar,
            result.whois.creation_date,
            reputation
        );
    }
    for alert in &report.alerts {
        println!("ALERT, {}, {}", alert.domain, alert.reason);
    }

    eprintln!(
        "Checked {} variations, {} exist, {} reputation lookups, {} alerts",
        report.permutations_checked,
        report.existing_domains,
        report.reputation_lookups,
        report.alerts.len()
    );
}
