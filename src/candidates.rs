//! Candidate aggregation: run the mutation strategies, union, validate.

use std::collections::BTreeSet;

use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::lists::AuxLists;
use crate::mutations::Strategy;
use crate::validate::is_valid_domain;

/// Canonical form of a user-supplied domain: host of a URL if one was given,
/// lower-cased, without the trailing root dot.
pub fn normalize_domain(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let host = if trimmed.contains("://") {
        Url::parse(trimmed)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .ok_or_else(|| Error::InvalidDomainFormat(input.to_string()))?
    } else {
        trimmed.to_string()
    };

    let domain = host.strip_suffix('.').unwrap_or(&host).to_lowercase();
    split_domain(&domain)?;
    Ok(domain)
}

/// Splits on the last dot into `(main, suffix)`.
pub fn split_domain(domain: &str) -> Result<(&str, &str)> {
    match domain.rsplit_once('.') {
        Some((main, suffix))
            if !suffix.is_empty() && !main.is_empty() && !main.split('.').any(str::is_empty) =>
        {
            Ok((main, suffix))
        }
        _ => Err(Error::InvalidDomainFormat(domain.to_string())),
    }
}

/// All candidates for `domain`, every strategy enabled.
pub fn generate_candidates(domain: &str, lists: &AuxLists) -> Result<Vec<String>> {
    generate_candidates_with(domain, lists, &Strategy::ALL)
}

/// Candidates from the selected strategies, deduplicated, validated and sorted.
/// The base domain itself is never a candidate.
pub fn generate_candidates_with(
    domain: &str,
    lists: &AuxLists,
    strategies: &[Strategy],
) -> Result<Vec<String>> {
    let (main, suffix) = split_domain(domain)?;

    let mut variations = BTreeSet::new();
    for strategy in strategies {
        let generated = strategy.generate(main, suffix, lists);
        debug!(strategy = strategy.name(), count = generated.len(), "strategy finished");
        variations.extend(generated);
    }
    let total = variations.len();

    let candidates: Vec<String> = variations
        .into_iter()
        .filter(|candidate| candidate != domain && is_valid_domain(candidate))
        .collect();

    info!(
        domain,
        generated = total,
        valid = candidates.len(),
        "candidate generation finished"
    );
    Ok(candidates)
}
