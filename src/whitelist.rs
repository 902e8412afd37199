use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::lists::{load_tokens, ListLoad};
use crate::probe::WhitelistProvider;

/// In-memory whitelist. Global entries apply to every owner scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticWhitelist {
    global: HashSet<String>,
    scoped: HashMap<String, HashSet<String>>,
}

impl StaticWhitelist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, domain: &str) -> Self {
        self.global.insert(domain.trim().to_lowercase());
        self
    }

    pub fn allow_for(mut self, owner_scope: &str, domain: &str) -> Self {
        self.scoped
            .entry(owner_scope.trim().to_lowercase())
            .or_default()
            .insert(domain.trim().to_lowercase());
        self
    }

    /// One entry per line: `domain` (any scope) or `scope,domain`.
    pub fn from_file(path: &Path) -> ListLoad<Self> {
        match load_tokens(path) {
            ListLoad::Loaded(entries) => ListLoad::Loaded(Self::from_entries(&entries)),
            ListLoad::Empty { path, reason } => ListLoad::Empty { path, reason },
        }
    }

    pub fn from_entries(entries: &[String]) -> Self {
        entries
            .iter()
            .fold(Self::new(), |whitelist, entry| match entry.split_once(',') {
                Some((scope, domain)) => whitelist.allow_for(scope, domain),
                None => whitelist.allow(entry),
            })
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.scoped.values().map(HashSet::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WhitelistProvider for StaticWhitelist {
    fn entries(&self, owner_scope: &str) -> HashSet<String> {
        let mut entries = self.global.clone();
        if let Some(scoped) = self.scoped.get(&owner_scope.to_lowercase()) {
            entries.extend(scoped.iter().cloned());
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_and_global_entries() {
        let whitelist = StaticWhitelist::from_entries(&[
            "example-partner.com".to_string(),
            "example.com,examp1e.com".to_string(),
            "other.org,0ther.org".to_string(),
        ]);

        let entries = whitelist.entries("example.com");
        assert!(entries.contains("example-partner.com"));
        assert!(entries.contains("examp1e.com"));
        assert!(!entries.contains("0ther.org"));
        assert_eq!(whitelist.len(), 3);
    }

    #[test]
    fn scope_lookup_is_case_insensitive() {
        let whitelist = StaticWhitelist::new().allow_for("Example.com", "Exampel.COM");
        assert!(whitelist.entries("EXAMPLE.COM").contains("exampel.com"));
    }

    #[test]
    fn missing_file_means_no_exemptions() {
        let whitelist = StaticWhitelist::from_file(Path::new("/no/such/whitelist.txt")).into_inner();
        assert!(whitelist.is_empty());
    }
}
