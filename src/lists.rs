//! Auxiliary list files feeding the mutation strategies.
//!
//! Every file holds one entry per line; blank lines and lines starting with `//`
//! are skipped. A list that cannot be read degrades to an empty collection.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ListPaths;

/// Character -> ordered replacement strings.
pub type CharMap = BTreeMap<char, Vec<String>>;

/// Outcome of loading one list file.
#[derive(Debug, Clone, PartialEq)]
pub enum ListLoad<T> {
    Loaded(T),
    /// The file could not be read; callers continue with an empty list.
    Empty { path: PathBuf, reason: String },
}

impl<T: Default> ListLoad<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ListLoad::Loaded(_))
    }

    /// Unwraps to the loaded value, or the empty collection after logging why.
    pub fn into_inner(self) -> T {
        match self {
            ListLoad::Loaded(value) => value,
            ListLoad::Empty { path, reason } => {
                warn!(path = %path.display(), %reason, "auxiliary list unavailable, using empty list");
                T::default()
            }
        }
    }
}

/// Every auxiliary list a scan needs, loaded once up front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxLists {
    pub keyboard: CharMap,
    pub similar_chars: CharMap,
    pub tlds: Vec<String>,
    pub subdomains: Vec<String>,
    pub affixes: Vec<String>,
}

impl AuxLists {
    pub fn load(paths: &ListPaths) -> Self {
        let lists = Self {
            keyboard: load_keyboard_proximity(&paths.keyboard).into_inner(),
            similar_chars: load_similar_chars(&paths.similar_chars).into_inner(),
            tlds: load_tlds(&paths.tlds).into_inner(),
            subdomains: load_tokens(&paths.subdomains).into_inner(),
            affixes: load_tokens(&paths.affixes).into_inner(),
        };
        debug!(
            keyboard = lists.keyboard.len(),
            similar_chars = lists.similar_chars.len(),
            tlds = lists.tlds.len(),
            subdomains = lists.subdomains.len(),
            affixes = lists.affixes.len(),
            "auxiliary lists loaded"
        );
        lists
    }
}

fn read_entries(path: &Path) -> ListLoad<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => ListLoad::Loaded(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with("//"))
                .map(str::to_string)
                .collect(),
        ),
        Err(err) => ListLoad::Empty {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    }
}

fn map_entries<T>(path: &Path, f: impl FnOnce(Vec<String>) -> T) -> ListLoad<T> {
    match read_entries(path) {
        ListLoad::Loaded(entries) => ListLoad::Loaded(f(entries)),
        ListLoad::Empty { path, reason } => ListLoad::Empty { path, reason },
    }
}

/// Plain token list, deduplicated in first-seen order.
pub fn load_tokens(path: &Path) -> ListLoad<Vec<String>> {
    map_entries(path, |entries| {
        let mut tokens: Vec<String> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !tokens.contains(&entry) {
                tokens.push(entry);
            }
        }
        tokens
    })
}

/// TLD list; a leading dot on an entry is tolerated.
pub fn load_tlds(path: &Path) -> ListLoad<Vec<String>> {
    map_entries(path, |entries| {
        let mut tlds: Vec<String> = Vec::with_capacity(entries.len());
        for entry in entries {
            let tld = entry.trim_start_matches('.').to_lowercase();
            if !tld.is_empty() && !tlds.contains(&tld) {
                tlds.push(tld);
            }
        }
        tlds
    })
}

/// `key:value1,value2,...` lines.
pub fn load_keyboard_proximity(path: &Path) -> ListLoad<CharMap> {
    map_entries(path, |entries| {
        let mut map = CharMap::new();
        for line in entries {
            let Some((key, values)) = line.split_once(':') else {
                debug!(%line, "skipping malformed keyboard proximity line");
                continue;
            };
            let Some(key) = single_char(key) else {
                debug!(%line, "skipping keyboard proximity line with multi-character key");
                continue;
            };
            let adjacent = map.entry(key).or_default();
            adjacent.extend(
                values
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            );
        }
        map
    })
}

/// `key,value` lines; repeated keys accumulate replacements.
pub fn load_similar_chars(path: &Path) -> ListLoad<CharMap> {
    map_entries(path, |entries| {
        let mut map = CharMap::new();
        for line in entries {
            let Some((key, value)) = line.split_once(',') else {
                debug!(%line, "skipping malformed similar character line");
                continue;
            };
            let Some(key) = single_char(key) else {
                debug!(%line, "skipping similar character line with multi-character key");
                continue;
            };
            let value = value.trim();
            if !value.is_empty() {
                map.entry(key).or_default().push(value.to_string());
            }
        }
        map
    })
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
