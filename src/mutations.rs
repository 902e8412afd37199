//! Typosquatting mutation strategies.
//!
//! Every generator takes the domain split into `main` (everything before the final
//! label) and `suffix` (the final label) and returns full `"<mutated>.<suffix>"`
//! strings. Generators are pure; the aggregator unions and validates their output.

use std::collections::HashSet;

use crate::lists::{AuxLists, CharMap};
use crate::phonetic::metaphone;

const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyz0123456789";
const LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// One squatting technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    PrefixSuffix,
    TldReplacement,
    KeyboardProximity,
    VisualSubstitution,
    RemovalInsertion,
    Transposition,
    SubdomainInsertion,
    HyphenDot,
    Soundsquatting,
    Bitsquatting,
}

impl Strategy {
    pub const ALL: [Strategy; 10] = [
        Strategy::PrefixSuffix,
        Strategy::TldReplacement,
        Strategy::KeyboardProximity,
        Strategy::VisualSubstitution,
        Strategy::RemovalInsertion,
        Strategy::Transposition,
        Strategy::SubdomainInsertion,
        Strategy::HyphenDot,
        Strategy::Soundsquatting,
        Strategy::Bitsquatting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::PrefixSuffix => "prefix-suffix",
            Strategy::TldReplacement => "tld-replacement",
            Strategy::KeyboardProximity => "keyboard-proximity",
            Strategy::VisualSubstitution => "visual-substitution",
            Strategy::RemovalInsertion => "removal-insertion",
            Strategy::Transposition => "transposition",
            Strategy::SubdomainInsertion => "subdomain-insertion",
            Strategy::HyphenDot => "hyphen-dot",
            Strategy::Soundsquatting => "soundsquatting",
            Strategy::Bitsquatting => "bitsquatting",
        }
    }

    pub fn generate(self, main: &str, suffix: &str, lists: &AuxLists) -> HashSet<String> {
        match self {
            Strategy::PrefixSuffix => generate_prefix_suffix(main, suffix, &lists.affixes),
            Strategy::TldReplacement => generate_tld_replacements(main, suffix, &lists.tlds),
            Strategy::KeyboardProximity => {
                generate_keyboard_proximity(main, suffix, &lists.keyboard)
            }
            Strategy::VisualSubstitution => {
                generate_visual_substitutions(main, suffix, &lists.similar_chars)
            }
            Strategy::RemovalInsertion => generate_removal_insertion(main, suffix),
            Strategy::Transposition => generate_transpositions(main, suffix),
            Strategy::SubdomainInsertion => {
                generate_subdomain_insertion(main, suffix, &lists.subdomains)
            }
            Strategy::HyphenDot => generate_hyphen_dot(main, suffix),
            Strategy::Soundsquatting => generate_soundsquatting(main, suffix),
            Strategy::Bitsquatting => generate_bitsquatting(main, suffix),
        }
    }
}

fn splice(chars: &[char], at: usize, remove: usize, insert: &str) -> String {
    let mut out: String = chars[..at].iter().collect();
    out.push_str(insert);
    out.extend(&chars[at + remove..]);
    out
}

fn deletions(chars: &[char]) -> impl Iterator<Item = String> + '_ {
    (0..chars.len()).map(move |i| splice(chars, i, 1, ""))
}

fn insertions<'a>(chars: &'a [char], alphabet: &'a str) -> impl Iterator<Item = String> + 'a {
    (0..=chars.len()).flat_map(move |i| {
        alphabet
            .chars()
            .map(move |ch| splice(chars, i, 0, ch.encode_utf8(&mut [0; 4])))
    })
}

fn substitutions<'a>(chars: &'a [char], alphabet: &'a str) -> impl Iterator<Item = String> + 'a {
    (0..chars.len()).flat_map(move |i| {
        alphabet
            .chars()
            .map(move |ch| splice(chars, i, 1, ch.encode_utf8(&mut [0; 4])))
    })
}

/// `t-main.suffix` and `main-t.suffix` for every token.
pub fn generate_prefix_suffix(main: &str, suffix: &str, affixes: &[String]) -> HashSet<String> {
    let mut variations = HashSet::new();
    for token in affixes {
        variations.insert(format!("{}-{}.{}", token, main, suffix));
        variations.insert(format!("{}-{}.{}", main, token, suffix));
    }
    variations
}

pub fn generate_tld_replacements(main: &str, suffix: &str, tlds: &[String]) -> HashSet<String> {
    tlds.iter()
        .filter(|tld| tld.as_str() != suffix)
        .map(|tld| format!("{}.{}", main, tld))
        .collect()
}

/// Substitution with, and insertion before/after, every adjacent key.
pub fn generate_keyboard_proximity(main: &str, suffix: &str, keyboard: &CharMap) -> HashSet<String> {
    let chars: Vec<char> = main.chars().collect();
    let mut variations = HashSet::new();

    for (i, ch) in chars.iter().enumerate() {
        let Some(adjacent) = keyboard.get(ch) else {
            continue;
        };
        for key in adjacent {
            variations.insert(format!("{}.{}", splice(&chars, i, 1, key), suffix));
            variations.insert(format!("{}.{}", splice(&chars, i, 0, key), suffix));
            variations.insert(format!("{}.{}", splice(&chars, i + 1, 0, key), suffix));
        }
    }

    variations
}

pub fn generate_visual_substitutions(main: &str, suffix: &str, similar: &CharMap) -> HashSet<String> {
    let chars: Vec<char> = main.chars().collect();
    let mut variations = HashSet::new();

    for (i, ch) in chars.iter().enumerate() {
        if let Some(lookalikes) = similar.get(ch) {
            for lookalike in lookalikes {
                variations.insert(format!("{}.{}", splice(&chars, i, 1, lookalike), suffix));
            }
        }
    }

    variations
}

/// Single-character omission plus alphanumeric insertion at every position.
pub fn generate_removal_insertion(main: &str, suffix: &str) -> HashSet<String> {
    let chars: Vec<char> = main.chars().collect();
    deletions(&chars)
        .chain(insertions(&chars, ALPHANUMERIC))
        .map(|label| format!("{}.{}", label, suffix))
        .collect()
}

pub fn generate_transpositions(main: &str, suffix: &str) -> HashSet<String> {
    let chars: Vec<char> = main.chars().collect();
    let mut variations = HashSet::new();

    for i in 0..chars.len().saturating_sub(1) {
        let mut swapped = chars.clone();
        swapped.swap(i, i + 1);
        let label: String = swapped.into_iter().collect();
        variations.insert(format!("{}.{}", label, suffix));
    }

    variations
}

pub fn generate_subdomain_insertion(main: &str, suffix: &str, subdomains: &[String]) -> HashSet<String> {
    subdomains
        .iter()
        .map(|sd| format!("{}.{}.{}", main, sd, suffix))
        .collect()
}

pub fn generate_hyphen_dot(main: &str, suffix: &str) -> HashSet<String> {
    let mut variations = HashSet::new();

    if main.contains('-') {
        variations.insert(format!("{}.{}", main.replace('-', ""), suffix));
        variations.insert(format!("{}.{}", main.replace('-', "."), suffix));
    }
    if main.contains('.') {
        variations.insert(format!("{}.{}", main.replace('.', "-"), suffix));
    }

    variations
}

/// Single-letter deletions, substitutions and insertions that keep the Metaphone key.
pub fn generate_soundsquatting(main: &str, suffix: &str) -> HashSet<String> {
    let chars: Vec<char> = main.chars().collect();
    let original_key = metaphone(main);

    deletions(&chars)
        .chain(substitutions(&chars, LETTERS))
        .chain(insertions(&chars, LETTERS))
        .filter(|label| label != main && metaphone(label) == original_key)
        .map(|label| format!("{}.{}", label, suffix))
        .collect()
}

/// One-bit flips of each character that stay within printable ASCII.
pub fn generate_bitsquatting(main: &str, suffix: &str) -> HashSet<String> {
    let chars: Vec<char> = main.chars().collect();
    let mut variations = HashSet::new();

    for (i, ch) in chars.iter().enumerate() {
        let code = *ch as u32;
        for bit in 0..8 {
            let flipped = code ^ (1 << bit);
            if !(32..=126).contains(&flipped) {
                continue;
            }
            if let Some(flipped_char) = char::from_u32(flipped) {
                let label = splice(&chars, i, 1, flipped_char.encode_utf8(&mut [0; 4]));
                variations.insert(format!("{}.{}", label.to_lowercase(), suffix));
            }
        }
    }

    variations
}
