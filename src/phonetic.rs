//! Metaphone sound keys.
//!
//! Only ASCII letters carry sound; digits, hyphens, dots and non-ASCII characters
//! are dropped before encoding so that `ex-ample` and `example` share a key.

fn is_vowel(c: Option<char>) -> bool {
    matches!(c, Some('a' | 'e' | 'i' | 'o' | 'u'))
}

fn is_front_vowel(c: Option<char>) -> bool {
    matches!(c, Some('e' | 'i' | 'y'))
}

/// Encodes `word` into its upper-case Metaphone key.
pub fn metaphone(word: &str) -> String {
    let mut letters: Vec<char> = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    // Silent initial letter.
    if let [a, b, ..] = letters.as_slice() {
        if matches!((a, b), ('k', 'n') | ('g', 'n') | ('p', 'n') | ('w', 'r') | ('a', 'e')) {
            letters.remove(0);
        }
    }

    let mut key = String::with_capacity(letters.len());
    let mut i = 0;
    while i < letters.len() {
        let c = letters[i];
        let prev = i.checked_sub(1).map(|p| letters[p]);
        let next = letters.get(i + 1).copied();
        let after = letters.get(i + 2).copied();

        // Doubled letters sound once, except "cc" as in "accent".
        if next == Some(c) && c != 'c' {
            i += 1;
            continue;
        }

        match c {
            'a' | 'e' | 'i' | 'o' | 'u' => {
                if i == 0 {
                    key.push(c.to_ascii_uppercase());
                }
            }
            'b' => {
                if !(prev == Some('m') && next.is_none()) {
                    key.push('B');
                }
            }
            'c' => {
                if next == Some('h') || (next == Some('i') && after == Some('a')) {
                    key.push('X');
                    i += 1;
                } else if is_front_vowel(next) {
                    if prev != Some('s') {
                        key.push('S');
                    }
                } else {
                    key.push('K');
                }
            }
            'd' => {
                if next == Some('g') && is_front_vowel(after) {
                    key.push('J');
                    i += 2;
                } else {
                    key.push('T');
                }
            }
            'g' => {
                if next == Some('h') && !is_vowel(after) {
                    i += 1;
                } else if next == Some('n') && after.is_none() {
                    i += 1;
                } else if is_front_vowel(next) {
                    key.push('J');
                } else {
                    key.push('K');
                }
            }
            'h' => {
                if i == 0 || is_vowel(next) || !is_vowel(prev) {
                    key.push('H');
                }
            }
            'k' => {
                if prev != Some('c') {
                    key.push('K');
                }
            }
            'p' => {
                if next == Some('h') {
                    key.push('F');
                    i += 1;
                } else {
                    key.push('P');
                }
            }
            'q' => key.push('K'),
            's' => {
                if next == Some('h') {
                    key.push('X');
                    i += 1;
                } else if next == Some('i') && matches!(after, Some('o' | 'a')) {
                    key.push('X');
                    i += 2;
                } else {
                    key.push('S');
                }
            }
            't' => {
                if next == Some('i') && matches!(after, Some('o' | 'a')) {
                    key.push('X');
                } else if next == Some('h') {
                    key.push('0');
                    i += 1;
                } else if !(next == Some('c') && after == Some('h')) {
                    key.push('T');
                }
            }
            'v' => key.push('F'),
            'w' => {
                if i == 0 && next == Some('h') {
                    key.push('W');
                    i += 1;
                } else if is_vowel(next) {
                    key.push('W');
                }
            }
            'x' => {
                if i == 0 {
                    key.push('S');
                } else {
                    key.push_str("KS");
                }
            }
            'y' => {
                if is_vowel(next) {
                    key.push('Y');
                }
            }
            'z' => key.push('S'),
            'f' | 'j' | 'l' | 'm' | 'n' | 'r' => key.push(c.to_ascii_uppercase()),
            _ => {}
        }
        i += 1;
    }
    key
}
