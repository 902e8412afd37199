use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Leading label of Unicode letters/digits/hyphens, then one or more alphabetic
    // suffix segments. Hyphen placement is checked separately (no look-around).
    static ref DOMAIN_RE: Regex =
        Regex::new(r"^[\p{L}\p{N}-]{1,63}(?:\.[A-Za-z]{2,})+$").expect("static regex");
}

/// Whether `candidate` is a syntactically valid domain name.
pub fn is_valid_domain(candidate: &str) -> bool {
    if candidate.starts_with('-') {
        return false;
    }
    let label = candidate.split('.').next().unwrap_or_default();
    if label.ends_with('-') {
        return false;
    }
    DOMAIN_RE.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_domains() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("ex-ample.com"));
        assert!(is_valid_domain("examp1e.co.uk"));
        assert!(is_valid_domain("example.www.com"));
    }

    #[test]
    fn accepts_unicode_labels() {
        assert!(is_valid_domain("exаmple.com"));
        assert!(is_valid_domain("bücher.de"));
        assert!(is_valid_domain("例え.jp"));
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(!is_valid_domain("example..com"));
        assert!(!is_valid_domain("-example.com"));
        assert!(!is_valid_domain("example-.com"));
        assert!(!is_valid_domain("example"));
        assert!(!is_valid_domain("example.c"));
        assert!(!is_valid_domain("example.c0m"));
        assert!(!is_valid_domain(".com"));
        assert!(!is_valid_domain("exa mple.com"));
        assert!(!is_valid_domain("exa_mple.com"));
    }

    #[test]
    fn enforces_label_length() {
        let longest = "a".repeat(63);
        assert!(is_valid_domain(&format!("{longest}.com")));
        assert!(!is_valid_domain(&format!("{longest}a.com")));
    }
}
