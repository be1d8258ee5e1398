//! Ad-gate / shortener domain denylist.
//!
//! A candidate destination URL is rejected when it contains any of a fixed
//! set of domain fragments (case-insensitive substring match). The table is
//! declarative so it can be extended and unit-tested independently of the
//! scan control flow; `LINKPEEL_DENYLIST_EXTRA` adds fragments at startup
//! without replacing the built-in set.

use aho_corasick::AhoCorasick;

/// Known ad-gate / shortener domain fragments. Small and admittedly
/// incomplete; extension is additive only.
const GATE_DOMAIN_FRAGMENTS: &[&str] = &[
    "linkvertise",
    "adf.ly",
    "bit.ly",
    "shorte.st",
    "ads",
];

/// Compiled denylist matcher. Patterns are simple substrings; Aho-Corasick
/// gives a single linear-time scan over each candidate.
#[derive(Debug)]
pub struct Denylist {
    matcher: AhoCorasick,
}

impl Denylist {
    /// Built-in fragments only.
    pub fn builtin() -> Self {
        Self::with_extra(&[])
    }

    /// Built-in fragments plus operator-supplied extras.
    pub fn with_extra(extra: &[String]) -> Self {
        let patterns: Vec<&str> = GATE_DOMAIN_FRAGMENTS
            .iter()
            .copied()
            .chain(extra.iter().map(String::as_str))
            .filter(|p| !p.trim().is_empty())
            .collect();
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .expect("valid denylist patterns");
        Self { matcher }
    }

    /// `true` when `url` contains any denylisted fragment.
    pub fn matches(&self, url: &str) -> bool {
        self.matcher.is_match(url)
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_known_gate_domains() {
        let denylist = Denylist::builtin();
        assert!(denylist.matches("https://linkvertise.com/12345/download"));
        assert!(denylist.matches("https://adf.ly/abc"));
        assert!(denylist.matches("https://bit.ly/3xyz"));
        assert!(denylist.matches("https://shorte.st/xyz"));
        assert!(denylist.matches("https://example.com/ads/landing"));
    }

    #[test]
    fn match_is_case_insensitive() {
        let denylist = Denylist::builtin();
        assert!(denylist.matches("https://LINKVERTISE.com/x"));
        assert!(denylist.matches("https://Bit.LY/x"));
    }

    #[test]
    fn passes_ordinary_destinations() {
        let denylist = Denylist::builtin();
        assert!(!denylist.matches("https://real-destination.example/page"));
        assert!(!denylist.matches("https://docs.rs/scraper"));
    }

    #[test]
    fn extra_fragments_extend_the_builtin_set() {
        let denylist = Denylist::with_extra(&["ouo.io".to_string()]);
        assert!(denylist.matches("https://ouo.io/abc"));
        assert!(denylist.matches("https://bit.ly/still-denied"));
    }
}
