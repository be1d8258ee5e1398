//! Final-URL heuristic extraction.
//!
//! Invoked only when the settled URL is unusable (no redirect happened, or
//! the browser landed on another gate/shortener domain). Two stages, first
//! hit wins:
//!
//! 1. anchor scan: outbound `http(s)` hyperlinks in document order,
//! 2. content regex scan: absolute URLs embedded anywhere in the page
//!    source, in source order.
//!
//! Both stages filter candidates through the denylist. Exhaustion is not an
//! error; the caller falls back to the settled URL and records a warning.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

use super::denylist::Denylist;

/// Absolute URL with at least 5 non-whitespace, non-quote characters after
/// the scheme. Loose on purpose; the denylist does the real filtering.
fn embedded_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"https?://[^\s"']{5,}"#).expect("valid URL pattern"))
}

/// Best-effort search for a plausible destination URL in the rendered page.
///
/// Returns `None` when every candidate is denylisted or no candidate exists.
pub fn extract_candidate_url(html: &str, denylist: &Denylist) -> Option<String> {
    scan_anchors(html, denylist).or_else(|| scan_page_source(html, denylist))
}

/// Stage 1: first non-denylisted absolute hyperlink, in document order.
fn scan_anchors(html: &str, denylist: &Denylist) -> Option<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").ok()?;
    document
        .select(&anchors)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
        .find(|href| !denylist.matches(href))
        .map(str::to_string)
}

/// Stage 2: first non-denylisted absolute URL anywhere in the page source.
fn scan_page_source(html: &str, denylist: &Denylist) -> Option<String> {
    embedded_url_pattern()
        .find_iter(html)
        .map(|m| m.as_str())
        .find(|candidate| !denylist.matches(candidate))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_scan_skips_denylisted_links() {
        let html = r#"<body>
            <a href="https://linkvertise.com/offer">sponsored</a>
            <a href="https://bit.ly/tracked">tracked</a>
            <a href="https://real-destination.example/page">the real one</a>
        </body>"#;
        let hit = extract_candidate_url(html, &Denylist::builtin());
        assert_eq!(hit.as_deref(), Some("https://real-destination.example/page"));
    }

    #[test]
    fn anchor_scan_ignores_relative_links() {
        let html = r#"<body>
            <a href="/local/path">relative</a>
            <a href="https://dest.example/file">absolute</a>
        </body>"#;
        let hit = extract_candidate_url(html, &Denylist::builtin());
        assert_eq!(hit.as_deref(), Some("https://dest.example/file"));
    }

    #[test]
    fn falls_back_to_page_source_when_no_anchor_qualifies() {
        let html = r#"<body>
            <a href="/only/relative">nothing here</a>
            <script>var target = "https://dest.example/hidden/payload";</script>
        </body>"#;
        let hit = extract_candidate_url(html, &Denylist::builtin());
        assert_eq!(hit.as_deref(), Some("https://dest.example/hidden/payload"));
    }

    #[test]
    fn anchor_match_wins_over_page_source_match() {
        // A qualifying anchor must short-circuit stage 2 even when the raw
        // source contains an earlier embedded URL.
        let html = r#"<head><script>var first = "https://embedded.example/earlier";</script></head>
            <body><a href="https://anchored.example/target">go</a></body>"#;
        let hit = extract_candidate_url(html, &Denylist::builtin());
        assert_eq!(hit.as_deref(), Some("https://anchored.example/target"));
    }

    #[test]
    fn exhaustion_yields_none() {
        let html = r#"<body>
            <a href="https://adf.ly/gateway">gate</a>
            <p>mirror: https://bit.ly/mirror and https://shorte.st/alt</p>
        </body>"#;
        assert_eq!(extract_candidate_url(html, &Denylist::builtin()), None);
    }

    #[test]
    fn short_url_tails_are_not_candidates() {
        // Fewer than 5 characters after the scheme, below the match floor.
        let html = r#"<p>see http://a.b now</p>"#;
        assert_eq!(extract_candidate_url(html, &Denylist::builtin()), None);
    }
}
