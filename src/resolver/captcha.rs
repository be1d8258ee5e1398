//! CAPTCHA presence detection.
//!
//! Structural signature test against the rendered document; no attempt to
//! understand or solve the challenge. A false negative (unmatched signature)
//! is a known limitation; a false positive fails a request that would have
//! been ineffective to continue anyway.

use scraper::{Html, Selector};

/// Ordered CSS-selector signatures of common CAPTCHA widgets. First match
/// wins; order only affects latency, not the verdict.
const CAPTCHA_SIGNATURES: &[&str] = &[
    "iframe[src*=\"captcha\"]",
    "input[name=\"captcha\"]",
    "#recaptcha",
    ".g-recaptcha",
    "[aria-label*=\"captcha\"]",
    "div[class*=\"captcha\"]",
];

/// `true` when the rendered page carries any known CAPTCHA signature.
pub fn looks_like_captcha(html: &str) -> bool {
    let document = Html::parse_document(html);
    for signature in CAPTCHA_SIGNATURES {
        if let Ok(selector) = Selector::parse(signature) {
            if document.select(&selector).next().is_some() {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_recaptcha_container() {
        let html = r#"<html><body><div id="recaptcha"></div></body></html>"#;
        assert!(looks_like_captcha(html));
    }

    #[test]
    fn detects_captcha_iframe() {
        let html = r#"<html><body>
            <iframe src="https://challenge.example/captcha/v2?k=abc"></iframe>
        </body></html>"#;
        assert!(looks_like_captcha(html));
    }

    #[test]
    fn detects_captcha_form_input() {
        let html = r#"<form><input name="captcha" type="text"></form>"#;
        assert!(looks_like_captcha(html));
    }

    #[test]
    fn detects_widget_class_and_aria_label() {
        assert!(looks_like_captcha(
            r#"<div class="g-recaptcha" data-sitekey="k"></div>"#
        ));
        assert!(looks_like_captcha(
            r#"<div aria-label="please solve the captcha below"></div>"#
        ));
        assert!(looks_like_captcha(
            r#"<div class="hcaptcha-box captcha-wrapper"></div>"#
        ));
    }

    #[test]
    fn clean_page_is_not_flagged() {
        let html = r#"<html><head><title>Plain page</title></head>
            <body><a href="https://example.com/next">continue</a></body></html>"#;
        assert!(!looks_like_captcha(html));
    }
}
