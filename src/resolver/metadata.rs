//! Best-effort page metadata (title + meta description).

use scraper::{Html, Selector};

use crate::core::types::PageMetadata;

/// Single read of the rendered document. Absence of either field is not an
/// error; a page with neither yields `None`.
pub fn extract_metadata(html: &str) -> Option<PageMetadata> {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let description = Selector::parse("meta[name=\"description\"]").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    });

    if title.is_none() && description.is_none() {
        return None;
    }
    Some(PageMetadata { title, description })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_title_and_description() {
        let html = r#"<html><head>
            <title> Gate Page </title>
            <meta name="description" content="An intermediary page.">
        </head><body></body></html>"#;
        let meta = extract_metadata(html).expect("metadata present");
        assert_eq!(meta.title.as_deref(), Some("Gate Page"));
        assert_eq!(meta.description.as_deref(), Some("An intermediary page."));
    }

    #[test]
    fn missing_description_is_not_an_error() {
        let html = "<html><head><title>Only a title</title></head></html>";
        let meta = extract_metadata(html).expect("metadata present");
        assert_eq!(meta.title.as_deref(), Some("Only a title"));
        assert!(meta.description.is_none());
    }

    #[test]
    fn bare_page_yields_none() {
        assert!(extract_metadata("<html><body><p>hi</p></body></html>").is_none());
    }
}
