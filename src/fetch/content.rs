//! Content extraction functionality for the fetch module

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

use crate::fetch::error::FetchError;

static IMAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid image pattern"));

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid link pattern"));

static BLANK_LINES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*){2,}").expect("valid blank line pattern"));

/// Tags that never carry text worth sending to the extraction service
const SKIPPED_TAGS: [&str; 6] = ["img", "script", "style", "noscript", "svg", "iframe"];

/// Keep only the elements matching `selector`
///
/// # Arguments
///
/// * `html` - The full page HTML
/// * `selector` - CSS selector for the content to keep
///
/// # Returns
///
/// The outer HTML of every matching element, concatenated in document order.
/// An empty string when nothing matches.
pub fn select_content(html: &str, selector: &str) -> Result<String, FetchError> {
    let parsed = Selector::parse(selector).map_err(|e| FetchError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let mut selected = String::new();
    for element in document.select(&parsed) {
        selected.push_str(&element.html());
    }

    Ok(selected)
}

/// Convert HTML to compact Markdown
///
/// Links are flattened to their text and images are dropped, which keeps the
/// input to the extraction service small. Lines are never wrapped.
pub fn html_to_markdown(html: &str) -> String {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();

    let markdown = match converter.convert(html) {
        Ok(markdown) => markdown,
        Err(e) => {
            warn!("Markdown conversion failed, falling back to text: {}", e);
            return visible_text(html);
        }
    };

    let markdown = IMAGE_PATTERN.replace_all(&markdown, "");
    let markdown = LINK_PATTERN.replace_all(&markdown, "$1");
    let markdown = BLANK_LINES_PATTERN.replace_all(&markdown, "\n\n");

    markdown.trim().to_string()
}

/// Whitespace-normalised text content of an HTML fragment
pub fn visible_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
