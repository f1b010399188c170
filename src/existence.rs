//! Page existence check
//!
//! Many target sites answer a missing page with a normal-looking "not found"
//! page, so the only reliable signal is the presence of their marker text.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::fetch::PageFetcher;

/// Marker text that identifies a soft-404 page, and where to look for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureMarker {
    /// Text shown by the site when the page has no content
    pub message: String,

    /// Selector of the element that carries the message
    pub selector: String,
}

impl FailureMarker {
    pub fn new(message: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            selector: selector.into(),
        }
    }
}

/// Decide whether `url` has useful content
///
/// Returns `false` when the fetch errors, when the page does not load, or when
/// the selected content contains the marker text. Fetch errors are never
/// passed on to the caller.
#[instrument(skip(fetcher))]
pub async fn check_existence<F>(fetcher: &F, url: &str, marker: &FailureMarker) -> bool
where
    F: PageFetcher,
{
    let page = match fetcher.fetch(url, &marker.selector).await {
        Ok(page) => page,
        Err(e) => {
            debug!("Existence fetch failed for {}: {}", url, e);
            return false;
        }
    };

    if !page.success {
        debug!("Page {} did not load", url);
        return false;
    }

    if page.content.contains(&marker.message) || page.text().contains(&marker.message) {
        debug!("Failure marker found on {}", url);
        return false;
    }

    true
}
