//! HTML utilities for comment bodies
//!
//! Two flavors: [`strip_html`] reduces a body to plain text for keyword
//! matching, [`sanitize_html`] removes script/style blocks but keeps the
//! markup for rendering.

use once_cell::sync::Lazy;
use regex::Regex;

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Strip markup and decode common entities, yielding trimmed plain text.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let text = STYLE_BLOCK.replace_all(html, "");
    let text = SCRIPT_BLOCK.replace_all(&text, "");
    let text = ANY_TAG.replace_all(&text, "");
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

/// Remove script and style blocks, keeping the remaining markup intact.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    STYLE_BLOCK.replace_all(&text, "").into_owned()
}
