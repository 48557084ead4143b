//! Parsers for DuckDuckGo responses.
//!
//! - Text: the no-JavaScript results page (`div.result` blocks)
//! - Images: the `vqd` token embedded in the search page, and `i.js` JSON

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::{ImageHit, TextHit};

// ---------------------------------------------------------------------------
// Selectors and patterns (compiled once)
// ---------------------------------------------------------------------------

static RESULT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.result").expect("result selector"));

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("title selector"));

static SNIPPET_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__snippet").expect("snippet selector"));

/// Matches `vqd="4-123..."`, `vqd='...'` or `vqd=4-123...&`.
static VQD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"vqd=["']?([0-9A-Za-z_-]+)"#).expect("vqd regex"));

/// Base used to resolve the protocol-relative redirect links on result pages.
static REDIRECT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://duckduckgo.com/").expect("redirect base"));

// ---------------------------------------------------------------------------
// Text results
// ---------------------------------------------------------------------------

/// Parse up to `max_results` organic hits from a results page.
///
/// Sponsored blocks and hits without a resolvable link are skipped.
pub(crate) fn parse_text_results(html: &str, max_results: usize) -> Vec<TextHit> {
    let doc = Html::parse_document(html);
    let mut hits = Vec::new();

    for block in doc.select(&RESULT_SEL) {
        if hits.len() >= max_results {
            break;
        }

        if block.value().classes().any(|c| c == "result--ad") {
            continue;
        }

        let Some(anchor) = block.select(&TITLE_SEL).next() else {
            continue;
        };

        let Some(href) = anchor.value().attr("href").and_then(resolve_href) else {
            continue;
        };

        let title = collapse_whitespace(&anchor.text().collect::<String>());
        let body = block
            .select(&SNIPPET_SEL)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        hits.push(TextHit { title, body, href });
    }

    hits
}

/// Turn a result link into the target URL.
///
/// Result links are usually wrapped as `//duckduckgo.com/l/?uddg=<target>`;
/// ad click-through links (`/y.js`) yield `None`.
pub(crate) fn resolve_href(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let resolved = REDIRECT_BASE.join(raw).ok()?;
    let on_ddg = resolved
        .host_str()
        .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"));

    if on_ddg {
        return match resolved.path() {
            "/l/" => resolved
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
                .filter(|target| !target.is_empty()),
            "/y.js" => None,
            _ => Some(resolved.to_string()),
        };
    }

    if raw.starts_with("http://") || raw.starts_with("https://") {
        Some(raw.to_string())
    } else {
        Some(resolved.to_string())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Image results
// ---------------------------------------------------------------------------

/// Extract the `vqd` request token from a search page.
pub(crate) fn extract_vqd(page: &str) -> Option<String> {
    VQD_RE.captures(page).map(|caps| caps[1].to_string())
}

#[derive(Debug, Deserialize)]
struct ImagePage {
    #[serde(default)]
    results: Vec<ImageHit>,
}

/// Decode an `i.js` response body into at most `max_results` hits.
pub(crate) fn parse_image_results(
    body: &str,
    max_results: usize,
) -> serde_json::Result<Vec<ImageHit>> {
    let page: ImagePage = serde_json::from_str(body)?;
    Ok(page.results.into_iter().take(max_results).collect())
}
