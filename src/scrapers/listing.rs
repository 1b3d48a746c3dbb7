//! News listing retrieval.
//!
//! The listing is served by an AJAX endpoint that answers a form POST with a
//! JSON-ish payload. The rendered HTML of the news column sits in its
//! `domStr` field as an escaped string. We locate that field, decode its
//! escapes, and read the news items out of the fragment.

use crate::client::Fetcher;
use crate::config::Settings;
use crate::errors::RetrievalError;
use crate::models::ListingEntry;
use crate::scrapers::SELECTORS;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument};
use url::Url;

/// The listing endpoint only needs a minimal browser-looking agent.
const LISTING_USER_AGENT: &str = "Mozilla/5.0";

/// Server-side command that renders a module page.
const LISTING_COMMAND: &str = "getWafNotCk_getAjaxPageModuleInfo";

/// Matches `"domStr": "<escaped string>"`, capturing the escaped body.
static DOM_STR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"domStr"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("domStr pattern is valid")
});

/// Retrieves one page of the news listing.
#[derive(Debug)]
pub struct ListingFetcher<'a, F> {
    fetcher: &'a F,
    settings: &'a Settings,
}

impl<'a, F: Fetcher> ListingFetcher<'a, F> {
    pub fn new(fetcher: &'a F, settings: &'a Settings) -> Self {
        Self { fetcher, settings }
    }

    /// Form fields asking the endpoint to render the configured page.
    fn form(&self) -> Vec<(&'static str, String)> {
        let s = self.settings;
        vec![
            ("cmd", LISTING_COMMAND.to_string()),
            ("_colId", s.column_id.to_string()),
            ("_extId", "0".to_string()),
            ("moduleId", s.module_id.to_string()),
            ("href", s.listing_href()),
            ("newNextPage", "false".to_string()),
            ("needIncToVue", "false".to_string()),
        ]
    }

    /// Fetch the listing and return its entries in page order.
    ///
    /// # Errors
    ///
    /// Any [`RetrievalError`]: the base URL is invalid, the request fails or
    /// answers non-2xx, or the `domStr` field is missing or undecodable.
    #[instrument(level = "info", skip_all, fields(page = self.settings.page))]
    pub async fn fetch_listing(&self) -> Result<Vec<ListingEntry>, RetrievalError> {
        let base = Url::parse(&self.settings.base_url).map_err(|source| {
            RetrievalError::BaseUrl {
                url: self.settings.base_url.clone(),
                source,
            }
        })?;

        let url = self.settings.listing_url();
        let page = self
            .fetcher
            .post_form(&url, &self.form(), &[("User-Agent", LISTING_USER_AGENT)])
            .await
            .map_err(RetrievalError::Request)?;
        if !page.status.is_success() {
            return Err(RetrievalError::Status(page.status));
        }

        let html = extract_dom_str(&page.body)?;
        let entries = parse_listing(&html, &base);
        info!(count = entries.len(), source = %url, "Indexed listing entries");
        debug!(urls = ?entries.iter().map(|e| e.url.as_str()).collect::<Vec<_>>(), "Listing URLs");
        Ok(entries)
    }
}

/// Locate the `domStr` field in a listing response and decode its string
/// escapes (`\"`, `\\`, `\/`, `\n`, `\uXXXX`, ...) into literal HTML.
///
/// Only the field itself is inspected, so the surrounding payload may be
/// anything.
pub fn extract_dom_str(body: &str) -> Result<String, RetrievalError> {
    let escaped = DOM_STR
        .captures(body)
        .and_then(|c| c.get(1))
        .ok_or(RetrievalError::MissingDomStr)?
        .as_str();
    serde_json::from_str::<String>(&format!("\"{escaped}\"")).map_err(RetrievalError::Decode)
}

/// Read news items from a rendered listing fragment.
///
/// Items lacking a title link, a non-empty title, an href, or a date are
/// skipped. Hrefs are resolved against `base`.
pub fn parse_listing(html: &str, base: &Url) -> Vec<ListingEntry> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&SELECTORS.news_item)
        .filter_map(|item| {
            let entry = listing_entry(item, base);
            if entry.is_none() {
                debug!(item = %truncate_for_log(&item.html(), 200), "Skipping incomplete news item");
            }
            entry
        })
        .collect()
}

fn listing_entry(item: ElementRef<'_>, base: &Url) -> Option<ListingEntry> {
    let link = item.select(&SELECTORS.news_title_link).next()?;
    let date = item.select(&SELECTORS.news_date).next()?;

    let title = link.value().attr("title")?.trim();
    let href = link.value().attr("href")?.trim();
    if title.is_empty() || href.is_empty() {
        return None;
    }
    let url = base.join(href).ok()?;

    Some(ListingEntry {
        title: title.to_string(),
        url: url.to_string(),
        publish_date: date.text().map(str::trim).collect(),
    })
}
