//! Scrapers for the hbjzxh.org.cn news column.
//!
//! Scraping happens in two phases:
//!
//! 1. **Listing**: [`listing::ListingFetcher`] asks the AJAX endpoint for one
//!    rendered page of the news column and turns it into
//!    [`ListingEntry`](crate::models::ListingEntry) values.
//! 2. **Articles**: [`article::ArticleProcessor`] fetches each article,
//!    downloads its attachments, summarizes its text, and writes the notice.
//!
//! # Selectors
//!
//! All knowledge of the site's markup lives in the constants below so that a
//! site redesign touches one place.
//!
//! | Constant | Selector | Page |
//! |----------|----------|------|
//! | [`NEWS_ITEM`] | `div.m_news_info` | listing |
//! | [`NEWS_TITLE_LINK`] | `a.article_title` | listing |
//! | [`NEWS_DATE`] | `span.normal_time` | listing |
//! | [`ARTICLE_CONTENT`] | `div.richContent.richContent0` | article |
//! | [`ATTACHMENT_BOX`] | `div.attachBox` | article |
//! | [`ATTACHMENT_LINK`] | `a.attachName` | article |

use once_cell::sync::Lazy;
use scraper::Selector;

pub mod article;
pub mod listing;

pub const NEWS_ITEM: &str = "div.m_news_info";
pub const NEWS_TITLE_LINK: &str = "a.article_title";
pub const NEWS_DATE: &str = "span.normal_time";
pub const ARTICLE_CONTENT: &str = "div.richContent.richContent0";
pub const ATTACHMENT_BOX: &str = "div.attachBox";
pub const ATTACHMENT_LINK: &str = "a.attachName";

/// Compiled selectors, parsed once on first use.
pub(crate) struct Selectors {
    pub news_item: Selector,
    pub news_title_link: Selector,
    pub news_date: Selector,
    pub article_content: Selector,
    pub attachment_box: Selector,
    pub attachment_link: Selector,
}

fn compile(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector constant {css:?}: {e:?}"))
}

pub(crate) static SELECTORS: Lazy<Selectors> = Lazy::new(|| Selectors {
    news_item: compile(NEWS_ITEM),
    news_title_link: compile(NEWS_TITLE_LINK),
    news_date: compile(NEWS_DATE),
    article_content: compile(ARTICLE_CONTENT),
    attachment_box: compile(ATTACHMENT_BOX),
    attachment_link: compile(ATTACHMENT_LINK),
});
