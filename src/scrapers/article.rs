//! Article processing: fetch, extract, summarize, download, write.
//!
//! One call to [`ArticleProcessor::process_article`] turns a listing entry
//! into at most one notice file plus any attachment files. Outcomes that mean
//! "nothing to write" (403, no content block, empty content) are returned as
//! [`ArticleOutcome`] values rather than errors. A failed attachment only
//! drops that attachment from the notice.

use crate::client::Fetcher;
use crate::config::Settings;
use crate::errors::{ArticleError, AttachmentError};
use crate::models::{ArticleOutcome, Attachment, ListingEntry, NoticeDocument};
use crate::outputs::markdown::render_notice;
use crate::scrapers::SELECTORS;
use crate::summarizer::Summarizer;
use crate::utils::sanitize_filename;
use itertools::Itertools;
use reqwest::StatusCode;
use scraper::{ElementRef, Html};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Article pages are only served to requests that look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9";

/// What an article page yields before any network access for attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    /// Text nodes of the content block, trimmed and joined by newlines.
    pub text: String,
    pub attachments: Vec<AttachmentLink>,
}

/// An attachment link as found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLink {
    pub name: String,
    pub href: Option<String>,
}

/// Read the content block and attachment links of an article page.
///
/// Returns `None` when the page has no content block.
pub fn parse_article(html: &str) -> Option<ArticlePage> {
    let document = Html::parse_document(html);
    let content = document.select(&SELECTORS.article_content).next()?;
    let text = visible_text(content);

    let attachments = document
        .select(&SELECTORS.attachment_box)
        .next()
        .map(|attach_box| {
            attach_box
                .select(&SELECTORS.attachment_link)
                .map(|a| AttachmentLink {
                    name: a.text().map(str::trim).collect(),
                    href: a.value().attr("href").map(|h| h.trim().to_string()),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(ArticlePage { text, attachments })
}

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "template"];

/// Trimmed text nodes under `root`, skipping anything inside
/// [`HIDDEN_ELEMENTS`].
fn visible_text(root: ElementRef<'_>) -> String {
    root.descendants()
        .filter(|node| {
            !node
                .ancestors()
                .filter_map(|a| a.value().as_element())
                .any(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        })
        .filter_map(|node| node.value().as_text())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .join("\n")
}

/// Turn an attachment href into an absolute URL.
///
/// Protocol-relative links (`//host/path`) get `https:`; other relative
/// links are resolved against `base`.
pub fn normalize_attachment_href(href: &str, base: &str) -> Result<String, url::ParseError> {
    if let Some(rest) = href.strip_prefix("//") {
        return Ok(format!("https://{rest}"));
    }
    Ok(Url::parse(base)?.join(href)?.to_string())
}

/// Processes listing entries into notices.
#[derive(Debug)]
pub struct ArticleProcessor<'a, F> {
    fetcher: &'a F,
    summarizer: &'a Summarizer,
    settings: &'a Settings,
}

impl<'a, F: Fetcher> ArticleProcessor<'a, F> {
    pub fn new(fetcher: &'a F, summarizer: &'a Summarizer, settings: &'a Settings) -> Self {
        Self {
            fetcher,
            summarizer,
            settings,
        }
    }

    /// Fetch one article and write its notice.
    ///
    /// # Errors
    ///
    /// - [`ArticleError::Fetch`] when the article request fails
    /// - [`ArticleError::Status`] for any non-2xx status other than 403
    /// - [`ArticleError::Write`] when the notice cannot be written
    #[instrument(level = "info", skip_all, fields(title = %entry.title, url = %entry.url))]
    pub async fn process_article(
        &self,
        entry: &ListingEntry,
    ) -> Result<ArticleOutcome, ArticleError> {
        info!("Processing article");

        let referer = self.settings.referer();
        let headers = [
            ("User-Agent", BROWSER_USER_AGENT),
            ("Referer", referer.as_str()),
            ("Accept-Language", ACCEPT_LANGUAGE),
        ];
        let page = self
            .fetcher
            .get(&entry.url, &headers)
            .await
            .map_err(ArticleError::Fetch)?;

        if page.status == StatusCode::FORBIDDEN {
            warn!("Article blocked with 403 Forbidden; skipping");
            return Ok(ArticleOutcome::Blocked);
        }
        if !page.status.is_success() {
            return Err(ArticleError::Status {
                url: entry.url.clone(),
                status: page.status,
            });
        }

        let Some(article) = parse_article(&page.body) else {
            warn!("Content block not found; nothing to write");
            return Ok(ArticleOutcome::MissingContent);
        };
        if article.text.is_empty() {
            warn!("Content block is empty; nothing to write");
            return Ok(ArticleOutcome::EmptyContent);
        }
        debug!(chars = article.text.chars().count(), links = article.attachments.len(), "Parsed article");

        let summary = self
            .summarizer
            .summarize(&article.text, self.settings.summary_sentences);

        let mut attachments = Vec::with_capacity(article.attachments.len());
        for link in &article.attachments {
            match self.download_attachment(link).await {
                Ok(attachment) => attachments.push(attachment),
                Err(e) => error!(error = %e, "Attachment download failed; continuing without it"),
            }
        }

        let notice = NoticeDocument {
            title: entry.title.clone(),
            publish_date: entry.publish_date.clone(),
            summary,
            attachments,
        };
        let path = self.notice_path(&entry.title);
        fs::write(&path, render_notice(&notice))
            .await
            .map_err(|source| ArticleError::Write {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), attachments = notice.attachments.len(), "Notice written");
        Ok(ArticleOutcome::Written(path))
    }

    fn notice_path(&self, title: &str) -> PathBuf {
        self.settings
            .output_dir
            .join(format!("{}.md", sanitize_filename(title)))
    }

    #[instrument(level = "info", skip_all, fields(name = %link.name))]
    async fn download_attachment(&self, link: &AttachmentLink) -> Result<Attachment, AttachmentError> {
        let href = link.href.as_deref().ok_or_else(|| AttachmentError::MissingHref {
            name: link.name.clone(),
        })?;
        if link.name.is_empty() {
            return Err(AttachmentError::Unnamed {
                href: href.to_string(),
            });
        }
        let url = normalize_attachment_href(href, &self.settings.base_url).map_err(|source| {
            AttachmentError::BadHref {
                name: link.name.clone(),
                href: href.to_string(),
                source,
            }
        })?;

        let local_path = self
            .settings
            .attachments_dir
            .join(sanitize_filename(&link.name));
        let bytes = self
            .fetcher
            .download(&url, &[("User-Agent", BROWSER_USER_AGENT)], &local_path)
            .await
            .map_err(|source| AttachmentError::Download {
                name: link.name.clone(),
                source,
            })?;

        info!(%url, path = %local_path.display(), bytes, "Saved attachment");
        Ok(Attachment {
            display_name: link.name.clone(),
            local_path,
        })
    }
}
