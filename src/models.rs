//! Data models flowing through a run.
//!
//! - [`ListingEntry`]: one row of the news listing
//! - [`Attachment`]: a file that was downloaded for an article
//! - [`NoticeDocument`]: everything needed to render one Markdown notice
//! - [`ArticleOutcome`] and [`RunReport`]: what happened to each entry
//!
//! Nothing here is persisted; every run re-derives the entries from the live
//! listing.

use std::path::PathBuf;

/// A news item as it appears on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Title taken from the link's `title` attribute.
    pub title: String,
    /// Absolute article URL.
    pub url: String,
    /// Publish date exactly as printed on the listing.
    pub publish_date: String,
}

/// An attachment whose bytes were written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Link text shown on the article page.
    pub display_name: String,
    /// Where the file was written.
    pub local_path: PathBuf,
}

/// The content of one notice file before rendering.
#[derive(Debug, Clone)]
pub struct NoticeDocument {
    pub title: String,
    pub publish_date: String,
    pub summary: String,
    pub attachments: Vec<Attachment>,
}

/// Non-error results of processing a single article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// The notice was written to this path.
    Written(PathBuf),
    /// The site answered 403.
    Blocked,
    /// The page had no content container.
    MissingContent,
    /// The content container held no text.
    EmptyContent,
}

/// Counters for one pass over the listing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub listed: usize,
    pub written: usize,
    pub blocked: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    /// Fold one article's result into the counters.
    pub fn record(&mut self, outcome: &ArticleOutcome) {
        match outcome {
            ArticleOutcome::Written(_) => self.written += 1,
            ArticleOutcome::Blocked => self.blocked += 1,
            ArticleOutcome::MissingContent | ArticleOutcome::EmptyContent => self.skipped += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_report_counts_outcomes() {
        let mut report = RunReport {
            listed: 4,
            ..Default::default()
        };
        report.record(&ArticleOutcome::Written(PathBuf::from("通知输出/a.md")));
        report.record(&ArticleOutcome::Blocked);
        report.record(&ArticleOutcome::MissingContent);
        report.record(&ArticleOutcome::EmptyContent);

        assert_eq!(report.written, 1);
        assert_eq!(report.blocked, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_listing_entries_compare_by_value() {
        let a = ListingEntry {
            title: "关于举办培训班的通知".to_string(),
            url: "https://www.hbjzxh.org.cn/nd.jsp?id=1".to_string(),
            publish_date: "2025-03-01".to_string(),
        };
        assert_eq!(a.clone(), a);
    }
}
