//! One full pass: prepare directories, fetch the listing, process articles.
//!
//! Articles are processed strictly in listing order, one at a time. A failing
//! article is logged and counted and the pass moves on; only directory setup
//! and listing retrieval can abort the run.

use crate::client::Fetcher;
use crate::config::Settings;
use crate::errors::PipelineError;
use crate::models::{ListingEntry, RunReport};
use crate::scrapers::article::ArticleProcessor;
use crate::scrapers::listing::ListingFetcher;
use crate::summarizer::Summarizer;
use crate::utils::ensure_writable_dir;
use tracing::{error, info, instrument};

/// Run a complete fetch-and-process pass.
///
/// # Errors
///
/// [`PipelineError::Setup`] when an output directory cannot be created or
/// written, [`PipelineError::Retrieval`] when the listing cannot be fetched.
#[instrument(level = "info", skip_all)]
pub async fn run<F: Fetcher>(
    fetcher: &F,
    summarizer: &Summarizer,
    settings: &Settings,
) -> Result<RunReport, PipelineError> {
    for dir in [&settings.attachments_dir, &settings.output_dir] {
        ensure_writable_dir(dir)
            .await
            .map_err(|source| PipelineError::Setup {
                path: dir.clone(),
                source,
            })?;
    }

    let entries = ListingFetcher::new(fetcher, settings).fetch_listing().await?;
    Ok(process_entries(fetcher, summarizer, settings, &entries).await)
}

/// Process `entries` in order, isolating failures per article.
pub async fn process_entries<F: Fetcher>(
    fetcher: &F,
    summarizer: &Summarizer,
    settings: &Settings,
    entries: &[ListingEntry],
) -> RunReport {
    let processor = ArticleProcessor::new(fetcher, summarizer, settings);
    let mut report = RunReport {
        listed: entries.len(),
        ..RunReport::default()
    };

    for (index, entry) in entries.iter().enumerate() {
        match processor.process_article(entry).await {
            Ok(outcome) => report.record(&outcome),
            Err(e) => {
                report.failed += 1;
                error!(index, title = %entry.title, error = %e, "Article failed; continuing with the next one");
            }
        }
    }

    info!(
        listed = report.listed,
        written = report.written,
        blocked = report.blocked,
        skipped = report.skipped,
        failed = report.failed,
        "Completed article processing"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{Fixture, FixtureFetcher};
    use crate::errors::RetrievalError;

    const LISTING_BODY: &str = r##"{"domStr":"<div class=\"m_news_info\"><a class=\"article_title\" href=\"/nd.jsp?id=1\" title=\"第一篇\">1<\/a><span class=\"normal_time\">2025-01-02<\/span><\/div><div class=\"m_news_info\"><a class=\"article_title\" href=\"/nd.jsp?id=2\" title=\"第二篇\">2<\/a><span class=\"normal_time\">2025-01-03<\/span><\/div>","scripts":""}"##;

    const ARTICLE: &str = r#"<div class="richContent richContent0"><p>协会发布年度工作通知。请各单位认真落实。</p></div>"#;

    fn settings(root: &std::path::Path) -> Settings {
        Settings {
            attachments_dir: root.join("attachments"),
            output_dir: root.join("通知输出"),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_failed_article_does_not_stop_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path());
        let fetcher = FixtureFetcher::new()
            .route(&settings.listing_url(), Fixture::ok(LISTING_BODY))
            .route("https://www.hbjzxh.org.cn/nd.jsp?id=1", Fixture::status(500))
            .route("https://www.hbjzxh.org.cn/nd.jsp?id=2", Fixture::ok(ARTICLE));

        let report = run(&fetcher, &Summarizer::new(), &settings).await.unwrap();

        assert_eq!(
            report,
            RunReport {
                listed: 2,
                written: 1,
                blocked: 0,
                skipped: 0,
                failed: 1,
            }
        );
        assert!(!settings.output_dir.join("第一篇.md").exists());
        let md = std::fs::read_to_string(settings.output_dir.join("第二篇.md")).unwrap();
        assert!(md.starts_with("## 第二篇\n"));
        assert!(md.contains("[发布时间] 2025-01-03"));
    }

    #[tokio::test]
    async fn test_articles_are_fetched_in_listing_order() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path());
        let fetcher = FixtureFetcher::new()
            .route(&settings.listing_url(), Fixture::ok(LISTING_BODY))
            .route("https://www.hbjzxh.org.cn/nd.jsp?id=1", Fixture::status(403))
            .route("https://www.hbjzxh.org.cn/nd.jsp?id=2", Fixture::ok(ARTICLE));

        let report = run(&fetcher, &Summarizer::new(), &settings).await.unwrap();
        assert_eq!(report.blocked, 1);
        assert_eq!(report.written, 1);

        let urls: Vec<String> = fetcher.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                settings.listing_url(),
                "https://www.hbjzxh.org.cn/nd.jsp?id=1".to_string(),
                "https://www.hbjzxh.org.cn/nd.jsp?id=2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path());
        let fetcher = FixtureFetcher::new().route(&settings.listing_url(), Fixture::status(502));

        let err = run(&fetcher, &Summarizer::new(), &settings).await.unwrap_err();

        assert!(matches!(err, PipelineError::Retrieval(RetrievalError::Status(_))));
        assert!(settings.attachments_dir.is_dir());
        assert!(settings.output_dir.is_dir());
    }

    #[tokio::test]
    async fn test_unusable_output_dir_is_a_setup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path());
        std::fs::write(&settings.output_dir, "not a directory").unwrap();
        let fetcher = FixtureFetcher::new();

        let err = run(&fetcher, &Summarizer::new(), &settings).await.unwrap_err();

        assert!(matches!(err, PipelineError::Setup { ref path, .. } if *path == settings.output_dir));
        assert!(fetcher.requests().is_empty());
    }
}
