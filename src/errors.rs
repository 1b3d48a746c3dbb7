//! Error types for each stage of a run.
//!
//! Every error is scoped to the unit it can abort: a single attachment, a
//! single article, or (for listing retrieval and directory setup) the whole
//! run. The orchestrator catches [`ArticleError`]s, the attachment loop
//! catches [`AttachmentError`]s, and only [`PipelineError`] reaches `main`.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed source used for transport failures so that test fixtures can
/// produce them without a live `reqwest::Error`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A low-level failure of one HTTP exchange.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The listing could not be retrieved; nothing can be processed.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid base URL {url}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("listing request failed: {0}")]
    Request(#[source] FetchError),
    #[error("listing endpoint answered HTTP {0}")]
    Status(StatusCode),
    #[error("domStr field not found in listing response")]
    MissingDomStr,
    #[error("domStr field is not a valid escaped string: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Processing of a single article failed.
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("article request failed: {0}")]
    Fetch(#[source] FetchError),
    #[error("article {url} answered HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not write notice {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One attachment could not be saved; the article carries on without it.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("attachment {name:?} has no href")]
    MissingHref { name: String },
    #[error("attachment link {href:?} has no name to save it under")]
    Unnamed { href: String },
    #[error("attachment {name:?} has an unusable href {href:?}: {source}")]
    BadHref {
        name: String,
        href: String,
        #[source]
        source: url::ParseError,
    },
    #[error("attachment {name:?} download failed: {source}")]
    Download {
        name: String,
        #[source]
        source: FetchError,
    },
}

/// Fatal run-level failures surfaced to the entry point.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("output directory {} is not usable: {source}", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

/// The YAML settings file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
