//! Runtime settings for the site, the output layout, and the summarizer.
//!
//! Defaults target the live site and write into the working directory. A
//! YAML file can override any subset of fields, and the CLI overrides the
//! file (see [`crate::cli::Cli::apply`]).

use crate::errors::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Everything a run needs to know that is not compiled in as a selector.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Site root used for the listing endpoint, the article `Referer`, and
    /// resolving relative links.
    pub base_url: String,
    /// Path of the AJAX listing endpoint below `base_url`.
    pub listing_path: String,
    /// Column (`_colId`) holding the news listing.
    pub column_id: u32,
    /// Module (`moduleId`) rendering the listing.
    pub module_id: u32,
    /// Listing page to request, starting at 1.
    pub page: u32,
    /// Where downloaded attachments are written.
    pub attachments_dir: PathBuf,
    /// Where notice Markdown files are written.
    pub output_dir: PathBuf,
    /// Number of sentences in each summary.
    pub summary_sentences: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://www.hbjzxh.org.cn".to_string(),
            listing_path: "/ajax/ajaxLoadModuleDom_h.jsp".to_string(),
            column_id: 125,
            module_id: 1172,
            page: 1,
            attachments_dir: PathBuf::from("attachments"),
            output_dir: PathBuf::from("通知输出"),
            summary_sentences: 3,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file; missing fields keep their defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the YAML settings file
    ///
    /// # Returns
    ///
    /// The defaults overlaid with every field present in the file. An empty
    /// file yields [`Settings::default`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Read`] if the file cannot be read
    /// - [`ConfigError::Parse`] if it is not valid YAML for these settings
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?settings, "Loaded settings file");
        Ok(settings)
    }

    /// Parse settings from YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Full URL of the listing endpoint.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.listing_path.trim_start_matches('/')
        )
    }

    /// `Referer` sent with article requests.
    pub fn referer(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// Site-relative page href the listing module is asked to render.
    pub fn listing_href(&self) -> String {
        format!(
            "/col.jsp?m{}pageno={}&id={}",
            self.module_id, self.page, self.column_id
        )
    }
}
