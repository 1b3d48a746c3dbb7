//! Command-line interface definitions.
//!
//! Every option is optional: running the binary with no arguments fetches the
//! first listing page of the live site and writes into `attachments/` and
//! `通知输出/` under the working directory.

use crate::config::Settings;
use crate::errors::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Defaults
/// hbjzxh_notices
///
/// # Custom output locations and a settings file
/// hbjzxh_notices -a ./files -o ./notices --config ./hbjzxh.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory for downloaded attachments
    #[arg(short, long, env = "HBJZXH_ATTACHMENTS_DIR")]
    pub attachments_dir: Option<PathBuf>,

    /// Directory for the generated notice Markdown files
    #[arg(short, long, env = "HBJZXH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Optional path to a YAML settings file
    #[arg(short, long, env = "HBJZXH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listing page to fetch
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Number of sentences per summary
    #[arg(short, long)]
    pub sentences: Option<usize>,
}

impl Cli {
    /// Resolve the effective settings: defaults, then the settings file, then
    /// flags given on the command line.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let base = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        Ok(self.apply(base))
    }

    /// Overlay the flags that were given on top of `settings`.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(dir) = &self.attachments_dir {
            settings.attachments_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(page) = self.page {
            settings.page = page;
        }
        if let Some(n) = self.sentences {
            settings.summary_sentences = n;
        }
        settings
    }
}
