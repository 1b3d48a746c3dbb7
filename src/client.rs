//! HTTP access behind a small trait.
//!
//! The scrapers only talk to the network through [`Fetcher`], which keeps the
//! request plumbing (headers, streaming, status handling) in one place and
//! lets tests drive the scrapers from in-memory fixtures.
//!
//! - [`Fetcher`]: form POST, GET, and streamed download to a file
//! - [`HttpFetcher`]: the `reqwest` implementation used by the binary

use crate::errors::FetchError;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// A fetched text response. Any status is returned; callers decide which
/// ones are acceptable.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: StatusCode,
    pub body: String,
}

/// The network operations the scrapers need.
pub trait Fetcher {
    /// POST `form` as `application/x-www-form-urlencoded`.
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Page, FetchError>;

    /// GET `url` and read the body as text.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Page, FetchError>;

    /// GET `url` and stream the body into `dest`.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the file
    /// * `headers` - Extra request headers as name/value pairs
    /// * `dest` - File to create or overwrite; its directory must exist
    ///
    /// # Returns
    ///
    /// The number of bytes written to `dest`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] if the request fails or the body is cut short
    /// - [`FetchError::Status`] for a non-2xx response, before `dest` is created
    /// - [`FetchError::Io`] if `dest` cannot be created or written
    ///
    /// On any error after `dest` was created the partial file is removed.
    async fn download(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        dest: &Path,
    ) -> Result<u64, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn request(
        &self,
        builder: reqwest::RequestBuilder,
        headers: &[(&str, &str)],
    ) -> reqwest::RequestBuilder {
        headers
            .iter()
            .fold(builder, |b, (name, value)| b.header(*name, *value))
    }
}

fn transport(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        source: Box::new(e),
    }
}

async fn into_page(url: &str, response: reqwest::Response) -> Result<Page, FetchError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport(url, e))?;
    debug!(%url, %status, bytes = body.len(), "Received response");
    Ok(Page { status, body })
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Page, FetchError> {
        let response = self
            .request(self.client.post(url), headers)
            .form(form)
            .send()
            .await
            .map_err(|e| transport(url, e))?;
        into_page(url, response).await
    }

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Page, FetchError> {
        let response = self
            .request(self.client.get(url), headers)
            .send()
            .await
            .map_err(|e| transport(url, e))?;
        into_page(url, response).await
    }

    #[instrument(level = "debug", skip_all, fields(%url, dest = %dest.display()))]
    async fn download(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        dest: &Path,
    ) -> Result<u64, FetchError> {
        let t0 = Instant::now();
        let mut response = self
            .request(self.client.get(url), headers)
            .send()
            .await
            .map_err(|e| transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let io_err = |source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let mut file = fs::File::create(dest).await.map_err(io_err)?;

        let copied: Result<u64, FetchError> = async {
            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await.map_err(|e| transport(url, e))? {
                file.write_all(&chunk).await.map_err(io_err)?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(io_err)?;
            Ok(written)
        }
        .await;
        drop(file);

        match copied {
            Ok(bytes) => {
                debug!(bytes, elapsed_ms = t0.elapsed().as_millis() as u64, "Download complete");
                Ok(bytes)
            }
            Err(e) => {
                warn!(error = %e, "Download interrupted; removing partial file");
                let _ = fs::remove_file(dest).await;
                Err(e)
            }
        }
    }
}

/// In-memory [`Fetcher`] for tests.
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A canned answer for one URL.
    #[derive(Debug, Clone)]
    pub enum Fixture {
        /// A text response with this status.
        Page { status: u16, body: String },
        /// A successful binary response.
        Bytes(Vec<u8>),
        /// The connection fails.
        Unreachable,
    }

    impl Fixture {
        pub fn ok(body: impl Into<String>) -> Self {
            Fixture::Page {
                status: 200,
                body: body.into(),
            }
        }

        pub fn status(status: u16) -> Self {
            Fixture::Page {
                status,
                body: String::new(),
            }
        }
    }

    /// One request as seen by the fixture.
    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: &'static str,
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub form: Vec<(String, String)>,
    }

    /// Serves [`Fixture`]s by exact URL; unknown URLs are unreachable.
    #[derive(Debug, Default)]
    pub struct FixtureFetcher {
        routes: HashMap<String, Fixture>,
        requests: Mutex<Vec<Recorded>>,
    }

    impl FixtureFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, url: &str, fixture: Fixture) -> Self {
            self.routes.insert(url.to_string(), fixture);
            self
        }

        pub fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        fn record(
            &self,
            method: &'static str,
            url: &str,
            headers: &[(&str, &str)],
            form: &[(&str, String)],
        ) -> Fixture {
            self.requests.lock().unwrap().push(Recorded {
                method,
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                form: form
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            });
            self.routes
                .get(url)
                .cloned()
                .unwrap_or(Fixture::Unreachable)
        }
    }

    fn unreachable(url: &str) -> FetchError {
        FetchError::Transport {
            url: url.to_string(),
            source: "connection refused".into(),
        }
    }

    fn page(url: &str, fixture: Fixture) -> Result<Page, FetchError> {
        match fixture {
            Fixture::Page { status, body } => Ok(Page {
                status: StatusCode::from_u16(status).unwrap(),
                body,
            }),
            Fixture::Bytes(bytes) => Ok(Page {
                status: StatusCode::OK,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Fixture::Unreachable => Err(unreachable(url)),
        }
    }

    impl Fetcher for FixtureFetcher {
        async fn post_form(
            &self,
            url: &str,
            form: &[(&str, String)],
            headers: &[(&str, &str)],
        ) -> Result<Page, FetchError> {
            page(url, self.record("POST", url, headers, form))
        }

        async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Page, FetchError> {
            page(url, self.record("GET", url, headers, &[]))
        }

        async fn download(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            dest: &Path,
        ) -> Result<u64, FetchError> {
            let bytes = match self.record("GET", url, headers, &[]) {
                Fixture::Bytes(bytes) => bytes,
                Fixture::Page { status, body } if (200..300).contains(&status) => {
                    body.into_bytes()
                }
                Fixture::Page { status, .. } => {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: StatusCode::from_u16(status).unwrap(),
                    });
                }
                Fixture::Unreachable => return Err(unreachable(url)),
            };
            fs::write(dest, &bytes).await.map_err(|source| FetchError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
            Ok(bytes.len() as u64)
        }
    }
}
