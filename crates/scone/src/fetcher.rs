//! Origin transports: HTTP via ureq and local directories.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use async_trait::async_trait;
use scone_config::Origin;
use scone_renderer::encode_uri;
use scone_viewer::{FetchError, Fetched, Fetcher};

/// Default timeout for HTTP requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the fetcher for a configured origin.
pub(crate) fn for_origin(origin: &Origin) -> Arc<dyn Fetcher> {
    match origin {
        Origin::Http(base) => Arc::new(HttpFetcher::new(base, DEFAULT_TIMEOUT)),
        Origin::Directory(root) => Arc::new(FsFetcher::new(root)),
    }
}

/// Fetches from an HTTP(S) origin.
///
/// ureq is blocking, so every request runs on tokio's blocking pool.
pub(crate) struct HttpFetcher {
    agent: ureq::Agent,
    base: String,
}

impl HttpFetcher {
    /// `base` must end with `/`.
    pub(crate) fn new(base: &str, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base: base.to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, encode_uri(path))
    }

    async fn blocking<T, F>(&self, path: &str, f: F) -> Result<T, FetchError>
    where
        T: Send + 'static,
        F: FnOnce(ureq::Agent, String, String) -> Result<T, FetchError> + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = self.url(path);
        let owned = path.to_owned();
        tokio::task::spawn_blocking(move || f(agent, url, owned))
            .await
            .map_err(|e| FetchError::Transport {
                path: path.to_owned(),
                message: e.to_string(),
            })?
    }
}

fn transport(path: &str, err: &impl std::fmt::Display) -> FetchError {
    FetchError::Transport {
        path: path.to_owned(),
        message: err.to_string(),
    }
}

fn check_status(status: u16, path: &str) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Status {
            status,
            path: path.to_owned(),
        })
    }
}

fn last_modified(response: &ureq::http::Response<ureq::Body>) -> Option<String> {
    response
        .headers()
        .get("last-modified")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> Result<Fetched, FetchError> {
        self.blocking(path, |agent, url, path| {
            let response = agent
                .get(&url)
                .header("Cache-Control", "no-store")
                .header("Pragma", "no-cache")
                .call()
                .map_err(|e| transport(&path, &e))?;
            check_status(response.status().as_u16(), &path)?;

            let last_modified = last_modified(&response);
            let bytes = response
                .into_body()
                .read_to_vec()
                .map_err(|e| transport(&path, &e))?;
            let body = String::from_utf8(bytes).map_err(|_| FetchError::Decode { path })?;
            Ok(Fetched {
                body,
                last_modified,
            })
        })
        .await
    }

    async fn probe(&self, path: &str) -> Result<Option<String>, FetchError> {
        self.blocking(path, |agent, url, path| {
            let response = agent
                .head(&url)
                .header("Cache-Control", "no-store")
                .header("Pragma", "no-cache")
                .call()
                .map_err(|e| transport(&path, &e))?;
            check_status(response.status().as_u16(), &path)?;
            Ok(last_modified(&response))
        })
        .await
    }
}

/// Fetches from a local directory.
///
/// File modification times stand in for `Last-Modified`, formatted as
/// nanoseconds since the Unix epoch. The value is only ever compared for
/// equality.
pub(crate) struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Resolve `path` under the root, rejecting anything that escapes it.
    fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(FetchError::Status {
                status: 404,
                path: path.to_owned(),
            });
        }
        Ok(self.root.join(relative))
    }
}

fn io_error(path: &str, err: &io::Error) -> FetchError {
    if err.kind() == io::ErrorKind::NotFound {
        FetchError::Status {
            status: 404,
            path: path.to_owned(),
        }
    } else {
        transport(path, err)
    }
}

async fn modified(file: &Path, path: &str) -> Result<Option<String>, FetchError> {
    let metadata = tokio::fs::metadata(file)
        .await
        .map_err(|e| io_error(path, &e))?;
    if !metadata.is_file() {
        return Err(FetchError::Status {
            status: 404,
            path: path.to_owned(),
        });
    }
    Ok(metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|since| since.as_nanos().to_string()))
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch_text(&self, path: &str) -> Result<Fetched, FetchError> {
        let file = self.resolve(path)?;
        let last_modified = modified(&file, path).await?;
        let bytes = tokio::fs::read(&file)
            .await
            .map_err(|e| io_error(path, &e))?;
        let body = String::from_utf8(bytes).map_err(|_| FetchError::Decode {
            path: path.to_owned(),
        })?;
        Ok(Fetched {
            body,
            last_modified,
        })
    }

    async fn probe(&self, path: &str) -> Result<Option<String>, FetchError> {
        let file = self.resolve(path)?;
        modified(&file, path).await
    }
}
