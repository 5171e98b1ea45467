use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::error::FetchError;
use tracing::debug;
use url::Url;

use crate::TemplateFetcher;

/// Serves site paths such as `/assets/templates/nav.html` from a directory.
#[derive(Debug, Clone)]
pub struct FsTemplateFetcher {
    root: PathBuf,
}

impl FsTemplateFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(FetchError::InvalidPath {
                        path: path.to_string(),
                    })
                }
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl TemplateFetcher for FsTemplateFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let file = self.resolve(path)?;
        debug!(%path, file = %file.display(), "reading site resource");
        tokio::fs::read_to_string(&file)
            .await
            .map_err(|error| match error.kind() {
                ErrorKind::NotFound => FetchError::NotFound {
                    path: path.to_string(),
                },
                _ => FetchError::transport(path, error),
            })
    }
}

/// Fetches site paths relative to a base URL with a plain GET. A leading `/`
/// is relative to the base too, so a site can live under a sub-path.
#[derive(Debug, Clone)]
pub struct HttpTemplateFetcher {
    client: Client,
    base_url: Url,
}

impl HttpTemplateFetcher {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// A base without a trailing `/` is treated as a directory, so
    /// `http://host/site` serves `http://host/site/assets/...`.
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }
}

#[async_trait]
impl TemplateFetcher for HttpTemplateFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| FetchError::InvalidPath {
                path: path.to_string(),
            })?;
        debug!(%url, "fetching site resource");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::transport(path, error))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                path: path.to_string(),
            });
        }
        let response = response
            .error_for_status()
            .map_err(|error| FetchError::transport(path, error))?;
        response
            .text()
            .await
            .map_err(|error| FetchError::transport(path, error))
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
