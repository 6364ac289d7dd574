//! Modrinth API client

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use sha2::{Digest, Sha512};
use url::Url;

use crate::catalog::types::{Collection, Project, ProjectVersion, VersionFile};
use crate::core::config::ApiConfig;
use crate::core::{RinthError, RinthResult};

/// Remote content catalog operations
///
/// The pipeline only talks to this trait, so tests can substitute an
/// in-memory catalog for the HTTP client.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch a collection's ordered project identifier list
    async fn get_collection(&self, id: &str) -> RinthResult<Collection>;

    /// Fetch project metadata
    async fn get_project(&self, id: &str) -> RinthResult<Project>;

    /// Fetch all published versions of a project, most recent first as
    /// returned by the API
    async fn get_versions(&self, project_id: &str) -> RinthResult<Vec<ProjectVersion>>;

    /// Download a version file to `dest`, verifying its published hash
    async fn download_file(&self, file: &VersionFile, dest: &Path) -> RinthResult<()>;
}

/// HTTP client for the Modrinth API
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    rate_limit_retries: u32,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(config: &ApiConfig) -> RinthResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| RinthError::config(format!("invalid user agent: {}", config.user_agent)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout))
            .gzip(true)
            .brotli(true)
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RinthError::config(format!("invalid API base URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            rate_limit_retries: config.rate_limit_retries,
        })
    }

    fn endpoint(&self, path: &str) -> RinthResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RinthError::config(format!("invalid API path {}: {}", path, e)))
    }

    /// Issue a GET, waiting out HTTP 429 responses. The Retry-After header
    /// is honored when present; otherwise exponential backoff capped at 30s.
    async fn get_with_pacing(&self, url: Url) -> RinthResult<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            let response = self.client.get(url.clone()).send().await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS
                && attempt < self.rate_limit_retries
            {
                let wait = retry_after(&response).unwrap_or_else(|| backoff(attempt));
                tracing::warn!(
                    url = %url,
                    attempt = attempt + 1,
                    wait_secs = wait.as_secs(),
                    "rate limited, backing off"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            return Ok(response);
        }
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn get_collection(&self, id: &str) -> RinthResult<Collection> {
        let url = self.endpoint(&format!("/v3/collection/{}", id))?;
        let response = self.get_with_pacing(url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RinthError::CollectionNotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(RinthError::remote_fetch(
                format!("collection {}", id),
                format!("HTTP {}", response.status()),
            ));
        }

        Ok(response.json().await?)
    }

    async fn get_project(&self, id: &str) -> RinthResult<Project> {
        let url = self.endpoint(&format!("/v2/project/{}", id))?;
        let response = self.get_with_pacing(url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RinthError::ProjectNotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(RinthError::remote_fetch(
                format!("project {}", id),
                format!("HTTP {}", response.status()),
            ));
        }

        Ok(response.json().await?)
    }

    async fn get_versions(&self, project_id: &str) -> RinthResult<Vec<ProjectVersion>> {
        let url = self.endpoint(&format!("/v2/project/{}/version", project_id))?;
        let response = self.get_with_pacing(url).await?;

        if !response.status().is_success() {
            return Err(RinthError::remote_fetch(
                format!("versions of {}", project_id),
                format!("HTTP {}", response.status()),
            ));
        }

        Ok(response.json().await?)
    }

    async fn download_file(&self, file: &VersionFile, dest: &Path) -> RinthResult<()> {
        let url = Url::parse(&file.url)
            .map_err(|e| RinthError::remote_fetch(file.url.as_str(), e.to_string()))?;
        let response = self.get_with_pacing(url).await?;

        if !response.status().is_success() {
            return Err(RinthError::remote_fetch(
                file.url.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let dir = dest
            .parent()
            .ok_or_else(|| RinthError::index(format!("no parent directory for {}", dest.display())))?;

        // Stream into a temp file in the destination directory, then rename;
        // a failed or interrupted download never leaves a partial artifact.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        let mut hasher = Sha512::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            tmp.write_all(&chunk)?;
        }
        tmp.flush()?;

        if let Some(ref expected) = file.hashes.sha512 {
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(RinthError::ChecksumMismatch {
                    url: file.url.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        tmp.persist(dest)
            .map_err(|e| RinthError::Io(e.error))?;

        tracing::debug!(file = %file.filename, "download complete");
        Ok(())
    }
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt).min(30))
}
