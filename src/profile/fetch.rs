//! Outbound lookups: the public profile and the directory snapshot.

use super::Record;
use crate::config::GitHubConfig;
use crate::error::{LookupError, Result};

use anyhow::Context as _;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

const RAW_CONTENT_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Both decoded upstream bodies for one handle.
#[derive(Debug, Clone)]
pub struct Profiles {
    pub public: Record,
    /// Every entry of the snapshot, in file order.
    pub directory: Vec<serde_json::Value>,
}

/// Result of a lookup that reached the upstream API.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Found(Profiles),
    /// The public profile request returned a non-success status.
    NotFound,
}

/// HTTP client for the profile API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { http, config })
    }

    pub fn profile_url(&self, handle: &str) -> String {
        format!(
            "{}/users/{}",
            self.config.api_url,
            urlencoding::encode(handle)
        )
    }

    pub fn directory_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.config.api_url, self.config.directory_repo, self.config.directory_path
        )
    }

    /// Fetch the public profile and the directory snapshot concurrently.
    ///
    /// When the profile request comes back with a non-success status the
    /// directory response is ignored, whatever its outcome.
    pub async fn fetch(
        &self,
        handle: &str,
        token: &str,
    ) -> std::result::Result<FetchOutcome, LookupError> {
        let profile_url = self.profile_url(handle);
        let directory_url = self.directory_url();

        let profile_request = self
            .http
            .get(&profile_url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(token)
            .send();
        let directory_request = self
            .http
            .get(&directory_url)
            .header(ACCEPT, RAW_CONTENT_MEDIA_TYPE)
            .header(API_VERSION_HEADER, &self.config.api_version)
            .bearer_auth(token)
            .send();

        let (profile_response, directory_response) =
            tokio::join!(profile_request, directory_request);

        let profile_response = profile_response.map_err(|source| LookupError::Transport {
            url: profile_url.clone(),
            source,
        })?;

        let status = profile_response.status();
        if !status.is_success() {
            tracing::debug!(handle, %status, "profile lookup returned non-success status");
            return Ok(FetchOutcome::NotFound);
        }

        let directory_response = directory_response.map_err(|source| LookupError::Transport {
            url: directory_url.clone(),
            source,
        })?;

        let (public, directory) = tokio::join!(
            profile_response.json::<Record>(),
            directory_response.json::<Vec<serde_json::Value>>()
        );

        let public = public.map_err(|source| LookupError::Decode {
            what: "public profile",
            source,
        })?;
        let directory = directory.map_err(|source| LookupError::Decode {
            what: "directory",
            source,
        })?;

        tracing::debug!(handle, entries = directory.len(), "fetched profile and directory");

        Ok(FetchOutcome::Found(Profiles { public, directory }))
    }
}
