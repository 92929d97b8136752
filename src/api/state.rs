//! Shared state for API handlers.

use crate::config::Config;
use crate::error::Result;
use crate::profile::GitHubClient;

/// State shared by every request. Immutable once the server starts.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub github: GitHubClient,
}

impl ApiState {
    pub fn new(github: GitHubClient) -> Self {
        Self { github }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(GitHubClient::new(config.github.clone())?))
    }
}
