//! Run configuration
//!
//! The YAML configuration document enumerating the server, the access
//! token, and the organizations to mirror. Read once at startup; an
//! unreadable or unparseable file is fatal to the whole run.
//!
//! ```yaml
//! url: https://git.example.com
//! token: ghp_xxxxxxxxxxxx
//! max_parallel: 20
//! listing: org-repos
//! orgs:
//!   - name: acme
//!     output: ./mirrors/acme
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gitmirror_client::ListingStrategy;
use serde::Deserialize;

/// One organization to mirror
#[derive(Debug, Clone, Deserialize)]
pub struct OrgTarget {
    /// Organization name on the remote server
    pub name: String,

    /// Local directory the organization's mirrors live under
    pub output: PathBuf,
}

/// Top-level configuration document
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the remote server
    pub url: String,

    /// Personal access token for listing and git transport
    pub token: String,

    /// Cap on simultaneously in-flight clone/pull operations
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Listing endpoint flavor
    #[serde(default)]
    pub listing: ListingStrategy,

    /// Organizations to mirror, processed in order
    pub orgs: Vec<OrgTarget>,
}

fn default_max_parallel() -> usize {
    gitmirror_engine::coordinator::DEFAULT_MAX_IN_FLIGHT
}

impl Config {
    /// Loads and parses the configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            anyhow::bail!("url cannot be empty");
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            anyhow::bail!("url must start with http:// or https://");
        }

        if self.token.is_empty() {
            anyhow::bail!("token cannot be empty");
        }

        if self.max_parallel == 0 {
            anyhow::bail!("max_parallel must be greater than 0");
        }

        if self.orgs.is_empty() {
            anyhow::bail!("at least one organization must be configured");
        }

        for org in &self.orgs {
            if org.name.is_empty() {
                anyhow::bail!("organization name cannot be empty");
            }
        }

        Ok(())
    }
}
