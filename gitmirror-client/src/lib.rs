//! Gitmirror Directory Client
//!
//! HTTP client for listing the repositories of an organization on a
//! GitHub-flavored server.
//!
//! Listing is paginated: pages are requested starting at 1 and the walk
//! stops at the first empty page. The server supports two listing shapes,
//! modeled here as interchangeable strategies over one capability:
//! - [`ListingStrategy::OrgRepos`]: the org-repos endpoint, returning a
//!   bare JSON array per page
//! - [`ListingStrategy::Search`]: the repository search endpoint,
//!   returning an `{items: [...]}` envelope per page
//!
//! # Example
//!
//! ```no_run
//! use gitmirror_client::DirectoryClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DirectoryClient::new("https://git.example.com", "ghp_token");
//! let repos = client.list_repos("acme").await?;
//! println!("{} repositories", repos.len());
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use error::{ClientError, Result};

use gitmirror_core::RemoteRepo;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Number of entries requested per page
const PER_PAGE: u32 = 100;

/// API version header sent with every page request
const API_VERSION: &str = "2022-11-28";

/// How the repository list is obtained from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStrategy {
    /// `GET /api/v3/orgs/{org}/repos` — bare JSON array per page
    #[default]
    OrgRepos,

    /// `GET /api/v3/search/repositories?q=org:{org}` — `{items}` envelope
    Search,
}

/// Envelope returned by the search endpoint
#[derive(Debug, Deserialize)]
struct SearchPage {
    items: Vec<RemoteRepo>,
}

/// HTTP client for the repository directory API
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    /// Base URL of the server (e.g., "https://git.example.com")
    base_url: String,
    /// Personal access token presented as a bearer credential
    token: String,
    /// Listing endpoint flavor
    strategy: ListingStrategy,
    /// HTTP client instance
    client: Client,
}

impl DirectoryClient {
    /// Create a new directory client using the org-repos strategy
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server (e.g., "https://git.example.com")
    /// * `token` - Personal access token for the `Authorization: Bearer` header
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new directory client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            strategy: ListingStrategy::default(),
            client,
        }
    }

    /// Select the listing strategy
    pub fn with_strategy(mut self, strategy: ListingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every repository of an organization
    ///
    /// Walks pages starting at 1 until the server returns an empty page and
    /// concatenates the entries in server order. All-or-nothing: a transport
    /// error, error status, or undecodable body on any page fails the whole
    /// listing.
    ///
    /// An organization with zero repositories yields `Ok(vec![])`.
    pub async fn list_repos(&self, org: &str) -> Result<Vec<RemoteRepo>> {
        let mut all = Vec::new();

        for page in 1.. {
            let entries = match self.strategy {
                ListingStrategy::OrgRepos => self.fetch_org_repos_page(org, page).await?,
                ListingStrategy::Search => self.fetch_search_page(org, page).await?,
            };

            debug!(org, page, count = entries.len(), "fetched listing page");

            if entries.is_empty() {
                break;
            }
            all.extend(entries);
        }

        Ok(all)
    }

    /// Fetch one page from the org-repos endpoint
    async fn fetch_org_repos_page(&self, org: &str, page: u32) -> Result<Vec<RemoteRepo>> {
        let url = format!(
            "{}/api/v3/orgs/{}/repos?type=all&sort=full_name&per_page={}&page={}",
            self.base_url, org, PER_PAGE, page
        );
        let response = self.send_page_request(&url).await?;
        self.handle_response(response).await
    }

    /// Fetch one page from the search endpoint and unwrap the envelope
    async fn fetch_search_page(&self, org: &str, page: u32) -> Result<Vec<RemoteRepo>> {
        let url = format!(
            "{}/api/v3/search/repositories?q=org:{}&per_page={}&page={}",
            self.base_url, org, PER_PAGE, page
        );
        let response = self.send_page_request(&url).await?;
        let envelope: SearchPage = self.handle_response(response).await?;
        Ok(envelope.items)
    }

    /// Issue one page request with the credential and protocol headers
    async fn send_page_request(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;
        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = DirectoryClient::new("https://git.example.com/", "t0k3n");
        assert_eq!(client.base_url(), "https://git.example.com");
    }

    #[test]
    fn test_default_strategy_is_org_repos() {
        let client = DirectoryClient::new("https://git.example.com", "t0k3n");
        assert_eq!(client.strategy, ListingStrategy::OrgRepos);
    }

    #[test]
    fn test_strategy_from_config_value() {
        let s: ListingStrategy = serde_json::from_str("\"search\"").unwrap();
        assert_eq!(s, ListingStrategy::Search);
        let s: ListingStrategy = serde_json::from_str("\"org-repos\"").unwrap();
        assert_eq!(s, ListingStrategy::OrgRepos);
    }
}
