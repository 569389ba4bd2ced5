//! Repository descriptor
//!
//! The shape of a repository entry as returned by the directory API.
//! Descriptors are produced by the listing client and consumed read-only
//! by the sync engine.

use serde::{Deserialize, Serialize};

/// A repository as listed by the remote server
///
/// Identity is `name`, which is unique within one organization's listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRepo {
    /// Repository name, unique per organization
    pub name: String,

    /// HTTPS clone URL used by the git transport
    pub clone_url: String,

    /// SSH clone URL, carried from the API payload but unused by the
    /// HTTPS transport
    #[serde(default)]
    pub ssh_url: Option<String>,
}

impl RemoteRepo {
    /// Creates a descriptor with just the fields the engine needs
    pub fn new(name: impl Into<String>, clone_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
            ssh_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_github_payload() {
        let json = r#"{
            "name": "widget",
            "clone_url": "https://git.example.com/acme/widget.git",
            "ssh_url": "git@git.example.com:acme/widget.git",
            "full_name": "acme/widget",
            "private": true
        }"#;

        let repo: RemoteRepo = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "widget");
        assert_eq!(repo.clone_url, "https://git.example.com/acme/widget.git");
        assert_eq!(
            repo.ssh_url.as_deref(),
            Some("git@git.example.com:acme/widget.git")
        );
    }

    #[test]
    fn test_deserialize_without_ssh_url() {
        let json = r#"{"name": "widget", "clone_url": "https://x/widget.git"}"#;
        let repo: RemoteRepo = serde_json::from_str(json).unwrap();
        assert!(repo.ssh_url.is_none());
    }
}
