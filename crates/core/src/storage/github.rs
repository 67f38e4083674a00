use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use crate::errors::LedgerError;

use super::traits::LedgerStore;

const API_ROOT: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("fee-ledger-core/", env!("CARGO_PKG_VERSION"));

/// Ledger store backed by a file in a (private) GitHub repository, via the
/// contents API.
///
/// Each resource is one file at the repo root. The blob sha returned by
/// the last load/save is cached per file and sent along with the next
/// write as the optimistic-concurrency token; on a conflict the current
/// sha is refetched and the write retried once. Writes to a file that does
/// not exist yet fall back to create.
pub struct GithubStore {
    client: reqwest::Client,
    token: String,
    /// "owner/name"
    repo: String,
    shas: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenContent,
}

#[derive(Debug, Deserialize)]
struct WrittenContent {
    sha: String,
}

impl GithubStore {
    pub fn new(token: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            repo: repo.into(),
            shas: HashMap::new(),
        }
    }

    fn contents_url(&self, resource: &str) -> String {
        format!("{API_ROOT}/repos/{}/contents/{resource}", self.repo)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
    }

    /// Fetch the current blob sha without caring about the content.
    /// Used to recover from a write conflict.
    async fn fetch_sha(&self, resource: &str) -> Result<Option<String>, LedgerError> {
        let response = self
            .request(self.client.get(self.contents_url(resource)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| LedgerError::StoreUnavailable(e.to_string()))?;
        let contents: ContentsResponse = response.json().await?;
        Ok(Some(contents.sha))
    }

    async fn put_contents(
        &self,
        resource: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<reqwest::Response, LedgerError> {
        let mut body = json!({
            "message": format!("Update {resource}"),
            "content": BASE64.encode(content.as_bytes()),
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .request(self.client.put(self.contents_url(resource)))
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl LedgerStore for GithubStore {
    async fn load(&mut self, resource: &str) -> Result<Option<String>, LedgerError> {
        let response = self
            .request(self.client.get(self.contents_url(resource)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| LedgerError::StoreUnavailable(e.to_string()))?;

        let contents: ContentsResponse = response.json().await?;
        // The contents API returns base64 with embedded newlines.
        let cleaned: String = contents
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = BASE64
            .decode(cleaned)
            .map_err(|e| LedgerError::Deserialization(format!("Invalid base64 content: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| LedgerError::Deserialization(format!("Invalid UTF-8 content: {e}")))?;

        self.shas.insert(resource.to_string(), contents.sha);
        Ok(Some(text))
    }

    async fn save(&mut self, resource: &str, content: &str) -> Result<(), LedgerError> {
        let cached_sha = self.shas.get(resource).cloned();
        let mut response = self
            .put_contents(resource, content, cached_sha.as_deref())
            .await?;

        // Stale or missing token: refetch the current sha and retry once.
        if matches!(
            response.status(),
            reqwest::StatusCode::CONFLICT | reqwest::StatusCode::UNPROCESSABLE_ENTITY
        ) {
            let fresh_sha = self.fetch_sha(resource).await?;
            response = self
                .put_contents(resource, content, fresh_sha.as_deref())
                .await?;
        }

        if !response.status().is_success() {
            return Err(LedgerError::StoreWriteFailed {
                resource: resource.to_string(),
                message: format!("GitHub API returned {}", response.status()),
            });
        }

        let written: WriteResponse = response.json().await?;
        self.shas.insert(resource.to_string(), written.content.sha);
        Ok(())
    }
}
