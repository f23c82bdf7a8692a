//! Remote function signature lookup via the 4byte directory

use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::domain::abi::SelectorSignature;
use crate::error::DirectoryError;

/// Default public signature directory endpoint
pub const DEFAULT_DIRECTORY_URL: &str = "https://www.4byte.directory/api/v1/signatures/";

/// Source of candidate text signatures for a 4-byte selector
///
/// The directory is untrusted: candidates may be irrelevant and are only
/// accepted after round-trip verification.
#[async_trait::async_trait]
pub trait SignatureDirectory: Send + Sync {
    /// Request URL for a selector; also the lookup cache key
    fn lookup_url(&self, selector: &str) -> String;

    /// Candidate signatures for an 8 hex char selector (no `0x`), in the order
    /// the directory returned them
    async fn lookup(&self, selector: &str) -> Result<Vec<SelectorSignature>, DirectoryError>;
}

/// 4byte API response structures
#[derive(Debug, Deserialize)]
struct FourByteResponse {
    #[serde(default)]
    results: Vec<FourByteSignature>,
}

#[derive(Debug, Deserialize)]
struct FourByteSignature {
    #[serde(default)]
    id: Option<u64>,
    text_signature: String,
}

/// HTTP client for a 4byte-compatible directory
pub struct FourByteDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl FourByteDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait::async_trait]
impl SignatureDirectory for FourByteDirectory {
    fn lookup_url(&self, selector: &str) -> String {
        format!("{}?hex_signature={}", self.base_url, selector)
    }

    async fn lookup(&self, selector: &str) -> Result<Vec<SelectorSignature>, DirectoryError> {
        let url = self.lookup_url(selector);
        tracing::debug!(%selector, %url, "querying signature directory");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Don't cache failures - allow retry on next request
            return Err(match response.json::<serde_json::Value>().await {
                Ok(body) => DirectoryError::Rejected {
                    status: status.as_u16(),
                    body,
                },
                Err(_) => DirectoryError::Status {
                    status: status.as_u16(),
                },
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;
        let candidates = parse_response(&body)?;
        tracing::debug!(%selector, count = candidates.len(), "directory returned candidates");
        Ok(candidates)
    }
}

fn parse_response(body: &str) -> Result<Vec<SelectorSignature>, DirectoryError> {
    let data: FourByteResponse =
        serde_json::from_str(body).map_err(|err| DirectoryError::Malformed(err.to_string()))?;

    Ok(data
        .results
        .into_iter()
        .map(|s| SelectorSignature {
            id: s.id,
            text: s.text_signature,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url() {
        let directory =
            FourByteDirectory::new(DEFAULT_DIRECTORY_URL, Duration::from_secs(1)).unwrap();
        assert_eq!(
            directory.lookup_url("40c10f19"),
            "https://www.4byte.directory/api/v1/signatures/?hex_signature=40c10f19"
        );
    }

    #[test]
    fn test_parse_response_keeps_order() {
        let body = r#"{
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                {"id": 7, "created_at": "2018-05-11T08:39:29Z", "text_signature": "mint(address,uint256)",
                 "hex_signature": "0x40c10f19", "bytes_signature": "@Á\u000f\u0019"},
                {"id": 912, "created_at": "2021-02-01T00:00:00Z", "text_signature": "gasprice_bit_ether(int128)",
                 "hex_signature": "0x40c10f19", "bytes_signature": "@Á\u000f\u0019"}
            ]
        }"#;

        let candidates = parse_response(body).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].text, "mint(address,uint256)");
        assert_eq!(candidates[0].id, Some(7));
        assert_eq!(candidates[1].text, "gasprice_bit_ether(int128)");
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        let empty = r#"{"count":0,"next":null,"previous":null,"results":[]}"#;
        assert!(parse_response(empty).unwrap().is_empty());

        assert!(matches!(
            parse_response("<html>"),
            Err(DirectoryError::Malformed(_))
        ));
    }
}
