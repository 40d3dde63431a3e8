//! Shared outbound HTTP plumbing for every provider.
//!
//! One call in, one parsed body or one typed failure out. No retries, no
//! timeout beyond the transport default, no local state.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::MetadataError;

/// Upstream bodies kept in error values are cut to this many characters.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Tmdb,
    YouTube,
    Gemini,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tmdb => "TMDB",
            Self::YouTube => "YouTube",
            Self::Gemini => "Gemini",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Upstream {
    provider: Provider,
    base_url: String,
    client: reqwest::Client,
}

impl Upstream {
    pub fn new(provider: Provider, base_url: &str, client: reqwest::Client) -> Self {
        Self {
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, MetadataError> {
        let url = format!("{}{path}", self.base_url);
        debug!(provider = %self.provider, url = %url, "GET");
        self.send(self.client.get(&url).query(params)).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        body: &B,
    ) -> Result<T, MetadataError> {
        let url = format!("{}{path}", self.base_url);
        debug!(provider = %self.provider, url = %url, "POST");
        self.send(self.client.post(&url).query(params).json(body))
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, MetadataError> {
        let provider = self.provider;
        let resp = request.send().await.map_err(|e| MetadataError::Network {
            provider,
            message: e.without_url().to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MetadataError::Status {
                provider,
                status: status.as_u16(),
                body: truncate_body(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| MetadataError::Network {
            provider,
            message: e.without_url().to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| MetadataError::Decode {
            provider,
            message: e.to_string(),
        })
    }
}

/// Cut `body` to at most `max_chars` characters, marking the cut.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}
