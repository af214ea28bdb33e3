//! Social-post channel transport
//!
//! Posts approved-article announcements to an external social API as a
//! JSON `{"text": ...}` payload. The transport sits behind the
//! `SocialPoster` trait so the fan-out logic can be tested without
//! network access. Credential presence is checked by the fan-out, not
//! here; a poster invoked without usable credentials simply fails.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::config::SocialConfig;

/// Outbound social-post transport.
#[async_trait]
pub trait SocialPoster: Send + Sync {
    /// Publish a single post.
    async fn post(&self, text: &str) -> Result<()>;
}

/// HTTP-backed social poster built from configuration.
pub struct HttpSocialPoster {
    config: SocialConfig,
    client: reqwest::Client,
}

impl HttpSocialPoster {
    pub fn new(config: SocialConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SocialPoster for HttpSocialPoster {
    async fn post(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.access_token)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .context("Network error posting to social API")?;

        let status = response.status();
        if status == reqwest::StatusCode::CREATED {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(anyhow!(
                "Social API returned status {}: {}",
                status,
                body
            ))
        }
    }
}
