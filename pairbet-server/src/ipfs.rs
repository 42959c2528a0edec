//! Content-addressed message storage on an IPFS node.

use crate::config::ServerConfig;
use crate::error::ConfigError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("node returned no hash")]
    MissingHash,
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist `content` and return its content hash.
    async fn store(&self, content: &str) -> Result<String, StoreError>;
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: Option<String>,
}

pub struct IpfsClient {
    client: reqwest::Client,
    add_url: String,
}

impl IpfsClient {
    pub fn new(config: &ServerConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            add_url: format!("{}/api/v0/add", config.ipfs_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl MessageStore for IpfsClient {
    async fn store(&self, content: &str) -> Result<String, StoreError> {
        let part = Part::text(content.to_string()).file_name("msg.txt");
        let form = Form::new().part("uploadfile", part);

        let response: AddResponse = self
            .client
            .post(&self.add_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let hash = response
            .hash
            .filter(|h| !h.is_empty())
            .ok_or(StoreError::MissingHash)?;
        tracing::info!(%hash, bytes = content.len(), "stored message");
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_url_strips_trailing_slash() {
        let mut config = ServerConfig::default();
        config.ipfs_url = "http://ipfs.local:5001/".to_string();
        let client = IpfsClient::new(&config).unwrap();
        assert_eq!(client.add_url, "http://ipfs.local:5001/api/v0/add");
    }

    #[test]
    fn test_decode_add_response() {
        let body = r#"{"Name":"msg.txt","Hash":"QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG","Size":"12"}"#;
        let response: AddResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.hash.as_deref(),
            Some("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG")
        );
    }
}
