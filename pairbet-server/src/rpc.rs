//! Bitcoin node JSON-RPC client used to broadcast the joint funding transaction.

use crate::config::ServerConfig;
use crate::error::ConfigError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("node returned error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("node returned an empty result")]
    EmptyResult,
}

#[async_trait]
pub trait TransactionBroadcaster: Send + Sync {
    /// Submit a raw transaction, returning its txid.
    async fn broadcast(&self, hex: &str) -> Result<String, RpcError>;
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

pub struct BitcoinRpc {
    client: reqwest::Client,
    url: String,
    user: String,
    password: String,
}

impl BitcoinRpc {
    pub fn new(config: &ServerConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            user: config.rpc_user.clone(),
            password: config.rpc_password.clone(),
        })
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request = json!({
            "jsonrpc": "1.0",
            "id": "pairbet",
            "method": method,
            "params": params,
        });

        // The node answers RPC-level failures with a non-2xx status and a JSON
        // error body, so the body is decoded regardless of status.
        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .header(reqwest::header::CONTENT_TYPE, "text/plain;")
            .body(request.to_string())
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }
        response.result.ok_or(RpcError::EmptyResult)
    }
}

#[async_trait]
impl TransactionBroadcaster for BitcoinRpc {
    async fn broadcast(&self, hex: &str) -> Result<String, RpcError> {
        let txid: String = self.call("sendrawtransaction", json!([hex])).await?;
        tracing::info!(%txid, "broadcast joint transaction");
        Ok(txid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success() {
        let body = r#"{"result":"abcd","error":null,"id":"pairbet"}"#;
        let response: RpcResponse<String> = serde_json::from_str(body).unwrap();
        assert_eq!(response.result.as_deref(), Some("abcd"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_decode_node_error() {
        let body = r#"{"result":null,"error":{"code":-26,"message":"txn-mempool-conflict"},"id":"pairbet"}"#;
        let response: RpcResponse<String> = serde_json::from_str(body).unwrap();
        let err = response.error.unwrap();
        assert_eq!(err.code, -26);
        assert_eq!(err.message, "txn-mempool-conflict");
        assert!(response.result.is_none());
    }

    #[test]
    fn test_client_builds_from_default_config() {
        let rpc = BitcoinRpc::new(&ServerConfig::default()).unwrap();
        assert_eq!(rpc.url, "http://127.0.0.1:8332");
    }
}
