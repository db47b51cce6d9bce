use crate::abi::codec::{decode_hex, decode_revert_reason, encode_hex};
use crate::abi::Address;
use crate::config::RpcConfig;
use crate::ports::ContractCaller;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

/// Each HTTP request carries exactly one JSON-RPC call
const REQUEST_ID: u64 = 1;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    /// Message with the `Error(string)` revert reason appended when present
    fn describe(&self) -> String {
        let reason = self
            .data
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|data| decode_hex(data).ok())
            .and_then(|bytes| decode_revert_reason(&bytes));

        match reason {
            Some(reason) => format!("{}: {reason}", self.message),
            None => self.message.clone(),
        }
    }
}

/// JSON-RPC client for `eth_call` over HTTP
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    client: Client,
    endpoint: String,
    block_tag: String,
}

impl JsonRpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Transport {
                endpoint: config.endpoint_url.clone(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url.clone(),
            block_tag: config.block_tag.clone(),
        })
    }

    fn transport_error(&self, message: impl Into<String>) -> Error {
        Error::Transport {
            endpoint: self.endpoint.clone(),
            message: message.into(),
        }
    }

    /// Send one JSON-RPC request and return its `result` member
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("{} request to {} failed: {}", method, self.endpoint, e);
                if e.is_timeout() {
                    self.transport_error(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    self.transport_error(format!("connection failed: {e}"))
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(self.transport_error(format!("HTTP {status}: {text}")));
        }

        let parsed: RpcResponse = serde_json::from_str(&text)
            .map_err(|e| self.transport_error(format!("malformed JSON-RPC response: {e}")))?;

        if let Some(id) = &parsed.id {
            if id.as_u64() != Some(REQUEST_ID) {
                warn!("{} answered with unexpected id {}", self.endpoint, id);
            }
        }

        if let Some(err) = parsed.error {
            return Err(Error::Rpc {
                code: err.code,
                message: err.describe(),
            });
        }

        parsed
            .result
            .ok_or_else(|| self.transport_error("response carried neither result nor error"))
    }
}

#[async_trait]
impl ContractCaller for JsonRpcClient {
    #[instrument(skip(self, data), fields(endpoint = %self.endpoint, calldata_len = data.len()))]
    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let start = Instant::now();
        let params = json!([
            { "to": to.to_string(), "data": encode_hex(data) },
            self.block_tag,
        ]);

        let result = self.request("eth_call", params).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| self.transport_error(format!("eth_call result is not a string: {result}")))?;
        let bytes = decode_hex(hex)
            .map_err(|e| self.transport_error(format!("eth_call result is not hex: {e}")))?;

        debug!("eth_call to {} returned {} bytes in {:?}", to, bytes.len(), start.elapsed());
        Ok(bytes)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
