//! RPC collaborator used for factory lookups and `slot0` reads.
//!
//! [`ContractCaller`] is the seam: the locator only ever asks for
//! `call(contract, descriptor, method, args)`. [`HttpContractCaller`] is the
//! production implementation, a plain JSON-RPC `eth_call` over HTTP. It does
//! not retry; a failed call is reported once to the caller.

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::JsonAbi;
use alloy::primitives::{hex, Address};
use async_trait::async_trait;
use eyre::{eyre, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default HTTP timeout for a single `eth_call`.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only contract call capability.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    /// Calls `method` on `contract`, encoding `args` and decoding the result
    /// with `descriptor`.
    ///
    /// # Errors
    /// Network failures, JSON-RPC errors (including reverts) and undecodable
    /// results.
    async fn call(
        &self,
        contract: Address,
        descriptor: &JsonAbi,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>>;
}

/// `eth_call` request body against the `latest` block.
#[derive(Debug, Serialize)]
struct EthCallRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallObject, &'static str),
}

#[derive(Debug, Serialize)]
struct CallObject {
    to: String,
    data: String,
}

impl EthCallRequest {
    fn new(contract: Address, calldata: &[u8]) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: (
                CallObject {
                    to: format!("{contract:#x}"),
                    data: hex::encode_prefixed(calldata),
                },
                "latest",
            ),
        }
    }
}

/// JSON-RPC error object. `data` carries revert payloads on most nodes.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EthCallResponse {
    result: Option<String>,
    error: Option<JsonRpcError>,
}

impl EthCallResponse {
    /// Return data of the call; an error object wins over any result.
    fn into_return_data(self) -> Result<Vec<u8>> {
        if let Some(err) = self.error {
            return Err(match err.data {
                Some(data) => eyre!("eth_call error {}: {} ({data})", err.code, err.message),
                None => eyre!("eth_call error {}: {}", err.code, err.message),
            });
        }

        let result = self.result.ok_or_else(|| eyre!("eth_call response has no result"))?;
        hex::decode(&result).map_err(|e| eyre!("eth_call returned invalid hex {result:?}: {e}"))
    }
}

/// JSON-RPC `eth_call` against the `latest` block.
#[derive(Debug, Clone)]
pub struct HttpContractCaller {
    client: Client,
    rpc_url: String,
}

impl HttpContractCaller {
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("failed to build HTTP client")?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn eth_call(&self, contract: Address, calldata: &[u8]) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(&self.rpc_url)
            .json(&EthCallRequest::new(contract, calldata))
            .send()
            .await
            .wrap_err("eth_call request failed")?
            .error_for_status()
            .wrap_err("eth_call rejected by RPC endpoint")?;

        let body: EthCallResponse = response
            .json()
            .await
            .wrap_err("failed to decode eth_call response")?;

        body.into_return_data()
    }
}

#[async_trait]
impl ContractCaller for HttpContractCaller {
    #[tracing::instrument(skip(self, descriptor, args), fields(contract = %contract))]
    async fn call(
        &self,
        contract: Address,
        descriptor: &JsonAbi,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>> {
        let function = descriptor
            .function(method)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| eyre!("method {method} not found in interface descriptor"))?;

        let calldata = function
            .abi_encode_input(args)
            .map_err(|e| eyre!("failed to encode {method} arguments: {e}"))?;

        let raw = self
            .eth_call(contract, &calldata)
            .await
            .wrap_err_with(|| format!("{method} on {contract:#x}"))?;
        tracing::trace!(bytes = raw.len(), "eth_call returned");

        if raw.is_empty() {
            return Err(eyre!("{method} returned no data (is {contract:#x} a contract?)"));
        }

        function
            .abi_decode_output(&raw, true)
            .map_err(|e| eyre!("failed to decode {method} output: {e}"))
    }
}
