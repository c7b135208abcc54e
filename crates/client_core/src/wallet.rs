//! Wallet collaborator seam: connection, transaction submission and receipt status.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use alloy_primitives::{Address, Bytes};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use shared::protocol::{TransactionRequest, TransactionStatus, TxHash};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const DEFAULT_CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_CONFIRMATION_ATTEMPTS: usize = 60;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("wallet exposed no accounts")]
    NoAccounts,
    #[error("wallet is not connected")]
    NotConnected,
    #[error("unexpected wallet response for {method}: {detail}")]
    UnexpectedResponse { method: String, detail: String },
    #[error("wallet transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait Wallet: Send + Sync {
    async fn connect(&self) -> Result<Address>;
    async fn account(&self) -> Option<Address>;
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash>;
    async fn transaction_status(&self, hash: TxHash) -> Result<TransactionStatus>;
}

pub struct MissingWallet;

#[async_trait]
impl Wallet for MissingWallet {
    async fn connect(&self) -> Result<Address> {
        Err(anyhow!("wallet connector is unavailable"))
    }

    async fn account(&self) -> Option<Address> {
        None
    }

    async fn send_transaction(&self, _request: &TransactionRequest) -> Result<TxHash> {
        Err(anyhow!("wallet connector is unavailable"))
    }

    async fn transaction_status(&self, hash: TxHash) -> Result<TransactionStatus> {
        Err(anyhow!("wallet connector is unavailable for transaction {hash}"))
    }
}

/// Polls until the transaction is confirmed or failed, or `attempts` runs out.
/// Running out returns the last pending status rather than an error.
pub async fn wait_for_confirmation(
    wallet: &dyn Wallet,
    hash: TxHash,
    poll_interval: Duration,
    attempts: usize,
) -> Result<TransactionStatus> {
    let attempts = attempts.max(1);
    let mut status = TransactionStatus::Pending(hash);
    for attempt in 0..attempts {
        status = wallet.transaction_status(hash).await?;
        if status.is_terminal() {
            info!(%hash, attempt, ?status, "transaction settled");
            return Ok(status);
        }
        debug!(%hash, attempt, "transaction still pending");
        if attempt + 1 < attempts {
            tokio::time::sleep(poll_interval).await;
        }
    }
    warn!(%hash, attempts, "gave up waiting for transaction receipt");
    Ok(status)
}

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
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ReceiptBody {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendTransactionParams {
    from: Address,
    to: Address,
    data: Bytes,
    chain_id: String,
}

/// Wallet backed by a JSON-RPC endpoint that holds the signing keys
/// (a browser-extension bridge, a local signer or a dev node).
pub struct JsonRpcWallet {
    http: Client,
    rpc_url: String,
    chain_id: u64,
    account: RwLock<Option<Address>>,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            http: Client::new(),
            rpc_url: rpc_url.into(),
            chain_id,
            account: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Skips account discovery and signs as `account`.
    pub fn with_account(self, account: Address) -> Self {
        Self {
            account: RwLock::new(Some(account)),
            ..self
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(method, id, "wallet rpc request");

        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(WalletError::from)?
            .error_for_status()
            .map_err(WalletError::from)?
            .json::<RpcResponse>()
            .await
            .map_err(WalletError::from)?;

        if let Some(error) = response.error {
            return Err(WalletError::Rpc {
                code: error.code,
                message: error.message,
            }
            .into());
        }

        let result = response.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|err| {
            anyhow::Error::from(WalletError::UnexpectedResponse {
                method: method.to_string(),
                detail: err.to_string(),
            })
        })
    }

    async fn discover_accounts(&self) -> Result<Vec<Address>> {
        match self
            .call::<Vec<Address>>("eth_requestAccounts", json!([]))
            .await
        {
            Ok(accounts) => Ok(accounts),
            Err(err) => {
                warn!("eth_requestAccounts failed, falling back to eth_accounts: {err}");
                self.call("eth_accounts", json!([])).await
            }
        }
    }
}

#[async_trait]
impl Wallet for JsonRpcWallet {
    async fn connect(&self) -> Result<Address> {
        if let Some(account) = *self.account.read().await {
            return Ok(account);
        }

        let accounts = self.discover_accounts().await?;
        let account = accounts.first().copied().ok_or(WalletError::NoAccounts)?;
        *self.account.write().await = Some(account);
        info!(%account, rpc_url = %self.rpc_url, "wallet connected");
        Ok(account)
    }

    async fn account(&self) -> Option<Address> {
        *self.account.read().await
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash> {
        let from = self.account().await.ok_or(WalletError::NotConnected)?;
        let params = SendTransactionParams {
            from,
            to: request.to,
            data: request.data.clone(),
            chain_id: format!("0x{:x}", self.chain_id),
        };
        let hash: TxHash = self
            .call("eth_sendTransaction", json!([params]))
            .await?;
        info!(%hash, to = %request.to, "transaction submitted");
        Ok(hash)
    }

    async fn transaction_status(&self, hash: TxHash) -> Result<TransactionStatus> {
        let receipt: Option<ReceiptBody> = self
            .call("eth_getTransactionReceipt", json!([hash]))
            .await?;

        let Some(receipt) = receipt else {
            return Ok(TransactionStatus::Pending(hash));
        };

        match receipt.status.as_deref() {
            Some("0x1") => Ok(TransactionStatus::Confirmed(hash)),
            Some("0x0") => Ok(TransactionStatus::Failed(format!(
                "transaction {hash} reverted"
            ))),
            // pre-byzantium receipts carry no status; inclusion is all we can observe
            None => Ok(TransactionStatus::Confirmed(hash)),
            Some(other) => Err(WalletError::UnexpectedResponse {
                method: "eth_getTransactionReceipt".to_string(),
                detail: format!("unknown receipt status {other}"),
            }
            .into()),
        }
    }
}

#[cfg(test)]
#[path = "tests/wallet_tests.rs"]
mod tests;
