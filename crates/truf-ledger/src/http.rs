//! JSON-RPC gateway adapter.
//!
//! Speaks JSON-RPC 2.0 over HTTP POST to a gateway node:
//! - `user.call`: read-only action call
//! - `user.broadcast`: signed transaction submission
//! - `user.tx_query`: transaction status lookup
//! - `user.account`: account nonce lookup
//!
//! Transactions are signed with the local key as an EIP-191 personal message
//! over the JSON-serialized transaction body.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use alloy::primitives::Address;
use alloy::signers::Signer as AlloySigner;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use truf_codec::ActionArg;
use truf_telemetry::Metrics;

use crate::client::{BoxFuture, LedgerClient, TxHash, TxOutcome, TxStatus};
use crate::error::{LedgerError, LedgerResult};
use crate::key::KeyManager;
use crate::nonce::NonceManager;
use crate::row::{normalize_rows, Row};

/// Default timeout for a single HTTP round trip.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Signature scheme tag understood by the gateway.
const SIGNATURE_TYPE: &str = "secp256k1_ep";

/// Gateway adapter settings.
#[derive(Debug, Clone)]
pub struct HttpLedgerConfig {
    /// JSON-RPC endpoint (e.g. "https://gateway.mainnet.truf.network/rpc/v1").
    pub endpoint: String,
    /// Chain id included in every signed body.
    pub chain_id: String,
    /// Namespace the actions live in.
    pub namespace: String,
    pub request_timeout: Duration,
    /// Delay between status polls while waiting for a transaction.
    pub tx_poll_interval: Duration,
    /// Give up waiting for a transaction after this long.
    pub tx_wait_timeout: Duration,
}

impl Default for HttpLedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8484/rpc/v1".to_string(),
            chain_id: "tn-v2".to_string(),
            namespace: "main".to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            tx_poll_interval: Duration::from_millis(500),
            tx_wait_timeout: Duration::from_secs(30),
        }
    }
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

/// Body covered by the transaction signature.
#[derive(Debug, Serialize)]
struct TxBody<'a> {
    namespace: &'a str,
    action: &'a str,
    arguments: Vec<Vec<Value>>,
    nonce: u64,
    chain_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct BroadcastResult {
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct AccountResult {
    #[serde(default)]
    nonce: i64,
}

#[derive(Debug, Deserialize)]
struct TxQueryResult {
    #[serde(default)]
    height: i64,
    #[serde(default)]
    tx_result: Option<TxResultBody>,
}

#[derive(Debug, Deserialize)]
struct TxResultBody {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
}

/// Ledger client backed by a JSON-RPC gateway.
pub struct HttpLedger {
    client: Client,
    config: HttpLedgerConfig,
    keys: KeyManager,
    nonces: NonceManager,
    request_id: AtomicU64,
}

impl HttpLedger {
    /// Build the adapter. The HTTP client is created once and reused.
    pub fn new(config: HttpLedgerConfig, keys: KeyManager) -> LedgerResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LedgerError::Http(format!("Failed to create HTTP client: {e}")))?;

        info!(
            endpoint = %config.endpoint,
            chain_id = %config.chain_id,
            account = %keys.address(),
            "Ledger gateway client created"
        );

        Ok(Self {
            client,
            config,
            keys,
            nonces: NonceManager::new(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &HttpLedgerConfig {
        &self.config
    }

    async fn rpc(&self, kind: &'static str, method: &str, params: Value) -> LedgerResult<Value> {
        let started = Instant::now();
        let result = self.rpc_inner(method, params).await;
        Metrics::ledger_request(
            kind,
            result.is_ok(),
            started.elapsed().as_secs_f64() * 1000.0,
        );
        result
    }

    async fn rpc_inner(&self, method: &str, params: Value) -> LedgerResult<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!(method, id = request.id, "Sending JSON-RPC request");

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Http(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Http(format!("HTTP {status}: {body}")));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Http(format!("Failed to parse response: {e}")))?;

        if let Some(err) = body.error {
            return Err(LedgerError::from_node(err.code, err.message));
        }
        Ok(body.result.unwrap_or(Value::Null))
    }

    async fn account_nonce(&self) -> LedgerResult<u64> {
        let params = json!({
            "id": {
                "identifier": hex::encode(self.keys.address().as_slice()),
                "key_type": "secp256k1",
            }
        });
        let value = self.rpc("account", "user.account", params).await?;
        let account: AccountResult = serde_json::from_value(value)
            .map_err(|e| LedgerError::decode(format!("account response: {e}")))?;
        Ok(u64::try_from(account.nonce).unwrap_or(0))
    }

    async fn broadcast(&self, action: &str, batch: Vec<Vec<ActionArg>>) -> LedgerResult<TxHash> {
        if !self.nonces.is_synced() {
            let account_nonce = self.account_nonce().await?;
            self.nonces.sync(account_nonce);
            debug!(account_nonce, "Nonce manager synced from node");
        }
        let nonce = self.nonces.next();

        let body = TxBody {
            namespace: &self.config.namespace,
            action,
            arguments: batch
                .iter()
                .map(|args| args.iter().map(ActionArg::to_json).collect())
                .collect(),
            nonce,
            chain_id: &self.config.chain_id,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| LedgerError::Signing(format!("Failed to serialize body: {e}")))?;
        let message = serde_json::to_vec(&body)
            .map_err(|e| LedgerError::Signing(format!("Failed to serialize body: {e}")))?;

        // NOTE: do not log the signature
        let signature = self
            .keys
            .signer()
            .sign_message(&message)
            .await
            .map_err(|e| LedgerError::Signing(e.to_string()))?;

        let params = json!({
            "tx": {
                "body": body,
                "signature": {
                    "sig": hex::encode(signature.as_bytes()),
                    "type": SIGNATURE_TYPE,
                },
                "sender": hex::encode(self.keys.address().as_slice()),
            }
        });

        let value = match self.rpc("submit", "user.broadcast", params).await {
            Ok(value) => value,
            Err(err) => {
                self.recover_nonce(nonce, &err).await;
                return Err(err);
            }
        };

        let result: BroadcastResult = serde_json::from_value(value)
            .map_err(|e| LedgerError::decode(format!("broadcast response: {e}")))?;
        let tx_hash = TxHash::parse(&result.tx_hash)?;

        info!(action, nonce, tx_hash = %tx_hash, batch_len = batch.len(), "Transaction broadcast");
        Ok(tx_hash)
    }

    /// Bring the nonce counter back in line after a failed broadcast.
    ///
    /// A nonce the node rejected triggers a resync from the account. A
    /// transport failure hands the nonce back so the next submission reuses
    /// it; if the node did see the transaction, the reuse is rejected and
    /// lands in the resync branch.
    async fn recover_nonce(&self, nonce: u64, err: &LedgerError) {
        match err {
            LedgerError::Rpc { message, .. } if message.contains("nonce") => {
                warn!(nonce, %message, "Nonce rejected, resyncing from account");
                if let Ok(account_nonce) = self.account_nonce().await {
                    self.nonces.reset(account_nonce);
                }
            }
            LedgerError::Http(_) => {
                if !self.nonces.release(nonce) {
                    debug!(nonce, "Later nonces already issued, not releasing");
                }
            }
            _ => {}
        }
    }

    /// One status lookup. `None` while the transaction is not yet final.
    async fn query_tx(&self, tx_hash: &TxHash) -> LedgerResult<Option<TxOutcome>> {
        let params = json!({ "tx_hash": tx_hash.as_str() });
        let value = self.rpc("wait", "user.tx_query", params).await?;
        let result: TxQueryResult = serde_json::from_value(value)
            .map_err(|e| LedgerError::decode(format!("tx_query response: {e}")))?;

        match result.tx_result {
            Some(tx_result) if result.height > 0 => Ok(Some(TxOutcome {
                tx_hash: tx_hash.clone(),
                height: result.height,
                status: if tx_result.code == 0 {
                    TxStatus::Success
                } else {
                    TxStatus::Failed
                },
                log: tx_result.log,
            })),
            _ => Ok(None),
        }
    }

    async fn wait(&self, tx_hash: TxHash) -> LedgerResult<TxOutcome> {
        let deadline = Instant::now() + self.config.tx_wait_timeout;
        loop {
            match self.query_tx(&tx_hash).await {
                Ok(Some(outcome)) => {
                    return match outcome.status {
                        TxStatus::Success => {
                            debug!(
                                tx_hash = %tx_hash,
                                height = outcome.height,
                                "Transaction final"
                            );
                            Ok(outcome)
                        }
                        TxStatus::Failed => Err(LedgerError::TxFailed {
                            tx_hash: tx_hash.to_string(),
                            log: outcome.log,
                        }),
                    };
                }
                // not indexed yet
                Ok(None) | Err(LedgerError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }

            if Instant::now() >= deadline {
                return Err(LedgerError::Timeout(tx_hash.to_string()));
            }
            tokio::time::sleep(self.config.tx_poll_interval).await;
        }
    }

    async fn read(&self, action: &str, args: Vec<ActionArg>) -> LedgerResult<Vec<Row>> {
        let params = json!({
            "namespace": self.config.namespace,
            "action": action,
            "arguments": args.iter().map(ActionArg::to_json).collect::<Vec<_>>(),
            "caller": hex::encode(self.keys.address().as_slice()),
        });
        let value = self.rpc("read", "user.call", params).await?;
        let rows = normalize_rows(value)?;
        debug!(action, rows = rows.len(), "Read action returned");
        Ok(rows)
    }
}

impl LedgerClient for HttpLedger {
    fn submit<'a>(
        &'a self,
        action: &'a str,
        args: Vec<ActionArg>,
    ) -> BoxFuture<'a, LedgerResult<TxHash>> {
        Box::pin(self.broadcast(action, vec![args]))
    }

    fn submit_batch<'a>(
        &'a self,
        action: &'a str,
        batch: Vec<Vec<ActionArg>>,
    ) -> BoxFuture<'a, LedgerResult<TxHash>> {
        Box::pin(self.broadcast(action, batch))
    }

    fn wait_for_tx(&self, tx_hash: TxHash) -> BoxFuture<'_, LedgerResult<TxOutcome>> {
        Box::pin(self.wait(tx_hash))
    }

    fn call_read_action<'a>(
        &'a self,
        action: &'a str,
        args: Vec<ActionArg>,
    ) -> BoxFuture<'a, LedgerResult<Vec<Row>>> {
        Box::pin(self.read(action, args))
    }

    fn current_account(&self) -> Address {
        self.keys.address()
    }
}
