//! Mock JSON-RPC gateway for integration tests.
//!
//! Serves `user.account`, `user.broadcast`, `user.tx_query` and `user.call`
//! from scripted state and records every request it receives.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

/// Scripted gateway behaviour.
#[derive(Debug, Clone)]
pub struct GatewayScript {
    /// Nonce reported by `user.account`.
    pub account_nonce: i64,
    /// `user.tx_query` reports pending this many times before final.
    pub pending_polls: u32,
    /// Result code reported once final (0 = success).
    pub tx_code: u32,
    /// Result for `user.call`.
    pub call_result: Value,
    /// If set, `user.broadcast` fails with this message.
    pub broadcast_error: Option<String>,
    /// The first this many broadcasts get an HTTP 503 instead of a reply.
    pub broadcast_http_failures: u32,
}

impl Default for GatewayScript {
    fn default() -> Self {
        Self {
            account_nonce: 0,
            pending_polls: 0,
            tx_code: 0,
            call_result: Value::Null,
            broadcast_error: None,
            broadcast_http_failures: 0,
        }
    }
}

#[derive(Default)]
struct GatewayState {
    script: Mutex<GatewayScript>,
    requests: Mutex<Vec<Value>>,
    polls: Mutex<u32>,
    dropped_broadcasts: Mutex<u32>,
}

/// A mock gateway bound to an ephemeral local port.
pub struct MockGateway {
    addr: SocketAddr,
    state: Arc<GatewayState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGateway {
    pub async fn start(script: GatewayScript) -> Self {
        let state = Arc::new(GatewayState {
            script: Mutex::new(script),
            ..Default::default()
        });

        let app = Router::new()
            .route("/rpc/v1", post(handle))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/rpc/v1", self.addr)
    }

    /// Every JSON-RPC request received, in order.
    pub async fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().await.clone()
    }

    /// Requests for one method.
    pub async fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r["method"] == method)
            .collect()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(State(state): State<Arc<GatewayState>>, Json(request): Json<Value>) -> Response {
    state.requests.lock().await.push(request.clone());
    let script = state.script.lock().await.clone();
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();

    if method == "user.broadcast" {
        let mut dropped = state.dropped_broadcasts.lock().await;
        if *dropped < script.broadcast_http_failures {
            *dropped += 1;
            return (StatusCode::SERVICE_UNAVAILABLE, "gateway unavailable").into_response();
        }
    }

    let outcome: Result<Value, String> = match method {
        "user.account" => Ok(json!({ "nonce": script.account_nonce })),
        "user.broadcast" => match script.broadcast_error {
            Some(message) => Err(message),
            None => Ok(json!({ "tx_hash": format!("0x{}", "ab".repeat(32)) })),
        },
        "user.tx_query" => {
            let mut polls = state.polls.lock().await;
            *polls += 1;
            if *polls <= script.pending_polls {
                Ok(json!({ "height": -1 }))
            } else {
                Ok(json!({
                    "height": 42,
                    "tx_result": { "code": script.tx_code, "log": "done" }
                }))
            }
        }
        "user.call" => Ok(script.call_result.clone()),
        other => Err(format!("method {other} not found")),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": message }
        }),
    })
    .into_response()
}
