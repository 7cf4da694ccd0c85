//! In-memory ledger for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use parking_lot::Mutex;
use truf_codec::ActionArg;

use crate::client::{BoxFuture, LedgerClient, TxHash, TxOutcome, TxStatus};
use crate::error::{LedgerError, LedgerResult};
use crate::row::Row;

/// Scripted response for a read action.
pub type ReadHandler = Arc<dyn Fn(&[ActionArg]) -> LedgerResult<Vec<Row>> + Send + Sync>;

/// A recorded submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub action: String,
    /// One entry per invocation; single submits record a batch of one.
    pub batch: Vec<Vec<ActionArg>>,
    pub tx_hash: TxHash,
}

impl Submission {
    /// Arguments of the first (usually only) invocation.
    pub fn args(&self) -> &[ActionArg] {
        self.batch.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A recorded read call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadCall {
    pub action: String,
    pub args: Vec<ActionArg>,
}

/// Mock ledger.
///
/// Reads are answered by per-action handlers (unknown actions return no
/// rows), submissions get sequential hashes, and every call is recorded.
pub struct MockLedger {
    account: Address,
    handlers: Mutex<HashMap<String, ReadHandler>>,
    submissions: Mutex<Vec<Submission>>,
    reads: Mutex<Vec<ReadCall>>,
    waits: Mutex<Vec<TxHash>>,
    submit_error: Mutex<Option<LedgerError>>,
    tx_status: Mutex<TxStatus>,
    next_tx: AtomicU64,
    height: AtomicU64,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new(Address::repeat_byte(0x11))
    }
}

impl MockLedger {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            handlers: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            reads: Mutex::new(Vec::new()),
            waits: Mutex::new(Vec::new()),
            submit_error: Mutex::new(None),
            tx_status: Mutex::new(TxStatus::Success),
            next_tx: AtomicU64::new(1),
            height: AtomicU64::new(100),
        }
    }

    /// Answer `action` with a computed result.
    pub fn set_read_handler<F>(&self, action: &str, handler: F)
    where
        F: Fn(&[ActionArg]) -> LedgerResult<Vec<Row>> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .insert(action.to_string(), Arc::new(handler));
    }

    /// Answer `action` with fixed rows.
    pub fn set_read_rows(&self, action: &str, rows: Vec<Row>) {
        self.set_read_handler(action, move |_| Ok(rows.clone()));
    }

    /// Fail every call to `action`.
    pub fn set_read_error(&self, action: &str, error: LedgerError) {
        self.set_read_handler(action, move |_| Err(error.clone()));
    }

    /// Fail subsequent submissions (`None` restores success).
    pub fn set_submit_error(&self, error: Option<LedgerError>) {
        *self.submit_error.lock() = error;
    }

    /// Status reported by `wait_for_tx`.
    pub fn set_tx_status(&self, status: TxStatus) {
        *self.tx_status.lock() = status;
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }

    pub fn last_submission(&self) -> Option<Submission> {
        self.submissions.lock().last().cloned()
    }

    pub fn reads(&self) -> Vec<ReadCall> {
        self.reads.lock().clone()
    }

    pub fn waits(&self) -> Vec<TxHash> {
        self.waits.lock().clone()
    }

    fn record_submission(&self, action: &str, batch: Vec<Vec<ActionArg>>) -> LedgerResult<TxHash> {
        if let Some(err) = self.submit_error.lock().clone() {
            return Err(err);
        }
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        let tx_hash = TxHash::parse(&format!("{n:064x}"))?;
        self.submissions.lock().push(Submission {
            action: action.to_string(),
            batch,
            tx_hash: tx_hash.clone(),
        });
        Ok(tx_hash)
    }
}

impl LedgerClient for MockLedger {
    fn submit<'a>(
        &'a self,
        action: &'a str,
        args: Vec<ActionArg>,
    ) -> BoxFuture<'a, LedgerResult<TxHash>> {
        Box::pin(async move { self.record_submission(action, vec![args]) })
    }

    fn submit_batch<'a>(
        &'a self,
        action: &'a str,
        batch: Vec<Vec<ActionArg>>,
    ) -> BoxFuture<'a, LedgerResult<TxHash>> {
        Box::pin(async move { self.record_submission(action, batch) })
    }

    fn wait_for_tx(&self, tx_hash: TxHash) -> BoxFuture<'_, LedgerResult<TxOutcome>> {
        Box::pin(async move {
            self.waits.lock().push(tx_hash.clone());
            let status = *self.tx_status.lock();
            let height = self.height.fetch_add(1, Ordering::SeqCst) as i64;
            match status {
                TxStatus::Success => Ok(TxOutcome {
                    tx_hash,
                    height,
                    status,
                    log: String::new(),
                }),
                TxStatus::Failed => Err(LedgerError::TxFailed {
                    tx_hash: tx_hash.to_string(),
                    log: "execution reverted".to_string(),
                }),
            }
        })
    }

    fn call_read_action<'a>(
        &'a self,
        action: &'a str,
        args: Vec<ActionArg>,
    ) -> BoxFuture<'a, LedgerResult<Vec<Row>>> {
        Box::pin(async move {
            self.reads.lock().push(ReadCall {
                action: action.to_string(),
                args: args.clone(),
            });
            let handler = self.handlers.lock().get(action).cloned();
            match handler {
                Some(handler) => handler(&args),
                None => Ok(Vec::new()),
            }
        })
    }

    fn current_account(&self) -> Address {
        self.account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submissions_recorded_with_sequential_hashes() {
        let ledger = MockLedger::default();
        let first = ledger.submit("a", vec![ActionArg::Int(1)]).await.unwrap();
        let second = ledger
            .submit_batch("b", vec![vec![ActionArg::Int(2)], vec![ActionArg::Int(3)]])
            .await
            .unwrap();
        assert_ne!(first, second);

        let subs = ledger.submissions();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].args(), &[ActionArg::Int(1)]);
        assert_eq!(subs[1].batch.len(), 2);
    }

    #[tokio::test]
    async fn test_reads_use_handlers() {
        let ledger = MockLedger::default();
        ledger.set_read_rows("known", vec![Row::new().with("x", 1)]);
        ledger.set_read_handler("echo", |args| {
            Ok(args
                .iter()
                .map(|a| Row::new().with("v", a.to_json()))
                .collect())
        });

        let known = ledger.call_read_action("known", vec![]).await.unwrap();
        assert_eq!(known.len(), 1);
        let unknown = ledger.call_read_action("unknown", vec![]).await.unwrap();
        assert!(unknown.is_empty());
        let echoed = ledger
            .call_read_action("echo", vec![ActionArg::Int(7), ActionArg::Null])
            .await
            .unwrap();
        assert_eq!(echoed.len(), 2);
        assert_eq!(ledger.reads().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_tx_is_error() {
        let ledger = MockLedger::default();
        let hash = ledger.submit("a", vec![]).await.unwrap();
        let outcome = tokio_test::assert_ok!(ledger.wait_for_tx(hash.clone()).await);
        assert_eq!(outcome.height, 100);

        ledger.set_tx_status(TxStatus::Failed);
        let err = tokio_test::assert_err!(ledger.wait_for_tx(hash).await);
        assert!(matches!(err, LedgerError::TxFailed { .. }));
    }

    #[tokio::test]
    async fn test_submit_error() {
        let ledger = MockLedger::default();
        ledger.set_submit_error(Some(LedgerError::RequestTooLarge));
        assert_eq!(
            ledger.submit("a", vec![]).await.unwrap_err(),
            LedgerError::RequestTooLarge
        );
        assert!(ledger.submissions().is_empty());
    }
}
