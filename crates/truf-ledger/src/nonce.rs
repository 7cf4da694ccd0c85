//! Account nonce tracking for transaction submission.
//!
//! The node expects each transaction from an account to carry the account's
//! last nonce plus one. The manager is seeded from the node once and then
//! hands out strictly increasing nonces, so concurrent submissions from one
//! process never collide.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Issues strictly increasing account nonces.
///
/// # Guarantees
/// - Nonces never repeat within the process
/// - A sync never moves the counter backwards
/// - Thread-safe for concurrent access
#[derive(Debug, Default)]
pub struct NonceManager {
    /// Next nonce to hand out.
    next: AtomicU64,
    synced: AtomicBool,
}

impl NonceManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the counter has been seeded from the node.
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Seed from the account's last used nonce.
    ///
    /// Keeps the local counter if it is already ahead (transactions still
    /// in flight).
    pub fn sync(&self, account_nonce: u64) {
        self.next
            .fetch_max(account_nonce.saturating_add(1), Ordering::AcqRel);
        self.synced.store(true, Ordering::Release);
    }

    /// Force the counter back to the node's view after a rejected submission.
    pub fn reset(&self, account_nonce: u64) {
        self.next
            .store(account_nonce.saturating_add(1), Ordering::Release);
        self.synced.store(true, Ordering::Release);
    }

    /// Take the next nonce.
    pub fn next(&self) -> u64 {
        loop {
            let current = self.next.load(Ordering::Acquire);
            match self.next.compare_exchange_weak(
                current,
                current.saturating_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return current,
                Err(_) => continue,
            }
        }
    }

    /// Hand `nonce` back if no later nonce has been issued.
    ///
    /// Used when a submission never reached the node. Returns whether the
    /// counter was rewound.
    pub fn release(&self, nonce: u64) -> bool {
        self.next
            .compare_exchange(
                nonce.saturating_add(1),
                nonce,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
