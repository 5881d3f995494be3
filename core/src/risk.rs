//! Multi-signal risk screening over a customer's transaction set.
//!
//! Pure functions — the screener computes nothing itself beyond
//! counting signals already present on the transaction records. A
//! transaction is suspicious when at least two independent signals
//! fire.

use crate::directory::Transaction;

pub const SCORE_THRESHOLD: f64 = 0.7;
pub const HIGH_VALUE_PENDING_FLOOR: f64 = 5000.0;
const MIN_SIGNALS: usize = 2;

/// Count the risk signals present on one transaction.
pub fn signal_count(txn: &Transaction) -> usize {
    let mut signals = 0;

    if txn.fraud_score.is_some_and(|s| s > SCORE_THRESHOLD) {
        signals += 1;
    }
    if txn.location.to_lowercase().contains("international") {
        signals += 1;
    }
    if txn
        .transaction_time
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains("late"))
    {
        signals += 1;
    }
    if txn
        .merchant_status
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case("newly added"))
    {
        signals += 1;
    }
    if txn.status == "pending" && txn.amount > HIGH_VALUE_PENDING_FLOOR {
        signals += 1;
    }
    if txn.merchant.to_lowercase().contains("unknown") {
        signals += 1;
    }

    signals
}

pub fn is_suspicious(txn: &Transaction) -> bool {
    signal_count(txn) >= MIN_SIGNALS
}

/// Suspicious subset, original order preserved. The caller treats the
/// first match as the proactive candidate.
pub fn screen(transactions: &[Transaction]) -> Vec<&Transaction> {
    transactions.iter().filter(|t| is_suspicious(t)).collect()
}
