//! Customer/Transaction Directory boundary.
//!
//! RULE: The core never assumes a storage technology. Everything that
//! needs customer or transaction data goes through this trait; the
//! SQLite-backed implementation lives in store.rs.

use crate::error::SupportResult;
use crate::types::{CustomerId, TransactionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub total_points: i64,
    pub cashback_value: f64,
    pub points_expiring_soon: i64,
    pub expiry_date: String,
    pub redemption_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    pub card_id: String,
    pub mobile: String,
    pub last_4: String,
    pub email: String,
    pub rewards: Option<RewardSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub customer_id: CustomerId,
    pub date: String,
    pub amount: f64,
    pub merchant: String,
    pub merchant_category: String,
    pub status: String, // pending | completed | declined
    pub location: String,
    pub card_last_4: String,
    pub fraud_score: Option<f64>,
    pub transaction_time: Option<String>,
    pub merchant_status: Option<String>,
}

/// Read-only lookup of customer identity and transaction history.
///
/// `suspicious_transactions_for` applies the directory's own flat
/// fraud-score cutoff. That predicate is deliberately distinct from the
/// multi-signal rule in `risk::screen` — the proactive check consults
/// both.
pub trait Directory {
    fn lookup_by_mobile(&self, mobile: &str) -> SupportResult<Option<Customer>>;

    /// Both fields must match exactly.
    fn lookup_by_mobile_and_last4(
        &self,
        mobile: &str,
        last4: &str,
    ) -> SupportResult<Option<Customer>>;

    /// Recent transactions in original (insertion) order, newest first
    /// as seeded.
    fn transactions_for(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> SupportResult<Vec<Transaction>>;

    /// Transactions whose fraud score exceeds the directory threshold,
    /// in original order.
    fn suspicious_transactions_for(
        &self,
        customer_id: &str,
    ) -> SupportResult<Vec<Transaction>>;
}
