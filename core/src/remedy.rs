//! Remedy orchestration — the card-block + dispute-ticket sequence run
//! when a caller confirms an unauthorized transaction.
//!
//! Execution is idempotent per transaction: a replayed confirmation
//! returns the original receipt instead of issuing duplicate tickets.

use crate::directory::Transaction;
use crate::policy::{FraudSla, LiabilityPolicy};
use crate::tickets::{TicketIssuer, TicketKind};
use crate::types::TransactionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemedyReceipt {
    pub block_ticket: String,
    pub dispute_ticket: String,
    pub transaction_id: TransactionId,
    pub amount: f64,
    pub merchant: String,
    pub card_last_4: String,
    pub issued_at: DateTime<Utc>,
}

pub struct RemedyOrchestrator {
    issuer: TicketIssuer,
    issued: HashMap<TransactionId, RemedyReceipt>,
}

impl RemedyOrchestrator {
    pub fn new(ticket_seed: u64) -> Self {
        Self {
            issuer: TicketIssuer::new(ticket_seed),
            issued: HashMap::new(),
        }
    }

    /// Block the card and raise a dispute for `txn`. One remedy per
    /// transaction: a second call with the same transaction id returns
    /// the receipt already issued.
    pub fn execute(&mut self, txn: &Transaction, card_last_4: &str) -> RemedyReceipt {
        if let Some(existing) = self.issued.get(&txn.transaction_id) {
            log::info!(
                "remedy replay for {}: returning existing receipt {}",
                txn.transaction_id,
                existing.dispute_ticket
            );
            return existing.clone();
        }

        let receipt = RemedyReceipt {
            block_ticket: self.issuer.issue(TicketKind::Block),
            dispute_ticket: self.issuer.issue(TicketKind::Dispute),
            transaction_id: txn.transaction_id.clone(),
            amount: txn.amount,
            merchant: txn.merchant.clone(),
            card_last_4: card_last_4.to_string(),
            issued_at: Utc::now(),
        };
        log::info!(
            "card ending {card_last_4} blocked ({}) and dispute raised ({}) for {}",
            receipt.block_ticket,
            receipt.dispute_ticket,
            txn.transaction_id
        );
        self.issued.insert(txn.transaction_id.clone(), receipt.clone());
        receipt
    }

    /// Hand-off ticket for a human agent.
    pub fn escalation_ticket(&mut self) -> String {
        self.issuer.issue(TicketKind::Escalation)
    }

    /// Human-readable confirmation summary, with SLA and liability
    /// figures quoted from the policy store.
    pub fn render(receipt: &RemedyReceipt, sla: &FraudSla, liability: &LiabilityPolicy) -> String {
        format!(
            "✓ Actions completed successfully!\n\n\
             **Card Blocked:**\n\
             - Ticket ID: {}\n\
             - Your card ending in {} has been blocked\n\n\
             **Dispute Raised:**\n\
             - Ticket ID: {}\n\
             - Amount: ${:.2}\n\
             - Merchant: {}\n\n\
             **Next Steps:**\n\
             - Card block effective: {}\n\
             - Fraud team review: {}\n\
             - New card will arrive in {}\n\
             - Dispute will be investigated within {}\n\
             - You'll receive SMS updates on both tickets ({})\n\
             - Liability: {} when reported within 24 hours",
            receipt.block_ticket,
            receipt.card_last_4,
            receipt.dispute_ticket,
            receipt.amount,
            receipt.merchant,
            sla.card_block,
            sla.fraud_team_review,
            sla.new_card_dispatch,
            sla.dispute_investigation,
            sla.sms_notification.to_lowercase(),
            liability.reported_within_24h,
        )
    }
}
