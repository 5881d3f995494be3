//! Policy/Knowledge Store boundary.
//!
//! Read-only reference data: SLA timelines, liability windows, ticket
//! formats, escalation ladder. Values are consumed verbatim into
//! response text; nothing here is ever computed or written at runtime.

use crate::tickets::TicketKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudSla {
    pub card_block: String,
    pub ticket_creation: String,
    pub sms_notification: String,
    pub fraud_team_review: String,
    pub new_card_dispatch: String,
    pub dispute_investigation: String,
}

impl Default for FraudSla {
    fn default() -> Self {
        Self {
            card_block: "Immediate (within 2 minutes)".into(),
            ticket_creation: "Immediate (within 5 minutes)".into(),
            sms_notification: "Within 5 minutes".into(),
            fraud_team_review: "Within 24 hours".into(),
            new_card_dispatch: "5-7 business days".into(),
            dispute_investigation: "30 days".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiabilityPolicy {
    pub reported_within_24h: String,
    pub reported_within_7_days: String,
    pub reported_after_7_days: String,
}

impl Default for LiabilityPolicy {
    fn default() -> Self {
        Self {
            reported_within_24h: "Zero liability".into(),
            reported_within_7_days: "Maximum $500 liability".into(),
            reported_after_7_days: "As per bank policy, up to $10,000".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketFormat {
    pub prefix: String,
    pub digits: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationLevel {
    pub level: String,
    pub owner: String,
    pub sla: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub levels: Vec<EscalationLevel>,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        let mk = |level: &str, owner: &str, sla: &str| EscalationLevel {
            level: level.into(),
            owner: owner.into(),
            sla: sla.into(),
        };
        Self {
            levels: vec![
                mk("level_1", "Senior Support Agent", "Immediate"),
                mk("level_2", "Fraud Investigation Team", "Within 2 hours"),
                mk("level_3", "Branch Manager", "Within 24 hours"),
                mk("level_4", "Banking Ombudsman", "As per regulator guidelines"),
            ],
        }
    }
}

/// Typed accessors over the knowledge base.
pub trait PolicyStore {
    fn fraud_sla(&self) -> &FraudSla;
    fn liability(&self) -> &LiabilityPolicy;
    fn ticket_format(&self, kind: TicketKind) -> TicketFormat;
    fn escalation(&self) -> &EscalationPolicy;
}

/// The built-in knowledge base, carrying the bank's published figures.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicyStore {
    fraud_sla: FraudSla,
    liability: LiabilityPolicy,
    escalation: EscalationPolicy,
}

impl PolicyStore for StaticPolicyStore {
    fn fraud_sla(&self) -> &FraudSla {
        &self.fraud_sla
    }

    fn liability(&self) -> &LiabilityPolicy {
        &self.liability
    }

    fn ticket_format(&self, kind: TicketKind) -> TicketFormat {
        TicketFormat {
            prefix: kind.prefix().to_string(),
            digits: 6,
        }
    }

    fn escalation(&self) -> &EscalationPolicy {
        &self.escalation
    }
}
