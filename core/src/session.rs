//! Per-conversation session state.
//!
//! The session is owned exclusively by the state machine. The hosting
//! UI may serialize it between turns; no field is shared across
//! sessions.

use crate::directory::Transaction;
use crate::error::SupportError;
use crate::types::{CustomerId, SessionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The discrete state of a session's conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    VerifyMobile,
    VerifyCard,
    GeneralEnquiry,
    FraudDetails,
    FraudConfirmation,
    FraudAction,
    Completed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::VerifyMobile => "verify_mobile",
            Stage::VerifyCard => "verify_card",
            Stage::GeneralEnquiry => "general_enquiry",
            Stage::FraudDetails => "fraud_details",
            Stage::FraudConfirmation => "fraud_confirmation",
            Stage::FraudAction => "fraud_action",
            Stage::Completed => "completed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = SupportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(Stage::Initial),
            "verify_mobile" => Ok(Stage::VerifyMobile),
            "verify_card" => Ok(Stage::VerifyCard),
            "general_enquiry" => Ok(Stage::GeneralEnquiry),
            "fraud_details" => Ok(Stage::FraudDetails),
            "fraud_confirmation" => Ok(Stage::FraudConfirmation),
            "fraud_action" => Ok(Stage::FraudAction),
            "completed" => Ok(Stage::Completed),
            other => Err(SupportError::UnknownStage {
                stage: other.to_string(),
            }),
        }
    }
}

/// Which top-level flow the caller chose at the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowOption {
    GeneralEnquiry,
    FraudReport,
}

impl FlowOption {
    /// "1" → general enquiry, "2" → fraud report.
    pub fn from_menu_key(input: &str) -> Option<Self> {
        match input {
            "1" => Some(FlowOption::GeneralEnquiry),
            "2" => Some(FlowOption::FraudReport),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowOption::GeneralEnquiry => "general_enquiry",
            FlowOption::FraudReport => "fraud_transaction",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub stage: Stage,
    pub selected_option: Option<FlowOption>,
    /// Meaningful only while stage is verify_mobile or verify_card.
    pub verification_attempts: u32,
    pub mobile_number: Option<String>,
    pub last_4: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    /// Non-null only while a fraud stage holds a selected transaction.
    pub pending_transaction: Option<Transaction>,
    /// The original free-text enquiry, preserved across a risk
    /// interrupt so it can be resumed verbatim.
    pub general_query: Option<String>,
    /// One-shot: the proactive risk check runs at most once per session.
    pub fraud_check_done: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            stage: Stage::Initial,
            selected_option: None,
            verification_attempts: 0,
            mobile_number: None,
            last_4: None,
            customer_id: None,
            customer_name: None,
            pending_transaction: None,
            general_query: None,
            fraud_check_done: false,
        }
    }

    /// Return to the top-level menu, dropping flow state.
    /// A verified identity survives for the rest of the session.
    pub fn reset_flow(&mut self) {
        self.stage = Stage::Initial;
        self.selected_option = None;
        self.pending_transaction = None;
        self.general_query = None;
    }

    pub fn is_verified(&self) -> bool {
        self.customer_id.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
