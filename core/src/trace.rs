//! Per-turn execution traces.
//!
//! RULE: The trace log is a pure side channel. Control logic appends
//! entries and never reads them back; they exist for diagnostics and
//! replay tooling only.

use crate::session::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured record of one turn's chosen action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Symbolic name of the branch taken, e.g. "mobile_verified".
    pub action: String,
    /// Stage at turn start.
    pub stage: String,
    /// Raw user text for the turn.
    pub input: String,
    pub at: DateTime<Utc>,
    /// Action-specific extras: transaction_amount, block_ticket, ...
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
}

impl TraceEntry {
    pub fn new(action: &str, stage: Stage, input: &str) -> Self {
        Self {
            action: action.to_string(),
            stage: stage.as_str().to_string(),
            input: input.to_string(),
            at: Utc::now(),
            context: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }
}
