//! Runtime configuration for the support desk.

use crate::error::SupportResult;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupportConfig {
    /// Verification ceiling per challenge stage. Exceeding it forces
    /// the session back to the top-level menu.
    pub max_verification_attempts: u32,
    /// How many recent transactions are listed and selectable.
    pub transaction_display_limit: usize,
    /// The directory's own fraud-score cutoff for its pre-filtered
    /// suspicious-transaction view.
    pub suspicious_score_threshold: f64,
    /// Seed for the ticket-number stream.
    pub ticket_seed: u64,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            max_verification_attempts: 3,
            transaction_display_limit: 5,
            suspicious_score_threshold: 0.7,
            ticket_seed: 0x5D5_CAFE_071C_6E75,
        }
    }
}

impl SupportConfig {
    /// Load config overrides from a JSON file. Missing keys fall back
    /// to the defaults above.
    pub fn from_json_file(path: &Path) -> SupportResult<Self> {
        let text = std::fs::read_to_string(path).map_err(anyhow::Error::from)?;
        let config: SupportConfig = serde_json::from_str(&text)?;
        Ok(config)
    }
}
