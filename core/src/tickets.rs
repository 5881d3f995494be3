//! Ticket identifier issuance.
//!
//! RULE: Nothing in the core calls a platform RNG. Ticket numbers come
//! from a single seeded PCG stream, so a given seed always yields the
//! same sequence. The issuer remembers every number it has handed out
//! and skips repeats, so one session can never issue two tickets with
//! the same 6-digit body; cross-session uniqueness comes from distinct
//! seeds.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::collections::HashSet;

/// Ticket number bodies are always 6 digits: 100000..=999999.
const TICKET_NUMBER_SPAN: u64 = 900_000;
const TICKET_NUMBER_FLOOR: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketKind {
    Block,
    Dispute,
    Escalation,
}

impl TicketKind {
    /// Fixed three-letter prefix per kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            TicketKind::Block => "BLK",
            TicketKind::Dispute => "CCB",
            TicketKind::Escalation => "ESC",
        }
    }
}

pub struct TicketIssuer {
    rng: Pcg64Mcg,
    issued: HashSet<u64>,
}

impl TicketIssuer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
            issued: HashSet::new(),
        }
    }

    /// Issue the next ticket identifier: prefix + 6 digits.
    pub fn issue(&mut self, kind: TicketKind) -> String {
        use rand::RngCore;
        loop {
            let n = self.rng.next_u64() % TICKET_NUMBER_SPAN + TICKET_NUMBER_FLOOR;
            if self.issued.insert(n) {
                return format!("{}{n:06}", kind.prefix());
            }
        }
    }
}
