//! Two-factor identity verification: mobile number, then card last-4.
//!
//! Each challenge stage independently counts attempts against the same
//! ceiling. Hitting the ceiling is a lockout: the counter resets and
//! the machine sends the session back to the top-level menu. A
//! card-stage lockout additionally discards the partially-entered
//! mobile number; a previously verified identity is never discarded.

use crate::directory::{Customer, Directory};
use crate::error::SupportResult;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    Verified(Customer),
    Retry { remaining: u32 },
    LockedOut,
}

pub struct IdentityVerifier {
    max_attempts: u32,
}

impl IdentityVerifier {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// First challenge: does the mobile number exist in the directory?
    /// On success the number is stored on the session and the counter
    /// resets for the card challenge.
    pub fn check_mobile(
        &self,
        directory: &dyn Directory,
        session: &mut Session,
        input: &str,
    ) -> SupportResult<VerifyOutcome> {
        let mobile = input.trim();
        match directory.lookup_by_mobile(mobile)? {
            Some(customer) => {
                session.mobile_number = Some(mobile.to_string());
                session.verification_attempts = 0;
                Ok(VerifyOutcome::Verified(customer))
            }
            None => Ok(self.record_failure(session)),
        }
    }

    /// Second challenge: the (mobile, last-4) pair must match a single
    /// customer exactly. Success populates the session identity.
    pub fn check_card(
        &self,
        directory: &dyn Directory,
        session: &mut Session,
        input: &str,
    ) -> SupportResult<VerifyOutcome> {
        let last4 = input.trim();
        let mobile = session.mobile_number.clone().unwrap_or_default();
        match directory.lookup_by_mobile_and_last4(&mobile, last4)? {
            Some(customer) => {
                session.customer_id = Some(customer.customer_id.clone());
                session.customer_name = Some(customer.name.clone());
                session.last_4 = Some(last4.to_string());
                session.verification_attempts = 0;
                Ok(VerifyOutcome::Verified(customer))
            }
            None => {
                let outcome = self.record_failure(session);
                if outcome == VerifyOutcome::LockedOut {
                    // The half-entered mobile must not survive a card
                    // lockout.
                    session.mobile_number = None;
                }
                Ok(outcome)
            }
        }
    }

    fn record_failure(&self, session: &mut Session) -> VerifyOutcome {
        session.verification_attempts += 1;
        if session.verification_attempts >= self.max_attempts {
            log::warn!(
                "session {}: verification lockout after {} attempts",
                session.session_id,
                session.verification_attempts
            );
            session.verification_attempts = 0;
            VerifyOutcome::LockedOut
        } else {
            VerifyOutcome::Retry {
                remaining: self.max_attempts - session.verification_attempts,
            }
        }
    }
}
