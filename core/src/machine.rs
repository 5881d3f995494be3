//! The conversation state machine — the heart of the support desk.
//!
//! TURN PROTOCOL (fixed, documented, never reordered):
//!   1. Trim the raw input.
//!   2. Global interrupt check: termination phrases (and bare "no"
//!      outside its excluded stages) reset the flow and return the
//!      top-level menu. Skipped entirely at initial and at the two
//!      fraud confirmation stages, where "no" carries meaning.
//!   3. Stage dispatch: exactly one handler runs and returns the
//!      response plus a trace entry.
//!
//! RULES:
//!   - A menu key ("1"/"2") at general_enquiry or completed restarts
//!     the flow via reset-and-loop, never by recursive self-dispatch.
//!   - "no" is tested before "yes" at the confirmation stages; an
//!     input containing both resolves to "no".
//!   - Every path returns a response and a trace entry. User mistakes
//!     never surface as errors across this boundary.

use crate::config::SupportConfig;
use crate::directory::{Directory, Transaction};
use crate::error::SupportResult;
use crate::policy::{PolicyStore, StaticPolicyStore};
use crate::query;
use crate::remedy::RemedyOrchestrator;
use crate::risk;
use crate::selector::{self, Selection};
use crate::session::{FlowOption, Session, Stage};
use crate::trace::TraceEntry;
use crate::verifier::{IdentityVerifier, VerifyOutcome};

const MENU_BLOCK: &str = "Please select an option:\n\
1. General Enquiry (Reward points, Statement, Credit limit, etc.)\n\
2. Fraud Transaction (Report suspicious transaction)\n\n\
Type **1** or **2** to continue.";

const APOLOGY: &str =
    "I'm sorry, something went wrong. Please start over by typing **1** or **2**.";

const YES_NO_PROMPT: &str = "Please respond with **YES** or **NO**.";

/// Exact lower-cased phrases that end the current flow from any
/// interruptible stage.
const TERMINATION_PHRASES: &[&str] = &[
    "no thanks",
    "thanks",
    "thank you",
    "no thank you",
    "that's all",
    "thats all",
    "exit",
    "0",
];

/// One processed turn: the reply to show and the trace entry recorded
/// for it.
#[derive(Debug, Clone)]
pub struct Turn {
    pub response: String,
    pub trace: TraceEntry,
}

pub struct SupportDesk {
    config: SupportConfig,
    directory: Box<dyn Directory>,
    policies: Box<dyn PolicyStore>,
    verifier: IdentityVerifier,
    remedies: RemedyOrchestrator,
    session: Session,
    trace_log: Vec<TraceEntry>,
}

impl SupportDesk {
    pub fn new(
        config: SupportConfig,
        directory: Box<dyn Directory>,
        policies: Box<dyn PolicyStore>,
    ) -> Self {
        let verifier = IdentityVerifier::new(config.max_verification_attempts);
        let remedies = RemedyOrchestrator::new(config.ticket_seed);
        Self {
            config,
            directory,
            policies,
            verifier,
            remedies,
            session: Session::new(),
            trace_log: Vec::new(),
        }
    }

    /// Default config and the built-in policy knowledge base.
    pub fn with_defaults(directory: Box<dyn Directory>) -> Self {
        Self::new(
            SupportConfig::default(),
            directory,
            Box::new(StaticPolicyStore::default()),
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session-scoped trace log, in turn order.
    pub fn trace_log(&self) -> &[TraceEntry] {
        &self.trace_log
    }

    /// Process one turn against the session's current stage.
    pub fn process(&mut self, raw: &str) -> SupportResult<Turn> {
        let input = raw.trim();
        log::debug!(
            "session {}: stage={} input={input:?}",
            self.session.session_id,
            self.session.stage
        );
        let turn = match self.check_termination(input) {
            Some(turn) => turn,
            None => self.dispatch(input)?,
        };
        self.trace_log.push(turn.trace.clone());
        Ok(turn)
    }

    /// Process one turn at a caller-persisted stage (the UI boundary
    /// form). An unrecognized stage string is fatal for the turn only:
    /// the session resets to initial with a generic apology.
    pub fn process_at(&mut self, raw: &str, stage: &str) -> SupportResult<Turn> {
        match stage.parse::<Stage>() {
            Ok(parsed) => {
                self.session.stage = parsed;
                self.process(raw)
            }
            Err(_) => {
                log::warn!(
                    "session {}: unknown stage {stage:?}, resetting to initial",
                    self.session.session_id
                );
                self.session.reset_flow();
                let turn = Turn {
                    response: APOLOGY.to_string(),
                    trace: TraceEntry::new("error_fallback", Stage::Initial, raw.trim())
                        .with("requested_stage", stage),
                };
                self.trace_log.push(turn.trace.clone());
                Ok(turn)
            }
        }
    }

    // ── Global interrupt ───────────────────────────────────────

    fn check_termination(&mut self, input: &str) -> Option<Turn> {
        let stage = self.session.stage;
        // "no" answers a question at the confirmation stages, and the
        // menu needs no terminating.
        if matches!(
            stage,
            Stage::Initial | Stage::FraudConfirmation | Stage::FraudAction
        ) {
            return None;
        }
        let lower = input.to_lowercase();
        // Bare "no" is a termination except where it would collide
        // with a pending challenge or selection prompt.
        let bare_no_terminates = lower == "no"
            && !matches!(
                stage,
                Stage::VerifyMobile | Stage::VerifyCard | Stage::FraudDetails
            );
        if !TERMINATION_PHRASES.contains(&lower.as_str()) && !bare_no_terminates {
            return None;
        }

        self.session.reset_flow();
        Some(Turn {
            response: format!(
                "Thank you for contacting us!\n\nHow can I help you today?\n\n{MENU_BLOCK}"
            ),
            trace: TraceEntry::new("conversation_terminated", stage, input),
        })
    }

    // ── Stage dispatch ─────────────────────────────────────────

    fn dispatch(&mut self, input: &str) -> SupportResult<Turn> {
        let mut redispatched = false;
        loop {
            return match self.session.stage {
                Stage::GeneralEnquiry | Stage::Completed
                    if !redispatched && FlowOption::from_menu_key(input).is_some() =>
                {
                    // Menu key restarts the flow; verification survives.
                    self.session.reset_flow();
                    redispatched = true;
                    continue;
                }
                Stage::Initial => self.handle_initial(input),
                Stage::VerifyMobile => self.handle_verify_mobile(input),
                Stage::VerifyCard => self.handle_verify_card(input),
                Stage::GeneralEnquiry => self.handle_general_enquiry(input),
                Stage::FraudDetails => self.handle_fraud_details(input),
                Stage::FraudConfirmation => self.handle_fraud_confirmation(input),
                Stage::FraudAction => self.handle_fraud_action(input),
                Stage::Completed => Ok(self.handle_completed(input)),
            };
        }
    }

    fn handle_initial(&mut self, input: &str) -> SupportResult<Turn> {
        let Some(option) = FlowOption::from_menu_key(input) else {
            return Ok(Turn {
                response: "Please select a valid option: Type **1** for General Enquiry \
                           or **2** for Fraud Transaction."
                    .to_string(),
                trace: TraceEntry::new("invalid_option", Stage::Initial, input),
            });
        };

        self.session.selected_option = Some(option);
        self.session.stage = Stage::VerifyMobile;

        let lead = match option {
            FlowOption::GeneralEnquiry => {
                "Sure! I'd be happy to help you with your general enquiry."
            }
            FlowOption::FraudReport => {
                "I understand you received a suspicious transaction SMS. Let me help you with that."
            }
        };
        Ok(Turn {
            response: format!(
                "{lead}\n\nFor security purposes, I need to verify your identity.\n\n\
                 Please provide your registered mobile number:"
            ),
            trace: TraceEntry::new("option_selected", Stage::Initial, input)
                .with("option", option.as_str()),
        })
    }

    fn handle_verify_mobile(&mut self, input: &str) -> SupportResult<Turn> {
        let outcome =
            self.verifier
                .check_mobile(self.directory.as_ref(), &mut self.session, input)?;
        let turn = match outcome {
            VerifyOutcome::Verified(_) => {
                self.session.stage = Stage::VerifyCard;
                Turn {
                    response: "Thank you! Mobile number verified. ✓\n\n\
                               Now, please provide the last 4 digits of your card:"
                        .to_string(),
                    trace: TraceEntry::new("mobile_verified", Stage::VerifyMobile, input)
                        .with("mobile_number", input.trim()),
                }
            }
            VerifyOutcome::Retry { remaining } => Turn {
                response: format!(
                    "Sorry, I couldn't find this mobile number in our records.\n\n\
                     Please check and try again.\n\nAttempts remaining: {remaining}"
                ),
                trace: TraceEntry::new("mobile_not_found", Stage::VerifyMobile, input)
                    .with("remaining_attempts", remaining),
            },
            VerifyOutcome::LockedOut => {
                self.session.stage = Stage::Initial;
                Turn {
                    response: format!(
                        "Mobile number verification failed. Please contact customer support \
                         or try again later.\n\n{MENU_BLOCK}"
                    ),
                    trace: TraceEntry::new(
                        "mobile_verification_failed_max_attempts",
                        Stage::VerifyMobile,
                        input,
                    ),
                }
            }
        };
        Ok(turn)
    }

    fn handle_verify_card(&mut self, input: &str) -> SupportResult<Turn> {
        let outcome =
            self.verifier
                .check_card(self.directory.as_ref(), &mut self.session, input)?;
        let turn = match outcome {
            VerifyOutcome::Verified(customer) => {
                let transactions = self
                    .directory
                    .transactions_for(&customer.customer_id, self.config.transaction_display_limit)?;

                if self.session.selected_option == Some(FlowOption::FraudReport) {
                    self.session.stage = Stage::FraudDetails;
                    let listing = transaction_listing(&transactions);
                    Turn {
                        response: format!(
                            "Thank you, {}. Your identity has been verified. ✓\n\n\
                             Here are your recent transactions:\n{listing}\n\n\
                             Which transaction would you like to report as suspicious?\n\
                             Please provide the transaction number (1-{}) or describe the transaction.",
                            customer.name,
                            transactions.len().max(1),
                        ),
                        trace: TraceEntry::new(
                            "verification_success_fraud",
                            Stage::VerifyCard,
                            input,
                        )
                        .with("customer_id", customer.customer_id.clone())
                        .with("transactions_shown", transactions.len()),
                    }
                } else {
                    self.session.stage = Stage::GeneralEnquiry;
                    Turn {
                        response: format!(
                            "Thank you, {}. Your identity has been verified. ✓\n\n\
                             How can I assist you today? You can ask about:\n\
                             - Reward points balance\n\
                             - Credit limit\n\
                             - Recent transactions\n\
                             - Statement details\n\n\
                             Please type your question.",
                            customer.name,
                        ),
                        trace: TraceEntry::new("verification_success", Stage::VerifyCard, input)
                            .with("customer_id", customer.customer_id.clone()),
                    }
                }
            }
            VerifyOutcome::Retry { remaining } => Turn {
                response: format!(
                    "Sorry, the last 4 digits don't match our records for this mobile number.\n\n\
                     Please try again.\n\nAttempts remaining: {remaining}"
                ),
                trace: TraceEntry::new("card_verification_failed", Stage::VerifyCard, input)
                    .with("remaining_attempts", remaining),
            },
            VerifyOutcome::LockedOut => {
                self.session.stage = Stage::Initial;
                Turn {
                    response: format!(
                        "Card verification failed. Please contact customer support \
                         or try again later.\n\n{MENU_BLOCK}"
                    ),
                    trace: TraceEntry::new(
                        "card_verification_failed_max_attempts",
                        Stage::VerifyCard,
                        input,
                    ),
                }
            }
        };
        Ok(turn)
    }

    fn handle_general_enquiry(&mut self, input: &str) -> SupportResult<Turn> {
        // One-shot proactive risk check: runs on the first general
        // enquiry after verification, never again for this session.
        if !self.session.fraud_check_done {
            self.session.fraud_check_done = true;
            if let Some(txn) = self.proactive_candidate()? {
                log::info!(
                    "session {}: proactive risk interrupt on {}",
                    self.session.session_id,
                    txn.transaction_id
                );
                self.session.general_query = Some(input.to_string());
                self.session.pending_transaction = Some(txn.clone());
                self.session.stage = Stage::FraudConfirmation;
                return Ok(Turn {
                    response: proactive_alert_text(&txn),
                    trace: TraceEntry::new("proactive_fraud_alert", Stage::GeneralEnquiry, input)
                        .with("transaction_id", txn.transaction_id.clone())
                        .with("transaction_amount", txn.amount),
                });
            }
        }

        self.session.general_query = Some(input.to_string());
        let resolved = query::resolve(
            self.directory.as_ref(),
            &self.session,
            input,
            self.config.transaction_display_limit,
        )?;
        Ok(Turn {
            response: resolved.response,
            trace: TraceEntry::new(resolved.action, Stage::GeneralEnquiry, input),
        })
    }

    fn handle_fraud_details(&mut self, input: &str) -> SupportResult<Turn> {
        let customer_id = self.session.customer_id.clone().unwrap_or_default();
        let transactions = self
            .directory
            .transactions_for(&customer_id, self.config.transaction_display_limit)?;

        let selection = selector::select(&transactions, input);
        let action = match selection {
            Selection::ByIndex(_) => "transaction_selected",
            Selection::ByMatch(_) => "transaction_matched",
            Selection::NotFound => "transaction_not_found",
        };

        let turn = match selection.transaction() {
            Some(txn) => {
                let txn = txn.clone();
                self.session.pending_transaction = Some(txn.clone());
                self.session.stage = Stage::FraudConfirmation;
                Turn {
                    response: format!(
                        "You've selected:\n**Transaction Details:**\n\
                         - Date: {}\n- Amount: ${:.2}\n- Merchant: {}\n- Status: {}\n\n\
                         Did you authorize this transaction?\n\
                         - Type **YES** if you authorized it\n\
                         - Type **NO** if you did not authorize it",
                        txn.date, txn.amount, txn.merchant, txn.status,
                    ),
                    trace: TraceEntry::new(action, Stage::FraudDetails, input)
                        .with("transaction_id", txn.transaction_id.clone()),
                }
            }
            None => Turn {
                response: format!(
                    "I couldn't identify the transaction. Please provide the transaction \
                     number (1-{}) from the list above.",
                    transactions.len().max(1),
                ),
                trace: TraceEntry::new(action, Stage::FraudDetails, input),
            },
        };
        Ok(turn)
    }

    fn handle_fraud_confirmation(&mut self, input: &str) -> SupportResult<Turn> {
        let lower = input.to_lowercase();

        if lower.contains("no") {
            let Some(txn) = self.session.pending_transaction.clone() else {
                return Ok(self.corrupt_state_turn(input));
            };
            self.session.stage = Stage::FraudAction;
            let sla = self.policies.fraud_sla();
            return Ok(Turn {
                response: format!(
                    "I understand this is concerning. For your security, I will:\n\n\
                     1. **Block your card** immediately to prevent further unauthorized transactions\n\
                     2. **Raise a dispute** for the transaction of ${:.2}\n\n\
                     A new card will be issued and sent to your registered address within {}.\n\n\
                     Should I proceed with these actions?\n\
                     - Type **YES** to proceed\n\
                     - Type **NO** to cancel",
                    txn.amount, sla.new_card_dispatch,
                ),
                trace: TraceEntry::new("fraud_confirmed", Stage::FraudConfirmation, input)
                    .with("transaction_amount", txn.amount),
            });
        }

        if lower.contains("yes") {
            self.session.pending_transaction = None;
            if let Some(original_query) = self.session.general_query.take() {
                // Resume the interrupted enquiry: the original query is
                // re-answered verbatim, not the confirmation text.
                self.session.stage = Stage::GeneralEnquiry;
                let resolved = query::resolve(
                    self.directory.as_ref(),
                    &self.session,
                    &original_query,
                    self.config.transaction_display_limit,
                )?;
                return Ok(Turn {
                    response: format!(
                        "Thank you for confirming. Your transaction is legitimate.\n\n\
                         Now, regarding your query about \"{original_query}\"...\n\n{}",
                        resolved.response,
                    ),
                    trace: TraceEntry::new(
                        "transaction_authorized_return_to_query",
                        Stage::FraudConfirmation,
                        input,
                    )
                    .with("resumed_query", original_query.clone()),
                });
            }

            self.session.stage = Stage::Completed;
            return Ok(Turn {
                response: "Thank you for confirming. Since you authorized this transaction, \
                           no action is needed.\n\n\
                           If you have any other concerns, please let me know!\n\n\
                           Type **1** or **2** to start a new query."
                    .to_string(),
                trace: TraceEntry::new("transaction_authorized", Stage::FraudConfirmation, input),
            });
        }

        Ok(Turn {
            response: YES_NO_PROMPT.to_string(),
            trace: TraceEntry::new("invalid_confirmation", Stage::FraudConfirmation, input),
        })
    }

    fn handle_fraud_action(&mut self, input: &str) -> SupportResult<Turn> {
        let lower = input.to_lowercase();

        if lower.contains("no") {
            self.session.pending_transaction = None;
            self.session.stage = Stage::Completed;
            return Ok(Turn {
                response: "Understood. No action has been taken.\n\n\
                           If you change your mind or need assistance, please let me know!\n\n\
                           Type **1** or **2** to start a new query."
                    .to_string(),
                trace: TraceEntry::new("fraud_actions_cancelled", Stage::FraudAction, input),
            });
        }

        if lower.contains("yes") {
            let Some(txn) = self.session.pending_transaction.clone() else {
                return Ok(self.corrupt_state_turn(input));
            };
            let last4 = self.session.last_4.clone().unwrap_or_default();
            let receipt = self.remedies.execute(&txn, &last4);
            self.session.pending_transaction = None;
            self.session.stage = Stage::Completed;
            return Ok(Turn {
                response: format!(
                    "{}\n\n{}",
                    RemedyOrchestrator::render(
                        &receipt,
                        self.policies.fraud_sla(),
                        self.policies.liability(),
                    ),
                    query::FOOTER,
                ),
                trace: TraceEntry::new("fraud_actions_completed", Stage::FraudAction, input)
                    .with("block_ticket", receipt.block_ticket.clone())
                    .with("dispute_ticket", receipt.dispute_ticket.clone())
                    .with("transaction_amount", receipt.amount),
            });
        }

        Ok(Turn {
            response: YES_NO_PROMPT.to_string(),
            trace: TraceEntry::new("invalid_action_confirmation", Stage::FraudAction, input),
        })
    }

    fn handle_completed(&mut self, input: &str) -> Turn {
        Turn {
            response: "Please type **1** for General Enquiry or **2** for Fraud Transaction \
                       to start a new query."
                .to_string(),
            trace: TraceEntry::new("awaiting_new_query", Stage::Completed, input),
        }
    }

    // ── Helpers ────────────────────────────────────────────────

    /// First proactive candidate: the directory's own pre-filtered
    /// suspicious view, falling back to the multi-signal screen over
    /// the recent history.
    fn proactive_candidate(&self) -> SupportResult<Option<Transaction>> {
        let Some(customer_id) = self.session.customer_id.as_deref() else {
            return Ok(None);
        };
        let flagged = self.directory.suspicious_transactions_for(customer_id)?;
        if let Some(txn) = flagged.into_iter().next() {
            return Ok(Some(txn));
        }
        let recent = self
            .directory
            .transactions_for(customer_id, self.config.transaction_display_limit)?;
        Ok(risk::screen(&recent).first().map(|t| (*t).clone()))
    }

    /// A confirmation stage was reached without a pending transaction.
    /// Fatal for the turn only: apologize and reset.
    fn corrupt_state_turn(&mut self, input: &str) -> Turn {
        let stage = self.session.stage;
        log::warn!(
            "session {}: stage {stage} has no pending transaction, resetting",
            self.session.session_id
        );
        self.session.reset_flow();
        Turn {
            response: APOLOGY.to_string(),
            trace: TraceEntry::new("error_fallback", stage, input),
        }
    }
}

fn transaction_listing(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "(no recent transactions on record)".to_string();
    }
    transactions
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. {} - ${:.2} at {} ({})",
                i + 1,
                t.date,
                t.amount,
                t.merchant,
                t.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn proactive_alert_text(txn: &Transaction) -> String {
    let time_info = txn
        .transaction_time
        .as_deref()
        .map(|t| format!(" during {t}"))
        .unwrap_or_default();
    format!(
        "Before I help you with that, I'd like to quickly confirm a recent transaction \
         for your safety.\n\n\
         **Transaction Alert:**\n\
         - Amount: ${:.2}\n\
         - Merchant: {}\n\
         - Date: {}{time_info}\n\
         - Location: {}\n\
         - Status: {}\n\n\
         Was this transaction authorized by you?\n\
         - Type **YES** if you authorized it\n\
         - Type **NO** if you did not authorize it",
        txn.amount,
        txn.merchant,
        txn.date,
        txn.location,
        txn.status.to_uppercase(),
    )
}
