//! General-enquiry intent classification and response composition.
//!
//! Classification is a prioritized table of (keywords, intent) pairs
//! evaluated in declared order — first row with any keyword hit wins,
//! so tie-breaks are explicit and testable. Answers are enriched with
//! live directory data when available and fall back to fixed
//! illustrative figures otherwise.

use crate::directory::Directory;
use crate::error::SupportResult;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    RewardPoints,
    CreditLimit,
    Statement,
    PaymentDue,
    TransactionHistory,
    Unrecognized,
}

/// Evaluated top to bottom. Order is part of the contract: "credit
/// limit statement" classifies as CreditLimit, never Statement.
const INTENT_TABLE: &[(&[&str], QueryIntent)] = &[
    (&["reward", "point"], QueryIntent::RewardPoints),
    (&["credit limit", "limit"], QueryIntent::CreditLimit),
    (&["statement", "bill"], QueryIntent::Statement),
    (&["due", "payment"], QueryIntent::PaymentDue),
    (&["transaction", "history"], QueryIntent::TransactionHistory),
];

pub fn classify(input: &str) -> QueryIntent {
    let lower = input.to_lowercase();
    for (keywords, intent) in INTENT_TABLE {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *intent;
        }
    }
    QueryIntent::Unrecognized
}

pub struct Resolved {
    pub response: String,
    /// Trace action name for the branch taken.
    pub action: &'static str,
}

pub const FOOTER: &str = "Is there anything else I can help you with?\n\
Type **1** or **2** to start a new query, or **thanks/0/exit** to go to main menu.";

/// Answer a classified enquiry for a verified session.
pub fn resolve(
    directory: &dyn Directory,
    session: &Session,
    input: &str,
    history_limit: usize,
) -> SupportResult<Resolved> {
    let resolved = match classify(input) {
        QueryIntent::RewardPoints => Resolved {
            response: reward_points_answer(directory, session)?,
            action: "reward_points_query",
        },
        QueryIntent::CreditLimit => Resolved {
            response: format!(
                "Your credit card details:\n\
                 - **Credit Limit**: $10,000\n\
                 - **Available Credit**: $7,350\n\
                 - **Used Credit**: $2,650\n\n\
                 Your credit utilization is at 26.5%, which is healthy!\n\n{FOOTER}"
            ),
            action: "credit_limit_query",
        },
        QueryIntent::Statement => Resolved {
            response: statement_answer(directory, session)?,
            action: "statement_query",
        },
        QueryIntent::PaymentDue => Resolved {
            response: format!(
                "**Payment Information:**\n\
                 - Payment Due Date: March 15, 2026\n\
                 - Total Amount Due: $2,650.00\n\
                 - Minimum Amount Due: $132.50\n\
                 - Last Payment: $1,500.00 on January 10, 2026\n\n\
                 **Payment Options:**\n\
                 - Online banking\n\
                 - Mobile app\n\
                 - Auto-debit\n\
                 - Bank branch\n\
                 - Cheque deposit\n\n{FOOTER}"
            ),
            action: "payment_due_query",
        },
        QueryIntent::TransactionHistory => Resolved {
            response: history_answer(directory, session, history_limit)?,
            action: "transaction_query",
        },
        QueryIntent::Unrecognized => Resolved {
            response: format!(
                "I understand you're asking about: \"{input}\"\n\n\
                 I'm here to help! Could you please be more specific? You can ask about:\n\
                 - Reward points\n\
                 - Credit limit\n\
                 - Recent transactions\n\
                 - Statement details\n\
                 - Payment due dates\n\n\
                 Or feel free to rephrase your question.\n\n{FOOTER}"
            ),
            action: "general_query_clarification",
        },
    };
    Ok(resolved)
}

fn reward_points_answer(directory: &dyn Directory, session: &Session) -> SupportResult<String> {
    let customer = match (&session.mobile_number, &session.last_4) {
        (Some(mobile), Some(last4)) => directory.lookup_by_mobile_and_last4(mobile, last4)?,
        _ => None,
    };

    if let Some(rewards) = customer.and_then(|c| c.rewards) {
        let options = rewards
            .redemption_options
            .iter()
            .map(|o| format!("- {o}"))
            .collect::<Vec<_>>()
            .join("\n");
        return Ok(format!(
            "Your current reward points balance is: **{} points**\n\n\
             **Reward Details:**\n\
             - Cashback Value: ${:.2}\n\
             - Points Expiring Soon: {} (by {})\n\n\
             **Redemption Options:**\n{options}\n\n{FOOTER}",
            group_thousands(rewards.total_points),
            rewards.cashback_value,
            rewards.points_expiring_soon,
            rewards.expiry_date,
        ));
    }

    // Illustrative fallback when the directory has no reward summary.
    Ok(format!(
        "Your current reward points balance is: **5,240 points**\n\n\
         You can redeem these points for:\n\
         - Shopping vouchers\n\
         - Flight miles\n\
         - Cashback\n\
         - Gift cards\n\n{FOOTER}"
    ))
}

fn statement_answer(directory: &dyn Directory, session: &Session) -> SupportResult<String> {
    let lines = recent_lines(directory, session, 10, true)?;
    Ok(format!(
        "**Statement Summary:**\n\
         - Statement Date: February 5, 2026\n\
         - Statement Period: January 6, 2026 - February 5, 2026\n\
         - Total Amount Due: $2,650.00\n\
         - Minimum Amount Due: $132.50\n\
         - Payment Due Date: March 15, 2026\n\
         - Last Payment: $1,500.00 on January 10, 2026\n\n\
         **Recent Transactions:**\n{lines}\n\n{FOOTER}"
    ))
}

fn history_answer(
    directory: &dyn Directory,
    session: &Session,
    limit: usize,
) -> SupportResult<String> {
    let lines = recent_lines(directory, session, limit, false)?;
    Ok(format!(
        "Here are your recent transactions:\n\n{lines}\n\n{FOOTER}"
    ))
}

fn recent_lines(
    directory: &dyn Directory,
    session: &Session,
    limit: usize,
    with_status: bool,
) -> SupportResult<String> {
    let customer_id = session.customer_id.as_deref().unwrap_or_default();
    let transactions = directory.transactions_for(customer_id, limit)?;
    if transactions.is_empty() {
        return Ok("- (no recent transactions on record)".to_string());
    }
    let lines = transactions
        .iter()
        .map(|t| {
            if with_status {
                format!(
                    "- {} - ${:.2} at {} ({})",
                    t.date, t.amount, t.merchant, t.status
                )
            } else {
                format!("- {} - ${:.2} at {}", t.date, t.amount, t.merchant)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    Ok(lines)
}

/// "12500" → "12,500". Points balances only; amounts stay plain.
fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
