//! Intent classification precedence and enquiry responses.

use supportdesk_core::error::SupportResult;
use supportdesk_core::machine::SupportDesk;
use supportdesk_core::query::{self, QueryIntent};
use supportdesk_core::store::SupportStore;

fn desk() -> SupportDesk {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SupportStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store.seed_demo_data().expect("seed demo data");
    SupportDesk::with_defaults(Box::new(store))
}

/// Jane has no flagged transactions, so enquiries answer directly.
fn enquiring_as_jane() -> SupportDesk {
    let mut desk = desk();
    desk.process("1").expect("option");
    desk.process("9998887776").expect("mobile");
    desk.process("5678").expect("card");
    desk
}

#[test]
fn classification_is_first_match_in_table_order() {
    assert_eq!(query::classify("reward points"), QueryIntent::RewardPoints);
    assert_eq!(query::classify("credit limit"), QueryIntent::CreditLimit);
    assert_eq!(query::classify("my statement"), QueryIntent::Statement);
    assert_eq!(query::classify("bill please"), QueryIntent::Statement);
    assert_eq!(query::classify("when is payment due"), QueryIntent::PaymentDue);
    assert_eq!(
        query::classify("transaction history"),
        QueryIntent::TransactionHistory
    );
    assert_eq!(query::classify("weather?"), QueryIntent::Unrecognized);

    // Ties resolve to the earlier table row, by contract.
    assert_eq!(
        query::classify("credit limit statement"),
        QueryIntent::CreditLimit
    );
    assert_eq!(
        query::classify("points on my statement"),
        QueryIntent::RewardPoints
    );
}

#[test]
fn classification_is_case_insensitive() {
    assert_eq!(query::classify("REWARD POINTS"), QueryIntent::RewardPoints);
    assert_eq!(query::classify("Credit Limit?"), QueryIntent::CreditLimit);
}

#[test]
fn reward_answer_uses_directory_data() -> SupportResult<()> {
    let mut desk = enquiring_as_jane();

    let turn = desk.process("how many reward points do I have")?;
    assert_eq!(turn.trace.action, "reward_points_query");
    assert!(turn.response.contains("8,750 points"));
    assert!(turn.response.contains(query::FOOTER));
    Ok(())
}

#[test]
fn statement_answer_lists_recent_transactions() -> SupportResult<()> {
    let mut desk = enquiring_as_jane();

    let turn = desk.process("send me my statement")?;
    assert_eq!(turn.trace.action, "statement_query");
    assert!(turn.response.contains("Statement Summary"));
    assert!(turn.response.contains("Walmart"));
    assert!(turn.response.contains("Best Buy"));
    Ok(())
}

#[test]
fn history_answer_lists_transactions() -> SupportResult<()> {
    let mut desk = enquiring_as_jane();

    let turn = desk.process("show my transaction history")?;
    assert_eq!(turn.trace.action, "transaction_query");
    assert!(turn.response.contains("$350.00 at Walmart"));
    assert!(turn.response.contains("$2100.00 at Best Buy"));
    Ok(())
}

#[test]
fn payment_due_answer_is_fixed_schedule() -> SupportResult<()> {
    let mut desk = enquiring_as_jane();

    let turn = desk.process("when is my payment due")?;
    assert_eq!(turn.trace.action, "payment_due_query");
    assert!(turn.response.contains("Payment Due Date"));
    Ok(())
}

#[test]
fn unrecognized_enquiry_asks_for_clarification() -> SupportResult<()> {
    let mut desk = enquiring_as_jane();

    let turn = desk.process("tell me a story")?;
    assert_eq!(turn.trace.action, "general_query_clarification");
    assert!(turn.response.contains("tell me a story"));
    assert!(turn.response.contains("more specific"));
    // A clarification keeps the session in the enquiry stage.
    let turn = desk.process("credit limit then")?;
    assert_eq!(turn.trace.action, "credit_limit_query");
    Ok(())
}
