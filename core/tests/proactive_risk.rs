//! Proactive risk interrupt tests: the one-shot fraud alert that can
//! pre-empt a general enquiry and later resume it.

use supportdesk_core::error::SupportResult;
use supportdesk_core::machine::SupportDesk;
use supportdesk_core::session::Stage;
use supportdesk_core::store::SupportStore;

fn desk() -> SupportDesk {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SupportStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store.seed_demo_data().expect("seed demo data");
    SupportDesk::with_defaults(Box::new(store))
}

/// John's history holds TXN003 (score 0.85, international, pending,
/// unknown merchant): the first enquiry must be interrupted.
fn verify_as_john(desk: &mut SupportDesk) -> SupportResult<()> {
    desk.process("1")?;
    desk.process("9876543210")?;
    desk.process("1234")?;
    Ok(())
}

#[test]
fn first_enquiry_is_interrupted_by_flagged_transaction() -> SupportResult<()> {
    let mut desk = desk();
    verify_as_john(&mut desk)?;

    let turn = desk.process("what is my credit limit")?;
    assert!(turn.response.contains("Transaction Alert"));
    assert!(turn.response.contains("Unknown Merchant XYZ"));
    assert_eq!(turn.trace.action, "proactive_fraud_alert");
    assert_eq!(desk.session().stage, Stage::FraudConfirmation);
    assert_eq!(
        desk.session().general_query.as_deref(),
        Some("what is my credit limit")
    );
    assert!(desk.session().fraud_check_done);
    Ok(())
}

#[test]
fn authorized_alert_resumes_the_original_query() -> SupportResult<()> {
    let mut desk = desk();
    verify_as_john(&mut desk)?;
    desk.process("what is my credit limit")?;

    let turn = desk.process("yes")?;
    assert!(turn.response.contains("regarding your query"));
    assert!(turn.response.contains("what is my credit limit"));
    assert!(turn.response.contains("$10,000"));
    assert_eq!(turn.trace.action, "transaction_authorized_return_to_query");
    assert_eq!(desk.session().stage, Stage::GeneralEnquiry);
    assert_eq!(desk.session().pending_transaction, None);
    assert_eq!(desk.session().general_query, None);
    Ok(())
}

#[test]
fn check_runs_exactly_once_per_session() -> SupportResult<()> {
    let mut desk = desk();
    verify_as_john(&mut desk)?;
    desk.process("what is my credit limit")?;
    desk.process("yes")?;

    // TXN003 is still flagged in the directory, yet no second alert.
    let turn = desk.process("reward points please")?;
    assert_eq!(turn.trace.action, "reward_points_query");
    assert!(turn.response.contains("12,500 points"));
    assert_eq!(desk.session().stage, Stage::GeneralEnquiry);
    Ok(())
}

#[test]
fn unauthorized_alert_enters_the_remedy_path() -> SupportResult<()> {
    let mut desk = desk();
    verify_as_john(&mut desk)?;
    desk.process("show my statement")?;

    let turn = desk.process("no")?;
    assert!(turn.response.contains("Block your card"));
    assert_eq!(turn.trace.action, "fraud_confirmed");
    assert_eq!(desk.session().stage, Stage::FraudAction);

    let turn = desk.process("yes")?;
    assert!(turn.response.contains("Actions completed successfully"));
    assert!(turn.response.contains("BLK"));
    assert!(turn.response.contains("CCB"));
    assert_eq!(turn.trace.action, "fraud_actions_completed");
    assert_eq!(desk.session().stage, Stage::Completed);
    Ok(())
}

#[test]
fn clean_history_is_never_interrupted() -> SupportResult<()> {
    let mut desk = desk();
    desk.process("1")?;
    desk.process("9998887776")?;
    desk.process("5678")?;

    // Jane has no flagged transactions and no multi-signal ones.
    let turn = desk.process("what is my credit limit")?;
    assert_eq!(turn.trace.action, "credit_limit_query");
    assert!(turn.response.contains("$10,000"));
    assert!(desk.session().fraud_check_done);
    assert_eq!(desk.session().stage, Stage::GeneralEnquiry);
    Ok(())
}
