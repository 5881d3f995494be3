//! Risk screener and transaction selector rules, exercised directly on
//! hand-built records.

use supportdesk_core::directory::Transaction;
use supportdesk_core::risk;
use supportdesk_core::selector::{self, Selection};

fn txn(id: &str, merchant: &str, amount: f64) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        customer_id: "CUST900".to_string(),
        date: "2026-02-01".to_string(),
        amount,
        merchant: merchant.to_string(),
        merchant_category: "Retail".to_string(),
        status: "completed".to_string(),
        location: "New York, NY".to_string(),
        card_last_4: "4242".to_string(),
        fraud_score: None,
        transaction_time: None,
        merchant_status: None,
    }
}

#[test]
fn one_signal_alone_is_not_suspicious() {
    let scored = Transaction {
        fraud_score: Some(0.95),
        ..txn("T1", "Acme", 50.0)
    };
    assert_eq!(risk::signal_count(&scored), 1);
    assert!(!risk::is_suspicious(&scored));
}

#[test]
fn two_signals_make_a_transaction_suspicious() {
    let t = Transaction {
        fraud_score: Some(0.8),
        location: "Lagos (International)".to_string(),
        ..txn("T1", "Acme", 50.0)
    };
    assert_eq!(risk::signal_count(&t), 2);
    assert!(risk::is_suspicious(&t));
}

#[test]
fn score_at_the_threshold_does_not_fire() {
    let t = Transaction {
        fraud_score: Some(risk::SCORE_THRESHOLD),
        location: "International".to_string(),
        ..txn("T1", "Acme", 50.0)
    };
    // Strictly above the threshold only.
    assert_eq!(risk::signal_count(&t), 1);
}

#[test]
fn high_value_pending_needs_both_conditions() {
    let pending_small = Transaction {
        status: "pending".to_string(),
        ..txn("T1", "Acme", 4999.0)
    };
    assert_eq!(risk::signal_count(&pending_small), 0);

    let completed_large = txn("T2", "Acme", 9000.0);
    assert_eq!(risk::signal_count(&completed_large), 0);

    let pending_large = Transaction {
        status: "pending".to_string(),
        ..txn("T3", "Acme", 9000.0)
    };
    assert_eq!(risk::signal_count(&pending_large), 1);
}

#[test]
fn textual_signals_are_case_insensitive() {
    let t = Transaction {
        transaction_time: Some("LATE NIGHT".to_string()),
        merchant_status: Some("NEWLY ADDED".to_string()),
        ..txn("T1", "UNKNOWN VENDOR", 50.0)
    };
    assert_eq!(risk::signal_count(&t), 3);
}

#[test]
fn screen_keeps_original_order() {
    let clean = txn("T1", "Acme", 50.0);
    let first_bad = Transaction {
        fraud_score: Some(0.9),
        location: "International".to_string(),
        ..txn("T2", "Acme", 50.0)
    };
    let second_bad = Transaction {
        status: "pending".to_string(),
        ..txn("T3", "Unknown Vendor", 8000.0)
    };
    let all = vec![clean, first_bad, second_bad];

    let flagged = risk::screen(&all);
    let ids: Vec<&str> = flagged.iter().map(|t| t.transaction_id.as_str()).collect();
    assert_eq!(ids, vec!["T2", "T3"]);
}

// ── Selector ───────────────────────────────────────────────────

fn sample() -> Vec<Transaction> {
    vec![
        txn("T1", "Amazon", 1250.0),
        txn("T2", "Starbucks", 450.5),
        txn("T3", "Unknown Merchant XYZ", 8900.0),
    ]
}

#[test]
fn index_selection_is_one_based() {
    let transactions = sample();
    let sel = selector::select(&transactions, "1");
    assert!(matches!(sel, Selection::ByIndex(t) if t.transaction_id == "T1"));
}

#[test]
fn index_out_of_bounds_is_not_found() {
    let transactions = sample();
    assert_eq!(selector::select(&transactions, "0"), Selection::NotFound);
    assert_eq!(selector::select(&transactions, "4"), Selection::NotFound);
}

#[test]
fn numeric_input_never_falls_through_to_amount_matching() {
    let transactions = sample();
    // "8900" parses as an index; it must not match the $8900 charge.
    assert_eq!(selector::select(&transactions, "8900"), Selection::NotFound);
}

#[test]
fn merchant_match_is_case_insensitive() {
    let transactions = sample();
    let sel = selector::select(&transactions, "STARBUCKS");
    assert!(matches!(sel, Selection::ByMatch(t) if t.transaction_id == "T2"));
}

#[test]
fn amount_with_decimals_matches() {
    let transactions = sample();
    let sel = selector::select(&transactions, "the 8900.00 one");
    assert!(matches!(sel, Selection::ByMatch(t) if t.transaction_id == "T3"));
}

#[test]
fn blank_input_is_not_found() {
    let transactions = sample();
    assert_eq!(selector::select(&transactions, "   "), Selection::NotFound);
}
