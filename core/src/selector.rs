//! Transaction selection within the fraud-report flow.
//!
//! Resolution order: integer parse as a 1-based index into the listed
//! transactions; otherwise fall back to fuzzy matching — the
//! lower-cased input as a substring of a merchant name, or the rendered
//! amount as a substring of the input. First match wins.

use crate::directory::Transaction;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// Resolved via a 1-based list index.
    ByIndex(&'a Transaction),
    /// Resolved via merchant or amount matching.
    ByMatch(&'a Transaction),
    NotFound,
}

impl<'a> Selection<'a> {
    pub fn transaction(&self) -> Option<&'a Transaction> {
        match self {
            Selection::ByIndex(t) | Selection::ByMatch(t) => Some(t),
            Selection::NotFound => None,
        }
    }
}

pub fn select<'a>(transactions: &'a [Transaction], input: &str) -> Selection<'a> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Selection::NotFound;
    }

    // Numeric input is always treated as an index, never as an amount.
    if let Ok(n) = trimmed.parse::<usize>() {
        return match n {
            n if n >= 1 && n <= transactions.len() => Selection::ByIndex(&transactions[n - 1]),
            _ => Selection::NotFound,
        };
    }

    let lower = trimmed.to_lowercase();
    let found = transactions.iter().find(|t| {
        t.merchant.to_lowercase().contains(&lower)
            || trimmed.contains(&format!("{}", t.amount))
            || trimmed.contains(&format!("{:.2}", t.amount))
    });

    match found {
        Some(t) => Selection::ByMatch(t),
        None => Selection::NotFound,
    }
}
