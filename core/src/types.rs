//! Shared primitive types used across the support core.

/// Stable customer identifier, e.g. "CUST001".
pub type CustomerId = String;

/// Stable transaction identifier, e.g. "TXN003".
pub type TransactionId = String;

/// Unique identifier for one conversation session.
pub type SessionId = String;
