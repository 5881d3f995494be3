//! supportdesk-core: stateful credit-card support dialogue engine.
//!
//! The crate drives a multi-turn support conversation: menu selection,
//! two-factor identity verification with bounded retries, a proactive
//! fraud alert that can interrupt and later resume a general enquiry,
//! transaction selection, and the card-block / dispute remedy sequence.
//!
//! RULE: only store.rs talks to the database. Everything else reaches
//! customer data through the [`directory::Directory`] trait.

pub mod config;
pub mod directory;
pub mod error;
pub mod machine;
pub mod policy;
pub mod query;
pub mod remedy;
pub mod risk;
pub mod selector;
pub mod session;
pub mod store;
pub mod tickets;
pub mod trace;
pub mod types;
pub mod verifier;
