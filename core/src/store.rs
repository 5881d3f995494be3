//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database. The state machine sees a
//! `Directory` trait object; tooling appends trace entries through the
//! methods here. Customer and transaction rows are read-only after
//! seeding — the trace log is the only table the runtime appends to.

use crate::directory::{Customer, Directory, RewardSummary, Transaction};
use crate::error::SupportResult;
use crate::trace::TraceEntry;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CUSTOMER_COLS: &str = "customer_id, name, card_id, mobile, last_4, email, \
     reward_total_points, reward_cashback_value, reward_points_expiring, \
     reward_expiry_date, reward_redemption_options";

const TRANSACTION_COLS: &str = "transaction_id, customer_id, date, amount, merchant, \
     merchant_category, status, location, card_last_4, fraud_score, \
     transaction_time, merchant_status";

pub struct SupportStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for a file
    suspicious_score_threshold: f64,
}

impl SupportStore {
    pub fn open(path: &str) -> SupportResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
            suspicious_score_threshold: 0.7,
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SupportResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: None,
            suspicious_score_threshold: 0.7,
        })
    }

    pub fn with_suspicious_threshold(mut self, threshold: f64) -> Self {
        self.suspicious_score_threshold = threshold;
        self
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases this returns a fresh, isolated database;
    /// shared access to :memory: requires a shared-cache URI path.
    pub fn reopen(&self) -> SupportResult<Self> {
        let reopened = match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }?;
        Ok(reopened.with_suspicious_threshold(self.suspicious_score_threshold))
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SupportResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_support.sql"))?;
        Ok(())
    }

    // ── Seeding ────────────────────────────────────────────────

    pub fn insert_customer(&self, customer: &Customer) -> SupportResult<()> {
        let rewards = customer.rewards.as_ref();
        let options_json = match rewards {
            Some(r) => Some(serde_json::to_string(&r.redemption_options)?),
            None => None,
        };
        self.conn.execute(
            "INSERT INTO customers (customer_id, name, card_id, mobile, last_4, email,
                 reward_total_points, reward_cashback_value, reward_points_expiring,
                 reward_expiry_date, reward_redemption_options)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                customer.customer_id,
                customer.name,
                customer.card_id,
                customer.mobile,
                customer.last_4,
                customer.email,
                rewards.map(|r| r.total_points),
                rewards.map(|r| r.cashback_value),
                rewards.map(|r| r.points_expiring_soon),
                rewards.map(|r| r.expiry_date.clone()),
                options_json,
            ],
        )?;
        Ok(())
    }

    pub fn insert_transaction(&self, txn: &Transaction) -> SupportResult<()> {
        self.conn.execute(
            "INSERT INTO transactions (transaction_id, customer_id, date, amount, merchant,
                 merchant_category, status, location, card_last_4, fraud_score,
                 transaction_time, merchant_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                txn.transaction_id,
                txn.customer_id,
                txn.date,
                txn.amount,
                txn.merchant,
                txn.merchant_category,
                txn.status,
                txn.location,
                txn.card_last_4,
                txn.fraud_score,
                txn.transaction_time,
                txn.merchant_status,
            ],
        )?;
        Ok(())
    }

    /// Load the demo directory: three customers, seven transactions.
    pub fn seed_demo_data(&self) -> SupportResult<()> {
        for customer in demo_customers() {
            self.insert_customer(&customer)?;
        }
        for txn in demo_transactions() {
            self.insert_transaction(&txn)?;
        }
        Ok(())
    }

    pub fn customer_count(&self) -> SupportResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count)
    }

    // ── Trace log ──────────────────────────────────────────────

    pub fn append_trace(&self, session_id: &str, entry: &TraceEntry) -> SupportResult<()> {
        self.conn.execute(
            "INSERT INTO trace_log (session_id, action, stage, input, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session_id,
                entry.action,
                entry.stage,
                entry.input,
                serde_json::to_string(&entry.context)?,
                entry.at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn trace_count(&self, session_id: &str) -> SupportResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM trace_log WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Action names for a session, in append order.
    pub fn trace_actions(&self, session_id: &str) -> SupportResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT action FROM trace_log WHERE session_id = ?1 ORDER BY id ASC",
        )?;
        let actions = stmt
            .query_map(params![session_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(actions)
    }
}

impl Directory for SupportStore {
    fn lookup_by_mobile(&self, mobile: &str) -> SupportResult<Option<Customer>> {
        let sql = format!(
            "SELECT {CUSTOMER_COLS} FROM customers WHERE mobile = ?1 ORDER BY customer_id LIMIT 1"
        );
        let customer = self
            .conn
            .query_row(&sql, params![mobile], row_to_customer)
            .optional()?;
        Ok(customer)
    }

    fn lookup_by_mobile_and_last4(
        &self,
        mobile: &str,
        last4: &str,
    ) -> SupportResult<Option<Customer>> {
        let sql = format!(
            "SELECT {CUSTOMER_COLS} FROM customers WHERE mobile = ?1 AND last_4 = ?2"
        );
        let customer = self
            .conn
            .query_row(&sql, params![mobile, last4], row_to_customer)
            .optional()?;
        Ok(customer)
    }

    fn transactions_for(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> SupportResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLS} FROM transactions
             WHERE customer_id = ?1 ORDER BY rowid ASC LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params![customer_id, limit as i64], row_to_transaction)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    fn suspicious_transactions_for(
        &self,
        customer_id: &str,
    ) -> SupportResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLS} FROM transactions
             WHERE customer_id = ?1 AND fraud_score > ?2 ORDER BY rowid ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(
                params![customer_id, self.suspicious_score_threshold],
                row_to_transaction,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(transactions)
    }
}

fn row_to_customer(row: &Row<'_>) -> rusqlite::Result<Customer> {
    let rewards = match row.get::<_, Option<i64>>(6)? {
        Some(total_points) => Some(RewardSummary {
            total_points,
            cashback_value: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
            points_expiring_soon: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
            expiry_date: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            redemption_options: row
                .get::<_, Option<String>>(10)?
                .map(|s| serde_json::from_str(&s).unwrap_or_default())
                .unwrap_or_default(),
        }),
        None => None,
    };
    Ok(Customer {
        customer_id: row.get(0)?,
        name: row.get(1)?,
        card_id: row.get(2)?,
        mobile: row.get(3)?,
        last_4: row.get(4)?,
        email: row.get(5)?,
        rewards,
    })
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        transaction_id: row.get(0)?,
        customer_id: row.get(1)?,
        date: row.get(2)?,
        amount: row.get(3)?,
        merchant: row.get(4)?,
        merchant_category: row.get(5)?,
        status: row.get(6)?,
        location: row.get(7)?,
        card_last_4: row.get(8)?,
        fraud_score: row.get(9)?,
        transaction_time: row.get(10)?,
        merchant_status: row.get(11)?,
    })
}

// ── Demo directory data ──────────────────────────────────────────────

fn standard_rewards(total_points: i64, cashback_value: f64, expiring: i64) -> RewardSummary {
    RewardSummary {
        total_points,
        cashback_value,
        points_expiring_soon: expiring,
        expiry_date: "2026-03-31".to_string(),
        redemption_options: vec![
            "Shopping vouchers".to_string(),
            "Travel bookings".to_string(),
            "Bill payments".to_string(),
            "Cashback to account".to_string(),
        ],
    }
}

fn demo_customers() -> Vec<Customer> {
    vec![
        Customer {
            customer_id: "CUST001".into(),
            name: "John Doe".into(),
            card_id: "CARD_1234".into(),
            mobile: "9876543210".into(),
            last_4: "1234".into(),
            email: "john.doe@example.com".into(),
            rewards: Some(standard_rewards(12_500, 3125.00, 450)),
        },
        Customer {
            customer_id: "CUST002".into(),
            name: "Jane Smith".into(),
            card_id: "CARD_5678".into(),
            mobile: "9998887776".into(),
            last_4: "5678".into(),
            email: "jane.smith@example.com".into(),
            rewards: Some(standard_rewards(8_750, 2187.50, 200)),
        },
        Customer {
            customer_id: "CUST003".into(),
            name: "Rajesh Kumar".into(),
            card_id: "CARD_9012".into(),
            mobile: "9123456789".into(),
            last_4: "9012".into(),
            email: "rajesh.kumar@example.com".into(),
            rewards: Some(standard_rewards(15_200, 3800.00, 350)),
        },
    ]
}

fn demo_transactions() -> Vec<Transaction> {
    let plain = |id: &str, cust: &str, date: &str, amount: f64, merchant: &str, category: &str,
                 status: &str, location: &str, last4: &str| Transaction {
        transaction_id: id.into(),
        customer_id: cust.into(),
        date: date.into(),
        amount,
        merchant: merchant.into(),
        merchant_category: category.into(),
        status: status.into(),
        location: location.into(),
        card_last_4: last4.into(),
        fraud_score: None,
        transaction_time: None,
        merchant_status: None,
    };

    vec![
        plain(
            "TXN001", "CUST001", "2026-01-23", 1250.00, "Amazon", "E-commerce",
            "completed", "Online", "1234",
        ),
        plain(
            "TXN002", "CUST001", "2026-01-22", 450.50, "Starbucks", "Food & Beverage",
            "completed", "New York, NY", "1234",
        ),
        Transaction {
            fraud_score: Some(0.85),
            ..plain(
                "TXN003", "CUST001", "2026-01-21", 8900.00, "Unknown Merchant XYZ",
                "Unknown", "pending", "International", "1234",
            )
        },
        plain(
            "TXN004", "CUST002", "2026-01-23", 350.00, "Walmart", "Retail",
            "completed", "Los Angeles, CA", "5678",
        ),
        plain(
            "TXN005", "CUST002", "2026-01-20", 2100.00, "Best Buy", "Electronics",
            "completed", "San Francisco, CA", "5678",
        ),
        plain(
            "TXN006", "CUST003", "2026-02-04", 1200.00, "Target", "Retail",
            "completed", "Mumbai, India", "9012",
        ),
        Transaction {
            fraud_score: Some(0.75),
            transaction_time: Some("Late night".into()),
            merchant_status: Some("Newly added".into()),
            ..plain(
                "TXN007", "CUST003", "2026-02-05 02:30 AM", 18_900.00,
                "GlobalTech Solutions Ltd", "Electronics", "pending",
                "Singapore (International)", "9012",
            )
        },
    ]
}
