use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub amount_base: Decimal,       // amount in base_currency, fixed at creation
    pub base_currency: String,
    pub category: String,
    pub description: Option<String>,
    pub spent_at: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// Validated input for an insert. Money is already in cents.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount_cents: i64,
    pub currency: String,
    pub amount_base_cents: i64,
    pub base_currency: String,
    pub category: String,
    pub description: Option<String>,
    pub spent_at: NaiveDate,
}
