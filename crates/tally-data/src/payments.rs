use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PaymentFilter {
    pub id: Option<u32>,
    pub user_id: Option<u32>,
    pub charge_id: Option<u32>,
}

/// A received payment. Append-only; the engine never edits
/// or deletes payments.
#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: u32,
    pub user_id: u32,
    /// The charge this payment settles, if known. Unlinked
    /// payments count as general credit.
    pub charge_id: Option<u32>,
    pub amount: f64,
    pub paid_at: NaiveDate,
}
