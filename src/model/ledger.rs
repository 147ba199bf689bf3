use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use super::Record;

/// Loans and deductions share one record shape and differ only in which
/// table they live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LedgerKind {
    Loan,
    Deduction,
}

impl LedgerKind {
    /// JSON key used when a single entry is echoed back.
    pub fn field(&self) -> &'static str {
        match self {
            LedgerKind::Loan => "loan",
            LedgerKind::Deduction => "deduction",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "employeeId": 1,
        "amount": 200.5,
        "remark": "Late arrival",
        "date": "2025-08-01"
    })
)]
pub struct LedgerEntry {
    pub id: u64,
    pub employee_id: u64,
    pub amount: f64,
    #[serde(default)]
    pub remark: String,
    #[schema(example = "2025-08-01", value_type = String)]
    pub date: NaiveDate,
}

impl Record for LedgerEntry {
    fn id(&self) -> u64 {
        self.id
    }
}
