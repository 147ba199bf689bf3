use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1,
        "workplace_id": 1,
        "date": "2025-08-10",
        "status": "present",
        "wage": 500.0,
        "overtime_wage": 0.0
    })
)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub workplace_id: u64,
    #[schema(example = "2025-08-10", value_type = String)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub wage: f64,
    #[serde(default)]
    pub overtime_wage: f64,
}

impl AttendanceRecord {
    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }

    /// Identity used for upserts and duplicate detection.
    pub fn key(&self) -> (u64, NaiveDate, u64) {
        (self.employee_id, self.date, self.workplace_id)
    }
}

impl Record for AttendanceRecord {
    fn id(&self) -> u64 {
        self.id
    }
}
