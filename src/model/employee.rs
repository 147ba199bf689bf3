use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "email": "john.doe@company.com",
        "role": "Developer",
        "department": "Engineering",
        "wage": 500.0,
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    /// Job title
    #[schema(example = "Developer")]
    pub role: String,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,

    /// Daily base wage
    #[schema(example = 500.0)]
    pub wage: f64,

    pub status: EmployeeStatus,
}

impl Record for Employee {
    fn id(&self) -> u64 {
        self.id
    }
}
