use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Info,
    Warning,
}

/// One line of the dashboard's recent activity feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Activity {
    pub id: u64,
    /// Display name of whoever made the change
    #[schema(example = "Admin")]
    pub user: String,
    #[schema(example = "Added employee John Doe")]
    pub action: String,
    pub status: ActivityStatus,
    #[schema(example = "2025-08-10T09:30:00Z", value_type = String)]
    pub time: DateTime<Utc>,
}
