use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Record;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"id": 1, "name": "Head Office", "location": "Dubai"}))]
pub struct Workplace {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub location: String,
}

impl Record for Workplace {
    fn id(&self) -> u64 {
        self.id
    }
}
