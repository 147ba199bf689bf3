use serde::Serialize;
use utoipa::ToSchema;

use super::Record;

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// argon2 PHC string
    pub password_hash: String,
}

/// The user as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({"id": 1, "name": "Admin", "email": "admin@admin.com"}))]
pub struct PublicUser {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl Record for User {
    fn id(&self) -> u64 {
        self.id
    }
}
