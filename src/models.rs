use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::user::PublicUser;

#[derive(Deserialize, ToSchema)]
pub struct SignupReqDto {
    #[schema(example = "Admin")]
    pub name: Option<String>,
    #[schema(example = "admin@admin.com")]
    pub email: Option<String>,
    #[schema(example = "admin")]
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin@admin.com")]
    pub email: Option<String>,
    #[schema(example = "admin")]
    pub password: Option<String>,
}

/// Returned by login and signup.
#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: PublicUser,
    /// Access token for the `Authorization: Bearer` header
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize, ToSchema)]
pub struct ValidateTokenResponse {
    pub valid: bool,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// email
    pub sub: String,
    pub name: String,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
