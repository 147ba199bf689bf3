use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Claims, TokenType},
};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn new_claims(user_id: u64, email: &str, name: &str, ttl: usize, token_type: TokenType) -> Claims {
    Claims {
        user_id,
        sub: email.to_string(),
        name: name.to_string(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    }
}

pub(crate) fn encode_claims(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
}

pub fn generate_access_token(
    user_id: u64,
    email: &str,
    name: &str,
    secret: &str,
    ttl: usize,
) -> Result<String, AppError> {
    let claims = new_claims(user_id, email, name, ttl, TokenType::Access);
    encode_claims(&claims, secret)
}

pub fn generate_refresh_token(
    user_id: u64,
    email: &str,
    name: &str,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), AppError> {
    let claims = new_claims(user_id, email, name, ttl, TokenType::Refresh);
    let token = encode_claims(&claims, secret)?;
    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips() {
        let token = generate_access_token(7, "a@x.com", "Ann", "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.name, "Ann");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_tokens_get_unique_ids() {
        let (_, a) = generate_refresh_token(1, "a@x.com", "Ann", "secret", 60).unwrap();
        let (_, b) = generate_refresh_token(1, "a@x.com", "Ann", "secret", 60).unwrap();

        assert_eq!(a.token_type, TokenType::Refresh);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(1, "a@x.com", "Ann", "secret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = new_claims(1, "a@x.com", "Ann", 0, TokenType::Access);
        claims.exp = now() - 3600;
        let token = encode_claims(&claims, "secret").unwrap();

        assert!(verify_token(&token, "secret").is_err());
    }
}
