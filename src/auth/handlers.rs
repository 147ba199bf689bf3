use actix_web::{HttpRequest, HttpResponse, web};
use once_cell::sync::Lazy;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::{activity::ActivityStatus, user::{PublicUser, User}},
    models::{AuthResponse, LoginReqDto, SignupReqDto, TokenPair, TokenType, ValidateTokenResponse},
    store::Store,
    utils::email_index::EmailIndex,
};

/// Verified against when the email is unknown, so both failure paths cost
/// one argon2 verification.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("not-a-real-password").ok());

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split_whitespace().nth(1))
}

/// Issues an access + refresh pair and registers the refresh token.
pub(crate) fn issue_tokens(user: &User, store: &Store, config: &Config) -> Result<TokenPair, AppError> {
    let token = generate_access_token(
        user.id,
        &user.email,
        &user.name,
        &config.jwt_secret,
        config.access_token_ttl,
    )?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user.id,
        &user.email,
        &user.name,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )?;

    debug!(user_id = user.id, jti = %refresh_claims.jti, "Storing refresh token");
    store.store_refresh_token(&refresh_claims.jti, user.id, refresh_claims.exp)?;

    Ok(TokenPair {
        token,
        refresh_token,
    })
}

/// User signup
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupReqDto,
    responses(
        (status = 200, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Missing field or email already exists", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn signup(
    payload: web::Json<SignupReqDto>,
    store: web::Data<Store>,
    emails: web::Data<EmailIndex>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let (Some(name), Some(email), Some(password)) = (
        required(&payload.name),
        required(&payload.email),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request("Name, email and password are required"));
    };

    if !emails.is_available(email, &store).await? {
        info!(email, "Signup rejected: email taken");
        return Err(AppError::bad_request("Email already exists"));
    }

    let hashed = hash_password(password)?;
    // The store re-checks under its write lock.
    let user = store.insert_user(name, email, hashed)?;
    emails.remember(&user.email).await;

    let tokens = issue_tokens(&user, &store, &config)?;
    store.record_activity(&user.name, "Signed up", ActivityStatus::Success)?;
    info!(user_id = user.id, "User registered");

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: PublicUser::from(&user),
        token: tokens.token,
        refresh_token: tokens.refresh_token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Missing fields or invalid credentials", body = MessageResponse)
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, payload),
    fields(email = payload.email.as_deref().unwrap_or_default())
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    // 1️⃣ Basic validation
    let (Some(email), Some(password)) = (
        required(&payload.email),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        info!("Validation failed: empty email or password");
        return Err(AppError::bad_request("Email and password are required"));
    };

    // 2️⃣ Fetch user
    let user = store.find_user_by_email(email)?;

    // 3️⃣ Verify password
    let verified = match &user {
        Some(u) => verify_password(password, &u.password_hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            false
        }
    };

    let user = match user {
        Some(u) if verified => u,
        _ => {
            info!("Invalid credentials");
            return Err(AppError::bad_request("Invalid credentials"));
        }
    };

    debug!(user_id = user.id, "Password verified");

    // 4️⃣ Issue tokens
    let tokens = issue_tokens(&user, &store, &config)?;
    store.record_activity(&user.name, "Logged in", ActivityStatus::Info)?;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: PublicUser::from(&user),
        token: tokens.token,
        refresh_token: tokens.refresh_token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/validate-token",
    responses(
        (status = 200, description = "Token is valid", body = ValidateTokenResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn validate_token(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let Some(token) = bearer(&req) else {
        return Err(AppError::Unauthorized("No token provided".into()));
    };

    let claims = verify_token(token, &config.jwt_secret)
        .ok()
        .filter(|c| c.token_type == TokenType::Access)
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    let user = store
        .find_user(claims.user_id)?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    Ok(HttpResponse::Ok().json(ValidateTokenResponse {
        valid: true,
        user: PublicUser::from(&user),
    }))
}

/// Exchange a refresh token for a new pair; the old one is revoked.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Refresh token missing, invalid or already used", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let unauthorized = || AppError::Unauthorized("Invalid refresh token".into());

    let token = bearer(&req).ok_or_else(unauthorized)?;
    let claims = verify_token(token, &config.jwt_secret).map_err(|_| unauthorized())?;
    if claims.token_type != TokenType::Refresh {
        return Err(unauthorized());
    }

    let user = store.find_user(claims.user_id)?.ok_or_else(unauthorized)?;

    // 🔄 issue the new pair, then swap the registry entry atomically
    let access = generate_access_token(
        user.id,
        &user.email,
        &user.name,
        &config.jwt_secret,
        config.access_token_ttl,
    )?;
    let (new_refresh, new_claims) = generate_refresh_token(
        user.id,
        &user.email,
        &user.name,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )?;

    if !store.rotate_refresh_token(&claims.jti, &new_claims.jti, user.id, new_claims.exp)? {
        warn!(user_id = user.id, jti = %claims.jti, "Refresh token reuse or unknown jti");
        return Err(unauthorized());
    }

    Ok(HttpResponse::Ok().json(TokenPair {
        token: access,
        refresh_token: new_refresh,
    }))
}

/// Revoke a refresh token. Always 204.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Logged out")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let claims = bearer(&req).and_then(|t| verify_token(t, &config.jwt_secret).ok());

    // only refresh tokens can logout
    if let Some(claims) = claims.filter(|c| c.token_type == TokenType::Refresh) {
        store.revoke_refresh_token(&claims.jti)?;
        debug!(user_id = claims.user_id, "Refresh token revoked");
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web};
    use serde_json::{Value, json};

    use crate::{auth::password::hash_password, store::Store, test_support as ts};

    #[actix_web::test]
    async fn signup_then_login_then_validate() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;

        let resp = test::call_service(
            &app,
            ts::post("/api/signup")
                .set_json(json!({"name": "Ann", "email": "ann@x.com", "password": "pw"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["email"], "ann@x.com");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("password_hash").is_none());

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/login")
                .set_json(json!({"email": "ann@x.com", "password": "pw"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let token = body["token"].as_str().unwrap().to_string();

        let resp = test::call_service(
            &app,
            ts::get("/api/validate-token")
                .insert_header(ts::bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["user"]["name"], "Ann");

        let feed = store.recent_activity(10).unwrap();
        assert_eq!(feed[0].action, "Logged in");
        assert_eq!(feed[1].action, "Signed up");
    }

    #[actix_web::test]
    async fn duplicate_signup_is_rejected() {
        let app = test::init_service(ts::app(web::Data::new(Store::new()))).await;

        let body = json!({"name": "Ann", "email": "ann@x.com", "password": "pw"});
        let first = test::call_service(&app, ts::post("/api/auth/signup").set_json(&body).to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let again = json!({"name": "Ann", "email": "ANN@x.com", "password": "pw"});
        let resp = test::call_service(&app, ts::post("/api/signup").set_json(&again).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Email already exists");
    }

    #[actix_web::test]
    async fn non_ascii_email_matches_the_same_way_everywhere() {
        let app = test::init_service(ts::app(web::Data::new(Store::new()))).await;

        let first = json!({"name": "Änn", "email": "ÄNN@x.com", "password": "pw"});
        let resp = test::call_service(&app, ts::post("/api/signup").set_json(&first).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let again = json!({"name": "Änn", "email": "änn@x.com", "password": "pw"});
        let resp = test::call_service(&app, ts::post("/api/signup").set_json(&again).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/login")
                .set_json(json!({"email": "änn@x.com", "password": "pw"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn signup_requires_all_fields() {
        let app = test::init_service(ts::app(web::Data::new(Store::new()))).await;

        let resp = test::call_service(
            &app,
            ts::post("/api/signup")
                .set_json(json!({"name": "Ann", "email": "  "}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let store = web::Data::new(Store::new());
        store
            .insert_user("Ann", "ann@x.com", hash_password("pw").unwrap())
            .unwrap();
        let app = test::init_service(ts::app(store)).await;

        for payload in [
            json!({"email": "ann@x.com", "password": "nope"}),
            json!({"email": "bob@x.com", "password": "pw"}),
        ] {
            let resp = test::call_service(&app, ts::post("/api/auth/login").set_json(&payload).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "Invalid credentials");
        }
    }

    #[actix_web::test]
    async fn login_requires_fields() {
        let app = test::init_service(ts::app(web::Data::new(Store::new()))).await;

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/login").set_json(json!({"email": "ann@x.com"})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn validate_token_rejects_missing_and_bad_tokens() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;

        let resp = test::call_service(&app, ts::get("/api/auth/validate-token").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "No token provided");

        let resp = test::call_service(
            &app,
            ts::get("/api/validate-token")
                .insert_header(ts::bearer("garbage"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // refresh tokens are not access tokens
        let tokens = ts::register(&store, "ann@x.com");
        let resp = test::call_service(
            &app,
            ts::get("/api/validate-token")
                .insert_header(ts::bearer(&tokens.refresh_token))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn refresh_rotates_and_rejects_reuse() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;
        let refresh = ts::register(&store, "ann@x.com").refresh_token;

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/refresh").insert_header(ts::bearer(&refresh)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["token"].is_string());
        assert_ne!(body["refresh_token"].as_str().unwrap(), refresh);

        let reused = test::call_service(
            &app,
            ts::post("/api/auth/refresh").insert_header(ts::bearer(&refresh)).to_request(),
        )
        .await;
        assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn access_token_cannot_refresh() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;
        let access = ts::register(&store, "ann@x.com").token;

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/refresh").insert_header(ts::bearer(&access)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_revokes_refresh_token() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;
        let refresh = ts::register(&store, "ann@x.com").refresh_token;

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/logout").insert_header(ts::bearer(&refresh)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/refresh").insert_header(ts::bearer(&refresh)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // idempotent, even without a token
        let resp = test::call_service(&app, ts::post("/api/auth/logout").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn seeded_admin_can_log_in() {
        let store = web::Data::new(Store::new());
        store.seed_demo_data(hash_password("admin").unwrap()).unwrap();
        let app = test::init_service(ts::app(store)).await;

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/login")
                .set_json(json!({"email": "admin@admin.com", "password": "admin"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
