use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::non_blank,
    auth::auth::AuthUser,
    error::AppError,
    model::{activity::ActivityStatus, profile::Profile},
    store::Store,
};

#[derive(Deserialize, ToSchema)]
pub struct ProfilePayload {
    #[schema(example = "John Doe")]
    pub name: Option<String>,
    #[schema(example = "john@example.com")]
    pub email: Option<String>,
    #[schema(example = "1234567890")]
    pub phone: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses((status = 200, description = "Account profile", body = Profile)),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(store.profile()?))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfilePayload,
    responses(
        (status = 200, description = "Updated profile", body = Profile),
        (status = 400, description = "Name and email are required", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<ProfilePayload>,
) -> Result<HttpResponse, AppError> {
    let (Some(name), Some(email)) = (non_blank(&payload.name), non_blank(&payload.email)) else {
        return Err(AppError::bad_request("Name and email are required"));
    };

    let profile = store.set_profile(Profile {
        name,
        email,
        phone: non_blank(&payload.phone).unwrap_or_default(),
    })?;

    store.record_activity(&auth.name, "Updated profile", ActivityStatus::Info)?;
    info!(user_id = auth.user_id, by = %auth.email, "Profile updated");

    Ok(HttpResponse::Ok().json(profile))
}
