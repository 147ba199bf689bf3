use actix_web::{HttpResponse, web};

use crate::{
    api::ledger::{self, LedgerPayload},
    auth::auth::AuthUser,
    error::AppError,
    model::ledger::LedgerKind,
    store::Store,
};

#[utoipa::path(
    get,
    path = "/api/deductions",
    responses((status = 200, description = "All deductions", body = [LedgerEntry])),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn list_deductions(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    ledger::list(LedgerKind::Deduction, &store).await
}

#[utoipa::path(
    get,
    path = "/api/deductions/{id}",
    params(("id", Path, description = "Deduction ID")),
    responses(
        (status = 200, description = "Deduction found", body = LedgerEntry),
        (status = 404, description = "Deduction not found", body = MessageResponse)
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn get_deduction(store: web::Data<Store>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    ledger::get(LedgerKind::Deduction, &store, path.into_inner()).await
}

#[utoipa::path(
    post,
    path = "/api/deductions",
    request_body = LedgerPayload,
    responses(
        (status = 200, description = "Deduction created", body = Object, example = json!({
            "message": "Deduction added",
            "deduction": {"id": 9, "employeeId": 1, "amount": 200.5, "remark": "Late arrival", "date": "2025-08-01"}
        })),
        (status = 400, description = "Missing required fields", body = MessageResponse)
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn create_deduction(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<LedgerPayload>,
) -> Result<HttpResponse, AppError> {
    ledger::create(LedgerKind::Deduction, &auth, &store, payload.into_inner()).await
}

#[utoipa::path(
    put,
    path = "/api/deductions/{id}",
    params(("id", Path, description = "Deduction ID")),
    request_body = LedgerPayload,
    responses(
        (status = 200, description = "Deduction updated", body = Object, example = json!({
            "message": "Deduction updated",
            "deduction": {"id": 9, "employeeId": 1, "amount": 150.0, "remark": "Late arrival", "date": "2025-08-01"}
        })),
        (status = 400, description = "Missing required fields", body = MessageResponse),
        (status = 404, description = "Deduction not found", body = MessageResponse)
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn update_deduction(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<LedgerPayload>,
) -> Result<HttpResponse, AppError> {
    ledger::update(LedgerKind::Deduction, &auth, &store, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/deductions/{id}",
    params(("id", Path, description = "Deduction ID")),
    responses(
        (status = 200, description = "Deduction deleted", body = MessageResponse),
        (status = 404, description = "Deduction not found", body = MessageResponse)
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn delete_deduction(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    ledger::delete(LedgerKind::Deduction, &auth, &store, path.into_inner()).await
}
