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
    path = "/api/loans",
    responses((status = 200, description = "All loans", body = [LedgerEntry])),
    tag = "Loan",
    security(("bearer_auth" = []))
)]
pub async fn list_loans(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    ledger::list(LedgerKind::Loan, &store).await
}

#[utoipa::path(
    get,
    path = "/api/loans/{id}",
    params(("id", Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan found", body = LedgerEntry),
        (status = 404, description = "Loan not found", body = MessageResponse)
    ),
    tag = "Loan",
    security(("bearer_auth" = []))
)]
pub async fn get_loan(store: web::Data<Store>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    ledger::get(LedgerKind::Loan, &store, path.into_inner()).await
}

#[utoipa::path(
    post,
    path = "/api/loans",
    request_body = LedgerPayload,
    responses(
        (status = 200, description = "Loan created", body = Object, example = json!({
            "message": "Loan added",
            "loan": {"id": 9, "employeeId": 1, "amount": 200.5, "remark": "Advance", "date": "2025-08-01"}
        })),
        (status = 400, description = "Missing required fields", body = MessageResponse)
    ),
    tag = "Loan",
    security(("bearer_auth" = []))
)]
pub async fn create_loan(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<LedgerPayload>,
) -> Result<HttpResponse, AppError> {
    ledger::create(LedgerKind::Loan, &auth, &store, payload.into_inner()).await
}

#[utoipa::path(
    put,
    path = "/api/loans/{id}",
    params(("id", Path, description = "Loan ID")),
    request_body = LedgerPayload,
    responses(
        (status = 200, description = "Loan updated", body = Object, example = json!({
            "message": "Loan updated",
            "loan": {"id": 9, "employeeId": 1, "amount": 150.0, "remark": "Advance", "date": "2025-08-01"},
            "deduction": {"id": 9, "employeeId": 1, "amount": 150.0, "remark": "Advance", "date": "2025-08-01"}
        })),
        (status = 400, description = "Missing required fields", body = MessageResponse),
        (status = 404, description = "Loan not found", body = MessageResponse)
    ),
    tag = "Loan",
    security(("bearer_auth" = []))
)]
pub async fn update_loan(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<LedgerPayload>,
) -> Result<HttpResponse, AppError> {
    ledger::update(LedgerKind::Loan, &auth, &store, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/loans/{id}",
    params(("id", Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan deleted", body = MessageResponse),
        (status = 404, description = "Loan not found", body = MessageResponse)
    ),
    tag = "Loan",
    security(("bearer_auth" = []))
)]
pub async fn delete_loan(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    ledger::delete(LedgerKind::Loan, &auth, &store, path.into_inner()).await
}
