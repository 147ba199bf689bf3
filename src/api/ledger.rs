//! Handlers shared by loans and deductions. Both keep the same record shape
//! in separate tables; `loan.rs` and `deduction.rs` bind them to routes.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::{non_blank, parse_date},
    auth::auth::AuthUser,
    error::{AppError, MessageResponse},
    model::{
        activity::ActivityStatus,
        ledger::{LedgerEntry, LedgerKind},
    },
    store::Store,
    utils::loose::{opt_f64, opt_id},
};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPayload {
    #[serde(default, deserialize_with = "opt_id")]
    #[schema(example = 1, value_type = u64)]
    pub employee_id: Option<u64>,
    #[serde(default, deserialize_with = "opt_f64")]
    #[schema(example = 200.5, value_type = f64)]
    pub amount: Option<f64>,
    #[schema(example = "Late arrival")]
    pub remark: Option<String>,
    #[schema(example = "2025-08-01")]
    pub date: Option<String>,
}

impl LedgerPayload {
    fn into_entry(self) -> Result<impl FnOnce(u64) -> LedgerEntry, AppError> {
        let (Some(employee_id), Some(amount), Some(date)) = (
            self.employee_id.filter(|id| *id != 0),
            self.amount.filter(|a| *a != 0.0),
            non_blank(&self.date),
        ) else {
            return Err(AppError::bad_request("Missing required fields"));
        };
        let date = parse_date(&date)?;
        let remark = non_blank(&self.remark).unwrap_or_default();

        Ok(move |id| LedgerEntry {
            id,
            employee_id,
            amount,
            remark,
            date,
        })
    }
}

fn not_found(kind: LedgerKind) -> AppError {
    AppError::not_found(format!("{kind} not found"))
}

fn saved(kind: LedgerKind, verb: &str, entry: &LedgerEntry) -> serde_json::Value {
    json!({
        "message": format!("{kind} {verb}"),
        (kind.field()): entry,
    })
}

pub async fn list(kind: LedgerKind, store: &Store) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(store.list_ledger(kind)?))
}

pub async fn get(kind: LedgerKind, store: &Store, id: u64) -> Result<HttpResponse, AppError> {
    let entry = store.get_ledger_entry(kind, id)?.ok_or_else(|| not_found(kind))?;
    Ok(HttpResponse::Ok().json(entry))
}

pub async fn create(
    kind: LedgerKind,
    auth: &AuthUser,
    store: &Store,
    payload: LedgerPayload,
) -> Result<HttpResponse, AppError> {
    let make = payload.into_entry()?;
    let entry = store.insert_ledger_entry(kind, make)?;

    store.record_activity(
        &auth.name,
        format!("Added {} of {:.2} for employee #{}", kind.field(), entry.amount, entry.employee_id),
        ActivityStatus::Success,
    )?;
    info!(%kind, id = entry.id, employee_id = entry.employee_id, "Ledger entry created");

    Ok(HttpResponse::Ok().json(saved(kind, "added", &entry)))
}

pub async fn update(
    kind: LedgerKind,
    auth: &AuthUser,
    store: &Store,
    id: u64,
    payload: LedgerPayload,
) -> Result<HttpResponse, AppError> {
    let make = payload.into_entry()?;
    let entry = store
        .replace_ledger_entry(kind, id, make)?
        .ok_or_else(|| not_found(kind))?;

    store.record_activity(
        &auth.name,
        format!("Updated {} #{}", kind.field(), entry.id),
        ActivityStatus::Info,
    )?;
    info!(%kind, id, "Ledger entry updated");

    let mut body = saved(kind, "updated", &entry);
    // the loans page reads an updated loan back from `deduction`
    if kind == LedgerKind::Loan {
        body[LedgerKind::Deduction.field()] = json!(entry);
    }

    Ok(HttpResponse::Ok().json(body))
}

pub async fn delete(kind: LedgerKind, auth: &AuthUser, store: &Store, id: u64) -> Result<HttpResponse, AppError> {
    store.delete_ledger_entry(kind, id)?.ok_or_else(|| not_found(kind))?;

    store.record_activity(&auth.name, format!("Removed {} #{id}", kind.field()), ActivityStatus::Warning)?;
    info!(%kind, id, "Ledger entry deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("{kind} deleted"))))
}
