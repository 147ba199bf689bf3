use std::collections::HashSet;
use std::str::FromStr;

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{non_blank, parse_date},
    auth::auth::AuthUser,
    error::AppError,
    model::{
        activity::ActivityStatus,
        attendance::{AttendanceRecord, AttendanceStatus},
    },
    store::{AttendanceDraft, Store},
    utils::loose::{opt_f64, opt_id},
};

/// One row of a bulk attendance save.
#[derive(Deserialize, ToSchema)]
pub struct AttendanceInput {
    #[serde(default, deserialize_with = "opt_id")]
    #[schema(example = 1, value_type = u64)]
    pub employee_id: Option<u64>,
    #[serde(default, deserialize_with = "opt_id")]
    #[schema(example = 1, value_type = u64)]
    pub workplace_id: Option<u64>,
    #[schema(example = "2025-08-10")]
    pub date: Option<String>,
    #[schema(example = "present")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    #[schema(example = 500.0, value_type = f64)]
    pub wage: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    #[schema(example = 0.0, value_type = f64)]
    pub overtime_wage: Option<f64>,
}

impl AttendanceInput {
    fn into_draft(self) -> Result<AttendanceDraft, AppError> {
        let (Some(employee_id), Some(workplace_id), Some(date), Some(status), Some(wage)) = (
            self.employee_id.filter(|id| *id != 0),
            self.workplace_id.filter(|id| *id != 0),
            non_blank(&self.date),
            non_blank(&self.status),
            self.wage,
        ) else {
            return Err(AppError::bad_request("Missing fields in attendance record"));
        };

        let status = AttendanceStatus::from_str(&status.to_lowercase())
            .map_err(|_| AppError::bad_request(format!("Invalid attendance status {status:?}")))?;

        Ok(AttendanceDraft {
            employee_id,
            workplace_id,
            date: parse_date(&date)?,
            status,
            wage,
            overtime_wage: self.overtime_wage,
        })
    }
}

/// Validates a whole bulk payload. Nothing is written unless every row
/// passes.
fn parse_records(body: Value) -> Result<Vec<AttendanceDraft>, AppError> {
    let rows = match body {
        Value::Array(rows) if !rows.is_empty() => rows,
        _ => return Err(AppError::bad_request("Attendance records array required")),
    };

    let mut seen = HashSet::with_capacity(rows.len());
    let mut drafts = Vec::with_capacity(rows.len());

    for row in rows {
        let input: AttendanceInput = serde_json::from_value(row)
            .map_err(|e| AppError::bad_request(format!("Invalid attendance record: {e}")))?;
        let draft = input.into_draft()?;

        if !seen.insert((draft.employee_id, draft.date, draft.workplace_id)) {
            return Err(AppError::bad_request(
                "Duplicate attendance record in input for employee, date, workplace",
            ));
        }
        drafts.push(draft);
    }

    Ok(drafts)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Day to list, `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceSaved {
    #[schema(example = "Attendance saved")]
    pub message: String,
    pub attendance: Vec<AttendanceRecord>,
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance rows for the day", body = [AttendanceRecord]),
        (status = 400, description = "Date query parameter required", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    store: web::Data<Store>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let raw = non_blank(&query.date).ok_or_else(|| AppError::bad_request("Date query parameter required"))?;
    let date = parse_date(&raw)?;

    let records = store.attendance_on(date)?;
    debug!(%date, count = records.len(), "Listed attendance");
    Ok(HttpResponse::Ok().json(records))
}

/// Bulk save. Rows are upserted by employee, workplace and date.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = [AttendanceInput],
    responses(
        (status = 200, description = "Attendance saved", body = AttendanceSaved),
        (status = 400, description = "Empty payload, missing fields or duplicate rows", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn save_attendance(
    auth: AuthUser,
    store: web::Data<Store>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let drafts = parse_records(body.into_inner())?;
    let count = drafts.len();

    let attendance = store.upsert_attendance(drafts)?;

    store.record_activity(
        &auth.name,
        format!("Saved {count} attendance record(s)"),
        ActivityStatus::Success,
    )?;
    info!(count, "Attendance saved");

    Ok(HttpResponse::Ok().json(AttendanceSaved {
        message: "Attendance saved".into(),
        attendance,
    }))
}
