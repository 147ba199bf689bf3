use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::today,
    error::AppError,
    reports::{EmployeeMonthSummary, MonthPeriod, employee_month_summary, salary_summary as summarize_salaries},
    store::Store,
    utils::loose::opt_id,
};

/// Month and year default to the current ones.
fn month_period(month: Option<u64>, year: Option<u64>) -> Result<MonthPeriod, AppError> {
    let current = MonthPeriod::of(today());
    let month = month.map_or(Ok(current.month), u32::try_from);
    let year = year.map_or(Ok(current.year), i32::try_from);

    match (month, year) {
        (Ok(month), Ok(year)) => MonthPeriod::new(year, month),
        _ => None,
    }
    .ok_or_else(|| AppError::bad_request("Invalid month or year"))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceSummaryQuery {
    /// Omit for every employee
    #[serde(default, deserialize_with = "opt_id")]
    #[param(value_type = Option<u64>)]
    pub employee_id: Option<u64>,
    /// 1-12
    #[serde(default, deserialize_with = "opt_id")]
    #[param(value_type = Option<u32>)]
    pub month: Option<u64>,
    #[serde(default, deserialize_with = "opt_id")]
    #[param(value_type = Option<i32>)]
    pub year: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SalaryQuery {
    #[serde(default, deserialize_with = "opt_id")]
    #[param(value_type = Option<u32>)]
    pub month: Option<u64>,
    #[serde(default, deserialize_with = "opt_id")]
    #[param(value_type = Option<i32>)]
    pub year: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceSummaryResponse {
    pub data: Vec<EmployeeMonthSummary>,
}

/// Per-employee attendance and pay for one month
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(AttendanceSummaryQuery),
    responses(
        (status = 200, description = "Monthly summary per employee", body = AttendanceSummaryResponse),
        (status = 400, description = "Invalid month or year", body = MessageResponse),
        (status = 404, description = "Employee not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn attendance_summary(
    store: web::Data<Store>,
    query: web::Query<AttendanceSummaryQuery>,
) -> Result<HttpResponse, AppError> {
    let period = month_period(query.month, query.year)?;

    let data = store.with_dataset(|data| match query.employee_id {
        Some(id) => data
            .employees
            .iter()
            .find(|e| e.id == id)
            .map(|employee| vec![employee_month_summary(data, employee, period)])
            .ok_or_else(|| AppError::not_found("Employee not found")),
        None => Ok(data
            .employees
            .iter()
            .map(|employee| employee_month_summary(data, employee, period))
            .collect()),
    })??;

    debug!(?period, employees = data.len(), "Attendance summary computed");
    Ok(HttpResponse::Ok().json(AttendanceSummaryResponse { data }))
}

#[utoipa::path(
    get,
    path = "/api/salary/summary",
    params(SalaryQuery),
    responses(
        (status = 200, description = "Salary per employee for the month", body = [SalaryRow]),
        (status = 400, description = "Invalid month or year", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn salary_summary(
    store: web::Data<Store>,
    query: web::Query<SalaryQuery>,
) -> Result<HttpResponse, AppError> {
    let period = month_period(query.month, query.year)?;
    let rows = store.with_dataset(|data| summarize_salaries(data, period))?;

    Ok(HttpResponse::Ok().json(rows))
}
