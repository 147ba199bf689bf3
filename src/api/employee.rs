use crate::{
    api::non_blank,
    auth::auth::AuthUser,
    error::{AppError, MessageResponse},
    model::{
        activity::ActivityStatus,
        employee::{Employee, EmployeeStatus},
    },
    store::Store,
    utils::loose::opt_f64,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct EmployeePayload {
    #[schema(example = "John Doe")]
    pub name: Option<String>,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "Developer")]
    pub role: Option<String>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
    /// Daily base wage; a number or numeric string
    #[serde(default, deserialize_with = "opt_f64")]
    #[schema(example = 500.0, value_type = f64)]
    pub wage: Option<f64>,
    #[serde(default)]
    pub status: Option<EmployeeStatus>,
}

impl EmployeePayload {
    /// Validates the payload and returns a builder that stamps the id.
    fn into_employee(self) -> Result<impl FnOnce(u64) -> Employee, AppError> {
        let (Some(name), Some(role), Some(wage)) = (non_blank(&self.name), non_blank(&self.role), self.wage)
        else {
            return Err(AppError::bad_request("Name, role and wage are required"));
        };
        let email = non_blank(&self.email).unwrap_or_default();
        let department = non_blank(&self.department);
        let status = self.status.unwrap_or_default();

        Ok(move |id| Employee {
            id,
            name,
            email,
            role,
            department,
            wage,
            status,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Case-insensitive match on name, email or role
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeQuery {
    fn matches(&self, employee: &Employee) -> bool {
        if let Some(status) = self.status {
            if employee.status != status {
                return false;
            }
        }

        if let Some(department) = non_blank(&self.department) {
            let same = employee
                .department
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(&department));
            if !same {
                return false;
            }
        }

        match non_blank(&self.search) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&employee.name, &employee.email, &employee.role]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    #[schema(example = "Employee added")]
    pub message: String,
    pub employee: Employee,
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees matching the filters", body = [Employee])
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    store: web::Data<Store>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, AppError> {
    let employees: Vec<Employee> = store
        .list_employees()?
        .into_iter()
        .filter(|e| query.matches(e))
        .collect();

    debug!(filters = ?query, count = employees.len(), "Listed employees");
    Ok(HttpResponse::Ok().json(employees))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = MessageResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(store: web::Data<Store>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let employee = store
        .get_employee(path.into_inner())?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Missing name, role or wage", body = MessageResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    let make = payload.into_inner().into_employee()?;
    let employee = store.insert_employee(make)?;

    store.record_activity(&auth.name, format!("Added employee {}", employee.name), ActivityStatus::Success)?;
    info!(employee_id = employee.id, "Employee created");

    Ok(HttpResponse::Ok().json(EmployeeResponse {
        message: "Employee added".into(),
        employee,
    }))
}

/// Update Employee (full replacement)
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id", Path, description = "Employee ID")),
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Missing name, role or wage", body = MessageResponse),
        (status = 404, description = "Employee not found", body = MessageResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let make = payload.into_inner().into_employee()?;

    let employee = store
        .replace_employee(employee_id, make)?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    store.record_activity(&auth.name, format!("Updated employee {}", employee.name), ActivityStatus::Info)?;
    info!(employee_id, "Employee updated");

    Ok(HttpResponse::Ok().json(EmployeeResponse {
        message: "Employee updated".into(),
        employee,
    }))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted", body = MessageResponse),
        (status = 404, description = "Employee not found", body = MessageResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();

    let removed = store
        .delete_employee(employee_id)?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    store.record_activity(&auth.name, format!("Removed employee {}", removed.name), ActivityStatus::Warning)?;
    info!(employee_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Employee deleted")))
}
