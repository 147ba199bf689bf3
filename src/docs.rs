use crate::api::{
    attendance::{AttendanceInput, AttendanceSaved},
    employee::{EmployeePayload, EmployeeResponse},
    ledger::LedgerPayload,
    profile::ProfilePayload,
    reports::AttendanceSummaryResponse,
    workplace::{WorkplacePayload, WorkplaceResponse},
};
use crate::error::MessageResponse;
use crate::model::{
    activity::{Activity, ActivityStatus},
    attendance::{AttendanceRecord, AttendanceStatus},
    employee::{Employee, EmployeeStatus},
    ledger::LedgerEntry,
    profile::Profile,
    user::PublicUser,
    workplace::Workplace,
};
use crate::models::{AuthResponse, LoginReqDto, SignupReqDto, TokenPair, ValidateTokenResponse};
use crate::reports::{
    AbsentEmployee, DailyStats, DailyTotals, DashStats, DayCount, DayEntry, EmployeeMonthSummary, EmployeeRef,
    MonthlyWage, PresentEmployee, SalaryRow, TodayCounts, WorkplaceDay,
};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paydesk API",
        version = "1.0.0",
        description = r#"
## Paydesk

Back end for a small-business payroll dashboard.

### 🔹 Key Features
- **Employees** and **Workplaces**
  - Create, update, list, and delete
- **Attendance**
  - Bulk daily entry per workplace, with wage and overtime
- **Loans & Deductions**
  - Per-employee ledger entries netted against pay
- **Reports**
  - Monthly attendance and salary summaries, daily, weekly and yearly dashboards

### 🔐 Security
Every data endpoint requires a **JWT Bearer** access token from `/api/auth/login`.
Use `/api/auth/refresh` with the refresh token once it expires.

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::signup,
        crate::auth::handlers::login,
        crate::auth::handlers::validate_token,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::workplace::list_workplaces,
        crate::api::workplace::get_workplace,
        crate::api::workplace::create_workplace,
        crate::api::workplace::update_workplace,
        crate::api::workplace::delete_workplace,

        crate::api::loan::list_loans,
        crate::api::loan::get_loan,
        crate::api::loan::create_loan,
        crate::api::loan::update_loan,
        crate::api::loan::delete_loan,

        crate::api::deduction::list_deductions,
        crate::api::deduction::get_deduction,
        crate::api::deduction::create_deduction,
        crate::api::deduction::update_deduction,
        crate::api::deduction::delete_deduction,

        crate::api::attendance::list_attendance,
        crate::api::attendance::save_attendance,

        crate::api::reports::attendance_summary,
        crate::api::reports::salary_summary,

        crate::api::stats::daily,
        crate::api::stats::weekly,
        crate::api::stats::dashstats,
        crate::api::stats::recent_activity,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile
    ),
    components(
        schemas(
            MessageResponse,
            SignupReqDto,
            LoginReqDto,
            AuthResponse,
            TokenPair,
            ValidateTokenResponse,
            PublicUser,
            Employee,
            EmployeeStatus,
            EmployeePayload,
            EmployeeResponse,
            Workplace,
            WorkplacePayload,
            WorkplaceResponse,
            LedgerEntry,
            LedgerPayload,
            AttendanceRecord,
            AttendanceStatus,
            AttendanceInput,
            AttendanceSaved,
            AttendanceSummaryResponse,
            EmployeeMonthSummary,
            EmployeeRef,
            DayEntry,
            SalaryRow,
            DailyStats,
            WorkplaceDay,
            PresentEmployee,
            AbsentEmployee,
            DailyTotals,
            DayCount,
            DashStats,
            MonthlyWage,
            TodayCounts,
            Activity,
            ActivityStatus,
            Profile,
            ProfilePayload
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign up, log in and token lifecycle"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Workplace", description = "Workplace management APIs"),
        (name = "Loan", description = "Employee loans"),
        (name = "Deduction", description = "Pay deductions"),
        (name = "Attendance", description = "Daily attendance entry"),
        (name = "Reports", description = "Monthly attendance and salary summaries"),
        (name = "Stats", description = "Dashboard statistics"),
        (name = "Profile", description = "Account profile"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
