//! Payroll and attendance aggregation.
//!
//! Everything here is a pure function over a borrowed [`Dataset`]; the HTTP
//! layer only parses query strings and serializes the results. Records that
//! point at a deleted employee or workplace still count and are labelled
//! `"Unknown"`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus},
    employee::Employee,
    ledger::LedgerEntry,
    workplace::Workplace,
};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const UNKNOWN: &str = "Unknown";

/// Read-only view over the store tables.
pub struct Dataset<'a> {
    pub employees: &'a [Employee],
    pub workplaces: &'a [Workplace],
    pub attendance: &'a [AttendanceRecord],
    pub loans: &'a [LedgerEntry],
    pub deductions: &'a [LedgerEntry],
}

impl Dataset<'_> {
    fn employee_name(&self, id: u64) -> String {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn workplace_name(&self, id: u64) -> String {
        self.workplaces
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Distinct employees present (any present row) and absent (only absent
/// rows) on one day.
fn day_counts(attendance: &[AttendanceRecord], date: NaiveDate) -> (u32, u32) {
    let mut present = BTreeSet::new();
    let mut seen = BTreeSet::new();
    for record in attendance.iter().filter(|r| r.date == date) {
        seen.insert(record.employee_id);
        if record.is_present() {
            present.insert(record.employee_id);
        }
    }
    let present_count = present.len() as u32;
    (present_count, seen.len() as u32 - present_count)
}

// ---------- per-employee month ----------

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
    #[schema(value_type = String, example = "2025-08-10")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub workplace: String,
    pub wage: f64,
    pub overtime_wage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeMonthSummary {
    pub employee: EmployeeRef,
    pub month: u32,
    pub year: i32,
    pub days: Vec<DayEntry>,
    pub total_present: u32,
    pub total_absent: u32,
    pub total_wage: f64,
    pub total_overtime_wage: f64,
    /// Present days per workplace name
    pub workplaces: BTreeMap<String, u32>,
    pub loans: Vec<LedgerEntry>,
    pub total_loan_amount: f64,
    pub deductions: Vec<LedgerEntry>,
    pub total_deduction_amount: f64,
    pub final_salary: f64,
}

fn entries_in(entries: &[LedgerEntry], employee_id: u64, period: MonthPeriod) -> Vec<LedgerEntry> {
    let mut selected: Vec<LedgerEntry> = entries
        .iter()
        .filter(|e| e.employee_id == employee_id && period.contains(e.date))
        .cloned()
        .collect();
    selected.sort_by_key(|e| (e.date, e.id));
    selected
}

pub fn employee_month_summary(data: &Dataset<'_>, employee: &Employee, period: MonthPeriod) -> EmployeeMonthSummary {
    let mut rows: Vec<&AttendanceRecord> = data
        .attendance
        .iter()
        .filter(|r| r.employee_id == employee.id && period.contains(r.date))
        .collect();
    rows.sort_by_key(|r| (r.date, r.workplace_id, r.id));

    let mut present_dates = BTreeSet::new();
    let mut absent_dates = BTreeSet::new();
    let mut workplace_days: BTreeMap<String, BTreeSet<NaiveDate>> = BTreeMap::new();
    let mut total_wage = 0.0;
    let mut total_overtime = 0.0;

    let days = rows
        .iter()
        .map(|r| {
            let workplace = data.workplace_name(r.workplace_id);
            if r.is_present() {
                present_dates.insert(r.date);
                total_wage += r.wage;
                total_overtime += r.overtime_wage;
                workplace_days.entry(workplace.clone()).or_default().insert(r.date);
            } else {
                absent_dates.insert(r.date);
            }
            DayEntry {
                date: r.date,
                status: r.status,
                workplace,
                wage: r.wage,
                overtime_wage: r.overtime_wage,
            }
        })
        .collect();

    let total_absent = absent_dates.difference(&present_dates).count() as u32;

    let loans = entries_in(data.loans, employee.id, period);
    let deductions = entries_in(data.deductions, employee.id, period);
    let total_loan_amount: f64 = loans.iter().map(|e| e.amount).sum();
    let total_deduction_amount: f64 = deductions.iter().map(|e| e.amount).sum();

    EmployeeMonthSummary {
        employee: EmployeeRef {
            id: employee.id,
            name: employee.name.clone(),
        },
        month: period.month,
        year: period.year,
        days,
        total_present: present_dates.len() as u32,
        total_absent,
        total_wage: round2(total_wage),
        total_overtime_wage: round2(total_overtime),
        workplaces: workplace_days
            .into_iter()
            .map(|(name, dates)| (name, dates.len() as u32))
            .collect(),
        loans,
        total_loan_amount: round2(total_loan_amount),
        deductions,
        total_deduction_amount: round2(total_deduction_amount),
        final_salary: round2(total_wage + total_overtime - total_loan_amount - total_deduction_amount),
    }
}

// ---------- salary sheet ----------

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRow {
    pub employee_id: u64,
    pub name: String,
    /// Base plus overtime for present days
    pub total_salary: f64,
    pub loan_deductions: f64,
    pub deductions: f64,
    pub final_salary: f64,
}

fn ledger_totals(entries: &[LedgerEntry], period: MonthPeriod) -> HashMap<u64, f64> {
    let mut totals = HashMap::new();
    for entry in entries.iter().filter(|e| period.contains(e.date)) {
        *totals.entry(entry.employee_id).or_insert(0.0) += entry.amount;
    }
    totals
}

/// One row per employee, ordered by id. The final salary may go negative
/// when loans exceed earnings.
pub fn salary_summary(data: &Dataset<'_>, period: MonthPeriod) -> Vec<SalaryRow> {
    let mut earned: HashMap<u64, f64> = HashMap::new();
    for record in data
        .attendance
        .iter()
        .filter(|r| r.is_present() && period.contains(r.date))
    {
        *earned.entry(record.employee_id).or_insert(0.0) += record.wage + record.overtime_wage;
    }
    let loans = ledger_totals(data.loans, period);
    let deductions = ledger_totals(data.deductions, period);

    let mut employees: Vec<&Employee> = data.employees.iter().collect();
    employees.sort_by_key(|e| e.id);

    employees
        .into_iter()
        .map(|e| {
            let total = earned.get(&e.id).copied().unwrap_or(0.0);
            let loan = loans.get(&e.id).copied().unwrap_or(0.0);
            let deduction = deductions.get(&e.id).copied().unwrap_or(0.0);
            SalaryRow {
                employee_id: e.id,
                name: e.name.clone(),
                total_salary: round2(total),
                loan_deductions: round2(loan),
                deductions: round2(deduction),
                final_salary: round2(total - loan - deduction),
            }
        })
        .collect()
}

// ---------- daily ----------

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PresentEmployee {
    pub employee_id: u64,
    pub name: String,
    pub basic_wage: f64,
    pub overtime_wage: f64,
    pub total_daily_wage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AbsentEmployee {
    pub employee_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkplaceDay {
    pub workplace_id: u64,
    pub workplace_name: String,
    #[serde(rename = "presentEmployees")]
    pub present_employees: Vec<PresentEmployee>,
    #[serde(rename = "absentEmployees")]
    pub absent_employees: Vec<AbsentEmployee>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub total_present: u32,
    pub total_absent: u32,
    pub total_salary: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyStats {
    #[schema(value_type = String, example = "2025-08-10")]
    pub date: NaiveDate,
    pub workplaces: Vec<WorkplaceDay>,
    pub totals: DailyTotals,
}

/// Attendance for one day grouped by workplace (ordered by workplace id).
/// Only workplaces with at least one record that day are listed.
pub fn daily_stats(data: &Dataset<'_>, date: NaiveDate) -> DailyStats {
    let mut grouped: BTreeMap<u64, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in data.attendance.iter().filter(|r| r.date == date) {
        grouped.entry(record.workplace_id).or_default().push(record);
    }

    let mut total_salary = 0.0;
    let workplaces = grouped
        .into_iter()
        .map(|(workplace_id, mut rows)| {
            rows.sort_by_key(|r| (r.employee_id, r.id));
            let mut day = WorkplaceDay {
                workplace_id,
                workplace_name: data.workplace_name(workplace_id),
                present_employees: Vec::new(),
                absent_employees: Vec::new(),
            };
            for r in rows {
                let name = data.employee_name(r.employee_id);
                if r.is_present() {
                    let total = r.wage + r.overtime_wage;
                    total_salary += total;
                    day.present_employees.push(PresentEmployee {
                        employee_id: r.employee_id,
                        name,
                        basic_wage: r.wage,
                        overtime_wage: r.overtime_wage,
                        total_daily_wage: round2(total),
                    });
                } else {
                    day.absent_employees.push(AbsentEmployee {
                        employee_id: r.employee_id,
                        name,
                    });
                }
            }
            day
        })
        .collect();

    let (total_present, total_absent) = day_counts(data.attendance, date);
    DailyStats {
        date,
        workplaces,
        totals: DailyTotals {
            total_present,
            total_absent,
            total_salary: round2(total_salary),
        },
    }
}

// ---------- weekly ----------

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayCount {
    #[schema(value_type = String, example = "2025-08-10")]
    pub date: NaiveDate,
    pub present: u32,
    pub absent: u32,
}

/// The seven days ending at `end`, oldest first. Days before the
/// calendar's first date are skipped.
pub fn weekly_stats(data: &Dataset<'_>, end: NaiveDate) -> Vec<DayCount> {
    (0..7)
        .rev()
        .filter_map(|back| end.checked_sub_signed(Duration::days(back)))
        .map(|date| {
            let (present, absent) = day_counts(data.attendance, date);
            DayCount { date, present, absent }
        })
        .collect()
}

// ---------- dashboard ----------

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyWage {
    #[schema(example = "Jan")]
    pub month: String,
    pub wage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodayCounts {
    pub present: u32,
    pub absent: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashStats {
    pub monthly_wages: Vec<MonthlyWage>,
    pub today: TodayCounts,
}

/// Wages paid per month of `year` (all twelve months) and today's head count.
pub fn dash_stats(data: &Dataset<'_>, year: i32, today: NaiveDate) -> DashStats {
    let mut wages = [0.0_f64; 12];
    for record in data
        .attendance
        .iter()
        .filter(|r| r.is_present() && r.date.year() == year)
    {
        wages[record.date.month0() as usize] += record.wage + record.overtime_wage;
    }

    let (present, absent) = day_counts(data.attendance, today);
    DashStats {
        monthly_wages: MONTH_LABELS
            .iter()
            .zip(wages)
            .map(|(month, wage)| MonthlyWage {
                month: month.to_string(),
                wage: round2(wage),
            })
            .collect(),
        today: TodayCounts { present, absent },
    }
}
