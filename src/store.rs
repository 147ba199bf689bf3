use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::{
    error::AppError,
    model::{
        Record,
        activity::{Activity, ActivityStatus},
        attendance::{AttendanceRecord, AttendanceStatus},
        employee::{Employee, EmployeeStatus},
        ledger::{LedgerEntry, LedgerKind},
        profile::Profile,
        user::User,
        workplace::Workplace,
    },
    reports::Dataset,
    utils::email_filter::normalize,
};

const ACTIVITY_CAPACITY: usize = 50;

/// A live refresh token. Rotated and revoked tokens are removed, so a
/// missing entry means the token can no longer be used.
struct RefreshTokenRecord {
    user_id: u64,
    /// Unix seconds, copied from the token's `exp` claim
    exp: usize,
}

/// Attendance row as submitted, before it has an id.
#[derive(Debug, Clone)]
pub struct AttendanceDraft {
    pub employee_id: u64,
    pub workplace_id: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub wage: f64,
    pub overtime_wage: Option<f64>,
}

#[derive(Default)]
struct Tables {
    next_id: u64,
    users: Vec<User>,
    employees: Vec<Employee>,
    workplaces: Vec<Workplace>,
    attendance: Vec<AttendanceRecord>,
    deductions: Vec<LedgerEntry>,
    loans: Vec<LedgerEntry>,
    profile: Profile,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    activity: VecDeque<Activity>,
}

impl Tables {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn ledger(&self, kind: LedgerKind) -> &Vec<LedgerEntry> {
        match kind {
            LedgerKind::Loan => &self.loans,
            LedgerKind::Deduction => &self.deductions,
        }
    }

    fn ledger_mut(&mut self, kind: LedgerKind) -> &mut Vec<LedgerEntry> {
        match kind {
            LedgerKind::Loan => &mut self.loans,
            LedgerKind::Deduction => &mut self.deductions,
        }
    }

    /// Drops expired refresh tokens, then registers `jti`.
    fn register_refresh_token(&mut self, jti: &str, user_id: u64, exp: usize) {
        let now = Utc::now().timestamp().max(0) as usize;
        self.refresh_tokens.retain(|_, record| record.exp > now);
        self.refresh_tokens
            .insert(jti.to_string(), RefreshTokenRecord { user_id, exp });
    }

    fn dataset(&self) -> Dataset<'_> {
        Dataset {
            employees: &self.employees,
            workplaces: &self.workplaces,
            attendance: &self.attendance,
            loans: &self.loans,
            deductions: &self.deductions,
        }
    }
}

fn find<T: Record + Clone>(rows: &[T], id: u64) -> Option<T> {
    rows.iter().find(|r| r.id() == id).cloned()
}

fn replace<T: Record + Clone>(rows: &mut [T], id: u64, make: impl FnOnce(u64) -> T) -> Option<T> {
    let slot = rows.iter_mut().find(|r| r.id() == id)?;
    *slot = make(id);
    Some(slot.clone())
}

fn remove<T: Record>(rows: &mut Vec<T>, id: u64) -> Option<T> {
    let index = rows.iter().position(|r| r.id() == id)?;
    Some(rows.remove(index))
}

/// In-memory tables shared by every worker. Nothing is persisted.
#[derive(Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("store lock poisoned".into()))
    }

    /// Runs a read-only computation over a consistent view of the data.
    pub fn with_dataset<R>(&self, f: impl FnOnce(&Dataset<'_>) -> R) -> Result<R, AppError> {
        let tables = self.read()?;
        Ok(f(&tables.dataset()))
    }

    // ---------- users ----------

    pub fn find_user(&self, id: u64) -> Result<Option<User>, AppError> {
        Ok(find(&self.read()?.users, id))
    }

    /// Emails match after the same normalization the email index uses.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let wanted = normalize(email);
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| normalize(&u.email) == wanted)
            .cloned())
    }

    pub fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find_user_by_email(email)?.is_some())
    }

    /// Inserts a user unless the email is already registered.
    pub fn insert_user(&self, name: &str, email: &str, password_hash: String) -> Result<User, AppError> {
        let wanted = normalize(email);
        let mut tables = self.write()?;
        if tables.users.iter().any(|u| normalize(&u.email) == wanted) {
            return Err(AppError::bad_request("Email already exists"));
        }

        let user = User {
            id: tables.allocate_id(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    pub fn user_emails(&self) -> Result<Vec<String>, AppError> {
        Ok(self.read()?.users.iter().map(|u| u.email.clone()).collect())
    }

    // ---------- refresh tokens ----------

    pub fn store_refresh_token(&self, jti: &str, user_id: u64, exp: usize) -> Result<(), AppError> {
        self.write()?.register_refresh_token(jti, user_id, exp);
        Ok(())
    }

    /// Replaces `old_jti` with `new_jti` in one step. Returns false when the
    /// old token is unknown, already used or belongs to someone else.
    pub fn rotate_refresh_token(
        &self,
        old_jti: &str,
        new_jti: &str,
        user_id: u64,
        exp: usize,
    ) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        match tables.refresh_tokens.get(old_jti) {
            Some(record) if record.user_id == user_id => {}
            _ => return Ok(false),
        }

        tables.refresh_tokens.remove(old_jti);
        tables.register_refresh_token(new_jti, user_id, exp);
        Ok(true)
    }

    /// Idempotent.
    pub fn revoke_refresh_token(&self, jti: &str) -> Result<(), AppError> {
        self.write()?.refresh_tokens.remove(jti);
        Ok(())
    }

    // ---------- employees ----------

    pub fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        Ok(self.read()?.employees.clone())
    }

    pub fn get_employee(&self, id: u64) -> Result<Option<Employee>, AppError> {
        Ok(find(&self.read()?.employees, id))
    }

    pub fn insert_employee(&self, make: impl FnOnce(u64) -> Employee) -> Result<Employee, AppError> {
        let mut tables = self.write()?;
        let employee = make(tables.allocate_id());
        tables.employees.push(employee.clone());
        Ok(employee)
    }

    pub fn replace_employee(&self, id: u64, make: impl FnOnce(u64) -> Employee) -> Result<Option<Employee>, AppError> {
        Ok(replace(&mut self.write()?.employees, id, make))
    }

    pub fn delete_employee(&self, id: u64) -> Result<Option<Employee>, AppError> {
        Ok(remove(&mut self.write()?.employees, id))
    }

    // ---------- workplaces ----------

    pub fn list_workplaces(&self) -> Result<Vec<Workplace>, AppError> {
        Ok(self.read()?.workplaces.clone())
    }

    pub fn get_workplace(&self, id: u64) -> Result<Option<Workplace>, AppError> {
        Ok(find(&self.read()?.workplaces, id))
    }

    pub fn insert_workplace(&self, make: impl FnOnce(u64) -> Workplace) -> Result<Workplace, AppError> {
        let mut tables = self.write()?;
        let workplace = make(tables.allocate_id());
        tables.workplaces.push(workplace.clone());
        Ok(workplace)
    }

    pub fn replace_workplace(&self, id: u64, make: impl FnOnce(u64) -> Workplace) -> Result<Option<Workplace>, AppError> {
        Ok(replace(&mut self.write()?.workplaces, id, make))
    }

    pub fn delete_workplace(&self, id: u64) -> Result<Option<Workplace>, AppError> {
        Ok(remove(&mut self.write()?.workplaces, id))
    }

    // ---------- loans / deductions ----------

    pub fn list_ledger(&self, kind: LedgerKind) -> Result<Vec<LedgerEntry>, AppError> {
        Ok(self.read()?.ledger(kind).clone())
    }

    pub fn get_ledger_entry(&self, kind: LedgerKind, id: u64) -> Result<Option<LedgerEntry>, AppError> {
        Ok(find(self.read()?.ledger(kind), id))
    }

    pub fn insert_ledger_entry(
        &self,
        kind: LedgerKind,
        make: impl FnOnce(u64) -> LedgerEntry,
    ) -> Result<LedgerEntry, AppError> {
        let mut tables = self.write()?;
        let entry = make(tables.allocate_id());
        tables.ledger_mut(kind).push(entry.clone());
        Ok(entry)
    }

    pub fn replace_ledger_entry(
        &self,
        kind: LedgerKind,
        id: u64,
        make: impl FnOnce(u64) -> LedgerEntry,
    ) -> Result<Option<LedgerEntry>, AppError> {
        Ok(replace(self.write()?.ledger_mut(kind), id, make))
    }

    pub fn delete_ledger_entry(&self, kind: LedgerKind, id: u64) -> Result<Option<LedgerEntry>, AppError> {
        Ok(remove(self.write()?.ledger_mut(kind), id))
    }

    // ---------- attendance ----------

    pub fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self
            .read()?
            .attendance
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    /// Inserts or merges each draft keyed by (employee, workplace, date),
    /// all under one write lock. Returns the stored rows in input order.
    pub fn upsert_attendance(&self, drafts: Vec<AttendanceDraft>) -> Result<Vec<AttendanceRecord>, AppError> {
        let mut tables = self.write()?;
        let mut saved = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let key = (draft.employee_id, draft.date, draft.workplace_id);
            let existing = tables.attendance.iter().position(|r| r.key() == key);

            let record = match existing {
                Some(index) => {
                    let row = &mut tables.attendance[index];
                    row.status = draft.status;
                    row.wage = draft.wage;
                    if let Some(overtime) = draft.overtime_wage {
                        row.overtime_wage = overtime;
                    }
                    row.clone()
                }
                None => {
                    let record = AttendanceRecord {
                        id: tables.allocate_id(),
                        employee_id: draft.employee_id,
                        workplace_id: draft.workplace_id,
                        date: draft.date,
                        status: draft.status,
                        wage: draft.wage,
                        overtime_wage: draft.overtime_wage.unwrap_or(0.0),
                    };
                    tables.attendance.push(record.clone());
                    record
                }
            };
            saved.push(record);
        }

        Ok(saved)
    }

    // ---------- profile ----------

    pub fn profile(&self) -> Result<Profile, AppError> {
        Ok(self.read()?.profile.clone())
    }

    pub fn set_profile(&self, profile: Profile) -> Result<Profile, AppError> {
        self.write()?.profile = profile.clone();
        Ok(profile)
    }

    // ---------- activity feed ----------

    pub fn record_activity(&self, user: &str, action: impl Into<String>, status: ActivityStatus) -> Result<(), AppError> {
        let mut tables = self.write()?;
        let entry = Activity {
            id: tables.allocate_id(),
            user: user.to_string(),
            action: action.into(),
            status,
            time: Utc::now(),
        };
        tables.activity.push_front(entry);
        tables.activity.truncate(ACTIVITY_CAPACITY);
        Ok(())
    }

    /// Newest first.
    pub fn recent_activity(&self, limit: usize) -> Result<Vec<Activity>, AppError> {
        Ok(self.read()?.activity.iter().take(limit).cloned().collect())
    }

    // ---------- demo data ----------

    /// Loads the sample records the front end was built against.
    pub fn seed_demo_data(&self, admin_password_hash: String) -> Result<(), AppError> {
        let mut tables = self.write()?;
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();

        let admin_id = tables.allocate_id();
        tables.users.push(User {
            id: admin_id,
            name: "Admin".into(),
            email: "admin@admin.com".into(),
            password_hash: admin_password_hash,
        });

        let mut employee_ids = Vec::new();
        for (name, email, role, wage) in [
            ("John Doe", "john.doe@company.com", "Developer", 500.0),
            ("Jane Smith", "jane.smith@company.com", "Designer", 450.0),
        ] {
            let id = tables.allocate_id();
            employee_ids.push(id);
            tables.employees.push(Employee {
                id,
                name: name.into(),
                email: email.into(),
                role: role.into(),
                department: None,
                wage,
                status: EmployeeStatus::Active,
            });
        }

        let mut workplace_ids = Vec::new();
        for name in ["Head Office", "Branch Office"] {
            let id = tables.allocate_id();
            workplace_ids.push(id);
            tables.workplaces.push(Workplace {
                id,
                name: name.into(),
                location: String::new(),
            });
        }

        for kind in [LedgerKind::Deduction, LedgerKind::Loan] {
            for (employee_id, amount, remark, day) in [
                (employee_ids[0], 200.5, "Late arrival", date(2025, 8, 1)),
                (employee_ids[1], 100.0, "Missed deadline", date(2025, 8, 5)),
            ] {
                let id = tables.allocate_id();
                tables.ledger_mut(kind).push(LedgerEntry {
                    id,
                    employee_id,
                    amount,
                    remark: remark.into(),
                    date: day,
                });
            }
        }

        for (employee_id, workplace_id, status, wage) in [
            (employee_ids[0], workplace_ids[0], AttendanceStatus::Present, 500.0),
            (employee_ids[1], workplace_ids[1], AttendanceStatus::Absent, 0.0),
        ] {
            let id = tables.allocate_id();
            tables.attendance.push(AttendanceRecord {
                id,
                employee_id,
                workplace_id,
                date: date(2025, 8, 10),
                status,
                wage,
                overtime_wage: 0.0,
            });
        }

        tables.profile = Profile {
            name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: "1234567890".into(),
        };

        info!(
            users = tables.users.len(),
            employees = tables.employees.len(),
            workplaces = tables.workplaces.len(),
            "Demo data seeded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(employee_id: u64, workplace_id: u64, day: u32, wage: f64) -> AttendanceDraft {
        AttendanceDraft {
            employee_id,
            workplace_id,
            date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
            status: AttendanceStatus::Present,
            wage,
            overtime_wage: None,
        }
    }

    #[test]
    fn ids_are_unique_across_tables() {
        let store = Store::new();
        let wp = store
            .insert_workplace(|id| Workplace {
                id,
                name: "Yard".into(),
                location: String::new(),
            })
            .unwrap();
        let loan = store
            .insert_ledger_entry(LedgerKind::Loan, |id| LedgerEntry {
                id,
                employee_id: 1,
                amount: 10.0,
                remark: String::new(),
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            })
            .unwrap();

        assert_ne!(wp.id, loan.id);
        assert!(store.list_ledger(LedgerKind::Deduction).unwrap().is_empty());
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let store = Store::new();
        store.insert_user("A", "a@x.com", "hash".into()).unwrap();

        let err = store.insert_user("B", "A@X.com", "hash".into()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(store.email_taken("A@x.COM").unwrap());

        store.insert_user("Änn", "ÄNN@x.com", "hash".into()).unwrap();
        assert!(store.email_taken("änn@x.com").unwrap());
        assert_eq!(store.find_user_by_email("änn@x.com").unwrap().unwrap().name, "Änn");
    }

    #[test]
    fn upsert_merges_on_employee_workplace_date() {
        let store = Store::new();
        let first = store.upsert_attendance(vec![draft(1, 1, 10, 100.0)]).unwrap();

        let mut update = draft(1, 1, 10, 120.0);
        update.overtime_wage = Some(30.0);
        let second = store
            .upsert_attendance(vec![update, draft(1, 2, 10, 80.0)])
            .unwrap();

        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].wage, 120.0);
        assert_eq!(second[0].overtime_wage, 30.0);
        assert_ne!(second[1].id, first[0].id);

        let day = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        assert_eq!(store.attendance_on(day).unwrap().len(), 2);
    }

    #[test]
    fn upsert_keeps_overtime_when_not_resubmitted() {
        let store = Store::new();
        let mut original = draft(1, 1, 10, 100.0);
        original.overtime_wage = Some(25.0);
        store.upsert_attendance(vec![original]).unwrap();

        let saved = store.upsert_attendance(vec![draft(1, 1, 10, 90.0)]).unwrap();
        assert_eq!(saved[0].overtime_wage, 25.0);
    }

    fn in_an_hour() -> usize {
        (Utc::now().timestamp() + 3600) as usize
    }

    fn live_refresh_tokens(store: &Store) -> usize {
        store.read().unwrap().refresh_tokens.len()
    }

    #[test]
    fn refresh_tokens_rotate_once() {
        let store = Store::new();
        store.store_refresh_token("old", 7, in_an_hour()).unwrap();

        assert!(store.rotate_refresh_token("old", "new", 7, in_an_hour()).unwrap());
        assert!(!store.rotate_refresh_token("old", "newer", 7, in_an_hour()).unwrap());
        assert!(!store.rotate_refresh_token("new", "other", 8, in_an_hour()).unwrap());

        store.revoke_refresh_token("new").unwrap();
        assert!(!store.rotate_refresh_token("new", "again", 7, in_an_hour()).unwrap());
    }

    #[test]
    fn refresh_registry_only_holds_live_tokens() {
        let store = Store::new();
        store.store_refresh_token("t0", 7, in_an_hour()).unwrap();
        for n in 1..100 {
            let (old, new) = (format!("t{}", n - 1), format!("t{n}"));
            assert!(store.rotate_refresh_token(&old, &new, 7, in_an_hour()).unwrap());
        }
        assert_eq!(live_refresh_tokens(&store), 1);

        store.revoke_refresh_token("t99").unwrap();
        assert_eq!(live_refresh_tokens(&store), 0);

        store.store_refresh_token("stale", 7, 1).unwrap();
        store.store_refresh_token("fresh", 7, in_an_hour()).unwrap();
        assert_eq!(live_refresh_tokens(&store), 1);
        assert!(!store.rotate_refresh_token("stale", "next", 7, in_an_hour()).unwrap());
    }

    #[test]
    fn activity_feed_is_bounded_and_newest_first() {
        let store = Store::new();
        for n in 0..(ACTIVITY_CAPACITY + 5) {
            store
                .record_activity("Admin", format!("change {n}"), ActivityStatus::Info)
                .unwrap();
        }

        let recent = store.recent_activity(100).unwrap();
        assert_eq!(recent.len(), ACTIVITY_CAPACITY);
        assert_eq!(recent[0].action, format!("change {}", ACTIVITY_CAPACITY + 4));
    }

    #[test]
    fn demo_data_matches_sample_records() {
        let store = Store::new();
        store.seed_demo_data("hash".into()).unwrap();

        assert!(store.find_user_by_email("admin@admin.com").unwrap().is_some());
        assert_eq!(store.list_employees().unwrap().len(), 2);
        assert_eq!(store.list_workplaces().unwrap().len(), 2);
        assert_eq!(store.list_ledger(LedgerKind::Loan).unwrap().len(), 2);
        assert_eq!(store.list_ledger(LedgerKind::Deduction).unwrap().len(), 2);
        assert_eq!(store.profile().unwrap().phone, "1234567890");
    }
}
