//! Monthly summary engine.
//!
//! Turns a snapshot of users, incomes and expenses for one month into a
//! [`Report`]: totals, an income-proportional allocation of the common
//! expenses, what each user actually paid towards them, and a reconciliation
//! flag comparing the two common-expense sums.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, Month};

use crate::constants::MISMATCH_EPSILON;
use crate::models::{Expense, Income, User, iso_date};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("Invalid period {month}/{year}: month must be between 1 and 12")]
    InvalidPeriod { month: u32, year: i32 },
    #[error("Failed to load records: {0}")]
    DataAccess(String),
}

/// A calendar month, as the half-open date range `[start, end)`.
///
/// `end` is `None` only for December 9999, whose following month falls
/// outside the supported calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    month: Month,
    year: i32,
    start: Date,
    end: Option<Date>,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, SummaryError> {
        let invalid = || SummaryError::InvalidPeriod { month, year };

        let month_number = u8::try_from(month).map_err(|_| invalid())?;
        let month_value = Month::try_from(month_number).map_err(|_| invalid())?;
        let start = Date::from_calendar_date(year, month_value, 1).map_err(|_| invalid())?;
        let end = match month_value {
            Month::December => Date::from_calendar_date(year + 1, Month::January, 1).ok(),
            next => Some(Date::from_calendar_date(year, next.next(), 1).map_err(|_| invalid())?),
        };

        Ok(Period {
            month: month_value,
            year,
            start,
            end,
        })
    }

    pub fn month(&self) -> u32 {
        u8::from(self.month) as u32
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// First day of the month.
    pub fn start(&self) -> Date {
        self.start
    }

    /// First day of the following month (exclusive bound), if representable.
    pub fn end(&self) -> Option<Date> {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        date >= self.start && self.end.is_none_or(|end| date < end)
    }
}

/// Read access to the records the engine summarizes.
pub trait FinanceSource {
    fn list_users(&self) -> impl Future<Output = anyhow::Result<Vec<User>>> + Send;

    /// Every income dated within `period`, regardless of owner.
    fn list_incomes(
        &self,
        period: Period,
    ) -> impl Future<Output = anyhow::Result<Vec<Income>>> + Send;

    /// Every expense dated within `period`, regardless of owner.
    fn list_expenses(
        &self,
        period: Period,
    ) -> impl Future<Output = anyhow::Result<Vec<Expense>>> + Send;
}

/// The records of one period, as handed to [`summarize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Allocation {
    pub user_id: i64,
    pub name: String,
    pub income: f64,
    pub alloc_quota: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommonPayer {
    pub user_id: i64,
    pub name: String,
    pub amount: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(into = "CommonExpenseResponse")]
pub struct CommonExpenseEntry {
    pub id: i64,
    pub amount: f64,
    pub user_id: i64,
    pub category: String,
    #[serde(with = "iso_date")]
    pub date: Date,
}

#[derive(Serialize)]
struct CommonExpenseResponse {
    id: i64,
    amount: f64,
    user_id: i64,
    owner_id: i64,
    category: String,
    #[serde(with = "iso_date")]
    date: Date,
}

impl From<CommonExpenseEntry> for CommonExpenseResponse {
    fn from(entry: CommonExpenseEntry) -> Self {
        CommonExpenseResponse {
            id: entry.id,
            amount: entry.amount,
            user_id: entry.user_id,
            owner_id: entry.user_id,
            category: entry.category,
            date: entry.date,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MismatchDiagnostic {
    pub total_common_expenses: f64,
    pub sum_common_payers: f64,
    pub mismatch: bool,
}

impl MismatchDiagnostic {
    pub fn new(total_common_expenses: f64, sum_common_payers: f64) -> Self {
        MismatchDiagnostic {
            total_common_expenses,
            sum_common_payers,
            mismatch: (sum_common_payers - total_common_expenses).abs() > MISMATCH_EPSILON,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub month: u32,
    pub year: i32,
    pub total_expenses: f64,
    pub total_common_expenses: f64,
    pub total_income: f64,
    pub allocations: Vec<Allocation>,
    pub common_payers: Vec<CommonPayer>,
    pub common_expenses_debug: Vec<CommonExpenseEntry>,
    pub debug_mismatch: MismatchDiagnostic,
}

/// Validates the period and computes its report from `snapshot`.
pub fn summarize(month: u32, year: i32, snapshot: &Snapshot) -> Result<Report, SummaryError> {
    let period = Period::new(month, year)?;
    Ok(build_report(period, snapshot))
}

/// Computes the report of `period`. The snapshot is taken as already
/// restricted to the period.
pub fn build_report(period: Period, snapshot: &Snapshot) -> Report {
    let total_expenses: f64 = snapshot.expenses.iter().map(|e| e.amount).sum();

    let common: Vec<&Expense> = snapshot.expenses.iter().filter(|e| e.is_common).collect();
    let total_common: f64 = common.iter().map(|e| e.amount).sum();

    let mut income_by_user: HashMap<i64, f64> = HashMap::new();
    for income in &snapshot.incomes {
        *income_by_user.entry(income.user_id).or_default() += income.amount;
    }

    let mut paid_by_user: HashMap<i64, f64> = HashMap::new();
    for expense in &common {
        *paid_by_user.entry(expense.user_id).or_default() += expense.amount;
    }

    let user_incomes: Vec<(&User, f64)> = snapshot
        .users
        .iter()
        .map(|user| (user, income_by_user.get(&user.id).copied().unwrap_or(0.0)))
        .collect();
    let total_income: f64 = user_incomes.iter().map(|(_, income)| income).sum();
    let user_count = user_incomes.len();

    let allocations = user_incomes
        .iter()
        .map(|(user, income)| {
            let share = if total_income > 0.0 {
                income / total_income
            } else if user_count > 0 {
                1.0 / user_count as f64
            } else {
                0.0
            };
            Allocation {
                user_id: user.id,
                name: user.name.clone(),
                income: *income,
                alloc_quota: share * total_common,
            }
        })
        .collect();

    let common_payers: Vec<CommonPayer> = snapshot
        .users
        .iter()
        .map(|user| CommonPayer {
            user_id: user.id,
            name: user.name.clone(),
            amount: paid_by_user.get(&user.id).copied().unwrap_or(0.0),
        })
        .collect();
    let sum_common_payers: f64 = common_payers.iter().map(|p| p.amount).sum();

    let common_expenses_debug = common
        .iter()
        .map(|e| CommonExpenseEntry {
            id: e.id,
            amount: e.amount,
            user_id: e.user_id,
            category: e.category.clone(),
            date: e.date,
        })
        .collect();

    Report {
        month: period.month(),
        year: period.year(),
        total_expenses,
        total_common_expenses: total_common,
        total_income,
        allocations,
        common_payers,
        common_expenses_debug,
        debug_mismatch: MismatchDiagnostic::new(total_common, sum_common_payers),
    }
}

/// Loads the period's records from `source` and summarizes them.
///
/// The three reads run concurrently; each one only has to be complete on its
/// own.
pub async fn monthly_summary<S>(source: &S, month: u32, year: i32) -> Result<Report, SummaryError>
where
    S: FinanceSource + Sync,
{
    let period = Period::new(month, year)?;

    let (users, incomes, expenses) = tokio::try_join!(
        source.list_users(),
        source.list_incomes(period),
        source.list_expenses(period),
    )
    .map_err(|e| SummaryError::DataAccess(format!("{e:#}")))?;

    let snapshot = Snapshot {
        users,
        incomes,
        expenses,
    };
    let report = build_report(period, &snapshot);

    if report.debug_mismatch.mismatch {
        tracing::warn!(
            month = report.month,
            year = report.year,
            total_common = report.debug_mismatch.total_common_expenses,
            sum_common_payers = report.debug_mismatch.sum_common_payers,
            "common expenses do not reconcile with payer totals"
        );
    }

    Ok(report)
}
