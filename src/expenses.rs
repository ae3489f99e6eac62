use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::constants::*;
use crate::database::Db;
use crate::models::{Expense, ExpensePayload, RecordFilter, SummaryQuery, iso_date};
use crate::summary::{Period, Report, SummaryError, monthly_summary};
use crate::utils::{
    db_error, db_error_with_context, filter_clause, not_found, parse_stored_date, period_clause,
    user_exists, validate_amount, validate_month, validate_string_length,
};

const SELECT_EXPENSES: &str = "SELECT id, amount, category, date, is_common, user_id FROM expenses";

/// Outcome of a write that references an owning user.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseWrite {
    Written(Expense),
    OwnerMissing,
    NotFound,
}

pub fn validate_expense_payload(payload: &ExpensePayload) -> Result<(), (StatusCode, String)> {
    validate_amount(payload.amount)?;
    validate_string_length(&payload.category, "Category", MAX_CATEGORY_LENGTH)
}

pub fn extract_expense_from_row(row: libsql::Row) -> anyhow::Result<Expense> {
    let id: i64 = row.get(0)?;
    let amount: f64 = row.get(1)?;
    let category: String = row.get(2)?;
    let date: String = row.get(3)?;
    let is_common: i64 = row.get(4)?;
    let user_id: i64 = row.get(5)?;

    Ok(Expense {
        id,
        amount,
        category,
        date: parse_stored_date(&date)?,
        is_common: is_common != 0,
        user_id,
    })
}

async fn query_expenses(
    db: &Db,
    sql: &str,
    params: Vec<libsql::Value>,
) -> anyhow::Result<Vec<Expense>> {
    let conn = db.read().await;
    let mut rows = conn.query(sql, libsql::params::Params::Positional(params)).await?;

    let mut expenses = Vec::new();
    while let Some(row) = rows.next().await? {
        expenses.push(extract_expense_from_row(row)?);
    }
    Ok(expenses)
}

pub async fn fetch_expenses(db: &Db, filter: &RecordFilter) -> anyhow::Result<Vec<Expense>> {
    let (clause, params) = filter_clause(filter);
    let sql = format!("{}{} ORDER BY date, id", SELECT_EXPENSES, clause);
    query_expenses(db, &sql, params).await
}

pub async fn fetch_expenses_in_period(db: &Db, period: Period) -> anyhow::Result<Vec<Expense>> {
    let (clause, params) = period_clause(period)?;
    let sql = format!("{}{} ORDER BY date, id", SELECT_EXPENSES, clause);
    query_expenses(db, &sql, params).await
}

pub async fn fetch_expense(db: &Db, expense_id: i64) -> anyhow::Result<Option<Expense>> {
    let sql = format!("{} WHERE id = ?", SELECT_EXPENSES);
    let mut expenses = query_expenses(db, &sql, vec![libsql::Value::Integer(expense_id)]).await?;
    Ok(expenses.pop())
}

pub async fn insert_expense(db: &Db, payload: &ExpensePayload) -> anyhow::Result<ExpenseWrite> {
    let date = iso_date::format(payload.date)?;
    let category = payload.category.trim();

    let conn = db.write().await;
    if !user_exists(&conn, payload.user_id).await? {
        return Ok(ExpenseWrite::OwnerMissing);
    }

    conn.execute(
        "INSERT INTO expenses (amount, category, date, is_common, user_id) VALUES (?, ?, ?, ?, ?)",
        (
            payload.amount,
            category,
            date.as_str(),
            i64::from(payload.is_common),
            payload.user_id,
        ),
    )
    .await?;

    Ok(ExpenseWrite::Written(Expense {
        id: conn.last_insert_rowid(),
        amount: payload.amount,
        category: category.to_string(),
        date: payload.date,
        is_common: payload.is_common,
        user_id: payload.user_id,
    }))
}

pub async fn replace_expense(
    db: &Db,
    expense_id: i64,
    payload: &ExpensePayload,
) -> anyhow::Result<ExpenseWrite> {
    let date = iso_date::format(payload.date)?;
    let category = payload.category.trim();

    let conn = db.write().await;
    if !user_exists(&conn, payload.user_id).await? {
        return Ok(ExpenseWrite::OwnerMissing);
    }

    let affected = conn
        .execute(
            "UPDATE expenses SET amount = ?, category = ?, date = ?, is_common = ?, user_id = ? WHERE id = ?",
            (
                payload.amount,
                category,
                date.as_str(),
                i64::from(payload.is_common),
                payload.user_id,
                expense_id,
            ),
        )
        .await?;

    if affected == 0 {
        return Ok(ExpenseWrite::NotFound);
    }

    Ok(ExpenseWrite::Written(Expense {
        id: expense_id,
        amount: payload.amount,
        category: category.to_string(),
        date: payload.date,
        is_common: payload.is_common,
        user_id: payload.user_id,
    }))
}

pub async fn remove_expense(db: &Db, expense_id: i64) -> anyhow::Result<bool> {
    let conn = db.write().await;
    let affected = conn
        .execute("DELETE FROM expenses WHERE id = ?", [expense_id])
        .await?;
    Ok(affected > 0)
}

fn written_or_error(
    write: ExpenseWrite,
    status: StatusCode,
) -> Result<(StatusCode, Json<Expense>), (StatusCode, String)> {
    match write {
        ExpenseWrite::Written(expense) => Ok((status, Json(expense))),
        ExpenseWrite::OwnerMissing => {
            Err((StatusCode::BAD_REQUEST, ERR_OWNER_NOT_FOUND.to_string()))
        }
        ExpenseWrite::NotFound => Err(not_found(ERR_EXPENSE_NOT_FOUND)),
    }
}

pub async fn list_expenses(
    State(db): State<Db>,
    Query(filter): Query<RecordFilter>,
) -> Result<(StatusCode, Json<Vec<Expense>>), (StatusCode, String)> {
    validate_month(filter.month)?;
    let expenses = fetch_expenses(&db, &filter).await.map_err(db_error)?;
    Ok((StatusCode::OK, Json(expenses)))
}

pub async fn get_expense(
    State(db): State<Db>,
    Path(expense_id): Path<i64>,
) -> Result<(StatusCode, Json<Expense>), (StatusCode, String)> {
    let expense = fetch_expense(&db, expense_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(ERR_EXPENSE_NOT_FOUND))?;
    Ok((StatusCode::OK, Json(expense)))
}

pub async fn create_expense(
    State(db): State<Db>,
    Json(payload): Json<ExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), (StatusCode, String)> {
    validate_expense_payload(&payload)?;

    let write = insert_expense(&db, &payload)
        .await
        .map_err(|e| db_error_with_context("expense creation failed", e))?;
    written_or_error(write, StatusCode::CREATED)
}

pub async fn update_expense(
    State(db): State<Db>,
    Path(expense_id): Path<i64>,
    Json(payload): Json<ExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), (StatusCode, String)> {
    validate_expense_payload(&payload)?;

    let write = replace_expense(&db, expense_id, &payload)
        .await
        .map_err(|e| db_error_with_context("expense update failed", e))?;
    written_or_error(write, StatusCode::OK)
}

pub async fn delete_expense(
    State(db): State<Db>,
    Path(expense_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    if remove_expense(&db, expense_id).await.map_err(db_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(ERR_EXPENSE_NOT_FOUND))
    }
}

/// `GET /expenses/summary?month=&year=`; `year` defaults to the current UTC year.
pub async fn get_summary(
    State(db): State<Db>,
    Query(query): Query<SummaryQuery>,
) -> Result<(StatusCode, Json<Report>), (StatusCode, String)> {
    let year = query
        .year
        .unwrap_or_else(|| time::OffsetDateTime::now_utc().year());

    let report = monthly_summary(&db, query.month, year)
        .await
        .map_err(|e| match e {
            SummaryError::InvalidPeriod { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
            SummaryError::DataAccess(_) => db_error(e),
        })?;

    tracing::debug!(
        month = report.month,
        year = report.year,
        users = report.allocations.len(),
        "monthly summary computed"
    );
    Ok((StatusCode::OK, Json(report)))
}
