use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::constants::*;
use crate::database::Db;
use crate::models::{CreateIncomePayload, Income, RecordFilter, iso_date};
use crate::summary::Period;
use crate::utils::{
    db_error, db_error_with_context, filter_clause, not_found, parse_stored_date, period_clause,
    user_exists, validate_amount, validate_month,
};

const SELECT_INCOMES: &str = "SELECT id, amount, date, user_id FROM incomes";

pub fn extract_income_from_row(row: libsql::Row) -> anyhow::Result<Income> {
    let id: i64 = row.get(0)?;
    let amount: f64 = row.get(1)?;
    let date: String = row.get(2)?;
    let user_id: i64 = row.get(3)?;

    Ok(Income {
        id,
        amount,
        date: parse_stored_date(&date)?,
        user_id,
    })
}

async fn query_incomes(
    db: &Db,
    sql: &str,
    params: Vec<libsql::Value>,
) -> anyhow::Result<Vec<Income>> {
    let conn = db.read().await;
    let mut rows = conn.query(sql, libsql::params::Params::Positional(params)).await?;

    let mut incomes = Vec::new();
    while let Some(row) = rows.next().await? {
        incomes.push(extract_income_from_row(row)?);
    }
    Ok(incomes)
}

pub async fn fetch_incomes(db: &Db, filter: &RecordFilter) -> anyhow::Result<Vec<Income>> {
    let (clause, params) = filter_clause(filter);
    let sql = format!("{}{} ORDER BY date, id", SELECT_INCOMES, clause);
    query_incomes(db, &sql, params).await
}

pub async fn fetch_incomes_in_period(db: &Db, period: Period) -> anyhow::Result<Vec<Income>> {
    let (clause, params) = period_clause(period)?;
    let sql = format!("{}{} ORDER BY date, id", SELECT_INCOMES, clause);
    query_incomes(db, &sql, params).await
}

pub async fn fetch_income(db: &Db, income_id: i64) -> anyhow::Result<Option<Income>> {
    let sql = format!("{} WHERE id = ?", SELECT_INCOMES);
    let mut incomes = query_incomes(db, &sql, vec![libsql::Value::Integer(income_id)]).await?;
    Ok(incomes.pop())
}

/// Returns `None` when the owning user does not exist.
pub async fn insert_income(
    db: &Db,
    payload: &CreateIncomePayload,
) -> anyhow::Result<Option<Income>> {
    let date = iso_date::format(payload.date)?;

    // Owner check and insert share one write lock
    let conn = db.write().await;
    if !user_exists(&conn, payload.user_id).await? {
        return Ok(None);
    }

    conn.execute(
        "INSERT INTO incomes (amount, date, user_id) VALUES (?, ?, ?)",
        (payload.amount, date.as_str(), payload.user_id),
    )
    .await?;

    Ok(Some(Income {
        id: conn.last_insert_rowid(),
        amount: payload.amount,
        date: payload.date,
        user_id: payload.user_id,
    }))
}

pub async fn remove_income(db: &Db, income_id: i64) -> anyhow::Result<bool> {
    let conn = db.write().await;
    let affected = conn
        .execute("DELETE FROM incomes WHERE id = ?", [income_id])
        .await?;
    Ok(affected > 0)
}

pub async fn list_incomes(
    State(db): State<Db>,
    Query(filter): Query<RecordFilter>,
) -> Result<(StatusCode, Json<Vec<Income>>), (StatusCode, String)> {
    validate_month(filter.month)?;
    let incomes = fetch_incomes(&db, &filter).await.map_err(db_error)?;
    Ok((StatusCode::OK, Json(incomes)))
}

pub async fn get_income(
    State(db): State<Db>,
    Path(income_id): Path<i64>,
) -> Result<(StatusCode, Json<Income>), (StatusCode, String)> {
    let income = fetch_income(&db, income_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(ERR_INCOME_NOT_FOUND))?;
    Ok((StatusCode::OK, Json(income)))
}

pub async fn create_income(
    State(db): State<Db>,
    Json(payload): Json<CreateIncomePayload>,
) -> Result<(StatusCode, Json<Income>), (StatusCode, String)> {
    validate_amount(payload.amount)?;

    let income = insert_income(&db, &payload)
        .await
        .map_err(|e| db_error_with_context("income creation failed", e))?
        .ok_or_else(|| (StatusCode::BAD_REQUEST, ERR_OWNER_NOT_FOUND.to_string()))?;

    Ok((StatusCode::CREATED, Json(income)))
}

pub async fn delete_income(
    State(db): State<Db>,
    Path(income_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    if remove_income(&db, income_id).await.map_err(db_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(ERR_INCOME_NOT_FOUND))
    }
}
