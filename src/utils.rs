use axum::http::StatusCode;
use libsql::Connection;
use std::fmt::Display;

use crate::constants::*;
use crate::models::{RecordFilter, iso_date};
use crate::summary::Period;

pub fn db_error(err: impl Display) -> (StatusCode, String) {
    tracing::error!(error = %err, "database operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ERR_DATABASE_OPERATION.to_string(),
    )
}

pub fn db_error_with_context(context: &str, err: impl Display) -> (StatusCode, String) {
    tracing::error!(error = %err, "database error: {}", context);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {}", context),
    )
}

pub fn not_found(message: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, message.to_string())
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), (StatusCode, String)> {
    if value.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} cannot be empty", field_name),
        ));
    }
    if value.trim().chars().count() > max_length {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be less than {} characters", field_name, max_length),
        ));
    }
    Ok(())
}

/// Negative amounts (refunds, corrections) are allowed.
pub fn validate_amount(amount: f64) -> Result<(), (StatusCode, String)> {
    if !amount.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Amount must be a finite number".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_month(month: Option<u32>) -> Result<(), (StatusCode, String)> {
    match month {
        Some(m) if !(1..=12).contains(&m) => Err((
            StatusCode::BAD_REQUEST,
            "Month must be between 1 and 12".to_string(),
        )),
        _ => Ok(()),
    }
}

pub async fn user_exists(conn: &Connection, user_id: i64) -> anyhow::Result<bool> {
    let mut rows = conn
        .query("SELECT id FROM users WHERE id = ?", [user_id])
        .await?;
    Ok(rows.next().await?.is_some())
}

pub fn parse_stored_date(text: &str) -> anyhow::Result<time::Date> {
    iso_date::parse(text).map_err(|e| anyhow::anyhow!("invalid stored date '{}': {}", text, e))
}

/// Builds the `WHERE` clause and its parameters for a list filter.
///
/// A month without a year matches that month in every year.
pub fn filter_clause(filter: &RecordFilter) -> (String, Vec<libsql::Value>) {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if let Some(month) = filter.month {
        conditions.push("CAST(strftime('%m', date) AS INTEGER) = ?");
        params.push(libsql::Value::Integer(month as i64));
    }
    if let Some(year) = filter.year {
        conditions.push("CAST(strftime('%Y', date) AS INTEGER) = ?");
        params.push(libsql::Value::Integer(year as i64));
    }
    if let Some(user_id) = filter.user_id {
        conditions.push("user_id = ?");
        params.push(libsql::Value::Integer(user_id));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    (clause, params)
}

/// Builds the `WHERE` clause and its parameters selecting the dates of `period`.
pub fn period_clause(period: Period) -> anyhow::Result<(String, Vec<libsql::Value>)> {
    let mut params = vec![libsql::Value::Text(iso_date::format(period.start())?)];
    let clause = match period.end() {
        Some(end) => {
            params.push(libsql::Value::Text(iso_date::format(end)?));
            " WHERE date >= ? AND date < ?"
        }
        None => " WHERE date >= ?",
    };
    Ok((clause.to_string(), params))
}
