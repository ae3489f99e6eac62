use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::config::DeletePolicy;
use crate::constants::*;
use crate::database::Db;
use crate::models::{User, UserPayload};
use crate::utils::{db_error, db_error_with_context, not_found, validate_string_length};

/// Outcome of a delete request under a given [`DeletePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletion {
    Deleted,
    NotFound,
    /// Refused under [`DeletePolicy::Restrict`]; carries the number of owned records.
    HasRecords(i64),
}

pub fn validate_user_name(name: &str) -> Result<(), (StatusCode, String)> {
    validate_string_length(name, "User name", MAX_USER_NAME_LENGTH)
}

pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

pub fn extract_user_from_row(row: libsql::Row) -> anyhow::Result<User> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    Ok(User { id, name })
}

pub async fn fetch_users(db: &Db) -> anyhow::Result<Vec<User>> {
    let conn = db.read().await;
    let mut rows = conn
        .query("SELECT id, name FROM users ORDER BY id", ())
        .await?;

    let mut users = Vec::new();
    while let Some(row) = rows.next().await? {
        users.push(extract_user_from_row(row)?);
    }
    Ok(users)
}

pub async fn fetch_user(db: &Db, user_id: i64) -> anyhow::Result<Option<User>> {
    let conn = db.read().await;
    let mut rows = conn
        .query("SELECT id, name FROM users WHERE id = ?", [user_id])
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(extract_user_from_row(row)?)),
        None => Ok(None),
    }
}

pub async fn insert_user(db: &Db, name: &str) -> anyhow::Result<User> {
    let conn = db.write().await;
    conn.execute("INSERT INTO users (name) VALUES (?)", [name])
        .await?;

    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub async fn rename_user(db: &Db, user_id: i64, name: &str) -> anyhow::Result<Option<User>> {
    let conn = db.write().await;
    let affected = conn
        .execute("UPDATE users SET name = ? WHERE id = ?", (name, user_id))
        .await?;

    if affected == 0 {
        return Ok(None);
    }
    Ok(Some(User {
        id: user_id,
        name: name.to_string(),
    }))
}

pub async fn remove_user(
    db: &Db,
    user_id: i64,
    policy: DeletePolicy,
) -> anyhow::Result<UserDeletion> {
    let conn = db.write().await;

    let mut rows = conn
        .query(
            "SELECT (SELECT COUNT(*) FROM incomes WHERE user_id = ?1) \
                  + (SELECT COUNT(*) FROM expenses WHERE user_id = ?1)",
            [user_id],
        )
        .await?;
    let owned: i64 = match rows.next().await? {
        Some(row) => row.get(0)?,
        None => 0,
    };

    if owned > 0 && policy == DeletePolicy::Restrict {
        // Only report the conflict for users that actually exist.
        let mut existing = conn
            .query("SELECT id FROM users WHERE id = ?", [user_id])
            .await?;
        if existing.next().await?.is_none() {
            return Ok(UserDeletion::NotFound);
        }
        return Ok(UserDeletion::HasRecords(owned));
    }

    let tx = conn.transaction().await?;
    tx.execute("DELETE FROM incomes WHERE user_id = ?", [user_id])
        .await?;
    tx.execute("DELETE FROM expenses WHERE user_id = ?", [user_id])
        .await?;
    let affected = tx
        .execute("DELETE FROM users WHERE id = ?", [user_id])
        .await?;
    tx.commit().await?;

    if affected == 0 {
        Ok(UserDeletion::NotFound)
    } else {
        Ok(UserDeletion::Deleted)
    }
}

pub async fn list_users(
    State(db): State<Db>,
) -> Result<(StatusCode, Json<Vec<User>>), (StatusCode, String)> {
    let users = fetch_users(&db).await.map_err(db_error)?;
    Ok((StatusCode::OK, Json(users)))
}

pub async fn get_user(
    State(db): State<Db>,
    Path(user_id): Path<i64>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    let user = fetch_user(&db, user_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(ERR_USER_NOT_FOUND))?;
    Ok((StatusCode::OK, Json(user)))
}

pub async fn create_user(
    State(db): State<Db>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    validate_user_name(&payload.name)?;

    let user = insert_user(&db, payload.name.trim()).await.map_err(|e| {
        if is_unique_violation(&e) {
            (StatusCode::CONFLICT, ERR_USER_NAME_TAKEN.to_string())
        } else {
            db_error_with_context("user creation failed", e)
        }
    })?;

    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(db): State<Db>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    validate_user_name(&payload.name)?;

    let user = rename_user(&db, user_id, payload.name.trim())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                (StatusCode::CONFLICT, ERR_USER_NAME_TAKEN.to_string())
            } else {
                db_error_with_context("user update failed", e)
            }
        })?
        .ok_or_else(|| not_found(ERR_USER_NOT_FOUND))?;

    Ok((StatusCode::OK, Json(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    match remove_user(&state.db, user_id, state.delete_policy)
        .await
        .map_err(|e| db_error_with_context("user deletion failed", e))?
    {
        UserDeletion::Deleted => {
            tracing::info!(user_id, policy = ?state.delete_policy, "user deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        UserDeletion::NotFound => Err(not_found(ERR_USER_NOT_FOUND)),
        UserDeletion::HasRecords(count) => Err((
            StatusCode::CONFLICT,
            format!(
                "User still owns {} income/expense records; delete them first",
                count
            ),
        )),
    }
}
