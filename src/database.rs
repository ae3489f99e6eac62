use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

use crate::constants::DATABASE_FILE;
use crate::models::{Expense, Income, User};
use crate::summary::{FinanceSource, Period};
use crate::{expenses, incomes, users};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT    UNIQUE NOT NULL
);
"#;

const CREATE_INCOMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS incomes (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    amount   REAL    NOT NULL,
    date     TEXT    NOT NULL,
    user_id  INTEGER NOT NULL REFERENCES users(id)
);
"#;

const CREATE_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    amount     REAL    NOT NULL,
    category   TEXT    NOT NULL,
    date       TEXT    NOT NULL,
    is_common  INTEGER NOT NULL DEFAULT 0,
    user_id    INTEGER NOT NULL REFERENCES users(id)
);
"#;

const CREATE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_incomes_date ON incomes(date);
CREATE INDEX IF NOT EXISTS idx_incomes_user ON incomes(user_id);
CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
CREATE INDEX IF NOT EXISTS idx_expenses_user ON expenses(user_id);
"#;

pub type Db = Arc<RwLock<Connection>>;

/// Household finances DB (finances.db)
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE);
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    conn.execute("PRAGMA foreign_keys = ON", ()).await?;
    conn.execute(CREATE_USERS_TABLE, ()).await?;
    conn.execute(CREATE_INCOMES_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_TABLE, ()).await?;
    conn.execute_batch(CREATE_INDEXES).await?;

    Ok(Arc::new(RwLock::new(conn)))
}

impl FinanceSource for Db {
    async fn list_users(&self) -> Result<Vec<User>> {
        users::fetch_users(self).await
    }

    async fn list_incomes(&self, period: Period) -> Result<Vec<Income>> {
        incomes::fetch_incomes_in_period(self, period).await
    }

    async fn list_expenses(&self, period: Period) -> Result<Vec<Expense>> {
        expenses::fetch_expenses_in_period(self, period).await
    }
}
