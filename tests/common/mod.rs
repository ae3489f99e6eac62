#![allow(dead_code)]

use fintracker_server::database::{Db, init_db};
use fintracker_server::expenses::{ExpenseWrite, insert_expense};
use fintracker_server::incomes::insert_income;
use fintracker_server::models::{
    CreateIncomePayload, Expense, ExpensePayload, Income, User,
};
use fintracker_server::users::insert_user;
use tempfile::{TempDir, tempdir};
use time::{Date, Month};

/// Opens a fresh database in its own temporary directory. Keep the returned
/// `TempDir` alive for the duration of the test.
pub async fn setup_test_environment() -> (Db, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();

    let db = init_db(&data_path)
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize database at {}: {}", data_path, e));

    (db, temp_dir)
}

pub fn date(year: i32, month: u8, day: u8) -> Date {
    let month = Month::try_from(month).expect("Invalid month in test date");
    Date::from_calendar_date(year, month, day).expect("Invalid test date")
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
    }
}

pub fn income(id: i64, user_id: i64, amount: f64, date: Date) -> Income {
    Income {
        id,
        amount,
        date,
        user_id,
    }
}

pub fn expense(id: i64, user_id: i64, amount: f64, is_common: bool, date: Date) -> Expense {
    Expense {
        id,
        amount,
        category: if is_common { "rent" } else { "personal" }.to_string(),
        date,
        is_common,
        user_id,
    }
}

pub async fn create_test_user(db: &Db, name: &str) -> User {
    insert_user(db, name)
        .await
        .unwrap_or_else(|e| panic!("Failed to insert test user '{}': {}", name, e))
}

pub async fn create_test_income(db: &Db, user_id: i64, amount: f64, date: Date) -> Income {
    let payload = CreateIncomePayload {
        amount,
        user_id,
        date,
    };
    insert_income(db, &payload)
        .await
        .unwrap_or_else(|e| panic!("Failed to insert test income for user {}: {}", user_id, e))
        .unwrap_or_else(|| panic!("Test income owner {} does not exist", user_id))
}

pub async fn create_test_expense(
    db: &Db,
    user_id: i64,
    amount: f64,
    category: &str,
    is_common: bool,
    date: Date,
) -> Expense {
    let payload = ExpensePayload {
        amount,
        category: category.to_string(),
        user_id,
        date,
        is_common,
    };
    match insert_expense(db, &payload).await {
        Ok(ExpenseWrite::Written(expense)) => expense,
        Ok(other) => panic!("Test expense for user {} not written: {:?}", user_id, other),
        Err(e) => panic!("Failed to insert test expense for user {}: {}", user_id, e),
    }
}
