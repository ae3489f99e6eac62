use serde::{Deserialize, Serialize};
use time::Date;

/// ISO `YYYY-MM-DD` dates, both on the wire and in the database.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;
    use time::macros::format_description;

    pub fn format(date: Date) -> Result<String, time::error::Format> {
        date.format(format_description!("[year]-[month]-[day]"))
    }

    pub fn parse(text: &str) -> Result<Date, time::error::Parse> {
        Date::parse(text, format_description!("[year]-[month]-[day]"))
    }

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = format(*date).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(into = "IncomeResponse")]
pub struct Income {
    pub id: i64,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub user_id: i64,
}

/// Serialized form of [`Income`]; `owner_id` repeats `user_id` for older clients.
#[derive(Serialize)]
struct IncomeResponse {
    id: i64,
    amount: f64,
    #[serde(with = "iso_date")]
    date: Date,
    user_id: i64,
    owner_id: i64,
}

impl From<Income> for IncomeResponse {
    fn from(income: Income) -> Self {
        IncomeResponse {
            id: income.id,
            amount: income.amount,
            date: income.date,
            user_id: income.user_id,
            owner_id: income.user_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(into = "ExpenseResponse")]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub is_common: bool,
    pub user_id: i64,
}

/// Serialized form of [`Expense`]; `owner_id` repeats `user_id` for older clients.
#[derive(Serialize)]
struct ExpenseResponse {
    id: i64,
    amount: f64,
    category: String,
    #[serde(with = "iso_date")]
    date: Date,
    is_common: bool,
    user_id: i64,
    owner_id: i64,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        ExpenseResponse {
            id: expense.id,
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            is_common: expense.is_common,
            user_id: expense.user_id,
            owner_id: expense.user_id,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct UserPayload {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateIncomePayload {
    pub amount: f64,
    #[serde(alias = "owner_id")]
    pub user_id: i64,
    #[serde(with = "iso_date")]
    pub date: Date,
}

/// Used for both creation and full replacement of an expense.
#[derive(Deserialize, Debug, Clone)]
pub struct ExpensePayload {
    pub amount: f64,
    pub category: String,
    #[serde(alias = "owner_id")]
    pub user_id: i64,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default)]
    pub is_common: bool,
}

/// Filters for the income and expense list endpoints.
///
/// A `month` without a `year` matches that month in every year.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RecordFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub user_id: Option<i64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SummaryQuery {
    pub month: u32,
    pub year: Option<i32>,
}
