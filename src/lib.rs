use axum::{
    Json, Router,
    extract::FromRef,
    http::HeaderValue,
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod constants;
pub mod database;
pub mod expenses;
pub mod incomes;
pub mod models;
pub mod summary;
pub mod users;
pub mod utils;

use config::DeletePolicy;
use database::Db;
use models::Message;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub delete_policy: DeletePolicy,
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

pub fn create_router(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let user_collection = get(users::list_users).post(users::create_user);
    let income_collection = get(incomes::list_incomes).post(incomes::create_income);
    let expense_collection = get(expenses::list_expenses).post(expenses::create_expense);

    // Collections answer with and without the trailing slash
    Router::new()
        .route("/", get(root))
        .route("/users", user_collection.clone())
        .route("/users/", user_collection)
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/incomes", income_collection.clone())
        .route("/incomes/", income_collection)
        .route(
            "/incomes/{income_id}",
            get(incomes::get_income).delete(incomes::delete_income),
        )
        .route("/expenses", expense_collection.clone())
        .route("/expenses/", expense_collection)
        .route("/expenses/summary", get(expenses::get_summary))
        .route(
            "/expenses/{expense_id}",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<Message> {
    Json(Message {
        message: "FinTracker API".to_string(),
    })
}
