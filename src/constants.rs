// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "8000";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DATABASE_FILE: &str = "finances.db";
pub const DEFAULT_LOG_FILTER: &str = "fintracker_server=debug,tower_http=debug";

// Summary engine
pub const MISMATCH_EPSILON: f64 = 0.009;

// Validation limits
pub const MAX_USER_NAME_LENGTH: usize = 50;
pub const MAX_CATEGORY_LENGTH: usize = 100;

// Error messages
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_USER_NOT_FOUND: &str = "User not found";
pub const ERR_INCOME_NOT_FOUND: &str = "Income not found";
pub const ERR_EXPENSE_NOT_FOUND: &str = "Expense not found";
pub const ERR_OWNER_NOT_FOUND: &str = "Owner user does not exist";
pub const ERR_USER_NAME_TAKEN: &str = "User name already exists";
