use thiserror::Error;

use crate::traits::{CatalogError, OrderManagementError};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Database query error: {0}")]
    QueryError(String),
    #[error("Order number {0} is already in use")]
    DuplicateOrderNumber(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Stored value could not be converted: {0}")]
    Conversion(String),
}

impl SqliteDatabaseError {
    /// Maps unique-constraint violations on the order number to [`SqliteDatabaseError::DuplicateOrderNumber`].
    pub(crate) fn from_insert(e: sqlx::Error, order_number: &str) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::DuplicateOrderNumber(order_number.to_string()),
            _ => Self::DriverError(e),
        }
    }
}

impl From<SqliteDatabaseError> for OrderManagementError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::DuplicateOrderNumber(n) => OrderManagementError::DuplicateOrderNumber(n),
            SqliteDatabaseError::OrderNotFound(id) => OrderManagementError::OrderNotFound(id),
            e => OrderManagementError::DatabaseError(e.to_string()),
        }
    }
}

impl From<SqliteDatabaseError> for CatalogError {
    fn from(e: SqliteDatabaseError) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
