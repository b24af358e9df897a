/// Persistence layer
///
/// Each resource has a storage trait and a Postgres implementation. The
/// repositories translate driver errors into domain errors: SQLSTATE 23505
/// becomes `AlreadyExists`, a missing row becomes `NotFound`, and anything
/// else is wrapped with its SQLSTATE for the logs.

mod category;
mod product;
mod user;

pub use category::{CategoryStorage, PgCategoryRepository};
pub use product::{PgProductRepository, ProductStorage};
pub use user::{PgUserRepository, UserStorage};

use crate::error::{sqlstate, AppError, Resource};

/// SQLSTATE of a unique constraint violation
pub const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn map_db_error(err: sqlx::Error, resource: Resource) -> AppError {
    if let sqlx::Error::RowNotFound = err {
        return AppError::NotFound;
    }
    if sqlstate(&err).as_deref() == Some(UNIQUE_VIOLATION) {
        return AppError::AlreadyExists(resource);
    }
    AppError::storage(err)
}
