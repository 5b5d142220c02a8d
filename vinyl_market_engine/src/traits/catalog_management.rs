use thiserror::Error;

use crate::db_types::{NewUser, NewVinyl, User, Vinyl};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Vinyl with ID {0} not found")]
    VinylNotFound(i64),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// Read access to the vinyl catalog, plus the inserts needed to seed it.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_vinyl(&self, vinyl_id: i64) -> Result<Option<Vinyl>, CatalogError>;

    async fn insert_vinyl(&self, vinyl: NewVinyl) -> Result<Vinyl, CatalogError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, CatalogError>;

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, CatalogError>;
}
