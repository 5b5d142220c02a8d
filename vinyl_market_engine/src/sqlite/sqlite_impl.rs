//! `SqliteDatabase` is the SQLite implementation of the market engine backend traits.
//!
//! Each trait method that writes more than one row opens its own transaction and passes `&mut tx` down to the query
//! functions in [`super::db`]. A transaction that goes out of scope without being committed is rolled back, so any `?`
//! between `begin` and `commit` undoes everything written so far.
//!
//! Single-row inserts use `INSERT .. RETURNING` and are committed explicitly too. A `RETURNING` statement run on a bare
//! pooled connection stays open after its row is read, and other connections do not see the row until the connection
//! is used again.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, orders, reviews, system_logs, users, vinyls};
use crate::{
    db_types::{
        LogLevel,
        NewOrder,
        NewReview,
        NewUser,
        NewVinyl,
        OrderWithItems,
        Page,
        Pagination,
        Rating,
        Review,
        SystemLog,
        User,
        Vinyl,
    },
    traits::{
        CatalogError,
        CatalogManagement,
        InsertOrderResult,
        OrderManagement,
        OrderStoreError,
        Requester,
        ReviewError,
        ReviewManagement,
        SystemLogError,
        SystemLogManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `VMS_DATABASE_URL`, or the default location.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Created new SQLite connection pool for {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn create_order(&self, order: NewOrder) -> Result<InsertOrderResult, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(&order, &mut tx).await?;
        match result {
            InsertOrderResult::Inserted(id) => {
                tx.commit().await?;
                debug!("🗃️ {order} saved with id {id}");
            },
            InsertOrderResult::AlreadyExists(id) => {
                // nothing was written
                tx.rollback().await?;
                debug!("🗃️ {order} already exists as order #{id}");
            },
        }
        Ok(result)
    }

    async fn fetch_order_by_session_id(&self, session_id: &str) -> Result<Option<OrderWithItems>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_session_id(session_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_all_orders(&self) -> Result<Vec<OrderWithItems>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_all_orders(&mut conn).await?;
        Ok(orders)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_vinyl(&self, vinyl_id: i64) -> Result<Option<Vinyl>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let vinyl = vinyls::fetch_vinyl(vinyl_id, &mut conn).await?;
        Ok(vinyl)
    }

    async fn insert_vinyl(&self, vinyl: NewVinyl) -> Result<Vinyl, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let vinyl = vinyls::insert_vinyl(vinyl, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Vinyl #{} [{}] added to the catalog", vinyl.id, vinyl.name);
        Ok(vinyl)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let user = users::insert_user(user, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User #{} created", user.id);
        Ok(user)
    }

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(user_id, &mut conn).await?;
        Ok(user)
    }
}

impl ReviewManagement for SqliteDatabase {
    async fn create_review(
        &self,
        user_id: i64,
        vinyl_id: i64,
        review: NewReview,
    ) -> Result<(Review, Rating), ReviewError> {
        let mut tx = self.pool.begin().await?;
        // Take the write lock before reading, so no other review for this vinyl can land between the check and the
        // insert. The unique (user_id, vinyl_id) index still backs the check up.
        if !vinyls::lock_vinyl(vinyl_id, &mut tx).await? {
            return Err(ReviewError::VinylNotFound(vinyl_id));
        }
        if let Some(existing) = reviews::fetch_review_by_user_and_vinyl(user_id, vinyl_id, &mut tx).await? {
            debug!("🗃️ User #{user_id} already reviewed vinyl #{vinyl_id} in review #{}", existing.id);
            return Err(ReviewError::AlreadyReviewed);
        }
        let review = reviews::insert_review(user_id, vinyl_id, &review, &mut tx).await?;
        let rating = vinyls::update_average_rating(vinyl_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Review #{} stored. Vinyl #{vinyl_id} is now rated {rating}", review.id);
        Ok((review, rating))
    }

    async fn delete_review(
        &self,
        review_id: i64,
        requester: &Requester,
    ) -> Result<(Review, Option<Rating>), ReviewError> {
        let mut tx = self.pool.begin().await?;
        let review = reviews::delete_review(review_id, &mut tx).await?.ok_or(ReviewError::ReviewNotFound(review_id))?;
        if !requester.may_modify(review.user_id) {
            tx.rollback().await?;
            let owner = review.user_id;
            warn!("🗃️ User #{} tried to delete review #{review_id} belonging to user #{owner}", requester.user_id);
            return Err(ReviewError::Forbidden);
        }
        let rating = if vinyls::vinyl_exists(review.vinyl_id, &mut tx).await? {
            Some(vinyls::update_average_rating(review.vinyl_id, &mut tx).await?)
        } else {
            None
        };
        tx.commit().await?;
        debug!("🗃️ Review #{review_id} deleted");
        Ok((review, rating))
    }

    async fn fetch_review(&self, review_id: i64) -> Result<Option<Review>, ReviewError> {
        let mut conn = self.pool.acquire().await?;
        let review = reviews::fetch_review(review_id, &mut conn).await?;
        Ok(review)
    }

    async fn fetch_reviews_for_vinyl(
        &self,
        vinyl_id: i64,
        pagination: &Pagination,
    ) -> Result<Page<Review>, ReviewError> {
        let mut conn = self.pool.acquire().await?;
        let (reviews, total) = reviews::fetch_reviews_for_vinyl(vinyl_id, pagination, &mut conn).await?;
        Ok(Page::new(reviews, total, pagination))
    }
}

impl SystemLogManagement for SqliteDatabase {
    async fn create_log(&self, level: LogLevel, message: &str) -> Result<SystemLog, SystemLogError> {
        let mut tx = self.pool.begin().await?;
        let log = system_logs::insert_log(level, message, &mut tx).await?;
        tx.commit().await?;
        Ok(log)
    }

    async fn fetch_logs(&self, pagination: &Pagination) -> Result<Page<SystemLog>, SystemLogError> {
        let mut conn = self.pool.acquire().await?;
        let (logs, total) = system_logs::fetch_logs(pagination, &mut conn).await?;
        Ok(Page::new(logs, total, pagination))
    }
}
