use std::collections::HashMap;

use cucumber::World;
use log::*;
use vinyl_market_engine::{
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::ReviewError,
    ReviewApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct RatingsWorld {
    pub system: Option<MarketSystem>,
    /// user name -> user id
    pub users: HashMap<String, i64>,
    /// vinyl name -> vinyl id
    pub vinyls: HashMap<String, i64>,
    /// (user name, vinyl name) -> review id
    pub reviews: HashMap<(String, String), i64>,
    pub last_error: Option<ReviewError>,
}

#[derive(Debug)]
pub struct MarketSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub api: ReviewApi<SqliteDatabase>,
}

impl RatingsWorld {
    pub fn system(&self) -> &MarketSystem {
        self.system.as_ref().expect("Market system not initialised")
    }

    pub fn user_id(&self, name: &str) -> i64 {
        *self.users.get(name).unwrap_or_else(|| panic!("No user called {name}"))
    }

    pub fn vinyl_id(&self, name: &str) -> i64 {
        *self.vinyls.get(name).unwrap_or_else(|| panic!("No vinyl called {name}"))
    }
}

impl MarketSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let api = ReviewApi::new(db.clone());
        Self { db_path: url, db, api }
    }
}
