#![allow(dead_code)]

use vinyl_market_engine::{
    db_types::{Cents, NewUser, NewVinyl, Role, User, Vinyl},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::CatalogManagement,
    SqliteDatabase,
};

pub async fn new_database() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub async fn seed_user(db: &SqliteDatabase, name: &str) -> User {
    let user = NewUser::new(name, "Tester", format!("{}@example.com", name.to_lowercase()).as_str());
    db.insert_user(user).await.expect("Error creating user")
}

pub async fn seed_admin(db: &SqliteDatabase, name: &str) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    let user = NewUser::new(name, "Admin", email.as_str()).with_role(Role::Admin);
    db.insert_user(user).await.expect("Error creating admin")
}

pub async fn seed_vinyl(db: &SqliteDatabase, name: &str, author: &str, price: &str) -> Vinyl {
    let price = price.parse::<Cents>().expect("Invalid price");
    db.insert_vinyl(NewVinyl::new(name, author, price)).await.expect("Error creating vinyl")
}
