use cucumber::given;
use vinyl_market_engine::{
    db_types::{Cents, NewUser, NewVinyl, Role},
    traits::CatalogManagement,
};

use crate::cucumber::{ratings_world::MarketSystem, RatingsWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut RatingsWorld) {
    let system = MarketSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a user called {word}")]
async fn create_user(world: &mut RatingsWorld, name: String) {
    add_user(world, name, Role::User).await;
}

#[given(expr = "an admin called {word}")]
async fn create_admin(world: &mut RatingsWorld, name: String) {
    add_user(world, name, Role::Admin).await;
}

async fn add_user(world: &mut RatingsWorld, name: String, role: Role) {
    let email = format!("{}@example.com", name.to_lowercase());
    let user = NewUser::new(name.as_str(), "Tester", email.as_str()).with_role(role);
    let user = world.system().db.insert_user(user).await.expect("Error creating user");
    world.users.insert(name, user.id);
}

#[given(expr = "the vinyl {string} by {string} priced at {word}")]
async fn create_vinyl(world: &mut RatingsWorld, name: String, author: String, price: String) {
    let price = price.parse::<Cents>().expect("Invalid price");
    let vinyl = NewVinyl::new(name.as_str(), author.as_str(), price);
    let vinyl = world.system().db.insert_vinyl(vinyl).await.expect("Error creating vinyl");
    world.vinyls.insert(name, vinyl.id);
}
