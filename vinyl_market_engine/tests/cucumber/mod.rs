mod ratings_world;
mod setups;
mod steps;

pub use ratings_world::RatingsWorld;
