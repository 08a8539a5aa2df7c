//! The drink resource: model, persistence and HTTP handlers

pub mod handlers;
pub mod model;
pub mod repository;

pub use model::{Drink, DrinkChanges, DrinkPayload, DrinkSummary, Ingredient, NewDrink};
pub use repository::{DrinkRepository, RepositoryError, SqliteDrinkRepository};
