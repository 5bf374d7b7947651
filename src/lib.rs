mod components;
mod dispatch;
mod entity_store;
mod environment;

pub use components::posts;
pub use dispatch::{Effect, Reducer, Store};
pub use entity_store::{Entity, EntityStore};
pub use environment::{model, Environment};
