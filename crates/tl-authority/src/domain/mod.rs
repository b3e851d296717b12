//! Domain layer: authority entities, errors, and the model aggregate.

pub mod entities;
pub mod errors;
pub mod model;
