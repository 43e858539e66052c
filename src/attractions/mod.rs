// Attractions: CRUD, slug lookup, listing and the denormalized rating fields

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
