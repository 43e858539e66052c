pub mod error;
pub mod handlers;
pub mod models;
pub mod rating_aggregator;
pub mod repository;
pub mod service;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use rating_aggregator::*;
pub use repository::*;
pub use service::*;
