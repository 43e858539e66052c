// Geo-distance resolution for radius and nearest-point queries

pub mod distance_calculator;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod resolver;

pub use distance_calculator::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use resolver::*;
