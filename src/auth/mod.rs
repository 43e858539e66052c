// Authentication module
// Bearer JWT validation and role checks; tokens are issued by an external identity service

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use models::Role;
pub use token::{Claims, TokenService};
