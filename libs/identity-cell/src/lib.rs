pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;

pub use error::IdentityError;
pub use models::*;
pub use repository::{InMemoryUserDirectory, SupabaseUserDirectory, UserDirectory};
pub use router::user_routes;
pub use services::UserService;
