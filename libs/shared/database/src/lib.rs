pub mod repository;
pub mod supabase;

pub use repository::RepositoryError;
pub use supabase::{DatabaseError, SupabaseClient};
