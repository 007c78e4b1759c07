pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, AuthUser};
pub use auth_service_impl::SupabaseAuthService;

pub mod search;
pub use search::{SearchHit, SearchOutcome, SearchService, SearchSource};
