// Authentication: configuration, JWT issuance and request extractors

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::{AuthConfig, AuthMode};
pub use middleware::{AuthError, AuthState, AuthUser};
