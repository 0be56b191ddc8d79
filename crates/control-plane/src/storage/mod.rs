// Storage layer for the RSVP control-plane
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// - Database: sqlx repository over PostgreSQL
// - InMemoryDatabase: parking_lot-guarded maps with the same API
// - StorageBackend: enum dispatch over the two, used by services and auth

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;
