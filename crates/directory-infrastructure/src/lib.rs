//! # Directory Infrastructure
//! 
//! Menu repository implementations (adapters): PostgreSQL and in-memory.

pub mod database;
pub mod memory;

pub use database::{create_pool, run_migrations, PgMenuRepository};
pub use memory::InMemoryMenuRepository;
