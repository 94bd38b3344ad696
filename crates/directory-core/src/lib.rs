//! # Directory Core
//! 
//! Menu entities, the tree assembler, the location cache, and repository traits.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
