//! # Directory Shared
//! 
//! Shared configuration, telemetry, constants, and types for the directory menu service.

pub mod constants;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use error::AppError;
