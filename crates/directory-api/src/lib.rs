//! # Directory API
//! 
//! HTTP handlers, routing, and the response envelope for the menu service.

pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
