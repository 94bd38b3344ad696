//! # Directory Core - Domain Module
//! 
//! Domain entities for the directory menu service.

pub mod menu;
pub mod menu_item;

// Re-export all entities
pub use menu::{Menu, NewMenu};
pub use menu_item::{DisplayMenuItem, MenuItem, MenuItemPatch, NewMenuItem};
