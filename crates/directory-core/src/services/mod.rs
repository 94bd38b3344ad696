//! Domain services (business logic)

pub mod clock;
pub mod menu_cache;
pub mod menu_service;
pub mod menu_tree;

pub use clock::{Clock, ManualClock, SystemClock};
pub use menu_cache::{MenuCache, MenuCacheStats};
pub use menu_service::MenuService;
pub use menu_tree::{build_tree, lint_items, MenuItemIssue};
