//! Application-wide constants

/// Menu cache entries are served for five minutes before a read refetches them.
pub const DEFAULT_MENU_CACHE_TTL_SECS: u64 = 300;

/// Sibling order used when a menu item has no explicit order.
pub const DEFAULT_MENU_ORDER: i32 = 0;

/// Deepest nesting level a menu renders. Admin writes past it are rejected and
/// rows stored below it are lifted to the root level when the forest is built.
pub const MAX_MENU_DEPTH: usize = 32;

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 3;
