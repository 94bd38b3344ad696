use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, health, menu};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Public menu read path
        .route("/api/v1/menus/{location}", get(menu::get_menu))
        // Admin menus
        .route(
            "/api/v1/admin/menus",
            get(admin::list_menus).post(admin::create_menu),
        )
        .route("/api/v1/admin/menus/{location}", delete(admin::delete_menu))
        .route(
            "/api/v1/admin/menus/{location}/items",
            get(admin::list_items).post(admin::create_item),
        )
        .route("/api/v1/admin/menus/{location}/lint", get(admin::lint_menu))
        // Admin menu items
        .route(
            "/api/v1/admin/menu-items/{id}",
            put(admin::update_item).delete(admin::delete_item),
        )
        // Admin cache control
        .route("/api/v1/admin/menu-cache", get(admin::cache_stats))
        .route("/api/v1/admin/menu-cache/invalidate", post(admin::invalidate_cache))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
