use std::sync::Arc;

use directory_core::services::MenuService;

#[derive(Clone)]
pub struct AppState {
    pub menu_service: Arc<MenuService>,
}

impl AppState {
    pub fn new(menu_service: Arc<MenuService>) -> Self {
        Self { menu_service }
    }
}
