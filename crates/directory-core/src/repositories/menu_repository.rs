//! Menu repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Menu, MenuItem};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn find_menu_by_location(&self, location: &str) -> Result<Option<Menu>, DomainError>;
    async fn find_menu_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError>;
    async fn list_menus(&self) -> Result<Vec<Menu>, DomainError>;
    async fn create_menu(&self, menu: &Menu) -> Result<Menu, DomainError>;
    /// Removes the menu together with all of its items.
    async fn delete_menu(&self, id: &Uuid) -> Result<(), DomainError>;

    /// Items of one menu, ordered by `order` ascending (missing order first as 0).
    async fn find_items_for_menu(&self, menu_id: &Uuid) -> Result<Vec<MenuItem>, DomainError>;
    async fn find_item_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError>;
    async fn create_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError>;
    async fn update_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError>;
    async fn delete_item(&self, id: &Uuid) -> Result<(), DomainError>;
}
