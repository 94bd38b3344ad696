//! In-memory menu repository, used when no database is configured and in tests

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use directory_core::domain::{Menu, MenuItem};
use directory_core::error::DomainError;
use directory_core::repositories::MenuRepository;

#[derive(Default)]
pub struct InMemoryMenuRepository {
    menus: RwLock<HashMap<Uuid, Menu>>,
    items: RwLock<HashMap<Uuid, MenuItem>>,
}

impl InMemoryMenuRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with fixture rows taken as-is. Unlike `create_*`
    /// nothing is checked, so rows that only another writer could produce
    /// (orphans, cycles, very deep chains) can be loaded for tests.
    pub fn with_data(menus: Vec<Menu>, items: Vec<MenuItem>) -> Self {
        Self {
            menus: RwLock::new(menus.into_iter().map(|m| (m.id, m)).collect()),
            items: RwLock::new(items.into_iter().map(|i| (i.id, i)).collect()),
        }
    }
}

#[async_trait]
impl MenuRepository for InMemoryMenuRepository {
    async fn find_menu_by_location(&self, location: &str) -> Result<Option<Menu>, DomainError> {
        Ok(self
            .menus
            .read()
            .values()
            .find(|m| m.location == location)
            .cloned())
    }

    async fn find_menu_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError> {
        Ok(self.menus.read().get(id).cloned())
    }

    async fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        let mut menus: Vec<Menu> = self.menus.read().values().cloned().collect();
        menus.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(menus)
    }

    async fn create_menu(&self, menu: &Menu) -> Result<Menu, DomainError> {
        let mut menus = self.menus.write();
        if menus.values().any(|m| m.location == menu.location) {
            return Err(DomainError::MenuLocationAlreadyExists(menu.location.clone()));
        }
        menus.insert(menu.id, menu.clone());
        Ok(menu.clone())
    }

    async fn delete_menu(&self, id: &Uuid) -> Result<(), DomainError> {
        if self.menus.write().remove(id).is_none() {
            return Err(DomainError::MenuNotFoundById(*id));
        }
        self.items.write().retain(|_, item| item.menu_id != *id);
        Ok(())
    }

    async fn find_items_for_menu(&self, menu_id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        let mut items: Vec<MenuItem> = self
            .items
            .read()
            .values()
            .filter(|i| i.menu_id == *menu_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.effective_order()
                .cmp(&b.effective_order())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    async fn find_item_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError> {
        Ok(self.items.read().get(id).cloned())
    }

    async fn create_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        if !self.menus.read().contains_key(&item.menu_id) {
            return Err(DomainError::MenuNotFoundById(item.menu_id));
        }
        self.items.write().insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn update_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let mut items = self.items.write();
        match items.get_mut(&item.id) {
            Some(existing) => {
                *existing = MenuItem {
                    menu_id: existing.menu_id,
                    created_at: existing.created_at,
                    ..item.clone()
                };
                Ok(existing.clone())
            }
            None => Err(DomainError::MenuItemNotFound(item.id)),
        }
    }

    async fn delete_item(&self, id: &Uuid) -> Result<(), DomainError> {
        match self.items.write().remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::MenuItemNotFound(*id)),
        }
    }
}
