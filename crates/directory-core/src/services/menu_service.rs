// ============================================================================
// Directory Core - Menu Service
// File: crates/directory-core/src/services/menu_service.rs
// ============================================================================
//! Menu read path and the admin mutators that keep the location cache honest

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use directory_shared::constants::MAX_MENU_DEPTH;
use directory_shared::utils::normalize_location;

use super::menu_cache::MenuCache;
use super::menu_tree::{build_tree, lint_items, MenuItemIssue};
use crate::domain::{DisplayMenuItem, Menu, MenuItem, MenuItemPatch, NewMenu, NewMenuItem};
use crate::error::DomainError;
use crate::repositories::MenuRepository;

/// Menu service: cached forest reads for pages, cache-invalidating writes for admin.
pub struct MenuService<R: MenuRepository + ?Sized = dyn MenuRepository> {
    menu_repo: Arc<R>,
    cache: Arc<MenuCache>,
}

impl<R: MenuRepository + ?Sized> MenuService<R> {
    pub fn new(menu_repo: Arc<R>, cache: Arc<MenuCache>) -> Self {
        Self { menu_repo, cache }
    }

    pub fn cache(&self) -> &Arc<MenuCache> {
        &self.cache
    }

    /// Display forest for a page location.
    ///
    /// Served from cache while fresh. On a miss the menu and its items are
    /// loaded, assembled and cached, empty results included. A location
    /// without a menu yields an empty forest; nothing is created here.
    pub async fn get_menu_items_for_location(
        &self,
        location: &str,
    ) -> Result<Vec<DisplayMenuItem>, DomainError> {
        let location = location_key(location)?;

        if let Some(forest) = self.cache.get(&location) {
            debug!("Menu cache hit for '{}'", location);
            return Ok(forest);
        }

        let forest = match self.menu_repo.find_menu_by_location(&location).await? {
            Some(menu) => {
                let items = self.menu_repo.find_items_for_menu(&menu.id).await?;
                debug!("Loaded {} menu items for '{}'", items.len(), location);
                build_tree(&items)
            }
            None => {
                debug!("No menu configured for '{}'", location);
                Vec::new()
            }
        };

        self.cache.put(&location, &forest);
        Ok(forest)
    }

    /// Read-only menu lookup; never creates.
    pub async fn get_menu(&self, location: &str) -> Result<Option<Menu>, DomainError> {
        let location = location_key(location)?;
        self.menu_repo.find_menu_by_location(&location).await
    }

    pub async fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        self.menu_repo.list_menus().await
    }

    /// Admin lookup that creates the menu when the location has none yet.
    pub async fn get_or_create_menu(&self, name: &str, location: &str) -> Result<Menu, DomainError> {
        let input = NewMenu {
            name: name.trim().to_string(),
            location: location_key(location)?,
        };
        input.validate()?;

        if let Some(menu) = self.menu_repo.find_menu_by_location(&input.location).await? {
            return Ok(menu);
        }

        let menu = Menu::new(input)?;
        match self.menu_repo.create_menu(&menu).await {
            Ok(created) => {
                info!("Created menu '{}' for location '{}'", created.name, created.location);
                self.cache.invalidate(&created.location);
                Ok(created)
            }
            // Lost a race against another admin request creating the same location.
            Err(DomainError::MenuLocationAlreadyExists(existing)) => self
                .menu_repo
                .find_menu_by_location(&existing)
                .await?
                .ok_or(DomainError::MenuLocationAlreadyExists(existing)),
            Err(e) => Err(e),
        }
    }

    pub async fn delete_menu(&self, id: &Uuid) -> Result<(), DomainError> {
        let menu = self
            .menu_repo
            .find_menu_by_id(id)
            .await?
            .ok_or(DomainError::MenuNotFoundById(*id))?;

        self.menu_repo.delete_menu(id).await?;
        self.cache.invalidate(&menu.location);

        info!("Deleted menu {} ('{}')", id, menu.location);
        Ok(())
    }

    /// Flat items of a location, as stored. Empty when the location has no menu.
    pub async fn list_menu_items(&self, location: &str) -> Result<Vec<MenuItem>, DomainError> {
        let location = location_key(location)?;
        match self.menu_repo.find_menu_by_location(&location).await? {
            Some(menu) => self.menu_repo.find_items_for_menu(&menu.id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Create an item under `location`, creating the menu on first use.
    pub async fn create_item(
        &self,
        location: &str,
        input: NewMenuItem,
    ) -> Result<MenuItem, DomainError> {
        let location = location_key(location)?;
        input.validate()?;

        let menu = self.get_or_create_menu(&default_menu_name(&location), &location).await?;

        let item = MenuItem::new(menu.id, input)?;
        if let Some(parent_id) = item.parent_id {
            self.ensure_parent_in_menu(&parent_id, &menu).await?;
            self.ensure_placement(&item.id, &parent_id, &menu).await?;
        }

        let created = self.menu_repo.create_item(&item).await?;
        self.cache.invalidate(&menu.location);

        info!("Created menu item {} in '{}'", created.id, menu.location);
        Ok(created)
    }

    pub async fn update_item(&self, id: &Uuid, patch: MenuItemPatch) -> Result<MenuItem, DomainError> {
        let patch = patch.normalized();
        patch.check()?;

        let mut item = self
            .menu_repo
            .find_item_by_id(id)
            .await?
            .ok_or(DomainError::MenuItemNotFound(*id))?;
        let menu = self
            .menu_repo
            .find_menu_by_id(&item.menu_id)
            .await?
            .ok_or(DomainError::MenuNotFoundById(item.menu_id))?;

        if let Some(Some(parent_id)) = patch.parent_id {
            if parent_id == item.id {
                return Err(DomainError::InvalidParent {
                    parent_id,
                    reason: "an item cannot be its own parent".to_string(),
                });
            }
            self.ensure_parent_in_menu(&parent_id, &menu).await?;
            self.ensure_placement(&item.id, &parent_id, &menu).await?;
        }

        item.apply_patch(patch);
        let updated = self.menu_repo.update_item(&item).await?;
        self.cache.invalidate(&menu.location);

        info!("Updated menu item {} in '{}'", updated.id, menu.location);
        Ok(updated)
    }

    /// Children of the deleted item are left in place and render as roots.
    pub async fn delete_item(&self, id: &Uuid) -> Result<(), DomainError> {
        let item = self
            .menu_repo
            .find_item_by_id(id)
            .await?
            .ok_or(DomainError::MenuItemNotFound(*id))?;

        self.menu_repo.delete_item(id).await?;

        match self.menu_repo.find_menu_by_id(&item.menu_id).await? {
            Some(menu) => {
                self.cache.invalidate(&menu.location);
                info!("Deleted menu item {} from '{}'", id, menu.location);
            }
            None => {
                warn!("Menu {} of deleted item {} is gone, clearing all menu caches", item.menu_id, id);
                self.cache.invalidate_all();
            }
        }
        Ok(())
    }

    /// Rows of `location` the assembler would demote or re-parent.
    pub async fn lint_location(&self, location: &str) -> Result<Vec<MenuItemIssue>, DomainError> {
        let items = self.list_menu_items(location).await?;
        let issues = lint_items(&items);
        if !issues.is_empty() {
            warn!("Menu '{}' has {} structural issues", location.trim(), issues.len());
        }
        Ok(issues)
    }

    pub fn invalidate_cache_for_location(&self, location: &str) {
        self.cache.invalidate(&normalize_location(location));
    }

    pub fn invalidate_all_caches(&self) {
        self.cache.invalidate_all();
    }

    async fn ensure_parent_in_menu(&self, parent_id: &Uuid, menu: &Menu) -> Result<(), DomainError> {
        let parent = self
            .menu_repo
            .find_item_by_id(parent_id)
            .await?
            .ok_or_else(|| DomainError::InvalidParent {
                parent_id: *parent_id,
                reason: "parent item does not exist".to_string(),
            })?;

        if parent.menu_id != menu.id {
            return Err(DomainError::InvalidParent {
                parent_id: *parent_id,
                reason: format!("parent belongs to a different menu than '{}'", menu.location),
            });
        }
        Ok(())
    }

    /// Rejects placing `item_id` beneath one of its own descendants, or so
    /// deep that its subtree would pass `MAX_MENU_DEPTH`. A new item has no
    /// stored rows yet and counts as a single level.
    async fn ensure_placement(
        &self,
        item_id: &Uuid,
        new_parent_id: &Uuid,
        menu: &Menu,
    ) -> Result<(), DomainError> {
        let items = self.menu_repo.find_items_for_menu(&menu.id).await?;
        let mut parents: HashMap<Uuid, Option<Uuid>> = HashMap::with_capacity(items.len());
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for item in &items {
            parents.entry(item.id).or_insert(item.parent_id);
            if let Some(parent_id) = item.parent_id {
                children.entry(parent_id).or_default().push(item.id);
            }
        }

        // Levels from the root down to and including the new parent.
        let mut parent_depth = 0;
        let mut current = Some(*new_parent_id);
        while let Some(id) = current {
            if id == *item_id {
                return Err(DomainError::InvalidParent {
                    parent_id: *new_parent_id,
                    reason: "parent is a descendant of the item".to_string(),
                });
            }
            parent_depth += 1;
            if parent_depth > parents.len() {
                // Stored rows already loop above the parent.
                break;
            }
            current = parents.get(&id).copied().flatten();
        }

        let height = subtree_height(item_id, &children);
        if parent_depth + height > MAX_MENU_DEPTH {
            return Err(DomainError::InvalidParent {
                parent_id: *new_parent_id,
                reason: format!("menu would nest deeper than {} levels", MAX_MENU_DEPTH),
            });
        }
        Ok(())
    }
}

/// Levels in the subtree rooted at `root`, counting `root` itself.
fn subtree_height(root: &Uuid, children: &HashMap<Uuid, Vec<Uuid>>) -> usize {
    let mut height = 0;
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([(*root, 1)]);
    while let Some((id, level)) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        height = height.max(level);
        if let Some(kids) = children.get(&id) {
            queue.extend(kids.iter().map(|kid| (*kid, level + 1)));
        }
    }
    height
}

fn location_key(location: &str) -> Result<String, DomainError> {
    let location = normalize_location(location);
    if location.is_empty() {
        return Err(DomainError::ValidationError(
            "Menu location must not be empty".to_string(),
        ));
    }
    Ok(location)
}

fn default_menu_name(location: &str) -> String {
    let mut chars = location.chars();
    match chars.next() {
        Some(first) => format!("{}{} Menu", first.to_uppercase(), chars.as_str()),
        None => "Menu".to_string(),
    }
}
