// ============================================================================
// Directory Infrastructure - PostgreSQL Menu Repository
// File: crates/directory-infrastructure/src/database/postgres/menu_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use directory_core::domain::{Menu, MenuItem};
use directory_core::error::DomainError;
use directory_core::repositories::MenuRepository;

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuRow {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: row.id,
            name: row.name,
            location: row.location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MenuItemRow {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub label: String,
    pub url: String,
    pub target: Option<String>,
    pub sort_order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            menu_id: row.menu_id,
            parent_id: row.parent_id,
            label: row.label,
            url: row.url,
            target: row.target,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn find_menu_by_location(&self, location: &str) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            SELECT id, name, location, created_at, updated_at
            FROM menus
            WHERE location = $1
            "#
        )
        .bind(location)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding menu by location", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_menu_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            SELECT id, name, location, created_at, updated_at
            FROM menus
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding menu by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(
            r#"
            SELECT id, name, location, created_at, updated_at
            FROM menus
            ORDER BY location ASC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing menus", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_menu(&self, menu: &Menu) -> Result<Menu, DomainError> {
        info!("Creating menu: {} ({})", menu.name, menu.location);

        let row: MenuRow = sqlx::query_as(
            r#"
            INSERT INTO menus (id, name, location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, location, created_at, updated_at
            "#
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(&menu.location)
        .bind(menu.created_at)
        .bind(menu.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            if is_unique_violation(&e) {
                DomainError::MenuLocationAlreadyExists(menu.location.clone())
            } else {
                db_error("creating menu", e)
            }
        })?;

        Ok(row.into())
    }

    async fn delete_menu(&self, id: &Uuid) -> Result<(), DomainError> {
        // menu_items rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deleting menu", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MenuNotFoundById(*id));
        }
        Ok(())
    }

    async fn find_items_for_menu(&self, menu_id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(
            r#"
            SELECT
                id, menu_id, parent_id, label, url, target, sort_order,
                created_at, updated_at
            FROM menu_items
            WHERE menu_id = $1
            ORDER BY COALESCE(sort_order, 0) ASC, id ASC
            "#
        )
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("loading menu items", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_item_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(
            r#"
            SELECT
                id, menu_id, parent_id, label, url, target, sort_order,
                created_at, updated_at
            FROM menu_items
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding menu item by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let row: MenuItemRow = sqlx::query_as(
            r#"
            INSERT INTO menu_items (
                id, menu_id, parent_id, label, url, target, sort_order,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, menu_id, parent_id, label, url, target, sort_order,
                created_at, updated_at
            "#
        )
        .bind(item.id)
        .bind(item.menu_id)
        .bind(item.parent_id)
        .bind(&item.label)
        .bind(&item.url)
        .bind(&item.target)
        .bind(item.order)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating menu item", e))?;

        Ok(row.into())
    }

    async fn update_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(
            r#"
            UPDATE menu_items
            SET
                parent_id = $2,
                label = $3,
                url = $4,
                target = $5,
                sort_order = $6,
                updated_at = $7
            WHERE id = $1
            RETURNING
                id, menu_id, parent_id, label, url, target, sort_order,
                created_at, updated_at
            "#
        )
        .bind(item.id)
        .bind(item.parent_id)
        .bind(&item.label)
        .bind(&item.url)
        .bind(&item.target)
        .bind(item.order)
        .bind(item.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating menu item", e))?;

        row.map(Into::into)
            .ok_or(DomainError::MenuItemNotFound(item.id))
    }

    async fn delete_item(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deleting menu item", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MenuItemNotFound(*id));
        }
        Ok(())
    }
}
