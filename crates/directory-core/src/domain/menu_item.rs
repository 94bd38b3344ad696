// ============================================================================
// Directory Core - Menu Item Entity
// File: crates/directory-core/src/domain/menu_item.rs
// Description: Flat stored menu rows and the hierarchical display projection
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use directory_shared::constants::DEFAULT_MENU_ORDER;

/// Menu item as stored: one flat row per link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a menu item
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    #[validate(length(min = 1, max = 100, message = "Label must be between 1 and 100 characters"))]
    pub label: String,

    #[validate(length(min = 1, max = 2048, message = "URL must be between 1 and 2048 characters"))]
    pub url: String,

    #[validate(length(max = 20, message = "Link target too long"))]
    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub order: Option<i32>,

    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Partial update. For the nullable columns the outer `Option` says whether
/// the field was sent at all, the inner one whether it is being cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPatch {
    #[validate(length(min = 1, max = 100, message = "Label must be between 1 and 100 characters"))]
    pub label: Option<String>,

    #[validate(length(min = 1, max = 2048, message = "URL must be between 1 and 2048 characters"))]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub target: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub order: Option<Option<i32>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub parent_id: Option<Option<Uuid>>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl MenuItem {
    pub fn new(menu_id: Uuid, input: NewMenuItem) -> Result<Self, validator::ValidationErrors> {
        let input = NewMenuItem {
            label: input.label.trim().to_string(),
            url: input.url.trim().to_string(),
            target: input.target.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            ..input
        };
        input.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            menu_id,
            parent_id: input.parent_id,
            label: input.label,
            url: input.url,
            target: input.target,
            order: input.order,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sibling sort key; a missing order sorts as 0.
    pub fn effective_order(&self) -> i32 {
        self.order.unwrap_or(DEFAULT_MENU_ORDER)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Expects a patch that went through `MenuItemPatch::normalized`.
    pub fn apply_patch(&mut self, patch: MenuItemPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(target) = patch.target {
            self.target = target;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        self.updated_at = Utc::now();
    }
}

impl MenuItemPatch {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.url.is_none()
            && self.target.is_none()
            && self.order.is_none()
            && self.parent_id.is_none()
    }

    /// Trims text fields the same way `MenuItem::new` does, so a blank
    /// label or url fails `check` instead of being stored empty.
    pub fn normalized(self) -> Self {
        Self {
            label: self.label.map(|l| l.trim().to_string()),
            url: self.url.map(|u| u.trim().to_string()),
            target: self
                .target
                .map(|t| t.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())),
            ..self
        }
    }

    /// Checks the derived rules plus the nullable target, which the
    /// derive does not reach through the double `Option`.
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        if let Some(Some(target)) = &self.target {
            if target.chars().count() > 20 {
                let mut errors = validator::ValidationErrors::new();
                let mut error = validator::ValidationError::new("length");
                error.message = Some("Link target too long".into());
                errors.add("target", error);
                return Err(errors);
            }
        }
        Ok(())
    }
}

/// Hierarchical projection of a menu item, as rendered by page templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMenuItem {
    pub id: Uuid,
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<DisplayMenuItem>,
}

impl DisplayMenuItem {
    pub fn effective_order(&self) -> i32 {
        self.order.unwrap_or(DEFAULT_MENU_ORDER)
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DisplayMenuItem::node_count).sum::<usize>()
    }
}

impl From<&MenuItem> for DisplayMenuItem {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id,
            label: item.label.clone(),
            url: item.url.clone(),
            target: item.target.clone(),
            order: item.order,
            created_at: item.created_at,
            updated_at: item.updated_at,
            children: Vec::new(),
        }
    }
}
