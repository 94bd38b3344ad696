// ============================================================================
// Directory Core - Menu Entity
// File: crates/directory-core/src/domain/menu.rs
// Description: Named menu bound to a page location (header, footer, ...)
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use directory_shared::utils::normalize_location;

/// Menu entity. One menu per location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a menu
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewMenu {
    #[validate(length(min = 2, max = 100, message = "Menu name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Menu location must be between 1 and 50 characters"))]
    pub location: String,
}

impl Menu {
    pub fn new(input: NewMenu) -> Result<Self, validator::ValidationErrors> {
        let input = NewMenu {
            name: input.name.trim().to_string(),
            location: normalize_location(&input.location),
        };
        input.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            location: input.location,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_menu_normalizes_location() {
        let menu = Menu::new(NewMenu {
            name: " Footer links ".to_string(),
            location: " Footer".to_string(),
        })
        .unwrap();
        assert_eq!(menu.name, "Footer links");
        assert_eq!(menu.location, "footer");
        assert_eq!(menu.created_at, menu.updated_at);
    }

    #[test]
    fn test_blank_location_rejected() {
        let menu = Menu::new(NewMenu {
            name: "Header".to_string(),
            location: "   ".to_string(),
        });
        assert!(menu.is_err());
    }
}
