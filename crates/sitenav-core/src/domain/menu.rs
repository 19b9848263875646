// ============================================================================
// Sitenav Core - Menu Entity
// File: crates/sitenav-core/src/domain/menu.rs
// Description: Navigation menu node and its wire payloads
// ============================================================================

use serde::{Deserialize, Serialize};
use sitenav_shared::EntityId;
use validator::Validate;

/// One navigation entry in a site's menu tree.
///
/// The flat list of these records is the source of truth; the tree shape is
/// always derived from `parent_id` / `display_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: EntityId,
    pub site_id: EntityId,
    pub name: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    /// `None` marks a root of the site's tree.
    pub parent_id: Option<EntityId>,
    /// Zero-based contiguous rank among siblings.
    pub display_order: i32,
    pub enabled: bool,
}

impl MenuNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Full-replace payload carrying every attribute. The backend update
    /// operation overwrites the whole record, never a partial patch.
    pub fn replace_payload(&self) -> MenuReplace {
        MenuReplace {
            name: self.name.clone(),
            url: self.url.clone(),
            icon: self.icon.clone(),
            display_order: self.display_order,
            parent_id: self.parent_id,
            enabled: self.enabled,
        }
    }
}

/// Creation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuCreate {
    pub site_id: EntityId,

    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Menu URL too long"))]
    pub url: Option<String>,

    #[validate(length(max = 100, message = "Menu icon too long"))]
    pub icon: Option<String>,

    pub display_order: i32,
    pub parent_id: Option<EntityId>,
}

impl MenuCreate {
    pub fn new(
        site_id: EntityId,
        name: String,
        url: Option<String>,
        icon: Option<String>,
        display_order: i32,
        parent_id: Option<EntityId>,
    ) -> Result<Self, validator::ValidationErrors> {
        let create = Self {
            site_id,
            name: name.trim().to_string(),
            url: url.map(|u| u.trim().to_string()),
            icon: icon.map(|i| i.trim().to_string()),
            display_order,
            parent_id,
        };

        create.validate()?;
        Ok(create)
    }
}

/// Full-replace update payload, keyed by node id on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuReplace {
    pub name: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub parent_id: Option<EntityId>,
    pub enabled: bool,
}

/// Inline-editable display attributes; order and parent are untouched.
#[derive(Debug, Clone, Validate)]
pub struct MenuDetails {
    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Menu URL too long"))]
    pub url: Option<String>,

    #[validate(length(max = 100, message = "Menu icon too long"))]
    pub icon: Option<String>,

    pub enabled: bool,
}
