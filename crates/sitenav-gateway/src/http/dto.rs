//! Wire DTOs for the remote menu API
//!
//! The backend speaks camelCase JSON wrapped in a `{ success, data, message }`
//! envelope; domain types never leak onto the wire directly.

use serde::{Deserialize, Serialize};
use sitenav_core::domain::{MenuCreate, MenuNode, MenuReplace};
use sitenav_shared::EntityId;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDto {
    pub id: EntityId,
    pub site_id: EntityId,
    pub name: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<EntityId>,
    pub display_order: i32,
    pub enabled: bool,
}

impl From<MenuDto> for MenuNode {
    fn from(dto: MenuDto) -> Self {
        MenuNode {
            id: dto.id,
            site_id: dto.site_id,
            name: dto.name,
            url: dto.url,
            icon: dto.icon,
            parent_id: dto.parent_id,
            display_order: dto.display_order,
            enabled: dto.enabled,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuBody {
    pub site_id: EntityId,
    pub name: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub parent_id: Option<EntityId>,
}

impl From<&MenuCreate> for CreateMenuBody {
    fn from(create: &MenuCreate) -> Self {
        Self {
            site_id: create.site_id,
            name: create.name.clone(),
            url: create.url.clone(),
            icon: create.icon.clone(),
            display_order: create.display_order,
            parent_id: create.parent_id,
        }
    }
}

/// Full-replace body: every attribute is resent on every update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceMenuBody {
    pub name: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub parent_id: Option<EntityId>,
    pub enabled: bool,
}

impl From<&MenuReplace> for ReplaceMenuBody {
    fn from(replace: &MenuReplace) -> Self {
        Self {
            name: replace.name.clone(),
            url: replace.url.clone(),
            icon: replace.icon.clone(),
            display_order: replace.display_order,
            parent_id: replace.parent_id,
            enabled: replace.enabled,
        }
    }
}
