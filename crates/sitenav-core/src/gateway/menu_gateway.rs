//! Menu gateway trait (port)
//!
//! The remote menu API behind this port offers no multi-record transaction;
//! every write is a single-record full replace.

use async_trait::async_trait;
use sitenav_shared::EntityId;

use crate::domain::{MenuCreate, MenuNode, MenuReplace};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuGateway: Send + Sync {
    async fn fetch_menus(&self, site_id: EntityId) -> Result<Vec<MenuNode>, DomainError>;
    async fn create_menu(&self, create: MenuCreate) -> Result<MenuNode, DomainError>;
    async fn replace_menu(&self, id: EntityId, replace: MenuReplace) -> Result<MenuNode, DomainError>;
    async fn delete_menu(&self, id: EntityId) -> Result<(), DomainError>;
}
