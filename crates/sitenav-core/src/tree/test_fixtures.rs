//! Shared fixtures for tree tests

use sitenav_shared::{new_id, EntityId};

use crate::domain::MenuNode;

pub fn site() -> EntityId {
    new_id()
}

pub fn node(site_id: EntityId, name: &str, parent_id: Option<EntityId>, display_order: i32) -> MenuNode {
    MenuNode {
        id: new_id(),
        site_id,
        name: name.to_string(),
        url: Some(format!("/{}", name.to_lowercase())),
        icon: None,
        parent_id,
        display_order,
        enabled: true,
    }
}

/// Sibling ids under `parent_id`, ordered by `display_order`.
pub fn ordered_ids(nodes: &[MenuNode], parent_id: Option<EntityId>) -> Vec<EntityId> {
    let mut siblings: Vec<&MenuNode> = nodes.iter().filter(|n| n.parent_id == parent_id).collect();
    siblings.sort_by_key(|n| n.display_order);
    siblings.iter().map(|n| n.id).collect()
}
