//! Post-delete selection advice

use sitenav_shared::EntityId;

use crate::domain::MenuNode;

/// Picks the replacement selection after `deleted` is removed.
///
/// Preference order: the sibling with the largest `display_order` strictly
/// below the deleted node's, else the sibling with the smallest order, else
/// the former parent, else nothing. `nodes` may still contain the deleted
/// record; it is ignored.
pub fn next_selection(nodes: &[MenuNode], deleted: &MenuNode) -> Option<EntityId> {
    let siblings: Vec<&MenuNode> = nodes
        .iter()
        .filter(|n| n.parent_id == deleted.parent_id && n.id != deleted.id)
        .collect();

    let preceding = siblings
        .iter()
        .filter(|n| n.display_order < deleted.display_order)
        .max_by_key(|n| n.display_order);
    if let Some(node) = preceding {
        return Some(node.id);
    }

    if let Some(first) = siblings.iter().min_by_key(|n| n.display_order) {
        return Some(first.id);
    }

    deleted.parent_id
}
