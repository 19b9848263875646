//! Sibling renumbering

use sitenav_shared::EntityId;

use crate::domain::MenuNode;
use crate::error::DomainError;
use crate::tree::resolver::MoveCommand;

/// Order value for a node appended to the `parent_id` sibling set.
pub fn next_order(nodes: &[MenuNode], parent_id: Option<EntityId>) -> i32 {
    nodes.iter().filter(|n| n.parent_id == parent_id).count() as i32
}

/// Applies a guarded move to the flat list in place.
///
/// The node is spliced out of its origin sibling list and into the
/// destination list at `new_index`; both lists are reassigned contiguous
/// `0..k-1` orders preserving relative order. When origin and destination
/// are the same list the two steps collapse into one splice-and-renumber.
///
/// Returns the ids of every node whose `display_order` or `parent_id`
/// actually changed.
pub fn apply_move(nodes: &mut [MenuNode], command: &MoveCommand) -> Result<Vec<EntityId>, DomainError> {
    let node = nodes
        .iter()
        .find(|n| n.id == command.menu_id)
        .ok_or(DomainError::MenuNotFound(command.menu_id))?;
    let old_parent_id = node.parent_id;

    let mut origin = ordered_sibling_ids(nodes, old_parent_id);
    origin.retain(|id| *id != command.menu_id);

    let mut changed = Vec::new();
    if old_parent_id == command.new_parent_id {
        let index = command.new_index.min(origin.len());
        origin.insert(index, command.menu_id);
        renumber(nodes, &origin, old_parent_id, &mut changed);
    } else {
        let mut destination = ordered_sibling_ids(nodes, command.new_parent_id);
        let index = command.new_index.min(destination.len());
        destination.insert(index, command.menu_id);
        renumber(nodes, &origin, old_parent_id, &mut changed);
        renumber(nodes, &destination, command.new_parent_id, &mut changed);
    }
    Ok(changed)
}

/// Removes `menu_id` and promotes its children to the deleted node's former
/// parent, appended after the surviving siblings in their existing relative
/// order. The combined sibling set is renumbered contiguously.
///
/// Returns the removed node and the ids of every changed survivor.
pub fn apply_delete_promote(
    nodes: &mut Vec<MenuNode>,
    menu_id: EntityId,
) -> Result<(MenuNode, Vec<EntityId>), DomainError> {
    let index = nodes
        .iter()
        .position(|n| n.id == menu_id)
        .ok_or(DomainError::MenuNotFound(menu_id))?;
    let removed = nodes.remove(index);

    let mut combined = ordered_sibling_ids(nodes, removed.parent_id);
    combined.extend(ordered_sibling_ids(nodes, Some(removed.id)));

    let mut changed = Vec::new();
    renumber(nodes, &combined, removed.parent_id, &mut changed);
    Ok((removed, changed))
}

fn ordered_sibling_ids(nodes: &[MenuNode], parent_id: Option<EntityId>) -> Vec<EntityId> {
    let mut siblings: Vec<&MenuNode> = nodes.iter().filter(|n| n.parent_id == parent_id).collect();
    siblings.sort_by_key(|n| (n.display_order, n.id));
    siblings.iter().map(|n| n.id).collect()
}

fn renumber(
    nodes: &mut [MenuNode],
    ordered: &[EntityId],
    parent_id: Option<EntityId>,
    changed: &mut Vec<EntityId>,
) {
    for (position, id) in ordered.iter().enumerate() {
        if let Some(node) = nodes.iter_mut().find(|n| n.id == *id) {
            let order = position as i32;
            if node.display_order != order || node.parent_id != parent_id {
                node.display_order = order;
                node.parent_id = parent_id;
                changed.push(node.id);
            }
        }
    }
}
