//! Drop gesture resolution

use serde::Serialize;
use sitenav_shared::EntityId;

use crate::domain::MenuNode;
use crate::error::DomainError;

/// Destination container of a drop gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// The site's top-level sibling set.
    Root { index: usize },
    /// The child list of an existing menu.
    Under { parent_id: EntityId, index: usize },
}

/// Raw drop gesture as reported by the surface: which node was dragged and
/// where it was released.
#[derive(Debug, Clone, Copy)]
pub struct DropGesture {
    pub menu_id: EntityId,
    pub target: DropTarget,
}

/// Normalized move. `new_index` is the position in the destination sibling
/// list after the node has left its origin slot (splice semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveCommand {
    pub menu_id: EntityId,
    pub new_parent_id: Option<EntityId>,
    pub new_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    RootReorder,
    ReparentToRoot,
    ReparentToChild,
    SameParentReorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMove {
    pub command: MoveCommand,
    pub kind: MoveKind,
}

/// Interprets a drop gesture against the current flat list.
///
/// Returns `Ok(None)` when source and destination resolve to the identical
/// parent and index; a canceled or null drag never reaches persistence.
/// Cycle legality is NOT decided here; `cycle::check_move` runs on the
/// resolved command.
pub fn resolve(nodes: &[MenuNode], gesture: &DropGesture) -> Result<Option<ResolvedMove>, DomainError> {
    let node = nodes
        .iter()
        .find(|n| n.id == gesture.menu_id)
        .ok_or(DomainError::MenuNotFound(gesture.menu_id))?;

    let (new_parent_id, requested_index) = match gesture.target {
        DropTarget::Root { index } => (None, index),
        DropTarget::Under { parent_id, index } => {
            if !nodes.iter().any(|n| n.id == parent_id) {
                return Err(DomainError::ParentNotFound(parent_id));
            }
            (Some(parent_id), index)
        }
    };

    // Destination slots are counted with the dragged node already removed.
    let destination_len = nodes
        .iter()
        .filter(|n| n.parent_id == new_parent_id && n.id != node.id)
        .count();
    let new_index = requested_index.min(destination_len);

    let same_parent = new_parent_id == node.parent_id;
    if same_parent && new_index == position_among_siblings(nodes, node) {
        return Ok(None);
    }

    let kind = match (same_parent, new_parent_id) {
        (true, None) => MoveKind::RootReorder,
        (true, Some(_)) => MoveKind::SameParentReorder,
        (false, None) => MoveKind::ReparentToRoot,
        (false, Some(_)) => MoveKind::ReparentToChild,
    };

    Ok(Some(ResolvedMove {
        command: MoveCommand {
            menu_id: node.id,
            new_parent_id,
            new_index,
        },
        kind,
    }))
}

fn position_among_siblings(nodes: &[MenuNode], node: &MenuNode) -> usize {
    let mut siblings: Vec<&MenuNode> = nodes.iter().filter(|n| n.parent_id == node.parent_id).collect();
    siblings.sort_by_key(|n| (n.display_order, n.id));
    siblings
        .iter()
        .position(|n| n.id == node.id)
        .unwrap_or(node.display_order as usize)
}
