//! Cycle guard for reparenting moves

use std::collections::HashMap;

use sitenav_shared::EntityId;

use crate::domain::MenuNode;
use crate::error::DomainError;
use crate::tree::resolver::MoveCommand;

/// Reports whether `candidate` is `node_id` itself or lies anywhere in the
/// subtree below `node_id`.
pub fn is_descendant(nodes: &[MenuNode], candidate: EntityId, node_id: EntityId) -> bool {
    if candidate == node_id {
        return true;
    }

    let mut children: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
    for node in nodes {
        if let Some(parent_id) = node.parent_id {
            children.entry(parent_id).or_default().push(node.id);
        }
    }

    let mut stack = vec![node_id];
    while let Some(current) = stack.pop() {
        if let Some(kids) = children.get(&current) {
            for &child in kids {
                if child == candidate {
                    return true;
                }
                stack.push(child);
            }
        }
    }
    false
}

/// Rejects a command whose destination parent would close a parent cycle:
/// the dragged node itself or any of its descendants. A rejected move must
/// have no observable effect, so this runs before any mutation.
pub fn check_move(nodes: &[MenuNode], command: &MoveCommand) -> Result<(), DomainError> {
    if let Some(parent_id) = command.new_parent_id {
        if is_descendant(nodes, parent_id, command.menu_id) {
            return Err(DomainError::CycleDetected {
                menu_id: command.menu_id,
                parent_id,
            });
        }
    }
    Ok(())
}
