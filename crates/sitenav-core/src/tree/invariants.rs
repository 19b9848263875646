//! Structural invariant checks over a flat node list

use std::collections::{HashMap, HashSet};

use crate::domain::MenuNode;

/// Returns a human-readable description of every violated invariant:
/// non-contiguous sibling orders, dangling parents, cross-site parents,
/// and parent chains that never reach a root.
pub fn violations(nodes: &[MenuNode]) -> Vec<String> {
    let mut out = Vec::new();
    let by_id: HashMap<_, _> = nodes.iter().map(|n| (n.id, n)).collect();

    // Sibling sets must carry exactly {0..k-1}.
    let mut sibling_orders: HashMap<Option<_>, Vec<i32>> = HashMap::new();
    for node in nodes {
        sibling_orders.entry(node.parent_id).or_default().push(node.display_order);
    }
    for (parent_id, mut orders) in sibling_orders {
        orders.sort_unstable();
        let expected: Vec<i32> = (0..orders.len() as i32).collect();
        if orders != expected {
            out.push(format!(
                "sibling set under {:?} has orders {:?}, expected {:?}",
                parent_id, orders, expected
            ));
        }
    }

    for node in nodes {
        if let Some(parent_id) = node.parent_id {
            match by_id.get(&parent_id) {
                None => out.push(format!("menu {} references missing parent {}", node.id, parent_id)),
                Some(parent) if parent.site_id != node.site_id => {
                    out.push(format!("menu {} references parent {} in another site", node.id, parent_id))
                }
                _ => {}
            }
        }
    }

    // Parent chains must terminate at a root.
    for node in nodes {
        let mut seen = HashSet::new();
        let mut current = node;
        loop {
            if !seen.insert(current.id) {
                out.push(format!("parent chain starting at {} revisits {}", node.id, current.id));
                break;
            }
            match current.parent_id.and_then(|p| by_id.get(&p).copied()) {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    out
}
