//! Derived tree construction

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sitenav_shared::EntityId;

use crate::domain::MenuNode;

/// One node of the derived tree. `children` is a view recomputed from the
/// flat list, never a source of truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub menu: MenuNode,
    pub children: Vec<TreeNode>,
}

/// Builds the rooted forest for one site's flat node list.
///
/// Siblings are ordered by `display_order` (id as tiebreak), so the output
/// is identical for any permutation of the input. A node whose `parent_id`
/// references nothing in the list surfaces at the root level.
pub fn build(nodes: &[MenuNode]) -> Vec<TreeNode> {
    let ids: HashSet<EntityId> = nodes.iter().map(|n| n.id).collect();

    let mut by_parent: HashMap<EntityId, Vec<&MenuNode>> = HashMap::new();
    let mut roots: Vec<&MenuNode> = Vec::new();
    for node in nodes {
        match node.parent_id {
            Some(parent_id) if ids.contains(&parent_id) => {
                by_parent.entry(parent_id).or_default().push(node);
            }
            _ => roots.push(node),
        }
    }

    roots.sort_by_key(|n| (n.display_order, n.id));
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|n| (n.display_order, n.id));
    }

    roots.into_iter().map(|root| attach(root, &by_parent)).collect()
}

/// Forest of enabled nodes only; a disabled node prunes its whole subtree.
pub fn build_enabled(nodes: &[MenuNode]) -> Vec<TreeNode> {
    prune_disabled(build(nodes))
}

/// Preorder flattening of a forest back into the flat record list.
pub fn flatten(forest: &[TreeNode]) -> Vec<MenuNode> {
    let mut out = Vec::new();
    for tree_node in forest {
        out.push(tree_node.menu.clone());
        out.extend(flatten(&tree_node.children));
    }
    out
}

fn attach(menu: &MenuNode, by_parent: &HashMap<EntityId, Vec<&MenuNode>>) -> TreeNode {
    let children = by_parent
        .get(&menu.id)
        .map(|siblings| siblings.iter().map(|&child| attach(child, by_parent)).collect())
        .unwrap_or_default();
    TreeNode {
        menu: menu.clone(),
        children,
    }
}

fn prune_disabled(forest: Vec<TreeNode>) -> Vec<TreeNode> {
    forest
        .into_iter()
        .filter(|tree_node| tree_node.menu.enabled)
        .map(|mut tree_node| {
            tree_node.children = prune_disabled(std::mem::take(&mut tree_node.children));
            tree_node
        })
        .collect()
}
