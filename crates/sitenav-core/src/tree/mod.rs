//! # Sitenav Core - Tree Module
//!
//! The menu reorder engine: building the derived tree, guarding against
//! cycles, resolving drop gestures, renumbering sibling sets, and advising
//! the post-delete selection. Everything here is pure and synchronous; the
//! persistence fan-out lives in `services`.

pub mod builder;
pub mod cycle;
pub mod invariants;
pub mod renumber;
pub mod resolver;
pub mod selection;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use builder::{build, build_enabled, flatten, TreeNode};
pub use cycle::{check_move, is_descendant};
pub use renumber::{apply_delete_promote, apply_move, next_order};
pub use resolver::{resolve, DropGesture, DropTarget, MoveCommand, MoveKind, ResolvedMove};
pub use selection::next_selection;
