//! # Sitenav Core - Domain Module
//!
//! Domain entities for the navigation console.

pub mod menu;

// Re-export all entities
pub use menu::{MenuCreate, MenuDetails, MenuNode, MenuReplace};
