//! # Sitenav Core
//!
//! Domain entities, the menu reorder engine, and the gateway port for the
//! sitenav console.

pub mod domain;
pub mod error;
pub mod gateway;
pub mod services;
pub mod tree;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
