//! # Sitenav Gateway
//!
//! HTTP adapter implementing the core menu gateway port against the remote
//! admin API.

pub mod http;

pub use http::HttpMenuGateway;
