//! HTTP gateway implementation

pub mod dto;
pub mod menu_gateway_impl;

pub use menu_gateway_impl::HttpMenuGateway;
