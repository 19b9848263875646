//! Gateway traits (ports)

pub mod menu_gateway;

pub use menu_gateway::MenuGateway;
