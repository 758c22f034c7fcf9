//! Network layer: wire types, error normalization, token persistence, HTTP transport.

pub mod api;
pub mod error;
pub mod token;
pub mod types;
