//! Board and content flows layered over [`MuralApi`](crate::net::api::MuralApi).
//!
//! These are independent of the session: failures come back as
//! [`ApiError`](crate::net::error::ApiError) and never touch session state.

pub mod contenido;
pub mod mural;

#[cfg(test)]
#[path = "mock_api_test.rs"]
pub(crate) mod mock_api;
