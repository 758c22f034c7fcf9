//! Client state owned by the library: the auth session and board lists.

pub mod murales;
pub mod session;
