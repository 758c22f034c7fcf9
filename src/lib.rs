//! Murales client: session lifecycle and REST plumbing for the mural board service.
//!
//! SYSTEM CONTEXT
//! ==============
//! The remote service owns users, boards ("murales") and posted content. This
//! crate is the client side: [`state::session::SessionManager`] owns "who is
//! logged in", [`net::api::HttpApi`] talks to the service, and
//! [`net::token`] persists the opaque session cookie between runs.
//!
//! Consumers (the `murales` binary, or any embedding UI) hold an
//! `Arc<SessionManager>` and read its state; they never mutate session state
//! directly.

pub mod config;
pub mod net;
pub mod services;
pub mod state;

pub use config::ClientConfig;
pub use net::api::{HttpApi, IdentityApi, MuralApi};
pub use net::error::{ApiError, ErrorKind};
pub use net::token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use state::session::{Session, SessionError, SessionManager, SessionPhase};
