//! Board-list state for the dashboard view.
//!
//! DESIGN
//! ======
//! Kept apart from the auth session: a failed board load sets `error` here
//! and never touches who is logged in.

use crate::net::error::ApiError;
use crate::net::types::Mural;
use crate::services::mural::MuralLists;

const LOAD_FALLBACK: &str = "could not load murales";

/// Own and participant boards plus load status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MuralesState {
    pub own: Vec<Mural>,
    pub participant: Vec<Mural>,
    pub loading: bool,
    pub error: Option<String>,
}

impl MuralesState {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Apply a load outcome. On failure the previous lists are kept.
    pub fn finish_load(&mut self, result: Result<MuralLists, ApiError>) {
        self.loading = false;
        match result {
            Ok(lists) => {
                self.own = lists.own;
                self.participant = lists.participant;
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.messages_or(LOAD_FALLBACK).join("; "));
            }
        }
    }

    /// Look a board up in either list.
    #[must_use]
    pub fn find(&self, mural_id: &str) -> Option<&Mural> {
        self.own
            .iter()
            .chain(self.participant.iter())
            .find(|mural| mural.id.as_deref() == Some(mural_id))
    }

    /// Whether the board is one of the user's own (editable/deletable) boards.
    #[must_use]
    pub fn is_owned(&self, mural_id: &str) -> bool {
        self.own.iter().any(|mural| mural.id.as_deref() == Some(mural_id))
    }
}

#[cfg(test)]
#[path = "murales_test.rs"]
mod tests;
