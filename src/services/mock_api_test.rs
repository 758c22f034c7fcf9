//! Scripted [`MuralApi`] for service and state tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::net::api::MuralApi;
use crate::net::error::ApiError;
use crate::net::types::{Contenido, Mural, MuralUpdate, NewContenido, NewMural};

/// Every call is logged as `"<op> <arg>"`; list endpoints default to empty lists.
#[derive(Default)]
pub struct MockMuralApi {
    pub log: Mutex<Vec<String>>,
    pub created: Mutex<Vec<NewMural>>,
    pub uploaded: Mutex<Vec<NewContenido>>,
    pub own: Mutex<VecDeque<Result<Vec<Mural>, ApiError>>>,
    pub participant: Mutex<VecDeque<Result<Vec<Mural>, ApiError>>>,
    pub join: Mutex<VecDeque<Result<(), ApiError>>>,
    pub delete: Mutex<VecDeque<Result<(), ApiError>>>,
    pub create: Mutex<VecDeque<Result<Mural, ApiError>>>,
    pub update: Mutex<VecDeque<Result<Mural, ApiError>>>,
    pub contents: Mutex<VecDeque<Result<Vec<Contenido>, ApiError>>>,
    pub upload: Mutex<VecDeque<Result<Contenido, ApiError>>>,
}

impl MockMuralApi {
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

pub fn mural(id: &str, titulo: &str) -> Mural {
    Mural { id: Some(id.to_owned()), titulo: titulo.to_owned(), ..Mural::default() }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>, default: impl FnOnce() -> Result<T, ApiError>) -> Result<T, ApiError> {
    queue.lock().unwrap().pop_front().unwrap_or_else(default)
}

fn unscripted<T>() -> Result<T, ApiError> {
    Err(ApiError::Transport("unscripted call".into()))
}

#[async_trait::async_trait]
impl MuralApi for MockMuralApi {
    async fn create_mural(&self, mural: &NewMural) -> Result<Mural, ApiError> {
        self.record(format!("create {}", mural.titulo));
        self.created.lock().unwrap().push(mural.clone());
        next(&self.create, unscripted)
    }

    async fn own_murales(&self) -> Result<Vec<Mural>, ApiError> {
        self.record("own".to_owned());
        next(&self.own, || Ok(Vec::new()))
    }

    async fn participant_murales(&self) -> Result<Vec<Mural>, ApiError> {
        self.record("participant".to_owned());
        next(&self.participant, || Ok(Vec::new()))
    }

    async fn join_mural(&self, codigo: &str) -> Result<(), ApiError> {
        self.record(format!("join {codigo}"));
        next(&self.join, || Ok(()))
    }

    async fn mural_contents(&self, mural_id: &str) -> Result<Vec<Contenido>, ApiError> {
        self.record(format!("contents {mural_id}"));
        next(&self.contents, || Ok(Vec::new()))
    }

    async fn update_mural(&self, mural_id: &str, _update: &MuralUpdate) -> Result<Mural, ApiError> {
        self.record(format!("update {mural_id}"));
        next(&self.update, unscripted)
    }

    async fn delete_mural(&self, mural_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete {mural_id}"));
        next(&self.delete, || Ok(()))
    }

    async fn upload_contenido(&self, mural_id: &str, contenido: &NewContenido) -> Result<Contenido, ApiError> {
        self.record(format!("upload {mural_id}"));
        self.uploaded.lock().unwrap().push(contenido.clone());
        next(&self.upload, unscripted)
    }
}
