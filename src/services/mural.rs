//! Board listing, creation, joining, editing and deletion.
//!
//! DESIGN
//! ======
//! Inputs are validated locally first so a malformed request never reaches
//! the network. Mutations that change list membership (`join`, `delete`)
//! reload both lists afterwards, matching what a board dashboard shows next.

use tracing::info;

use crate::net::api::MuralApi;
use crate::net::error::ApiError;
use crate::net::types::{Contenido, Mural, MuralUpdate, NewMural, User};

/// Boards the user owns and boards they joined by code.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct MuralLists {
    pub own: Vec<Mural>,
    pub participant: Vec<Mural>,
}

/// Fetch own and participant boards concurrently. Both must succeed.
///
/// # Errors
///
/// Returns the first failure of either request.
pub async fn load_all(api: &dyn MuralApi) -> Result<MuralLists, ApiError> {
    let (own, participant) = tokio::try_join!(api.own_murales(), api.participant_murales())?;
    Ok(MuralLists { own, participant })
}

/// Create a board owned by `owner`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a blank title, otherwise the service's failure.
pub async fn create(
    api: &dyn MuralApi,
    titulo: &str,
    descripcion: &str,
    owner: Option<&User>,
) -> Result<Mural, ApiError> {
    let titulo = titulo.trim();
    if titulo.is_empty() {
        return Err(ApiError::Validation(vec!["titulo is required".to_owned()]));
    }
    let request = NewMural {
        titulo: titulo.to_owned(),
        descripcion: descripcion.trim().to_owned(),
        user: owner.and_then(|user| user.id.clone()),
    };
    let mural = api.create_mural(&request).await?;
    info!(mural_id = mural.id.as_deref().unwrap_or("?"), "mural created");
    Ok(mural)
}

/// Join a board by its access code, then reload both lists.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a blank code, otherwise the service's failure.
pub async fn join(api: &dyn MuralApi, codigo: &str) -> Result<MuralLists, ApiError> {
    let codigo = codigo.trim();
    if codigo.is_empty() {
        return Err(ApiError::Validation(vec!["codigo is required".to_owned()]));
    }
    api.join_mural(codigo).await?;
    info!(codigo, "joined mural");
    load_all(api).await
}

/// Delete a board, then reload both lists.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a blank id, otherwise the service's failure.
pub async fn delete(api: &dyn MuralApi, mural_id: &str) -> Result<MuralLists, ApiError> {
    let mural_id = require_id(mural_id)?;
    api.delete_mural(mural_id).await?;
    info!(mural_id, "mural deleted");
    load_all(api).await
}

/// List the content posted on a board.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a blank id, otherwise the service's failure.
pub async fn contents(api: &dyn MuralApi, mural_id: &str) -> Result<Vec<Contenido>, ApiError> {
    let mural_id = require_id(mural_id)?;
    api.mural_contents(mural_id).await
}

/// Edit a board's title and/or description.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when nothing would change or the new
/// title is blank, otherwise the service's failure.
pub async fn update(api: &dyn MuralApi, mural_id: &str, update: &MuralUpdate) -> Result<Mural, ApiError> {
    let mural_id = require_id(mural_id)?;
    if update.titulo.is_none() && update.descripcion.is_none() {
        return Err(ApiError::Validation(vec!["nothing to update".to_owned()]));
    }
    if update.titulo.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::Validation(vec!["titulo is required".to_owned()]));
    }
    api.update_mural(mural_id, update).await
}

fn require_id(mural_id: &str) -> Result<&str, ApiError> {
    let mural_id = mural_id.trim();
    if mural_id.is_empty() {
        return Err(ApiError::Validation(vec!["mural id is required".to_owned()]));
    }
    Ok(mural_id)
}

#[cfg(test)]
#[path = "mural_test.rs"]
mod tests;
