//! Publishing text and media onto a mural.

use tracing::info;

use crate::net::api::MuralApi;
use crate::net::error::ApiError;
use crate::net::types::{Attachment, Contenido, NewContenido};

/// Post `texto` (and optionally a file) to a board.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when the board id or text is blank,
/// otherwise the service's failure.
pub async fn publish(
    api: &dyn MuralApi,
    mural_id: &str,
    texto: &str,
    archivo: Option<Attachment>,
) -> Result<Contenido, ApiError> {
    let mural_id = mural_id.trim();
    let mut errors = Vec::new();
    if mural_id.is_empty() {
        errors.push("mural id is required".to_owned());
    }
    if texto.trim().is_empty() {
        errors.push("texto is required".to_owned());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let request = NewContenido { texto: texto.to_owned(), archivo };
    let contenido = api.upload_contenido(mural_id, &request).await?;
    info!(mural_id, with_file = request.archivo.is_some(), "contenido published");
    Ok(contenido)
}

#[cfg(test)]
#[path = "contenido_test.rs"]
mod tests;
