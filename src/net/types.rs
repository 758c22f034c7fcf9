//! Wire DTOs for the mural service.
//!
//! DESIGN
//! ======
//! The service speaks Spanish camelCase JSON (`nombreUsuario`, `codigoAcceso`,
//! `fechaSubida`) and Mongo-style `_id` keys. Response records keep every
//! field optional so a sparse or evolving payload still decodes; request
//! payloads are strict and validate locally before any network call.

use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// RECORDS
// =============================================================================

/// A user record as returned by `/login`, `/registrar`, `/verify` and `/perfil`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "UserWire")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_usuario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
}

impl User {
    /// Overwrite only the fields that `update` carries.
    pub fn merge(&mut self, update: User) {
        if update.id.is_some() {
            self.id = update.id;
        }
        if update.nombre_usuario.is_some() {
            self.nombre_usuario = update.nombre_usuario;
        }
        if update.correo.is_some() {
            self.correo = update.correo;
        }
    }

    /// Human-facing label: display name, then email, then id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nombre_usuario
            .as_deref()
            .or(self.correo.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("usuario")
    }
}

/// A user reference that the service returns either as a bare id or populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(#[serde(deserialize_with = "deserialize_id")] String),
    User(User),
}

impl UserRef {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::User(user) => user.id.as_deref(),
        }
    }
}

/// A board ("mural") owned by one user and joinable via its access code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "MuralWire")]
pub struct Mural {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub titulo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_acceso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

/// Uploaded media metadata attached to a content record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archivo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

/// A text-and-optional-media post attached to a mural.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ContenidoWire")]
pub struct Contenido {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub texto: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archivo: Option<Archivo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_subida: Option<String>,
}

// =============================================================================
// REQUEST PAYLOADS
// =============================================================================

/// Body of `POST /registrar`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub nombre_usuario: String,
    pub correo: String,
    pub password: String,
}

impl Registration {
    /// Check required fields locally.
    ///
    /// # Errors
    ///
    /// Returns every failed rule, in field order.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        require(&mut errors, &self.nombre_usuario, "nombreUsuario");
        require_email(&mut errors, &self.correo);
        require(&mut errors, &self.password, "password");
        finish(errors)
    }
}

/// Body of `POST /login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub correo: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(correo: impl Into<String>, password: impl Into<String>) -> Self {
        Self { correo: correo.into(), password: password.into() }
    }

    /// Check required fields locally.
    ///
    /// # Errors
    ///
    /// Returns every failed rule, in field order.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        require_email(&mut errors, &self.correo);
        require(&mut errors, &self.password, "password");
        finish(errors)
    }
}

/// Body of `PUT /profile`. Absent fields are left untouched server-side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_usuario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
}

impl ProfileUpdate {
    /// # Errors
    ///
    /// Fails when no field is set or a set field is blank.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.nombre_usuario.is_none() && self.correo.is_none() {
            errors.push("nothing to update".to_owned());
        }
        if let Some(name) = &self.nombre_usuario {
            require(&mut errors, name, "nombreUsuario");
        }
        if let Some(correo) = &self.correo {
            require_email(&mut errors, correo);
        }
        finish(errors)
    }
}

/// Body of `POST /subirMural`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewMural {
    pub titulo: String,
    pub descripcion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Body of `PUT /actualizarMural/:id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MuralUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

/// Multipart payload of `POST /subirPublicacion/:muralId`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewContenido {
    pub texto: String,
    pub archivo: Option<Attachment>,
}

/// A file sent as the `archivo` multipart part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Build an attachment, guessing the content type from the file name.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        Self { file_name, content_type, bytes }
    }

    /// Read a file from disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "archivo".to_owned(), |name| name.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }
}

/// `{ "message": ... }` error body. The service sends either one string or a list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<MessageField>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MessageField {
    One(String),
    Many(Vec<String>),
}

impl MessageField {
    /// Flatten into a list, dropping blank entries.
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        let all = match self {
            Self::One(message) => vec![message],
            Self::Many(messages) => messages,
        };
        all.into_iter()
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty())
            .collect()
    }
}

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

fn require(errors: &mut Vec<String>, value: &str, field: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    }
}

fn require_email(errors: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.push("correo is required".to_owned());
    } else if !looks_like_email(value) {
        errors.push("correo is not a valid email address".to_owned());
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !value.contains(char::is_whitespace)
}

fn finish(errors: Vec<String>) -> Result<(), Vec<String>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// =============================================================================
// ID DECODING
// =============================================================================

/// Ids arrive as strings (`_id`) or plain numbers depending on the backend.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        _ => Err(D::Error::custom("expected string or number id")),
    }
}

#[derive(Deserialize)]
struct WireId(#[serde(deserialize_with = "deserialize_id")] String);

/// `id` wins over `_id` when a payload carries both.
fn pick_id(id: Option<WireId>, mongo_id: Option<WireId>) -> Option<String> {
    id.or(mongo_id).map(|WireId(id)| id)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWire {
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<WireId>,
    #[serde(default)]
    nombre_usuario: Option<String>,
    #[serde(default)]
    correo: Option<String>,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        Self { id: pick_id(wire.id, wire.mongo_id), nombre_usuario: wire.nombre_usuario, correo: wire.correo }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MuralWire {
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<WireId>,
    #[serde(default)]
    titulo: String,
    #[serde(default)]
    descripcion: Option<String>,
    #[serde(default)]
    codigo_acceso: Option<String>,
    #[serde(default)]
    user: Option<UserRef>,
}

impl From<MuralWire> for Mural {
    fn from(wire: MuralWire) -> Self {
        Self {
            id: pick_id(wire.id, wire.mongo_id),
            titulo: wire.titulo,
            descripcion: wire.descripcion,
            codigo_acceso: wire.codigo_acceso,
            user: wire.user,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContenidoWire {
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<WireId>,
    #[serde(default)]
    texto: String,
    #[serde(default)]
    user: Option<UserRef>,
    #[serde(default)]
    archivo: Option<Archivo>,
    #[serde(default)]
    fecha_subida: Option<String>,
}

impl From<ContenidoWire> for Contenido {
    fn from(wire: ContenidoWire) -> Self {
        Self {
            id: pick_id(wire.id, wire.mongo_id),
            texto: wire.texto,
            user: wire.user,
            archivo: wire.archivo,
            fecha_subida: wire.fecha_subida,
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
