//! REST transport for the mural service.
//!
//! DESIGN
//! ======
//! Two collaborator traits split the service: [`IdentityApi`] (consumed by the
//! session manager) and [`MuralApi`] (boards and posted content). Both are
//! `async_trait` seams so tests substitute scripted mocks. [`HttpApi`]
//! implements both over one `reqwest` client.
//!
//! Requests are credentialed the way a browser would send them: the stored
//! token goes out as a cookie, and every response's `Set-Cookie` for that
//! cookie is written back to the [`TokenStore`]. Pure helpers (endpoint paths,
//! body parsing) are kept separate for testability.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use super::error::ApiError;
use super::token::{TokenError, TokenStore, cookie_update};
use super::types::{
    Contenido, Credentials, Mural, MuralUpdate, NewContenido, NewMural, ProfileUpdate, Registration, User,
};
use crate::config::ClientConfig;

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// Identity endpoints: registration, login, session verification, profile.
#[async_trait::async_trait]
pub trait IdentityApi: Send + Sync {
    /// `POST /registrar`.
    async fn register(&self, registration: &Registration) -> Result<User, ApiError>;

    /// `POST /login`.
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError>;

    /// `GET /verify`. `Ok(None)` when the service answers with an empty body.
    async fn verify(&self) -> Result<Option<User>, ApiError>;

    /// `POST /logout`.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `GET /perfil`.
    async fn profile(&self) -> Result<User, ApiError>;

    /// `PUT /profile`.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError>;
}

/// Board and content endpoints.
#[async_trait::async_trait]
pub trait MuralApi: Send + Sync {
    /// `POST /subirMural`.
    async fn create_mural(&self, mural: &NewMural) -> Result<Mural, ApiError>;

    /// `GET /verMisMurales`.
    async fn own_murales(&self) -> Result<Vec<Mural>, ApiError>;

    /// `GET /murales-participante`.
    async fn participant_murales(&self) -> Result<Vec<Mural>, ApiError>;

    /// `POST /unirse`.
    async fn join_mural(&self, codigo: &str) -> Result<(), ApiError>;

    /// `GET /verPublicacionesMural/:id`.
    async fn mural_contents(&self, mural_id: &str) -> Result<Vec<Contenido>, ApiError>;

    /// `PUT /actualizarMural/:id`.
    async fn update_mural(&self, mural_id: &str, update: &MuralUpdate) -> Result<Mural, ApiError>;

    /// `DELETE /bajarMural/:id`.
    async fn delete_mural(&self, mural_id: &str) -> Result<(), ApiError>;

    /// `POST /subirPublicacion/:muralId` (multipart).
    async fn upload_contenido(&self, mural_id: &str, contenido: &NewContenido) -> Result<Contenido, ApiError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

const REGISTER_PATH: &str = "/registrar";
const LOGIN_PATH: &str = "/login";
const VERIFY_PATH: &str = "/verify";
const LOGOUT_PATH: &str = "/logout";
const PROFILE_PATH: &str = "/perfil";
const PROFILE_UPDATE_PATH: &str = "/profile";
const CREATE_MURAL_PATH: &str = "/subirMural";
const OWN_MURALES_PATH: &str = "/verMisMurales";
const PARTICIPANT_MURALES_PATH: &str = "/murales-participante";
const JOIN_MURAL_PATH: &str = "/unirse";

fn mural_contents_endpoint(mural_id: &str) -> String {
    format!("/verPublicacionesMural/{mural_id}")
}

fn update_mural_endpoint(mural_id: &str) -> String {
    format!("/actualizarMural/{mural_id}")
}

fn delete_mural_endpoint(mural_id: &str) -> String {
    format!("/bajarMural/{mural_id}")
}

fn upload_contenido_endpoint(mural_id: &str) -> String {
    format!("/subirPublicacion/{mural_id}")
}

// =============================================================================
// BODY PARSING
// =============================================================================

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `/verify` answers with a user, or with nothing when there is no session.
fn parse_optional_user(body: &str) -> Result<Option<User>, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_json::<Option<User>>(trimmed)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// `reqwest`-backed implementation of both collaborator traits.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    cookie_name: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpApi {
    /// Build a client from config, sharing `tokens` with the session manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            cookie_name: config.cookie_name.clone(),
            tokens,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request with the session cookie attached; return the raw body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let request = match self.stored_token()? {
            Some(token) => request.header(COOKIE, format!("{}={token}", self.cookie_name)),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        self.absorb_cookies(response.headers());

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !is_success(status) {
            tracing::debug!(status, "request rejected");
            return Err(ApiError::from_response(status, &body));
        }
        Ok(body)
    }

    /// A corrupt token is sent as no cookie at all; the next `Set-Cookie` overwrites it.
    fn stored_token(&self) -> Result<Option<String>, ApiError> {
        match self.tokens.load() {
            Ok(token) => Ok(token),
            Err(TokenError::Corrupt(reason)) => {
                tracing::warn!(%reason, "ignoring unreadable session token");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        parse_json(&body)
    }

    /// Mirror the service's `Set-Cookie` decisions into the token store.
    fn absorb_cookies(&self, headers: &HeaderMap) {
        let now = OffsetDateTime::now_utc();
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            let Some(update) = cookie_update(raw, &self.cookie_name, now) else {
                continue;
            };
            if let Err(e) = self.tokens.apply(&update) {
                tracing::warn!(error = %e, "failed to persist session cookie");
            }
        }
    }
}

#[async_trait::async_trait]
impl IdentityApi for HttpApi {
    async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        self.send_json(self.http.post(self.url(REGISTER_PATH)).json(registration))
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.send_json(self.http.post(self.url(LOGIN_PATH)).json(credentials))
            .await
    }

    async fn verify(&self) -> Result<Option<User>, ApiError> {
        let body = self.send(self.http.get(self.url(VERIFY_PATH))).await?;
        parse_optional_user(&body)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.http.post(self.url(LOGOUT_PATH))).await?;
        Ok(())
    }

    async fn profile(&self) -> Result<User, ApiError> {
        self.send_json(self.http.get(self.url(PROFILE_PATH))).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.send_json(self.http.put(self.url(PROFILE_UPDATE_PATH)).json(update))
            .await
    }
}

#[async_trait::async_trait]
impl MuralApi for HttpApi {
    async fn create_mural(&self, mural: &NewMural) -> Result<Mural, ApiError> {
        self.send_json(self.http.post(self.url(CREATE_MURAL_PATH)).json(mural))
            .await
    }

    async fn own_murales(&self) -> Result<Vec<Mural>, ApiError> {
        self.send_json(self.http.get(self.url(OWN_MURALES_PATH))).await
    }

    async fn participant_murales(&self) -> Result<Vec<Mural>, ApiError> {
        self.send_json(self.http.get(self.url(PARTICIPANT_MURALES_PATH)))
            .await
    }

    async fn join_mural(&self, codigo: &str) -> Result<(), ApiError> {
        let payload = serde_json::json!({ "codigo": codigo });
        self.send(self.http.post(self.url(JOIN_MURAL_PATH)).json(&payload))
            .await?;
        Ok(())
    }

    async fn mural_contents(&self, mural_id: &str) -> Result<Vec<Contenido>, ApiError> {
        let url = self.url(&mural_contents_endpoint(mural_id));
        self.send_json(self.http.get(url)).await
    }

    async fn update_mural(&self, mural_id: &str, update: &MuralUpdate) -> Result<Mural, ApiError> {
        let url = self.url(&update_mural_endpoint(mural_id));
        self.send_json(self.http.put(url).json(update)).await
    }

    async fn delete_mural(&self, mural_id: &str) -> Result<(), ApiError> {
        let url = self.url(&delete_mural_endpoint(mural_id));
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn upload_contenido(&self, mural_id: &str, contenido: &NewContenido) -> Result<Contenido, ApiError> {
        let mut form = Form::new().text("texto", contenido.texto.clone());
        if let Some(archivo) = &contenido.archivo {
            let part = Part::bytes(archivo.bytes.clone())
                .file_name(archivo.file_name.clone())
                .mime_str(&archivo.content_type)
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            form = form.part("archivo", part);
        }
        let url = self.url(&upload_contenido_endpoint(mural_id));
        self.send_json(self.http.post(url).multipart(form)).await
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
