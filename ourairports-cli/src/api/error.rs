//! Error taxonomy for catalog API calls
//!
//! CKAN reports failures both through HTTP status codes and through the
//! `error.__type` field of its action envelope. Both are folded into a
//! single [`CatalogErrorKind`] so callers can tell "not found" and
//! "conflict" apart from transport problems.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    /// The requested package or group does not exist
    NotFound,
    /// The catalog rejected the payload (e.g. the name is already in use)
    Conflict,
    /// Missing or insufficient API key
    Auth,
    /// Any other non-success answer from the catalog
    Server,
    /// Connection, TLS or timeout failure before a response was read
    Transport,
    /// Response or request body could not be (de)serialized
    Serialization,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct CatalogError {
    pub kind: CatalogErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl CatalogError {
    pub fn new(kind: CatalogErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == CatalogErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == CatalogErrorKind::Conflict
    }

    /// Classify a failed action from its HTTP status and CKAN `__type`.
    ///
    /// The `__type` wins when present; CKAN sometimes answers 400 for
    /// validation errors and 403 for missing packages on private orgs.
    pub fn classify(status: u16, error_type: Option<&str>) -> CatalogErrorKind {
        match error_type {
            Some("Not Found Error") => return CatalogErrorKind::NotFound,
            Some("Validation Error") => return CatalogErrorKind::Conflict,
            Some("Authorization Error") => return CatalogErrorKind::Auth,
            _ => {}
        }
        match status {
            404 => CatalogErrorKind::NotFound,
            409 => CatalogErrorKind::Conflict,
            401 | 403 => CatalogErrorKind::Auth,
            _ => CatalogErrorKind::Server,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        let kind = if e.is_decode() {
            CatalogErrorKind::Serialization
        } else {
            CatalogErrorKind::Transport
        };
        CatalogError::new(kind, status, e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::new(CatalogErrorKind::Serialization, None, e.to_string())
    }
}
