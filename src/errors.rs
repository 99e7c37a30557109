use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use serde_json::json;
use thiserror::Error;

/// Błędy ładowania katalogu produktów. Każdy z nich kończy się komunikatem
/// w obszarze produktów, nigdy błędem całej strony.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Brak identyfikatora sesji")]
    MissingSession,

    #[error("Katalog jest pusty")]
    Empty,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Błąd połączenia: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Nieprawidłowa odpowiedź: {0}")]
    Malformed(String),
}

impl CatalogError {
    /// Czy błąd dotyczy komunikacji z serwerem. Tylko wtedy strona pokazuje
    /// blok błędu z linkiem do ponowienia.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Status { .. } | CatalogError::Request(_) | CatalogError::Malformed(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Wewnętrzny błąd serwera")]
    InternalServerError(String),

    #[error("Błąd konfiguracji: {0}")]
    Config(String),

    #[error("Błąd katalogu: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Błąd renderowania HTML: {0}")]
    Rewriting(#[from] lol_html::errors::RewritingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::Config(message) => {
                tracing::error!("Błąd konfiguracji: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Błąd konfiguracji serwera".to_string(),
                )
            }
            AppError::Catalog(err) => {
                tracing::warn!("Błąd katalogu: {:?}", err);
                let status = match err {
                    CatalogError::MissingSession => StatusCode::BAD_REQUEST,
                    CatalogError::Empty => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, err.to_string())
            }
            AppError::Rewriting(err) => {
                tracing::error!("Błąd przetwarzania szablonu: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Błąd wczytywania szablonu strony".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
