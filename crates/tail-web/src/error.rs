//! Error responses for HTML and JSON handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("{:#}", self);
        let status = match self {
            WebError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, "Page rendering failed").into_response()
    }
}
