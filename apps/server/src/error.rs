use std::io::Error as IoError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] vigil_service::config::ConfigError),
    #[error("Database error: {0:#}")]
    Database(anyhow::Error),
}

/// Response body shared by every API route
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success { data: T },
    Error { message: String },
}

pub fn success<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::Success { data })
}

/// Errors returned by API handlers, rendered as an error envelope
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    /// Store failure; the cause is logged, the client only sees `message`
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn service_not_found() -> Self {
        Self::NotFound("Service not found".into())
    }

    /// Adapter for `map_err` on store calls
    pub fn internal(message: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Internal { message, source }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Internal { message, source } = self {
            tracing::error!("{}: {:#}", message, source);
        }
        HttpResponse::build(self.status_code())
            .json(Envelope::<()>::Error { message: self.to_string() })
    }
}
