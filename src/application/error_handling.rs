// src/application/error_handling.rs
//
// Error responses for the UI
//
// ARCHITECTURE:
// - Maps internal errors to user-facing error panels
// - Never exposes storage internals
// - Logs the full error before it is reduced

use log::error;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, PlaybackError};

/// Payload of the dismissible error panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
    /// Dismissing the panel also closes the player
    pub dismiss_closes_player: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    NotFound,
    Validation,
    DomainError,
    Database,
    ExternalService,
    FileSystem,
    /// Terminal playback failure
    Playback,
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
            dismiss_closes_player: false,
        }
    }

    pub fn from_playback_error(error: &PlaybackError) -> Self {
        let (message, details) = match error {
            PlaybackError::SourceUnavailable { episode_id } => (
                "This episode has no playable video source",
                Some(format!("episode {}", episode_id)),
            ),
            PlaybackError::RecoveryExhausted { attempts, details } => (
                "Playback failed and could not be recovered",
                Some(format!("{} ({} attempts)", details, attempts)),
            ),
            PlaybackError::Unsupported => (
                "Video streaming is not supported on this device",
                None,
            ),
        };

        Self {
            dismiss_closes_player: true,
            ..Self::new(ErrorType::Playback, message, details)
        }
    }

    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound => Self::new(ErrorType::NotFound, "Resource not found", None),

            AppError::Domain(domain_error) => Self::new(
                ErrorType::DomainError,
                "Domain validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::Playback(playback_error) => Self::from_playback_error(&playback_error),

            AppError::Database(db_error) => {
                error!("database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                error!("connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Serialization(serde_error) => {
                error!("serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Io(io_error) => {
                error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::FileSystem,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Http(http_error) => {
                error!("content API error: {:?}", http_error);
                Self::new(
                    ErrorType::ExternalService,
                    "Content service unavailable",
                    Some(http_error.to_string()),
                )
            }

            AppError::Other(message) => {
                error!("other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }

    /// Serialized form handed back across the command boundary
    pub fn into_message(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| self.message)
    }
}

/// Convert command results into serialized error panels
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| ErrorResponse::from_app_error(e).into_message())
    }
}
