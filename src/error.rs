use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Failure taxonomy for the whole application. Handlers catch the
/// user-facing variants and turn them into a flash notice plus a redirect;
/// anything that escapes a handler is mapped to a status code here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("an account with that email or username already exists")]
    DuplicateIdentity,

    #[error("invalid username or password")]
    InvalidCredentials,

    /// Not authenticated at all.
    #[error("you must be logged in")]
    Unauthorized,

    /// Authenticated but lacking ownership or role.
    #[error("you do not have permission to do that")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("missing required field: {0}")]
    Validation(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("upload error: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateIdentity => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) | AppError::Session(_) | AppError::Io(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
