//! HTTP request handlers.

pub mod dispatch;
pub mod health;

use crate::http::error::AppError;

/// Router fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

pub async fn get_required() -> AppError {
    AppError::MethodNotAllowed("GET")
}

pub async fn post_required() -> AppError {
    AppError::MethodNotAllowed("POST")
}
