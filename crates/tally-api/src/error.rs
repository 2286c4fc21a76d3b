//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::{FromRequest, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tally_core::Error as CoreError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid request body: {}", .0.body_text())]
  Body(#[from] JsonRejection),
}

/// A JSON request body whose rejections render as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct Payload<T>(pub T);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    let (status, body) = match &self {
      ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
      ApiError::Body(rejection) => (rejection.status(), json!({ "error": message })),
      ApiError::Core(e) => match e {
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, json!({ "error": message })),
        CoreError::InsufficientStock { available, requested } => (
          StatusCode::CONFLICT,
          json!({ "error": message, "available": available, "requested": requested }),
        ),
        CoreError::InvalidInput { field, .. } => (
          StatusCode::UNPROCESSABLE_ENTITY,
          json!({ "error": message, "field": field }),
        ),
        CoreError::Insufficient(_) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
        CoreError::DuplicateBarcode(barcode) => (
          StatusCode::CONFLICT,
          json!({ "error": message, "barcode": barcode }),
        ),
        CoreError::Storage(_) => {
          tracing::error!(error = %e, "request failed in storage");
          (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "internal storage error" }))
        }
      },
    };
    (status, Json(body)).into_response()
  }
}
