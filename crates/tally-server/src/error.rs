//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("password hashing failed: {0}")]
  Hash(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" })))
            .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"tally\""),
        );
        res
      }
      Error::Hash(_) | Error::Store(_) => {
        tracing::error!(error = %self, "authentication backend failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal error" })),
        )
          .into_response()
      }
    }
  }
}
