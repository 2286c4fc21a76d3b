//! HTTP Basic authentication of tenants.
//!
//! Credentials are `phone:password`. The phone selects the tenant, the
//! password is checked against its argon2 PHC hash, and the resolved
//! [`TenantId`] travels on as a request extension.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;
use tally_core::{store::InventoryStore, tenant::TenantId};

use crate::{AppState, error::Error};

/// Split an `Authorization: Basic` header into `(phone, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded.trim()).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (phone, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  Ok((phone.trim().to_owned(), password.to_owned()))
}

/// Resolve the tenant the request's credentials belong to.
pub async fn verify_auth<S: InventoryStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<TenantId, Error> {
  let (phone, password) = basic_credentials(headers)?;

  let creds = store
    .find_credentials(&phone)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&creds.password_hash).map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(creds.tenant.tenant_id)
}

/// Middleware for every tenant-scoped route. Rejects with 401 or inserts the
/// caller's [`TenantId`] into the request extensions.
pub async fn require_tenant<S: InventoryStore + 'static>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let tenant = match verify_auth(req.headers(), state.engine.store().as_ref()).await {
    Ok(tenant) => tenant,
    Err(e) => {
      tracing::debug!(path = %req.uri().path(), "authentication failed");
      return Err(e);
    }
  };
  req.extensions_mut().insert(tenant);
  Ok(next.run(req).await)
}

/// Produce the argon2 PHC string stored for a tenant password.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
  use axum::http::{HeaderValue, header};

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn splits_phone_and_password() {
    let (phone, password) =
      basic_credentials(&headers(&basic("0711000000", "p:w"))).unwrap();
    assert_eq!(phone, "0711000000");
    assert_eq!(password, "p:w");
  }

  #[test]
  fn missing_header() {
    assert!(matches!(basic_credentials(&HeaderMap::new()), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let h = headers("Basic !!!not-base64!!!");
    assert!(matches!(basic_credentials(&h), Err(Error::Unauthorized)));
  }

  #[test]
  fn bearer_is_not_basic() {
    let h = headers("Bearer abc");
    assert!(matches!(basic_credentials(&h), Err(Error::Unauthorized)));
  }

  #[test]
  fn hash_verifies() {
    let hash = hash_password("secret").unwrap();
    let parsed = PasswordHash::new(&hash).unwrap();
    assert!(Argon2::default().verify_password(b"secret", &parsed).is_ok());
    assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
  }
}
