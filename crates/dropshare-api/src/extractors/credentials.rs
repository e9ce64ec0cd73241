//! `ShareCredentials` extractor: collects a share password or access token
//! from wherever the client put it.
//!
//! Sources, in order of precedence:
//! - `X-Share-Password` header / `password` query parameter
//! - `Authorization: Bearer <token>` header / `token` query parameter

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use serde::Deserialize;

use dropshare_service::Credentials;

/// Header carrying a plaintext share password.
pub const PASSWORD_HEADER: &str = "x-share-password";

#[derive(Debug, Default, Deserialize)]
struct CredentialQuery {
    password: Option<String>,
    token: Option<String>,
}

/// Credentials presented with a share request. Never rejects: missing
/// credentials are decided on by the lifecycle manager.
#[derive(Debug, Clone, Default)]
pub struct ShareCredentials(pub Credentials);

impl ShareCredentials {
    /// Returns the inner `Credentials`.
    pub fn into_inner(self) -> Credentials {
        self.0
    }
}

impl<S> FromRequestParts<S> for ShareCredentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<CredentialQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        let header_password = parts
            .headers
            .get(PASSWORD_HEADER)
            .and_then(|v| String::from_utf8(v.as_bytes().to_vec()).ok());

        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(auth)| auth.token().to_string());

        Ok(Self(Credentials {
            password: non_empty(header_password).or_else(|| non_empty(query.password)),
            token: non_empty(bearer).or_else(|| non_empty(query.token)),
        }))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
