//! Bearer-token verification for the routes that write data or expose applicant records.
//!
//! Tokens are issued out of band (the identity provider hands one to each signed-in user) and
//! configured as `token=email` pairs. An empty registry means the service runs open, which is
//! how the original deployment behaved.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Email-backed identity resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Authentication is disabled; every request is trusted.
    Anonymous,
    Verified(Identity),
}

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Caller::Anonymous => None,
            Caller::Verified(identity) => Some(identity),
        }
    }

    /// Succeeds when the caller may act for `email`. The match is exact, like the store lookups.
    pub fn require_email(&self, email: &str) -> Result<(), AuthError> {
        match self {
            Caller::Anonymous => Ok(()),
            Caller::Verified(identity) if identity.email == email => Ok(()),
            Caller::Verified(identity) => Err(AuthError::Forbidden {
                email: identity.email.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("bearer token not recognized")]
    UnknownToken,
    #[error("{email} is not allowed to access this resource")]
    Forbidden { email: String },
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::UnknownToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Known tokens and the identities they stand for.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, Identity>,
}

impl TokenRegistry {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, T, E>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, E)>,
        T: Into<String>,
        E: Into<String>,
    {
        let tokens = pairs
            .into_iter()
            .map(|(token, email)| {
                (
                    token.into(),
                    Identity {
                        email: email.into(),
                    },
                )
            })
            .collect();
        Self { tokens }
    }

    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::UnknownToken)
    }

    pub fn caller_from_headers(&self, headers: &HeaderMap) -> Result<Caller, AuthError> {
        if !self.is_enabled() {
            return Ok(Caller::Anonymous);
        }

        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;

        self.verify(token).map(Caller::Verified)
    }
}

fn bearer_token(raw: &str) -> Option<&str> {
    let (scheme, token) = raw.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    Arc<TokenRegistry>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let registry = Arc::<TokenRegistry>::from_ref(state);
        registry.caller_from_headers(&parts.headers)
    }
}
