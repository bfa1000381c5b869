use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, error::Error, repository::RepositoryState};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Claims
///
/// The payload structure embedded inside the session token. The token carries
/// exactly one identity claim (the admin id) plus standard issuance metadata.
/// Claims are signed with the server's secret and validated on every protected
/// request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the administrator the token was issued to.
    pub sub: Uuid,
    /// Issued At (iat): timestamp when the token was signed.
    pub iat: usize,
    /// Expiration Time (exp): only present when a session TTL is configured.
    /// Its absence is the default behavior, not an oversight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// TokenService
///
/// Issues and verifies the signed, stateless session token. The signing secret is
/// handed in at construction (never looked up ambiently), and the service holds no
/// other state: the server keeps no session table, so "logout" is purely client-side
/// deletion of the cookie.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Option<Duration>,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Option<Duration>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.session_ttl_secs.map(Duration::from_secs),
        )
    }

    /// issue
    ///
    /// Produces a signed token embedding `user_id` as its sole identity claim.
    /// The expiry claim is set only when a TTL was configured.
    pub fn issue(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = unix_now();
        let claims = Claims {
            sub: user_id,
            iat,
            exp: self.ttl.map(|ttl| iat + ttl.as_secs() as usize),
        };
        encode(&jsonwebtoken::Header::default(), &claims, &self.encoding)
    }

    /// verify
    ///
    /// Recomputes and checks the token signature, returning the embedded admin id.
    /// Every failure mode (missing claim, malformed token, bad signature, expired)
    /// collapses into `Error::Unauthenticated` so the caller cannot distinguish them.
    /// Pure: no side effects.
    pub fn verify(&self, token: &str) -> Result<Uuid, Error> {
        let mut validation = Validation::default();
        if self.ttl.is_none() {
            // Tokens are issued without an expiry in the default configuration, so
            // verification must not demand one.
            validation.required_spec_claims.clear();
            validation.validate_exp = false;
        }

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.sub)
            .map_err(|_| Error::Unauthenticated)
    }
}

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// login
///
/// The credential check. Looks up the admin by exact username, compares the supplied
/// password against the stored bcrypt hash (bcrypt performs the comparison in
/// constant time), and issues a session token on match.
///
/// Both "unknown username" and "wrong password" yield the identical
/// `Error::InvalidCredentials`, so the two cases are externally indistinguishable.
/// An undecodable stored hash is treated as a mismatch.
pub async fn login(
    repo: &RepositoryState,
    tokens: &TokenService,
    username: &str,
    password: &str,
) -> Result<String, Error> {
    let admin = repo
        .get_admin_by_username(username)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !bcrypt::verify(password, &admin.password_hash).unwrap_or(false) {
        return Err(Error::InvalidCredentials);
    }

    Ok(tokens.issue(admin.id)?)
}

// --- Session Cookie Helpers ---

/// Set-Cookie value installing the session token after a successful login.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/")
}

/// Set-Cookie value clearing the session token on logout.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Extracts a named cookie value from the request's Cookie header, if present.
fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// AuthUser
///
/// The resolved identity of an authenticated request. This is the output of the
/// session guard: handlers on protected routes receive it as an explicit argument
/// rather than reading identity out of mutated request state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The administrator id embedded in the verified session token.
    pub id: Uuid,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any protected handler. The admission decision:
/// 1. Read the session token from the `token` cookie. Absent cookie rejects
///    immediately without consulting the token service.
/// 2. Delegate to `TokenService::verify`. Any verification failure rejects.
/// 3. On success, the embedded admin id becomes the request identity.
///
/// Rejection: StatusCode::UNAUTHORIZED (401) on any failure, uniformly. The guard
/// does not log, retry, or rate-limit.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);

        let token = cookie_value(parts, SESSION_COOKIE).ok_or(StatusCode::UNAUTHORIZED)?;

        let user_id = tokens
            .verify(token)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser { id: user_id })
    }
}
