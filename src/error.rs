use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error
///
/// The application-wide error taxonomy. Every fallible operation in the core funnels
/// into one of these variants, and the `IntoResponse` impl is the single place where
/// they are turned into user-facing responses.
///
/// Propagation policy:
/// - `Unauthenticated` is produced and consumed entirely by the session guard; it
///   never reaches a business handler.
/// - `InvalidCredentials` and `NotFound` are handled at the handler boundary.
/// - `Store` and `Signing` are logged here and collapse into a generic 500 without
///   leaking internal detail. Store failures are never retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, malformed, or unverifiable session credential. All token failure
    /// modes map to this single value so callers cannot distinguish them.
    #[error("authentication required")]
    Unauthenticated,

    /// Login failure. Unknown username and wrong password are deliberately
    /// indistinguishable to avoid username enumeration.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The requested post id does not exist.
    #[error("not found")]
    NotFound,

    /// Reserved for malformed input; not actively produced.
    #[error("invalid input: {0}")]
    Validation(String),

    /// An underlying persistence call failed.
    #[error("store operation failed")]
    Store(#[from] sqlx::Error),

    /// Token signing failed. HS256 signing with a valid key does not fail in
    /// practice, but the signing API is fallible.
    #[error("token signing failed")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthenticated | Error::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            Error::NotFound => (StatusCode::NOT_FOUND, "Post not found").into_response(),
            Error::Validation(detail) => (StatusCode::BAD_REQUEST, detail).into_response(),
            Error::Store(e) => {
                tracing::error!("store failure: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
            }
            Error::Signing(e) => {
                tracing::error!("token signing failure: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
            }
        }
    }
}
