use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// These routes handle the read-only public surface of the blog plus the login
/// and logout gateway functions.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /?page=N
        // The paginated front page, newest posts first. The page parameter
        // defaults to 1 when absent or non-numeric.
        .route("/", get(handlers::home))
        // GET /post/{id}
        // Detailed view of a single post.
        .route("/post/{id}", get(handlers::view_post))
        // POST /search
        // Free-text search over title and body. The form field `searchTerm` is
        // sanitized in the repository before matching.
        .route("/search", post(handlers::search_posts))
        // GET /about
        // Static page.
        .route("/about", get(handlers::about))
        // GET /admin  - login form
        // POST /admin - credential check; sets the session cookie on success and
        // redirects to /dashboard.
        .route(
            "/admin",
            get(handlers::login_page).post(handlers::submit_login),
        )
        // GET /logout
        // Clears the session cookie and redirects to the front page. Unguarded:
        // clearing an absent cookie is harmless.
        .route("/logout", get(handlers::logout))
}
