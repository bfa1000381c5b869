use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get},
};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to the authenticated administrator:
/// the dashboard and the create/edit/delete post operations.
///
/// Access Control:
/// This entire router is wrapped in the session-guard route layer (see
/// `create_router`), which verifies the session token before any handler here is
/// invoked. Each handler additionally extracts `AuthUser`, so the resolved
/// identity is passed explicitly rather than read from shared request state.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // Lists every post with edit and delete controls.
        .route("/dashboard", get(handlers::dashboard))
        // GET /add-post  - create form
        // POST /add-post - insert the new post, then redirect to /dashboard.
        .route(
            "/add-post",
            get(handlers::add_post_page).post(handlers::submit_post),
        )
        // GET /edit-post/{id} - prefilled edit form
        // PUT /edit-post/{id} - overwrite title/body, refresh updated_at.
        .route(
            "/edit-post/{id}",
            get(handlers::edit_post_page).put(handlers::submit_edit),
        )
        // DELETE /delete-post/{id}
        // Remove the post, then redirect to /dashboard.
        .route("/delete-post/{id}", delete(handlers::delete_post))
}
