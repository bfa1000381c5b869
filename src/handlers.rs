use axum::{
    Form,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::Error,
    listing::{self, ListingQuery},
    models::{LoginForm, PostForm, SearchForm},
    views::{
        AboutTemplate, AddPostTemplate, DashboardTemplate, EditPostTemplate, IndexTemplate,
        Locals, LoginTemplate, PostTemplate, PostView, SearchTemplate,
    },
};

/// LoginQuery
///
/// Query parameters for the login form page. `error` is present after a rejected
/// attempt (the submit handler redirects back with `?error=credentials`).
#[derive(Debug, Deserialize, Default)]
pub struct LoginQuery {
    pub error: Option<String>,
}

// --- Public Handlers ---

/// home
///
/// [Public Route] The paginated front page (GET /?page=N). Page parsing and result
/// shaping are delegated to the listing orchestrator.
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<IndexTemplate, Error> {
    let listing = listing::front_page(&state.repo, &query).await?;

    Ok(IndexTemplate {
        locals: Locals::new("Home"),
        posts: listing.posts.iter().map(PostView::from).collect(),
        current_page: listing.current_page,
        next_page: listing.next_page,
    })
}

/// view_post
///
/// [Public Route] Single post view (GET /post/{id}).
pub async fn view_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<PostTemplate, Error> {
    let post = state.repo.get_post(id).await?.ok_or(Error::NotFound)?;

    Ok(PostTemplate {
        locals: Locals::new(&post.title),
        post: PostView::from(&post),
    })
}

/// search_posts
///
/// [Public Route] Free-text search (POST /search, form field `searchTerm`). The raw
/// term goes to the orchestrator untouched; the repository owns sanitization.
pub async fn search_posts(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<SearchTemplate, Error> {
    let posts = listing::search_results(&state.repo, &form.search_term).await?;

    Ok(SearchTemplate {
        locals: Locals::new("Search"),
        posts: posts.iter().map(PostView::from).collect(),
    })
}

/// about
///
/// [Public Route] Static page.
pub async fn about() -> AboutTemplate {
    AboutTemplate {
        locals: Locals::new("About"),
    }
}

/// login_page
///
/// [Public Route] The admin login form (GET /admin).
pub async fn login_page(Query(query): Query<LoginQuery>) -> LoginTemplate {
    LoginTemplate {
        locals: Locals::new("Admin"),
        error: query.error.is_some(),
    }
}

/// submit_login
///
/// [Public Route] The credential check (POST /admin). On success the session token
/// is installed in the `token` cookie and the client is redirected to the dashboard.
/// Both rejection causes (unknown username, wrong password) produce the identical
/// redirect, so they are externally indistinguishable.
pub async fn submit_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth::login(&state.repo, &state.tokens, &form.username, &form.password).await {
        Ok(token) => (
            [(header::SET_COOKIE, auth::session_cookie(&token))],
            Redirect::to("/dashboard"),
        )
            .into_response(),
        Err(Error::InvalidCredentials) => Redirect::to("/admin?error=credentials").into_response(),
        Err(error) => error.into_response(),
    }
}

/// logout
///
/// [Public Route] Clears the session cookie and redirects home. The token itself is
/// stateless, so logout is purely client-side credential deletion.
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to("/"),
    )
}

// --- Session-Protected Handlers ---

/// dashboard
///
/// [Protected Route] Lists every post with edit/delete controls (GET /dashboard).
pub async fn dashboard(
    _admin: AuthUser,
    State(state): State<AppState>,
) -> Result<DashboardTemplate, Error> {
    let posts = state.repo.list_all().await?;

    Ok(DashboardTemplate {
        locals: Locals::new("Dashboard"),
        posts: posts.iter().map(PostView::from).collect(),
    })
}

/// add_post_page
///
/// [Protected Route] The create-post form (GET /add-post).
pub async fn add_post_page(_admin: AuthUser) -> AddPostTemplate {
    AddPostTemplate {
        locals: Locals::new("Add Post"),
    }
}

/// submit_post
///
/// [Protected Route] Creates a post (POST /add-post) and redirects to the dashboard.
/// A store failure is logged and the redirect happens anyway; the write path fails
/// silently to the user.
pub async fn submit_post(
    _admin: AuthUser,
    State(state): State<AppState>,
    Form(form): Form<PostForm>,
) -> Redirect {
    if let Err(error) = state.repo.create_post(&form.title, &form.body).await {
        tracing::error!("create post failed: {:?}", error);
    }

    Redirect::to("/dashboard")
}

/// edit_post_page
///
/// [Protected Route] The edit form, prefilled (GET /edit-post/{id}).
pub async fn edit_post_page(
    _admin: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<EditPostTemplate, Error> {
    let post = state.repo.get_post(id).await?.ok_or(Error::NotFound)?;

    Ok(EditPostTemplate {
        locals: Locals::new("Edit Post"),
        post: PostView::from(&post),
    })
}

/// submit_edit
///
/// [Protected Route] Overwrites title/body and refreshes updated_at
/// (PUT /edit-post/{id}), then redirects back to the edit form. An absent id is a
/// 404; a store failure is logged and the redirect happens anyway.
pub async fn submit_edit(
    _admin: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<PostForm>,
) -> Result<Redirect, Error> {
    match state.repo.update_post(id, &form.title, &form.body).await {
        Ok(true) => {}
        Ok(false) => return Err(Error::NotFound),
        Err(error) => tracing::error!("edit post {} failed: {:?}", id, error),
    }

    Ok(Redirect::to(&format!("/edit-post/{id}")))
}

/// delete_post
///
/// [Protected Route] Deletes a post (DELETE /delete-post/{id}) and redirects to the
/// dashboard. An absent id is a 404 and no other record is touched; a store failure
/// is logged and the redirect happens anyway.
pub async fn delete_post(
    _admin: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, Error> {
    match state.repo.delete_post(id).await {
        Ok(true) => {}
        Ok(false) => return Err(Error::NotFound),
        Err(error) => tracing::error!("delete post {} failed: {:?}", id, error),
    }

    Ok(Redirect::to("/dashboard"))
}
