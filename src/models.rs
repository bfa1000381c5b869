use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Post
///
/// Represents a blog post record from the `posts` table. This is the primary data
/// structure for the core business logic.
///
/// Invariants: `id` is stable for the document's lifetime, `created_at` is set once
/// at creation, and `updated_at >= created_at` always (it is refreshed on every edit).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    // Body text; may contain markup, stored as-is.
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// AdminUser
///
/// The administrator's identity record from the `admins` table. Admins are
/// provisioned out-of-band (startup seeding); there is no public registration
/// endpoint. The record is read once per login attempt and never mutated within
/// the application.
#[derive(Debug, Clone, Deserialize, FromRow, Default)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    /// Salted bcrypt hash. Never serialized or logged.
    pub password_hash: String,
}

/// PostPage
///
/// One window of the paginated public listing. `has_next_page` is true iff the
/// window ends before the final post, i.e. `page * per_page < total`.
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub has_next_page: bool,
}

// --- Request Payloads (Form Schemas) ---

/// LoginForm
///
/// Input payload for the login submit (POST /admin).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// PostForm
///
/// Input payload shared by the create (POST /add-post) and edit (PUT /edit-post/{id})
/// submits. Title and body are accepted as-is; length/format validation is out of scope.
#[derive(Debug, Clone, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

/// SearchForm
///
/// Input payload for the search submit (POST /search). The raw term is forwarded
/// untouched to the repository, which owns sanitization.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchForm {
    #[serde(rename = "searchTerm", default)]
    pub search_term: String,
}
