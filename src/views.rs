use askama::Template;
use askama_web::WebTemplate;
use uuid::Uuid;

use crate::models::Post;

const SITE_DESCRIPTION: &str = "Simple blog built with Rust, Axum & Postgres.";

/// Locals
///
/// Page metadata supplied to every template: the title shown in the document head
/// and the site description used for the meta tag.
#[derive(Debug, Clone)]
pub struct Locals {
    pub title: String,
    pub description: String,
}

impl Locals {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: SITE_DESCRIPTION.to_string(),
        }
    }
}

/// PostView
///
/// Post data shaped for templates, with timestamps preformatted so the templates
/// stay logic-free.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            body: post.body.clone(),
            created_at: post.created_at.format("%-d %B %Y").to_string(),
            updated_at: post.updated_at.format("%-d %B %Y").to_string(),
        }
    }
}

/// Front page: the paginated listing.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub locals: Locals,
    pub posts: Vec<PostView>,
    pub current_page: u32,
    pub next_page: Option<u32>,
}

/// Single post view.
#[derive(Template, WebTemplate)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub locals: Locals,
    pub post: PostView,
}

/// Search results.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub locals: Locals,
    pub posts: Vec<PostView>,
}

/// Static about page.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub locals: Locals,
}

/// Admin login form. `error` is set when the previous attempt was rejected.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub locals: Locals,
    pub error: bool,
}

/// Admin dashboard: every post with edit/delete controls.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub locals: Locals,
    pub posts: Vec<PostView>,
}

/// Create-post form.
#[derive(Template, WebTemplate)]
#[template(path = "admin/add_post.html")]
pub struct AddPostTemplate {
    pub locals: Locals,
}

/// Edit-post form, prefilled with the current title and body.
#[derive(Template, WebTemplate)]
#[template(path = "admin/edit_post.html")]
pub struct EditPostTemplate {
    pub locals: Locals,
    pub post: PostView,
}
