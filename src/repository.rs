use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::Error,
    listing::Pagination,
    models::{AdminUser, Post, PostPage},
};

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. Handlers interact
/// with the data layer through this trait without knowing the concrete
/// implementation (Postgres in production, the in-memory store in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Posts ---
    /// Assigns an id, sets created_at = updated_at = now. Title and body are
    /// accepted as-is.
    async fn create_post(&self, title: &str, body: &str) -> Result<Post, Error>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, Error>;
    /// Overwrites title/body and refreshes updated_at; created_at is untouched.
    /// Returns false when the id is absent. Concurrent edits are not reconciled:
    /// last write wins.
    async fn update_post(&self, id: Uuid, title: &str, body: &str) -> Result<bool, Error>;
    /// Returns false when the id is absent.
    async fn delete_post(&self, id: Uuid) -> Result<bool, Error>;

    // --- Queries ---
    /// Dashboard listing: every post, repository-default order.
    async fn list_all(&self) -> Result<Vec<Post>, Error>;
    /// Public listing: sorted by created_at descending (ties broken by id,
    /// stable), windowed by the requested page.
    async fn list_page(&self, page: u32, per_page: u32) -> Result<PostPage, Error>;
    /// Free-text search: the raw term is sanitized here, then matched
    /// case-insensitively as a substring of title OR body. Result order is
    /// repository-default.
    async fn search(&self, raw_term: &str) -> Result<Vec<Post>, Error>;

    // --- Admins ---
    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>, Error>;
    /// Out-of-band provisioning path used by startup seeding; there is no public
    /// registration endpoint.
    async fn create_admin(&self, username: &str, password_hash: &str)
    -> Result<AdminUser, Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// sanitize_search_term
///
/// Strips every character outside the set {ASCII letters, digits, space} from
/// user-supplied search text. Disallowed characters are removed, not escaped, so
/// `"hello!!!world"` matches as the single word `"helloworld"`.
pub fn sanitize_search_term(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}

const POST_COLUMNS: &str = "id, title, body, created_at, updated_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL
/// database. The pool is the sole arbiter of durability and per-statement
/// atomicity; no locking, transactions, or retries are layered on top.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// ensure_schema
    ///
    /// Creates the `posts` and `admins` tables if they do not already exist.
    /// Safe to call on every startup.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id          UUID PRIMARY KEY,
                title       TEXT NOT NULL,
                body        TEXT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC, id)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS admins (
                id             UUID PRIMARY KEY,
                username       TEXT UNIQUE NOT NULL,
                password_hash  TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_post(&self, title: &str, body: &str) -> Result<Post, Error> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, title, body, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, Error> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update_post(&self, id: Uuid, title: &str, body: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE posts SET title = $2, body = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Post>, Error> {
        let posts = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts"))
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn list_page(&self, page: u32, per_page: u32) -> Result<PostPage, Error> {
        let window = Pagination::new(page, per_page);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts \
             ORDER BY created_at DESC, id ASC OFFSET $1 LIMIT $2"
        ))
        .bind(window.offset() as i64)
        .bind(i64::from(window.limit()))
        .fetch_all(&self.pool)
        .await?;

        Ok(PostPage {
            items,
            has_next_page: window.has_next(total.max(0) as u64),
        })
    }

    async fn search(&self, raw_term: &str) -> Result<Vec<Post>, Error> {
        // The sanitized term contains no LIKE metacharacters, so the pattern is
        // safe to interpolate into the wildcard wrapper. An all-stripped (empty)
        // term matches every post.
        let term = sanitize_search_term(raw_term);
        let pattern = format!("%{term}%");

        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE title ILIKE $1 OR body ILIKE $1"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>, Error> {
        let admin = sqlx::query_as::<_, AdminUser>(
            "SELECT id, username, password_hash FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn create_admin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminUser, Error> {
        let admin = sqlx::query_as::<_, AdminUser>(
            "INSERT INTO admins (id, username, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, username, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }
}

/// MemoryRepository
///
/// An in-memory implementation of `Repository` used by the integration tests.
/// It implements the full repository contract (ordering, windowing, sanitized
/// search) against plain vectors, with writers serialized through a `RwLock`,
/// so tests exercise real query semantics without a database.
#[derive(Default)]
pub struct MemoryRepository {
    posts: RwLock<Vec<Post>>,
    admins: RwLock<Vec<AdminUser>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_post(&self, title: &str, body: &str) -> Result<Post, Error> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, Error> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|post| post.id == id).cloned())
    }

    async fn update_post(&self, id: Uuid, title: &str, body: &str) -> Result<bool, Error> {
        let mut posts = self.posts.write().await;
        match posts.iter_mut().find(|post| post.id == id) {
            Some(post) => {
                post.title = title.to_string();
                post.body = body.to_string();
                post.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, Error> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|post| post.id != id);
        Ok(posts.len() < before)
    }

    async fn list_all(&self) -> Result<Vec<Post>, Error> {
        Ok(self.posts.read().await.clone())
    }

    async fn list_page(&self, page: u32, per_page: u32) -> Result<PostPage, Error> {
        let window = Pagination::new(page, per_page);

        let mut posts = self.posts.read().await.clone();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = posts.len() as u64;
        let items = posts
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .collect();

        Ok(PostPage {
            items,
            has_next_page: window.has_next(total),
        })
    }

    async fn search(&self, raw_term: &str) -> Result<Vec<Post>, Error> {
        let term = sanitize_search_term(raw_term).to_lowercase();

        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .filter(|post| {
                post.title.to_lowercase().contains(&term)
                    || post.body.to_lowercase().contains(&term)
            })
            .cloned()
            .collect())
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>, Error> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|admin| admin.username == username).cloned())
    }

    async fn create_admin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminUser, Error> {
        let admin = AdminUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };

        self.admins.write().await.push(admin.clone());
        Ok(admin)
    }
}
