use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use quillpress::{
    AppState,
    auth::{AuthUser, TokenService},
    config::AppConfig,
    error::Error,
    handlers,
    listing::ListingQuery,
    models::{PostForm, SearchForm},
    repository::{MemoryRepository, Repository, RepositoryState},
};
use std::sync::Arc;
use tokio::test;
use uuid::Uuid;

// --- Test Utilities ---

const TEST_ADMIN_ID: Uuid = Uuid::from_u128(42);

/// Creates an AppState around the given in-memory repository.
fn create_test_state(repo: Arc<MemoryRepository>) -> AppState {
    let repo_state: RepositoryState = repo;
    AppState {
        repo: repo_state,
        tokens: TokenService::new(b"handler-test-secret", None),
        config: AppConfig::default(),
    }
}

/// The identity the session guard would attach on an admitted request.
fn admin_user() -> AuthUser {
    AuthUser { id: TEST_ADMIN_ID }
}

fn listing_query(page: &str) -> ListingQuery {
    ListingQuery {
        page: Some(page.to_string()),
    }
}

async fn location_of(response: axum::response::Response) -> (StatusCode, String) {
    let status = response.status();
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (status, location)
}

// --- Public Handler Tests ---

#[test]
async fn test_home_shapes_pagination() {
    let repo = Arc::new(MemoryRepository::new());
    for i in 0..25 {
        repo.create_post(&format!("Post {i}"), "body").await.unwrap();
    }
    let state = create_test_state(repo);

    let first = handlers::home(State(state.clone()), Query(listing_query("1")))
        .await
        .unwrap();
    assert_eq!(first.posts.len(), 10);
    assert_eq!(first.current_page, 1);
    assert_eq!(first.next_page, Some(2));

    let third = handlers::home(State(state.clone()), Query(listing_query("3")))
        .await
        .unwrap();
    assert_eq!(third.posts.len(), 5);
    assert_eq!(third.next_page, None);

    let beyond = handlers::home(State(state), Query(listing_query("4")))
        .await
        .unwrap();
    assert!(beyond.posts.is_empty());
    assert_eq!(beyond.next_page, None);
}

#[test]
async fn test_home_defaults_malformed_page_to_first() {
    let repo = Arc::new(MemoryRepository::new());
    repo.create_post("Only", "post").await.unwrap();
    let state = create_test_state(repo);

    let page = handlers::home(State(state), Query(listing_query("garbage")))
        .await
        .unwrap();

    assert_eq!(page.current_page, 1);
    assert_eq!(page.posts.len(), 1);
}

#[test]
async fn test_view_post_not_found() {
    let state = create_test_state(Arc::new(MemoryRepository::new()));

    let result = handlers::view_post(State(state), Path(Uuid::new_v4())).await;

    assert!(matches!(result, Err(Error::NotFound)));
}

#[test]
async fn test_search_handler_forwards_raw_term() {
    let repo = Arc::new(MemoryRepository::new());
    repo.create_post("The helloworld guide", "body").await.unwrap();
    repo.create_post("A hello world story", "body").await.unwrap();
    let state = create_test_state(repo);

    let form = SearchForm {
        search_term: "hello!!!world".to_string(),
    };
    let results = handlers::search_posts(State(state), axum::Form(form))
        .await
        .unwrap();

    // Sanitization happened downstream in the repository: the fused word matched,
    // the spaced phrase did not.
    assert_eq!(results.posts.len(), 1);
    assert_eq!(results.posts[0].title, "The helloworld guide");
}

// --- Protected Handler Tests ---

#[test]
async fn test_submit_post_creates_and_redirects() {
    let repo = Arc::new(MemoryRepository::new());
    let state = create_test_state(repo.clone());

    let form = PostForm {
        title: "A".to_string(),
        body: "B".to_string(),
    };
    let redirect = handlers::submit_post(admin_user(), State(state), axum::Form(form)).await;

    let (status, location) = location_of(redirect.into_response()).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, "/dashboard");

    let posts = repo.list_all().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "A");
    assert_eq!(posts[0].body, "B");
}

#[test]
async fn test_newest_post_leads_the_front_page() {
    let repo = Arc::new(MemoryRepository::new());
    repo.create_post("Old news", "stale").await.unwrap();
    let state = create_test_state(repo.clone());

    let form = PostForm {
        title: "Fresh off the press".to_string(),
        body: "B".to_string(),
    };
    handlers::submit_post(admin_user(), State(state.clone()), axum::Form(form)).await;

    let page = handlers::home(State(state), Query(ListingQuery::default()))
        .await
        .unwrap();
    assert_eq!(page.posts[0].title, "Fresh off the press");
}

#[test]
async fn test_submit_edit_updates_and_redirects_back() {
    let repo = Arc::new(MemoryRepository::new());
    let post = repo.create_post("A", "B").await.unwrap();
    let state = create_test_state(repo.clone());

    let form = PostForm {
        title: "A2".to_string(),
        body: "B".to_string(),
    };
    let redirect = handlers::submit_edit(admin_user(), State(state), Path(post.id), axum::Form(form))
        .await
        .unwrap();

    let (status, location) = location_of(redirect.into_response()).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, format!("/edit-post/{}", post.id));

    let fetched = repo.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, "A2");
    assert_eq!(fetched.created_at, post.created_at);
}

#[test]
async fn test_submit_edit_missing_id_is_not_found() {
    let state = create_test_state(Arc::new(MemoryRepository::new()));

    let form = PostForm {
        title: "X".to_string(),
        body: "Y".to_string(),
    };
    let result =
        handlers::submit_edit(admin_user(), State(state), Path(Uuid::new_v4()), axum::Form(form))
            .await;

    assert!(matches!(result, Err(Error::NotFound)));
}

#[test]
async fn test_delete_post_redirects_to_dashboard() {
    let repo = Arc::new(MemoryRepository::new());
    let post = repo.create_post("Doomed", "gone soon").await.unwrap();
    let state = create_test_state(repo.clone());

    let redirect = handlers::delete_post(admin_user(), State(state), Path(post.id))
        .await
        .unwrap();

    let (status, location) = location_of(redirect.into_response()).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, "/dashboard");
    assert!(repo.get_post(post.id).await.unwrap().is_none());
}

#[test]
async fn test_delete_missing_post_is_not_found() {
    let repo = Arc::new(MemoryRepository::new());
    repo.create_post("Survivor", "still here").await.unwrap();
    let state = create_test_state(repo.clone());

    let result = handlers::delete_post(admin_user(), State(state), Path(Uuid::new_v4())).await;

    assert!(matches!(result, Err(Error::NotFound)));
    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

#[test]
async fn test_dashboard_lists_every_post() {
    let repo = Arc::new(MemoryRepository::new());
    for i in 0..3 {
        repo.create_post(&format!("Post {i}"), "body").await.unwrap();
    }
    let state = create_test_state(repo);

    let dashboard = handlers::dashboard(admin_user(), State(state)).await.unwrap();

    assert_eq!(dashboard.posts.len(), 3);
}
