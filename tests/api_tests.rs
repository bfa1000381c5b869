use quillpress::{
    AppState,
    auth::TokenService,
    config::AppConfig,
    create_router,
    repository::{MemoryRepository, Repository, RepositoryState},
};
use std::sync::Arc;
use tokio::net::TcpListener;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "hunter2 horse battery";

pub struct TestApp {
    pub address: String,
    pub repo: Arc<MemoryRepository>,
}

/// Spawns the full router on an ephemeral port, backed by an in-memory repository
/// seeded with one admin account.
async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let hash = bcrypt::hash(ADMIN_PASSWORD, 4).expect("hashing failed");
    repo.create_admin(ADMIN_USERNAME, &hash)
        .await
        .expect("seeding failed");

    let config = AppConfig::default();
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        tokens: TokenService::from_config(&config),
        config,
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, repo }
}

/// A client that keeps the session cookie and follows redirects, like a browser.
fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

/// A client that neither stores cookies nor follows redirects, for asserting on
/// raw responses.
fn bare_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn log_in(app: &TestApp, client: &reqwest::Client) {
    let response = client
        .post(format!("{}/admin", app.address))
        .form(&[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .expect("login request failed");
    assert!(response.status().is_success());
    assert!(response.url().path().ends_with("/dashboard"));
}

// --- Session Tests ---

#[tokio::test]
async fn test_protected_routes_reject_anonymous_requests() {
    let app = spawn_app().await;
    let client = bare_client();

    for path in ["/dashboard", "/add-post"] {
        let response = client
            .get(format!("{}{}", app.address, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401, "{path} should require a session");
    }
}

#[tokio::test]
async fn test_login_sets_cookie_and_redirects() {
    let app = spawn_app().await;
    let client = bare_client();

    let response = client
        .post(format!("{}/admin", app.address))
        .form(&[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/dashboard");
    let cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_rejected_logins_are_indistinguishable() {
    let app = spawn_app().await;
    let client = bare_client();

    let mut responses = Vec::new();
    for (username, password) in [
        ("no-such-user", ADMIN_PASSWORD),
        (ADMIN_USERNAME, "wrong password"),
    ] {
        let response = client
            .post(format!("{}/admin", app.address))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .unwrap();
        responses.push((
            response.status(),
            response.headers()["location"].to_str().unwrap().to_string(),
            response.headers().contains_key("set-cookie"),
        ));
    }

    // Unknown username and wrong password produce byte-identical rejections.
    assert_eq!(responses[0], responses[1]);
    assert_eq!(responses[0].1, "/admin?error=credentials");
    assert!(!responses[0].2, "no session cookie on rejection");
}

#[tokio::test]
async fn test_logout_clears_the_session() {
    let app = spawn_app().await;
    let client = browser();
    log_in(&app, &client).await;

    let response = client
        .get(format!("{}/logout", app.address))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let dashboard = client
        .get(format!("{}/dashboard", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(dashboard.status(), 401);
}

// --- Content Lifecycle Tests ---

#[tokio::test]
async fn test_post_lifecycle() {
    let app = spawn_app().await;
    let client = browser();
    log_in(&app, &client).await;

    // Create
    let response = client
        .post(format!("{}/add-post", app.address))
        .form(&[("title", "A"), ("body", "B")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // The new post leads the front page.
    let home = client
        .get(format!("{}/", app.address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(home.contains(">A<") || home.contains("A</span>"), "new post listed");

    let post = app.repo.list_all().await.unwrap()[0].clone();
    assert_eq!(post.title, "A");

    // Edit
    let response = client
        .put(format!("{}/edit-post/{}", app.address, post.id))
        .form(&[("title", "A2"), ("body", "B")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let page = client
        .get(format!("{}/post/{}", app.address, post.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("A2"));

    let edited = app.repo.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(edited.created_at, post.created_at);
    assert!(edited.updated_at >= post.updated_at);

    // Delete
    let response = client
        .delete(format!("{}/delete-post/{}", app.address, post.id))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let gone = client
        .get(format!("{}/post/{}", app.address, post.id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);

    let home = client
        .get(format!("{}/", app.address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!home.contains(&post.id.to_string()));
}

#[tokio::test]
async fn test_search_endpoint_sanitizes_the_term() {
    let app = spawn_app().await;
    app.repo
        .create_post("Alpha helloworld guide", "one word")
        .await
        .unwrap();
    app.repo
        .create_post("Beta hello world notes", "two words")
        .await
        .unwrap();

    let client = bare_client();
    let results = client
        .post(format!("{}/search", app.address))
        .form(&[("searchTerm", "hello!!!world")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(results.contains("Alpha helloworld guide"));
    assert!(!results.contains("Beta hello world notes"));
}

#[tokio::test]
async fn test_front_page_tolerates_malformed_page_parameter() {
    let app = spawn_app().await;
    let client = bare_client();

    for query in ["?page=abc", "?page=", ""] {
        let response = client
            .get(format!("{}/{}", app.address, query))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success(), "GET /{query} should render");
    }
}
