use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use auth::Authenticator;
use auth::HashCost;
use auth::PasswordHasher;
use auth::TokenIssuer;
use chrono::Utc;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use user_service::domain::auth::errors::TokenCacheError;
use user_service::domain::auth::ports::TokenCache;
use user_service::domain::auth::service::AuthService;
use user_service::domain::user::errors::UserError;
use user_service::domain::user::models::NewUser;
use user_service::domain::user::models::PageRequest;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::models::UserPage;
use user_service::domain::user::models::Username;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub token_cache: Arc<InMemoryTokenCache>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(InMemoryUserRepository::default(), REQUEST_TIMEOUT).await
    }

    /// Spawn with a custom repository and request deadline
    pub async fn spawn_with(repository: InMemoryUserRepository, request_timeout: Duration) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let hasher = PasswordHasher::with_cost(HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Invalid hash cost");
        let issuer = TokenIssuer::with_default_lifetime(JWT_SECRET).expect("Invalid token issuer");
        let authenticator = Arc::new(Authenticator::new(hasher, issuer));

        let repository = Arc::new(repository);
        let token_cache = Arc::new(InMemoryTokenCache::default());

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));
        let auth_service = Arc::new(AuthService::new(
            repository,
            Arc::clone(&token_cache),
            authenticator,
        ));

        let router = create_router(user_service, auth_service, request_timeout);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            token_cache,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(&format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Create a user and return the response body
    pub async fn create_user(&self, username: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/users")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in and return the issued token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/login")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().expect("Missing token").to_string()
    }
}

#[derive(Default)]
struct UserTable {
    users: Vec<User>,
    last_id: i64,
}

/// User repository kept in memory, enforcing username uniqueness like the
/// database constraint does
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
    latency: Option<Duration>,
}

impl InMemoryUserRepository {
    /// Repository whose every call takes at least `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            table: Mutex::default(),
            latency: Some(latency),
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn fetch(&self, request: &PageRequest) -> Result<UserPage, UserError> {
        self.simulate_latency().await;
        let table = self.table.lock().unwrap();

        let users = table
            .users
            .iter()
            .skip(request.offset() as usize)
            .take(request.num() as usize)
            .cloned()
            .collect();

        Ok(UserPage::from_rows(users, request))
    }

    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        self.simulate_latency().await;
        let mut table = self.table.lock().unwrap();

        if table.users.iter().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
        }

        table.last_id += 1;
        let stored = User {
            id: UserId(table.last_id),
            username: user.username,
            password_hash: user.password_hash,
            avatar: user.avatar,
            created_at: Utc::now(),
            updated_at: None,
        };
        table.users.push(stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.simulate_latency().await;
        let table = self.table.lock().unwrap();
        Ok(table.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        self.simulate_latency().await;
        let table = self.table.lock().unwrap();
        Ok(table.users.iter().find(|u| u.username == *username).cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        self.simulate_latency().await;
        let mut table = self.table.lock().unwrap();

        if table
            .users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
        }

        let slot = table
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;
        *slot = user.clone();

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.simulate_latency().await;
        let mut table = self.table.lock().unwrap();

        let before = table.users.len();
        table.users.retain(|u| u.id != *id);
        if table.users.len() == before {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

/// Token cache kept in memory with per-entry expiry
#[derive(Default)]
pub struct InMemoryTokenCache {
    entries: Mutex<HashMap<String, Instant>>,
    unavailable: AtomicBool,
}

impl InMemoryTokenCache {
    /// Make every cache call fail as if the server were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), TokenCacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TokenCacheError::Unavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .get(token)
            .is_some_and(|expires_at| *expires_at > Instant::now())
    }

    /// Drop an entry as if its TTL had run out
    pub fn evict(&self, token: &str) {
        self.entries.lock().unwrap().remove(token);
    }

    pub fn ttl(&self, token: &str) -> Option<Duration> {
        self.entries
            .lock()
            .unwrap()
            .get(token)
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()))
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn mark_valid(&self, token: &str, ttl: Duration) -> Result<(), TokenCacheError> {
        self.check_available()?;
        self.entries
            .lock()
            .unwrap()
            .insert(token.to_string(), Instant::now() + ttl);
        Ok(())
    }

    async fn is_valid(&self, token: &str) -> Result<bool, TokenCacheError> {
        self.check_available()?;
        Ok(self.contains(token))
    }
}

/// Throwaway Postgres database with migrations applied.
///
/// Created under the server named by `DATABASE_URL` and dropped again when
/// the value goes out of scope.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
}

impl TestDb {
    /// Create a new test database with a unique name.
    ///
    /// Returns `None` when `DATABASE_URL` is not set, so callers can skip.
    pub async fn new() -> Option<Self> {
        let Ok(postgres_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres test");
            return None;
        };

        let db_name = format!(
            "test_user_service_{}",
            uuid::Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&postgres_url)
            .await
            .expect("Failed to connect to Postgres");

        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = postgres_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self { pool, db_name })
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Database cleanup happens asynchronously
        let db_name = self.db_name.clone();
        let Ok(postgres_url) = std::env::var("DATABASE_URL") else {
            return;
        };
        tokio::spawn(async move {
            if let Ok(mut conn) = PgConnection::connect(&postgres_url).await {
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;

                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}

/// Redis server for cache tests, from `REDIS_URL`.
///
/// Returns `None` when the variable is not set, so callers can skip.
pub fn test_redis_url() -> Option<String> {
    match std::env::var("REDIS_URL") {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("REDIS_URL not set, skipping Redis test");
            None
        }
    }
}
