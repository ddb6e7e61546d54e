//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP requests,
//! and seeding the data the API itself cannot create.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use community_api::{create_app, create_app_state, AppState};
use community_common::AppConfig;
use community_core::{
    Group, MemberRole, Membership, Message, ModerationScope, Post, Room, Snowflake, User, UserRole,
};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::unique_suffix;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: AppState,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        let config = test_config()?;
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state.clone());

        // Ephemeral port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            state,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url(), path)
    }

    /// Mint an access token the way the identity service would
    pub fn token_for(&self, user_id: Snowflake) -> Result<String> {
        Ok(self.state.jwt_service().issue_access_token(user_id)?)
    }

    /// GET a path outside `/api/v1`
    pub async fn get_raw(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Unauthenticated GET under `/api/v1`
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.api_url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.api_url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// POST without a body
    pub async fn post_empty_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .patch(self.api_url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    // === Seeding ===

    fn next_id(&self) -> Snowflake {
        self.state.service_context().generate_id()
    }

    /// Insert a user with the given platform role
    pub async fn seed_user(&self, role: UserRole) -> Result<User> {
        let suffix = unique_suffix();
        let id = self.next_id();
        let mut user = User::new(
            id,
            format!("it_user_{id}_{suffix}"),
            format!("it_{id}_{suffix}@example.com"),
        );
        user.role = role;
        self.state.service_context().user_repo().create(&user).await?;
        Ok(user)
    }

    /// Insert a room owned by `owner`, who joins as admin
    pub async fn seed_room(&self, owner: &User) -> Result<Room> {
        let room = Room::new(self.next_id(), format!("room {}", unique_suffix()), owner.id);
        self.state.service_context().room_repo().create(&room).await?;
        self.join(room.scope(), owner, MemberRole::Admin).await?;
        Ok(room)
    }

    /// Insert a group owned by `owner`, who joins as admin
    pub async fn seed_group(&self, owner: &User) -> Result<Group> {
        let group = Group::new(self.next_id(), format!("group {}", unique_suffix()), owner.id);
        self.state.service_context().group_repo().create(&group).await?;
        self.join(group.scope(), owner, MemberRole::Admin).await?;
        Ok(group)
    }

    pub async fn join(&self, scope: ModerationScope, user: &User, role: MemberRole) -> Result<()> {
        let membership = Membership::new(scope, user.id, role);
        self.state
            .service_context()
            .membership_repo()
            .create(&membership)
            .await?;
        Ok(())
    }

    /// Insert a post in a group
    pub async fn seed_post(&self, group: &Group, author: &User) -> Result<Post> {
        let post = Post {
            id: self.next_id(),
            group_id: Some(group.id),
            author_id: author.id,
            title: format!("Post {}", unique_suffix()),
            created_at: chrono::Utc::now(),
        };
        self.state.service_context().post_repo().create(&post).await?;
        Ok(post)
    }

    /// Insert a chat message in a room
    pub async fn seed_message(&self, room: &Room, author: &User) -> Result<Message> {
        let message = Message {
            id: self.next_id(),
            room_id: Some(room.id),
            group_id: None,
            author_id: author.id,
            content: format!("message number {}", unique_suffix()),
            created_at: chrono::Utc::now(),
        };
        self.state
            .service_context()
            .message_repo()
            .create(&message)
            .await?;
        Ok(message)
    }
}

/// Create a test configuration
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("JWT_SECRET").is_err() {
        eprintln!("Skipping test: JWT_SECRET not set");
        return false;
    }

    true
}

/// Success envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Assert response status and unwrap the success envelope
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    let envelope: Envelope<T> = response.json().await?;
    anyhow::ensure!(envelope.success, "success flag was false");
    Ok(envelope.data)
}

/// Assert an error status and return the error envelope
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await?;
    if status != expected_status {
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    anyhow::ensure!(body["success"] == Value::Bool(false), "success flag was not false");
    Ok(body)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
