use crate::app::AppState;
use crate::auth::Identity;
use crate::config::AppConfig;
use crate::database::models::{Role, User, UserStore};

/// In-memory application state for unit tests; every context is a fresh database
pub struct TestContext {
    pub state: AppState,
}

impl TestContext {
    pub async fn new() -> Self {
        let state = AppState::new(AppConfig::test())
            .await
            .expect("failed to build in-memory app state");
        Self { state }
    }

    /// Insert a user directly, skipping password hashing
    pub async fn insert_user(&self, username: &str) -> User {
        UserStore::new(self.state.pool.clone())
            .upsert(&User::new(username, "$argon2id$not-a-real-hash", Role::User))
            .await
            .expect("failed to insert test user")
    }

    pub async fn identity(&self, username: &str) -> Identity {
        Identity::from(&self.insert_user(username).await)
    }

    /// A stored user plus a valid access token for it
    pub async fn user_with_token(&self, username: &str) -> (User, String) {
        let user = self.insert_user(username).await;
        let token = self
            .state
            .auth
            .tokens()
            .issue(&user)
            .expect("failed to issue test token");
        (user, token)
    }
}
