use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

use crate::auth::dto::{AccessToken, LoginDto, SignupDto};
use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenService;
use crate::auth::{AuthError, Identity};
use crate::config::SecurityConfig;
use crate::database::models::{Role, User, UserStore};

/// Signup, login and per-request token authentication
pub struct AuthService {
    users: UserStore,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(pool: SqlitePool, security: &SecurityConfig) -> Result<Self, AuthError> {
        Ok(Self {
            users: UserStore::new(pool),
            hasher: PasswordHasher::new(&security.hash)?,
            tokens: TokenService::new(&security.jwt_secret, security.jwt_expiry_secs),
        })
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn signup(&self, dto: SignupDto) -> Result<User, AuthError> {
        let SignupDto { username, password } = dto;

        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        let user = self.users.upsert(&User::new(username, hash, Role::User)).await?;
        info!("Registered user {}", user.username);
        Ok(user)
    }

    /// Every failure, including a broken lookup, is the same InvalidCredentials
    pub async fn login(&self, dto: LoginDto) -> Result<AccessToken, AuthError> {
        let LoginDto { username, password } = dto;

        let user = match self.users.find_by_username(&username).await {
            Ok(user) => user,
            Err(e) => {
                warn!("User lookup failed during login: {}", e);
                None
            }
        };

        let hasher = self.hasher.clone();
        let stored = user.as_ref().map(|u| u.password.clone());
        let verified = tokio::task::spawn_blocking(move || match stored {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

        match user {
            Some(user) if verified => {
                let access_token = self.tokens.issue(&user)?;
                debug!("Issued access token for {}", user.username);
                Ok(AccessToken { access_token })
            }
            _ => {
                warn!("Rejected login for {}", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Verify the token, then require that its user still exists
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claimed = self.tokens.verify(token)?;
        let user = self
            .users
            .find_by_identity(&claimed.id, &claimed.username)
            .await?
            .ok_or_else(|| {
                debug!("Token subject {} no longer resolves to a user", claimed.id);
                AuthError::InvalidToken
            })?;

        Ok(Identity::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::DatabaseError;

    async fn service() -> AuthService {
        let config = AppConfig::test();
        let pool = crate::database::connect(&config.database).await.unwrap();
        AuthService::new(pool, &config.security).unwrap()
    }

    fn signup_dto(username: &str, password: &str) -> SignupDto {
        SignupDto {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn login_dto(username: &str, password: &str) -> LoginDto {
        LoginDto {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn signup_hashes_and_assigns_user_role() {
        let auth = service().await;
        let user = auth.signup(signup_dto("test123", "Abc12345@")).await.unwrap();
        assert_eq!(user.role, "USER");
        assert_ne!(user.password, "Abc12345@");
        assert!(user.password.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let auth = service().await;
        auth.signup(signup_dto("test123", "Abc12345@")).await.unwrap();
        let err = auth.signup(signup_dto("test123", "other")).await.unwrap_err();
        match err {
            AuthError::Database(DatabaseError::Conflict(msg)) => {
                assert_eq!(msg, "username test123 already exists")
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_issues_a_token_that_authenticates() {
        let auth = service().await;
        let user = auth.signup(signup_dto("alice", "pw")).await.unwrap();

        let token = auth.login(login_dto("alice", "pw")).await.unwrap();
        let identity = auth.authenticate(&token.access_token).await.unwrap();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let auth = service().await;
        auth.signup(signup_dto("alice", "pw")).await.unwrap();

        let wrong = auth.login(login_dto("alice", "nope")).await.unwrap_err();
        let unknown = auth.login(login_dto("mallory", "pw")).await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_rejected() {
        let auth = service().await;
        let user = auth.signup(signup_dto("ghost", "pw")).await.unwrap();
        let token = auth.tokens().issue(&user).unwrap();

        auth.users.remove(&user.id).await.unwrap();
        let err = auth.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
