use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::db::Store;
use crate::types::{
    AppError, NewUser, RegisterRequest, Result, UpdateProfileRequest, User, UserChanges,
};
use std::sync::Arc;

/// Account workflows shared by the auth handlers and middleware.
///
/// Request bodies reaching this service have already been validated and
/// sanitized; the service only enforces store-level rules (unique email,
/// credential checks) and owns the hashing step.
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    tokens: TokenService,
    default_profile_image: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenService,
        default_profile_image: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            store,
            hasher: PasswordHasher::new()?,
            tokens,
            default_profile_image: default_profile_image.into(),
        })
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account and returns it with a fresh session token.
    pub async fn register(&self, req: RegisterRequest) -> Result<(User, String)> {
        if self.store.email_exists(&req.email).await? {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = self.hash_password(req.password).await?;

        let profile_image = req
            .profile_image
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.default_profile_image.clone());

        let user = self
            .store
            .create_user(&NewUser {
                full_name: req.full_name,
                email: req.email,
                password_hash,
                profile_image,
                bio: req.bio.unwrap_or_default(),
            })
            .await?;

        let token = self.tokens.issue(&user.id)?;
        tracing::info!(user_id = %user.id, "user registered");

        Ok((user, token))
    }

    /// Checks credentials and mints a new session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| {
                AppError::Auth("No account found with this email address".to_string())
            })?;

        if !self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?
        {
            tracing::debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::Auth("Incorrect password".to_string()));
        }

        let token = self.tokens.issue(&user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok((user, token))
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(reason = %e, "token rejected");
            AppError::from(e)
        })?;

        self.store
            .get_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %claims.sub, "token refers to a missing user");
                AppError::Auth("Token verification failed. User not found.".to_string())
            })
    }

    /// Applies a profile update. The password is re-hashed only when the
    /// caller supplies a new one.
    pub async fn update_profile(&self, user_id: &str, req: UpdateProfileRequest) -> Result<User> {
        let password_hash = match req.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let changes = UserChanges {
            full_name: req.full_name,
            profile_image: req.profile_image,
            bio: req.bio,
            password_hash,
        };

        let user = self
            .store
            .update_user(user_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::DEFAULT_TOKEN_TTL_SECS;
    use crate::db::SqliteStore;
    use crate::types::DEFAULT_PROFILE_IMAGE;

    const SECRET: &str = "test-secret-key-that-is-at-least-32-chars";

    async fn service() -> AuthService {
        let store = SqliteStore::new_memory().await.expect("in-memory store");
        AuthService::new(
            Arc::new(store),
            TokenService::new(SECRET, DEFAULT_TOKEN_TTL_SECS),
            DEFAULT_PROFILE_IMAGE,
        )
        .expect("service")
    }

    fn jane() -> RegisterRequest {
        RegisterRequest {
            full_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            password: "Abcdef1".to_string(),
            profile_image: None,
            bio: None,
        }
    }

    #[tokio::test]
    async fn test_register_token_resolves_to_new_user() {
        let service = service().await;

        let (user, token) = service.register(jane()).await.expect("register");
        let claims = service.tokens().verify(&token).expect("valid token");

        assert_eq!(claims.sub, user.id);
        assert_eq!(user.profile_image, DEFAULT_PROFILE_IMAGE);
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = service().await;
        service.register(jane()).await.expect("register");

        let mut again = jane();
        again.email = "jane@x.com".to_string();
        let result = service.register(again).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let service = service().await;
        service.register(jane()).await.expect("register");

        assert!(service.login("jane@x.com", "Abcdef1").await.is_ok());
        assert!(matches!(
            service.login("jane@x.com", "Wrong12").await,
            Err(AppError::Auth(_))
        ));
        assert!(matches!(
            service.login("nobody@x.com", "Abcdef1").await,
            Err(AppError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_update_rehashes_only_with_password() {
        let service = service().await;
        let (user, _) = service.register(jane()).await.expect("register");

        let renamed = service
            .update_profile(
                &user.id,
                UpdateProfileRequest {
                    full_name: Some("Jane Smith".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(renamed.full_name, "Jane Smith");
        assert_eq!(renamed.password_hash, user.password_hash);

        let rekeyed = service
            .update_profile(
                &user.id,
                UpdateProfileRequest {
                    password: Some("Newpass9".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_ne!(rekeyed.password_hash, user.password_hash);
        assert!(service.login("jane@x.com", "Newpass9").await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user_is_unauthorized() {
        let service = service().await;
        let token = service.tokens().issue("ghost").expect("issue");

        let result = service.authenticate(&token).await;
        assert!(matches!(result, Err(AppError::Auth(ref m)) if m.contains("User not found")));
    }
}
