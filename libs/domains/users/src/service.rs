//! User Service - account, session and profile flows

use axum_helpers::{AuthSession, JwtAuth};
use chrono::Utc;
use email::NotificationService;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::config::UsersConfig;
use crate::credentials;
use crate::error::{UserError, UserResult};
use crate::models::{
    LoginRequest, ProfileChanges, ProfileForm, ProfilePicture, ProfileResponse,
    ResetPasswordRequest, SignupRequest, User, UserResponse, parse_dob,
};
use crate::repository::UserRepository;

/// Result of a successful signup
#[derive(Debug)]
pub struct SignedUp {
    pub user: UserResponse,
    pub token: String,
}

/// Result of a successful login
#[derive(Debug)]
pub struct LoggedIn {
    pub token: String,
    pub username: String,
}

pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    jwt: JwtAuth,
    notifications: NotificationService,
    config: UsersConfig,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(
        repository: Arc<R>,
        jwt: JwtAuth,
        notifications: NotificationService,
        config: UsersConfig,
    ) -> Self {
        Self {
            repository,
            jwt,
            notifications,
            config,
        }
    }

    /// Token verifier shared with the bearer middleware
    pub fn jwt(&self) -> &JwtAuth {
        &self.jwt
    }

    /// Create the account and start its first session
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn signup(&self, input: SignupRequest) -> UserResult<SignedUp> {
        input.validate()?;

        if self.repository.get_by_email(&input.email).await?.is_some() {
            return Err(UserError::DuplicateEmail);
        }
        if self
            .repository
            .get_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateUsername);
        }

        let password_hash = credentials::hash_password(&input.password)?;
        let mut user = User::new(input, password_hash);

        let token = self
            .jwt
            .issue_token(&user.id.to_string(), &user.username)?;
        user.tokens.push(token.clone());

        let created = self.repository.create(user).await?;
        tracing::info!(user_id = %created.id, "User signed up");

        Ok(SignedUp {
            user: created.into(),
            token,
        })
    }

    #[instrument(skip(self, input))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<LoggedIn> {
        let user = self
            .repository
            .get_by_email(&input.email)
            .await?
            .ok_or(UserError::EmailNotFound)?;

        if !credentials::verify_password(&input.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(UserError::InvalidPassword);
        }

        let token = self
            .jwt
            .issue_token(&user.id.to_string(), &user.username)?;
        if !self.repository.push_token(user.id, &token).await? {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoggedIn {
            token,
            username: user.username,
        })
    }

    /// Resolve a verified bearer session to its user.
    ///
    /// The token must still be listed on the account; logged-out tokens are rejected.
    #[instrument(skip(self, session), fields(user_id = %session.claims.sub))]
    pub async fn authenticate(&self, session: &AuthSession) -> UserResult<User> {
        let id = Uuid::parse_str(&session.claims.sub)
            .map_err(|_| UserError::Unauthorized("Invalid or expired token".to_string()))?;

        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        if !user.tokens.iter().any(|t| t == &session.token) {
            return Err(UserError::Unauthorized(
                "Session has been logged out".to_string(),
            ));
        }

        Ok(user)
    }

    #[instrument(skip(self, session))]
    pub async fn logout(&self, session: &AuthSession) -> UserResult<()> {
        let user = self.authenticate(session).await?;
        self.repository.pull_token(user.id, &session.token).await?;

        tracing::info!(user_id = %user.id, "User logged out");
        Ok(())
    }

    /// Store a one-hour reset token and mail the link in the background.
    ///
    /// Delivery failures are logged and never reach the caller.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> UserResult<()> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::NotFound)?;

        let token = credentials::generate_reset_token();
        let expires = Utc::now() + credentials::reset_token_ttl();
        if !self
            .repository
            .set_reset_token(user.id, &token, expires)
            .await?
        {
            return Err(UserError::NotFound);
        }

        let link = self.config.reset_link(&token);
        let notifications = self.notifications.clone();
        let to = user.email;
        tokio::spawn(async move {
            match notifications.send_password_reset(&to, &link).await {
                Ok(result) => {
                    tracing::info!(message_id = %result.message_id, "Password reset email sent")
                }
                Err(e) => tracing::error!(error = %e, "Failed to send password reset email"),
            }
        });

        Ok(())
    }

    #[instrument(skip(self, token, input))]
    pub async fn reset_password(&self, token: &str, input: ResetPasswordRequest) -> UserResult<()> {
        let user = self
            .repository
            .get_by_reset_token(token)
            .await?
            .filter(|u| credentials::reset_token_valid(u.reset_password_expires, Utc::now()))
            .ok_or(UserError::InvalidResetToken)?;

        if input.password != input.confirm_password {
            return Err(UserError::PasswordMismatch);
        }

        let password_hash = credentials::hash_password(&input.password)?;
        if !self
            .repository
            .update_password(user.id, &password_hash)
            .await?
        {
            return Err(UserError::InvalidResetToken);
        }

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    pub async fn profile(&self, session: &AuthSession) -> UserResult<ProfileResponse> {
        let user = self.authenticate(session).await?;
        Ok(ProfileResponse {
            username: user.username,
            email: user.email,
        })
    }

    pub async fn details(&self, session: &AuthSession) -> UserResult<UserResponse> {
        Ok(self.authenticate(session).await?.into())
    }

    /// Public view of a user, used when attaching owners to orders
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        self.repository
            .get_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or(UserError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: Uuid) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound);
        }
        Ok(())
    }

    /// Set name and date of birth, optionally storing a new profile picture
    #[instrument(skip(self, form, picture), fields(user_id = %form.user_id))]
    pub async fn update_profile(
        &self,
        form: ProfileForm,
        picture: Option<ProfilePicture>,
    ) -> UserResult<UserResponse> {
        form.validate()?;

        let id = Uuid::parse_str(form.user_id.trim())
            .map_err(|_| UserError::InvalidId(form.user_id.clone()))?;
        let dob = parse_dob(&form.dob)
            .ok_or_else(|| UserError::BadRequest("Date of birth must be a valid date".to_string()))?;

        if self.repository.get_by_id(id).await?.is_none() {
            return Err(UserError::NotFound);
        }

        let profile_pic = match picture {
            Some(picture) => Some(self.store_picture(id, picture).await?),
            None => None,
        };

        let changes = ProfileChanges {
            name: form.name.trim().to_string(),
            dob,
            profile_pic: profile_pic.clone(),
        };

        let updated = match self.repository.update_profile(id, changes).await {
            Ok(Some(user)) => return Ok(user.into()),
            Ok(None) => Err(UserError::NotFound),
            Err(e) => Err(e),
        };

        if let Some(path) = profile_pic {
            Self::discard_picture(&path).await;
        }
        updated
    }

    /// Remove an upload whose profile update did not go through
    async fn discard_picture(path: &str) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path, error = %e, "Failed to remove orphaned profile picture");
        }
    }

    async fn store_picture(&self, user_id: Uuid, picture: ProfilePicture) -> UserResult<String> {
        let extension = picture
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();

        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        let path = self
            .config
            .upload_dir
            .join(format!("{}-{}{}", user_id, Uuid::now_v7(), extension));
        tokio::fs::write(&path, &picture.bytes).await?;

        tracing::debug!(path = %path.display(), bytes = picture.bytes.len(), "Profile picture stored");
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use axum_helpers::JwtConfig;
    use email::{MockEmailProvider, TemplateEngine};

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(SECRET).unwrap())
    }

    fn service_with<R: UserRepository>(repo: R, mail: MockEmailProvider) -> UserService<R> {
        let config = UsersConfig {
            reset_password_url: "http://localhost:4000/reset-password".to_string(),
            upload_dir: std::env::temp_dir().join(format!("users-test-{}", Uuid::now_v7())),
        };
        UserService::new(
            Arc::new(repo),
            jwt(),
            NotificationService::new(Arc::new(mail), TemplateEngine::new().unwrap()),
            config,
        )
    }

    fn service() -> UserService<InMemoryUserRepository> {
        service_with(InMemoryUserRepository::new(), MockEmailProvider::new())
    }

    fn signup_input() -> SignupRequest {
        SignupRequest {
            username: "Alice1".to_string(),
            email: "alice@example.com".to_string(),
            password: "Secret1".to_string(),
            phone: "0123456789".to_string(),
        }
    }

    fn session_for(service: &UserService<impl UserRepository>, token: &str) -> AuthSession {
        AuthSession {
            claims: service.jwt().verify_token(token).unwrap(),
            token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_hashes_password_and_stores_session() {
        let repo = InMemoryUserRepository::new();
        let service = service_with(repo.clone(), MockEmailProvider::new());

        let signed_up = service.signup(signup_input()).await.unwrap();
        let stored = repo.get_by_id(signed_up.user.id).await.unwrap().unwrap();

        assert_ne!(stored.password_hash, "Secret1");
        assert_eq!(stored.tokens, vec![signed_up.token.clone()]);

        let claims = service.jwt().verify_token(&signed_up.token).unwrap();
        assert_eq!(claims.sub, signed_up.user.id.to_string());
        assert_eq!(claims.username, "Alice1");
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_is_conflict_regardless_of_other_fields() {
        let service = service();
        service.signup(signup_input()).await.unwrap();

        let mut again = signup_input();
        again.username = "Different".to_string();
        again.phone = "9876543210".to_string();

        assert!(matches!(
            service.signup(again).await,
            Err(UserError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_signup_duplicate_username() {
        let service = service();
        service.signup(signup_input()).await.unwrap();

        let mut again = signup_input();
        again.email = "other@example.com".to_string();

        assert!(matches!(
            service.signup(again).await,
            Err(UserError::DuplicateUsername)
        ));
    }

    #[tokio::test]
    async fn test_signup_validation_runs_before_lookup() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().never();

        let service = service_with(repo, MockEmailProvider::new());
        let mut input = signup_input();
        input.phone = "123".to_string();

        assert!(matches!(
            service.signup(input).await,
            Err(UserError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_errors() {
        let service = service();
        service.signup(signup_input()).await.unwrap();

        let unknown = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "Secret1".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(UserError::EmailNotFound)));

        let wrong = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "Wrong1".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(UserError::InvalidPassword)));
    }

    #[tokio::test]
    async fn test_login_appends_token_and_logout_removes_it() {
        let repo = InMemoryUserRepository::new();
        let service = service_with(repo.clone(), MockEmailProvider::new());
        let signed_up = service.signup(signup_input()).await.unwrap();

        let logged_in = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "Secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.username, "Alice1");

        let stored = repo.get_by_id(signed_up.user.id).await.unwrap().unwrap();
        assert_eq!(stored.tokens.len(), 2);

        let session = session_for(&service, &logged_in.token);
        service.logout(&session).await.unwrap();

        let stored = repo.get_by_id(signed_up.user.id).await.unwrap().unwrap();
        assert_eq!(stored.tokens, vec![signed_up.token]);

        assert!(matches!(
            service.profile(&session).await,
            Err(UserError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_for_deleted_user_is_not_found() {
        let service = service();
        let signed_up = service.signup(signup_input()).await.unwrap();
        let session = session_for(&service, &signed_up.token);

        assert_eq!(
            service.profile(&session).await.unwrap(),
            ProfileResponse {
                username: "Alice1".to_string(),
                email: "alice@example.com".to_string(),
            }
        );

        service.delete_account(signed_up.user.id).await.unwrap();
        assert!(matches!(
            service.profile(&session).await,
            Err(UserError::NotFound)
        ));
        assert!(matches!(
            service.delete_account(signed_up.user.id).await,
            Err(UserError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_forgot_and_reset_password() {
        let repo = InMemoryUserRepository::new();
        let mail = MockEmailProvider::new();
        let service = service_with(repo.clone(), mail.clone());
        let signed_up = service.signup(signup_input()).await.unwrap();

        service.forgot_password("alice@example.com").await.unwrap();

        let stored = repo.get_by_id(signed_up.user.id).await.unwrap().unwrap();
        let token = stored.reset_password_token.clone().unwrap();
        assert_eq!(token.len(), 40);

        // Delivery happens on a spawned task
        for _ in 0..50 {
            if mail.sent_count().await > 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let sent = mail.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Password Reset");
        assert!(sent[0].body_text.as_deref().unwrap().ends_with(&format!(
            "http://localhost:4000/reset-password/{}",
            token
        )));

        let mismatch = service
            .reset_password(
                &token,
                ResetPasswordRequest {
                    password: "NewPass1".to_string(),
                    confirm_password: "NewPass2".to_string(),
                },
            )
            .await;
        assert!(matches!(mismatch, Err(UserError::PasswordMismatch)));

        service
            .reset_password(
                &token,
                ResetPasswordRequest {
                    password: "NewPass1".to_string(),
                    confirm_password: "NewPass1".to_string(),
                },
            )
            .await
            .unwrap();

        let stored = repo.get_by_id(signed_up.user.id).await.unwrap().unwrap();
        assert!(credentials::verify_password("NewPass1", &stored.password_hash).unwrap());
        assert!(stored.reset_password_token.is_none());

        let reused = service
            .reset_password(
                &token,
                ResetPasswordRequest {
                    password: "NewPass1".to_string(),
                    confirm_password: "NewPass1".to_string(),
                },
            )
            .await;
        assert!(matches!(reused, Err(UserError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_forgot_password_mail_failure_is_not_returned() {
        let service = service_with(
            InMemoryUserRepository::new(),
            MockEmailProvider::failing("relay down"),
        );
        service.signup(signup_input()).await.unwrap();

        assert!(service.forgot_password("alice@example.com").await.is_ok());
        assert!(matches!(
            service.forgot_password("nobody@example.com").await,
            Err(UserError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_expired_reset_token_rejected() {
        let repo = InMemoryUserRepository::new();
        let service = service_with(repo.clone(), MockEmailProvider::new());
        let signed_up = service.signup(signup_input()).await.unwrap();

        repo.set_reset_token(
            signed_up.user.id,
            "expired",
            Utc::now() - chrono::Duration::minutes(1),
        )
        .await
        .unwrap();

        let result = service
            .reset_password(
                "expired",
                ResetPasswordRequest {
                    password: "NewPass1".to_string(),
                    confirm_password: "NewPass1".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(UserError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_update_profile_stores_picture() {
        let service = service();
        let signed_up = service.signup(signup_input()).await.unwrap();

        let updated = service
            .update_profile(
                ProfileForm {
                    user_id: signed_up.user.id.to_string(),
                    name: "Alice Liddell".to_string(),
                    dob: "1990-07-15".to_string(),
                },
                Some(ProfilePicture {
                    file_name: Some("me.PNG".to_string()),
                    bytes: vec![1, 2, 3],
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Alice Liddell"));
        assert_eq!(updated.dob, chrono::NaiveDate::from_ymd_opt(1990, 7, 15));

        let path = updated.profile_pic.unwrap();
        assert!(path.ends_with(".png"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![1, 2, 3]);
    }

    fn stored_user() -> User {
        User::new(signup_input(), "$argon2id$placeholder".to_string())
    }

    #[tokio::test]
    async fn test_forgot_password_when_token_not_stored() {
        let user = stored_user();
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_set_reset_token().returning(|_, _, _| Ok(false));

        let mail = MockEmailProvider::new();
        let service = service_with(repo, mail.clone());

        let result = service.forgot_password("alice@example.com").await;
        assert!(matches!(result, Err(UserError::NotFound)));

        tokio::task::yield_now().await;
        assert_eq!(mail.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_reset_password_when_user_vanished() {
        let mut user = stored_user();
        user.reset_password_token = Some("abc".to_string());
        user.reset_password_expires = Some(Utc::now() + chrono::Duration::minutes(30));

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_reset_token()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update_password().returning(|_, _| Ok(false));

        let service = service_with(repo, MockEmailProvider::new());
        let result = service
            .reset_password(
                "abc",
                ResetPasswordRequest {
                    password: "NewPass1".to_string(),
                    confirm_password: "NewPass1".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(UserError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_update_profile_failure_removes_upload() {
        let user = stored_user();
        let id = user.id;
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update_profile().returning(|_, _| Ok(None));

        let service = service_with(repo, MockEmailProvider::new());
        let upload_dir = service.config.upload_dir.clone();

        let result = service
            .update_profile(
                ProfileForm {
                    user_id: id.to_string(),
                    name: "Alice".to_string(),
                    dob: "1990-07-15".to_string(),
                },
                Some(ProfilePicture {
                    file_name: Some("me.png".to_string()),
                    bytes: vec![9, 9, 9],
                }),
            )
            .await;
        assert!(matches!(result, Err(UserError::NotFound)));

        let mut entries = tokio::fs::read_dir(&upload_dir).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_errors() {
        let service = service();

        let invalid = service
            .update_profile(
                ProfileForm {
                    user_id: Uuid::now_v7().to_string(),
                    name: String::new(),
                    dob: "yesterday".to_string(),
                },
                None,
            )
            .await;
        match invalid {
            Err(UserError::Validation(errors)) => {
                assert!(errors.field_errors().contains_key("name"));
                assert!(errors.field_errors().contains_key("dob"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let bad_id = service
            .update_profile(
                ProfileForm {
                    user_id: "42".to_string(),
                    name: "Bob".to_string(),
                    dob: "1990-01-01".to_string(),
                },
                None,
            )
            .await;
        assert!(matches!(bad_id, Err(UserError::InvalidId(_))));

        let missing = service
            .update_profile(
                ProfileForm {
                    user_id: Uuid::now_v7().to_string(),
                    name: "Bob".to_string(),
                    dob: "1990-01-01".to_string(),
                },
                None,
            )
            .await;
        assert!(matches!(missing, Err(UserError::NotFound)));
    }
}
