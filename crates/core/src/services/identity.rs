//! Identity service: registration, login and password handling.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use templatehub_common::{AppError, AppResult, IdGenerator, config::AuthConfig, token};
use templatehub_db::{
    entities::{Role, user},
    repositories::UserRepository,
};
use validator::Validate;

/// Identity service for business logic.
#[derive(Clone)]
pub struct IdentityService {
    user_repo: UserRepository,
    auth: AuthConfig,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    /// Requested role name; only `Visitor` and `Owner` are self-serve.
    pub role: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub role: String,
}

impl IdentityService {
    /// Create a new identity service.
    #[must_use]
    pub fn new(user_repo: UserRepository, auth: AuthConfig) -> Self {
        Self {
            user_repo,
            auth,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user. The role is fixed here for the account's lifetime.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let role = Role::parse(&input.role).ok_or_else(|| {
            AppError::Validation("Invalid role. Allowed: Visitor, Owner".to_string())
        })?;

        if role == Role::Admin {
            return Err(AppError::Validation(
                "Admin signup is not allowed".to_string(),
            ));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.user_repo.create(model).await
    }

    /// Authenticate by email and password and issue a bearer token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = token::issue_token(
            &self.auth,
            &user.id,
            &user.name,
            &user.email,
            user.role.as_str(),
        )?;

        Ok(LoginResponse {
            token,
            user_id: user.id,
            name: user.name,
            role: user.role.to_string(),
        })
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            secret: "a-test-secret-of-reasonable-length".to_string(),
            issuer: "templatehub".to_string(),
            audience: "templatehub".to_string(),
            token_ttl_hours: 2,
        }
    }

    fn create_test_user(id: &str, email: &str, password: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role,
            created_at: Utc::now().into(),
        }
    }

    fn register_input(role: &str) -> RegisterInput {
        RegisterInput {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_hash_password_produces_argon2_string() {
        let hash = hash_password("secret-password").unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("secret-password").unwrap();
        assert!(verify_password("secret-password", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_role() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = IdentityService::new(UserRepository::new(db), test_auth_config());

        let result = service.register(register_input("superuser")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_admin_role() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = IdentityService::new(UserRepository::new(db), test_auth_config());

        let result = service.register(register_input("Admin")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        // Case variations are still Admin
        let result = service.register(register_input("admin")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let existing = create_test_user("user1", "test@example.com", "password123", Role::Visitor);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = IdentityService::new(UserRepository::new(db), test_auth_config());

        let result = service.register(register_input("Visitor")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_creates_visitor() {
        let created = create_test_user("user1", "test@example.com", "password123", Role::Visitor);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = IdentityService::new(UserRepository::new(db), test_auth_config());

        let user = service.register(register_input("visitor")).await.unwrap();
        assert_eq!(user.role, Role::Visitor);
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_unauthorized() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = IdentityService::new(UserRepository::new(db), test_auth_config());

        let result = service
            .login(LoginInput {
                email: "nobody@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let user = create_test_user("user1", "test@example.com", "password123", Role::Visitor);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let service = IdentityService::new(UserRepository::new(db), test_auth_config());

        let result = service
            .login(LoginInput {
                email: "test@example.com".to_string(),
                password: "not-the-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_issues_token_with_role_claim() {
        let auth = test_auth_config();
        let user = create_test_user("user1", "owner@example.com", "password123", Role::Owner);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let service = IdentityService::new(UserRepository::new(db), auth.clone());

        let response = service
            .login(LoginInput {
                email: "owner@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.role, "Owner");

        let claims = token::validate_token(&auth, &response.token).unwrap();
        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.role, "Owner");
    }
}
