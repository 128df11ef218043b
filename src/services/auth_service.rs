//! User registration and login

use std::sync::Arc;

use bcrypt::{hash, verify};
use tracing::info;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::models::auth::AuthUser;
use crate::models::user::{NewUser, UserRole};
use crate::repositories::FleetStore;
use crate::services::jwt_service::JwtService;
use crate::utils::errors::{AppError, AppResult};

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid username or password".to_string())
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn FleetStore>,
    jwt: Arc<JwtService>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn FleetStore>, jwt: Arc<JwtService>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            jwt,
            bcrypt_cost,
        }
    }

    /// Creates a user; the role defaults to operator. An admin can only be
    /// created by another admin, or as the very first user.
    pub async fn register(
        &self,
        request: RegisterRequest,
        caller: Option<&AuthUser>,
    ) -> AppResult<UserResponse> {
        let username = request.username.trim().to_string();
        if self.store.find_user_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict("username already exists".to_string()));
        }

        let password = request.password;
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))??;

        let role = request.role.unwrap_or(UserRole::Operator);
        let new_user = NewUser {
            username,
            password_hash,
            role,
        };
        let user = match role {
            UserRole::Admin if caller.is_some_and(AuthUser::is_admin) => {
                self.store.insert_user(new_user).await?
            }
            UserRole::Admin => self
                .store
                .insert_first_user(new_user)
                .await?
                .ok_or_else(|| {
                    AppError::Forbidden("admin role required to create admin users".to_string())
                })?,
            UserRole::Operator => self.store.insert_user(new_user).await?,
        };

        info!(user_id = user.id, role = %user.role, "👤 User registered");
        Ok(UserResponse::from(&user))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .store
            .find_user_by_username(request.username.trim())
            .await?
            .ok_or_else(invalid_credentials)?;

        let password = request.password;
        let password_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))??;
        if !valid {
            return Err(invalid_credentials());
        }

        let (token, expires_at) = self.jwt.generate_access_token(&user)?;
        info!(user_id = user.id, "🔐 Login successful");

        Ok(LoginResponse {
            token,
            expires_at,
            user: UserResponse::from(&user),
        })
    }

    /// Current identity, as stored.
    pub async fn me(&self, auth: &AuthUser) -> AppResult<UserResponse> {
        let user = self
            .store
            .get_user(auth.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("user no longer exists".to_string()))?;
        Ok(UserResponse::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryFleetStore;
    use crate::services::jwt_service::JwtConfig;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryFleetStore::new()),
            Arc::new(JwtService::new(JwtConfig::new("test-secret", 1))),
            4,
        )
    }

    fn register(username: &str, role: Option<UserRole>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "secret123".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();
        let user = service.register(register("operator1", None), None).await.unwrap();
        assert_eq!(user.role, UserRole::Operator);

        let login = service
            .login(LoginRequest {
                username: "operator1".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert!(!login.token.is_empty());
        assert_eq!(login.user.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let service = service();
        service
            .register(register("admin", Some(UserRole::Admin)), None)
            .await.unwrap();
        assert!(matches!(
            service.register(register("admin", None), None).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_unauthorized() {
        let service = service();
        service.register(register("operator2", None), None).await.unwrap();

        let wrong_password = service
            .login(LoginRequest {
                username: "operator2".to_string(),
                password: "not-it!".to_string(),
            })
            .await;
        let unknown_user = service
            .login(LoginRequest {
                username: "ghost".to_string(),
                password: "secret123".to_string(),
            })
            .await;
        for result in [wrong_password, unknown_user] {
            match result {
                Err(AppError::Unauthorized(msg)) => {
                    assert_eq!(msg, "invalid username or password")
                }
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_only_first_user_or_admin_can_create_admin() {
        let service = service();
        let root = service
            .register(register("root", Some(UserRole::Admin)), None)
            .await
            .unwrap();
        assert_eq!(root.role, UserRole::Admin);

        match service
            .register(register("mallory", Some(UserRole::Admin)), None)
            .await
        {
            Err(AppError::Forbidden(msg)) => {
                assert_eq!(msg, "admin role required to create admin users")
            }
            other => panic!("unexpected: {other:?}"),
        }

        let operator = AuthUser {
            id: 99,
            username: "op".to_string(),
            role: UserRole::Operator,
        };
        assert!(matches!(
            service
                .register(register("mallory", Some(UserRole::Admin)), Some(&operator))
                .await,
            Err(AppError::Forbidden(_))
        ));

        let admin = AuthUser {
            id: root.id,
            username: root.username.clone(),
            role: UserRole::Admin,
        };
        let second = service
            .register(register("second-admin", Some(UserRole::Admin)), Some(&admin))
            .await
            .unwrap();
        assert_eq!(second.role, UserRole::Admin);
    }
}
