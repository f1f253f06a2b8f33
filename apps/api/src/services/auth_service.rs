//! Authentication service.
//!
//! Handles staff registration and email/password login.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use scanpos_core::validation::{validate_email, validate_name, validate_password};
use scanpos_core::{User, UserRole};
use scanpos_db::Store;

use crate::auth::{hash_password, verify_password, JwtManager};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub business_phone: Option<String>,
    #[serde(alias = "gstNumber")]
    pub business_gst: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by both register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Authentication service implementation.
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt_manager: JwtManager,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt_manager: JwtManager) -> Self {
        AuthService { store, jwt_manager }
    }

    /// Creates a `user`-role account and signs it in.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthResponse> {
        let name = validate_name("name", &request.name)?;
        let email = validate_email(&request.email)?;
        validate_password(&request.password)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash: hash_password(&request.password)?,
            role: UserRole::User,
            business_name: non_empty(request.business_name),
            business_address: non_empty(request.business_address),
            business_phone: non_empty(request.business_phone),
            business_gst: non_empty(request.business_gst),
            created_at: Utc::now(),
        };
        self.store.insert_user(&user).await?;

        let token = self.jwt_manager.generate_token(&user)?;
        info!(user_id = %user.id, email = %user.email, "User registered");
        Ok(AuthResponse { user, token })
    }

    /// Exchanges email and password for a token.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthResponse> {
        let email = request.email.trim().to_ascii_lowercase();
        if email.is_empty() || request.password.is_empty() {
            return Err(ApiError::validation("email and password are required"));
        }

        let user = match self.store.get_user_by_email(&email).await? {
            Some(user) if verify_password(&request.password, &user.password_hash) => user,
            _ => {
                warn!(email = %email, "Login rejected");
                return Err(ApiError::unauthorized("Invalid email or password"));
            }
        };

        let token = self.jwt_manager.generate_token(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse { user, token })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use scanpos_db::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            JwtManager::new("test-secret".to_string(), 3600),
        )
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            name: "Meera".to_string(),
            email: "Meera@Shop.in".to_string(),
            password: "counter-42".to_string(),
            business_gst: Some("27ABCDE1234F1Z5".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();
        let registered = service.register(register_request()).await.unwrap();
        assert_eq!(registered.user.email, "meera@shop.in");
        assert_eq!(registered.user.role, UserRole::User);
        assert!(registered.user.password_hash.starts_with("$argon2"));

        let logged_in = service
            .login(LoginRequest {
                email: "MEERA@shop.in".to_string(),
                password: "counter-42".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
        assert!(!logged_in.token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let service = service();
        service.register(register_request()).await.unwrap();
        let err = service.register(register_request()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let service = service();
        service.register(register_request()).await.unwrap();

        let wrong_password = service
            .login(LoginRequest {
                email: "meera@shop.in".to_string(),
                password: "counter-43".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(wrong_password.code, ErrorCode::Unauthorized);

        let unknown = service
            .login(LoginRequest {
                email: "ghost@shop.in".to_string(),
                password: "counter-42".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(unknown.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let mut request = register_request();
        request.password = "abc".to_string();
        let err = service().register(request).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_gst_number_alias() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Meera",
            "email": "meera@shop.in",
            "password": "counter-42",
            "gstNumber": "27ABCDE1234F1Z5"
        }))
        .unwrap();
        assert_eq!(request.business_gst.as_deref(), Some("27ABCDE1234F1Z5"));
    }
}
