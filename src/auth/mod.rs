//! Authentication and authorization.
//!
//! JWT access tokens with database-backed refresh tokens, argon2 password
//! hashing, and an extractor that attributes every request to a user. The
//! service layer never authenticates; it receives the already-resolved
//! actor id and only attributes records to it.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{refresh_token, user, user::UserRole},
    errors::{ApiError, ServiceError},
};

/// Claim structure for access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    /// Unique id of this token
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated actor extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    /// Gate for admin-only operations.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "administrator role required".to_string(),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    crate::AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = crate::AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let claims = decode_token(&app.config.jwt_secret, token).map_err(|e| {
            debug!("token rejected: {}", e);
            ApiError::Unauthorized
        })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// Decodes and validates an access token.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ServiceError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| ServiceError::AuthError(format!("invalid token: {}", e)))?;
    Ok(data.claims)
}

/// Authentication configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
}

/// Access/refresh token pair returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Input for registering a new user (admin only).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserInput {
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub full_name: Option<String>,
    pub role: UserRole,
}

/// Authentication service: login, token refresh, user registration.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    pub fn hash_password(password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {}", e)))
    }

    pub fn verify_password(password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Authenticates a user by username and password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let account = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("invalid credentials".to_string()))?;

        if !account.is_active {
            return Err(ServiceError::Unauthorized("account disabled".to_string()));
        }

        if !Self::verify_password(password, &account.password_hash) {
            return Err(ServiceError::Unauthorized("invalid credentials".to_string()));
        }

        self.issue_token_pair(&account).await
    }

    /// Exchanges a refresh token for a fresh token pair, rotating it.
    #[instrument(skip(self, token))]
    pub async fn refresh(&self, token: &str) -> Result<TokenPair, ServiceError> {
        let stored = refresh_token::Entity::find()
            .filter(refresh_token::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("unknown refresh token".to_string()))?;

        if stored.expires_at < Utc::now() {
            stored.delete(self.db.as_ref()).await?;
            return Err(ServiceError::Unauthorized("refresh token expired".to_string()));
        }

        let account = user::Entity::find_by_id(stored.user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("unknown user".to_string()))?;

        if !account.is_active {
            return Err(ServiceError::Unauthorized("account disabled".to_string()));
        }

        stored.delete(self.db.as_ref()).await?;
        self.issue_token_pair(&account).await
    }

    /// Creates a new user account. The caller enforces the admin gate.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterUserInput) -> Result<user::Model, ServiceError> {
        input.validate()?;

        let existing = user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(input.username.clone()))
                    .add(user::Column::Email.eq(input.email.clone())),
            )
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "username or email already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let account = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(Self::hash_password(&input.password)?),
            full_name: Set(input.full_name),
            role: Set(input.role),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(account.insert(self.db.as_ref()).await?)
    }

    /// Looks up a user by id, for the `me` endpoint.
    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {} not found", user_id)))
    }

    async fn issue_token_pair(&self, account: &user::Model) -> Result<TokenPair, ServiceError> {
        let access_token = self.issue_access_token(account)?;
        let refresh_token = self.issue_refresh_token(account.id).await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    fn issue_access_token(&self, account: &user::Model) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            role: account.role,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ChronoDuration::seconds(self.config.access_token_ttl_secs as i64))
                .timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token signing failed: {}", e)))
    }

    async fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, ServiceError> {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();

        let now = Utc::now();
        let row = refresh_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token: Set(token.clone()),
            expires_at: Set(now
                + ChronoDuration::seconds(self.config.refresh_token_ttl_secs as i64)),
            created_at: Set(now),
        };
        row.insert(self.db.as_ref()).await?;
        Ok(token)
    }
}
