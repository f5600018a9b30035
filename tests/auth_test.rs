//! Authentication flow tests: registration, login, token refresh.

mod common;

use assert_matches::assert_matches;
use std::sync::Arc;

use common::setup;
use reliefstock_api::{
    auth::{decode_token, AuthConfig, AuthService, RegisterUserInput},
    entities::user::UserRole,
    errors::ServiceError,
};

const TEST_SECRET: &str = "test_secret_key_for_token_signing_in_tests_only";

fn auth_service(db: Arc<reliefstock_api::db::DbPool>) -> AuthService {
    AuthService::new(
        AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 86_400,
        },
        db,
    )
}

fn register_input(username: &str) -> RegisterUserInput {
    RegisterUserInput {
        username: username.to_string(),
        email: format!("{}@example.org", username),
        password: "correct horse battery".to_string(),
        full_name: None,
        role: UserRole::ProductPurchaser,
    }
}

#[tokio::test]
async fn register_login_and_refresh_roundtrip() {
    let ctx = setup().await;
    let auth = auth_service(ctx.db.clone());

    let account = auth.register(register_input("purchaser")).await.unwrap();
    assert_eq!(account.role, UserRole::ProductPurchaser);
    assert_ne!(account.password_hash, "correct horse battery");

    let tokens = auth
        .login("purchaser", "correct horse battery")
        .await
        .unwrap();
    assert_eq!(tokens.token_type, "bearer");

    let claims = decode_token(TEST_SECRET, &tokens.access_token).unwrap();
    assert_eq!(claims.sub, account.id.to_string());
    assert_eq!(claims.username, "purchaser");
    assert_eq!(claims.role, UserRole::ProductPurchaser);

    // refresh rotates: the new pair works, the old refresh token dies
    let refreshed = auth.refresh(&tokens.refresh_token).await.unwrap();
    assert!(decode_token(TEST_SECRET, &refreshed.access_token).is_ok());

    let reuse = auth.refresh(&tokens.refresh_token).await;
    assert_matches!(reuse, Err(ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let ctx = setup().await;
    let auth = auth_service(ctx.db.clone());
    auth.register(register_input("someone")).await.unwrap();

    let wrong_password = auth.login("someone", "wrong").await;
    assert_matches!(wrong_password, Err(ServiceError::Unauthorized(_)));

    let unknown_user = auth.login("nobody", "whatever").await;
    assert_matches!(unknown_user, Err(ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let ctx = setup().await;
    let auth = auth_service(ctx.db.clone());

    auth.register(register_input("dup")).await.unwrap();
    let err = auth.register(register_input("dup")).await;
    assert_matches!(err, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn registration_validates_input() {
    let ctx = setup().await;
    let auth = auth_service(ctx.db.clone());

    let mut input = register_input("shortpass");
    input.password = "short".to_string();
    let err = auth.register(input).await;
    assert_matches!(err, Err(ServiceError::ValidationError(_)));

    let mut input = register_input("bademail");
    input.email = "not-an-email".to_string();
    let err = auth.register(input).await;
    assert_matches!(err, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn tampered_tokens_are_rejected() {
    let ctx = setup().await;
    let auth = auth_service(ctx.db.clone());
    auth.register(register_input("signer")).await.unwrap();
    let tokens = auth
        .login("signer", "correct horse battery")
        .await
        .unwrap();

    // wrong secret
    assert!(decode_token("another_secret_entirely_for_verification", &tokens.access_token).is_err());

    // mangled payload
    let mut broken = tokens.access_token.clone();
    broken.push('x');
    assert!(decode_token(TEST_SECRET, &broken).is_err());
}
