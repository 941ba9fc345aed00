//! Authentication service tests against the in-memory store.

mod common;

use std::sync::Arc;

use tokio_test::assert_ok;

use artisan_catalog::domain::{AccountType, AuthProvider, Identity, Role};
use artisan_catalog::errors::AppError;
use artisan_catalog::services::AuthService;

use common::{authenticator, social_profile, InMemoryStore};

#[tokio::test]
async fn test_duplicate_admin_registration_conflicts() {
    let store = Arc::new(InMemoryStore::default());
    let auth = authenticator(store);

    assert_ok!(
        auth.register_admin("curator@example.com".into(), "s3cret!".into())
            .await
    );
    let second = auth
        .register_admin("curator@example.com".into(), "another!".into())
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_admin_login_issues_admin_token() {
    let store = Arc::new(InMemoryStore::default());
    let auth = authenticator(store);
    let admin = auth
        .register_admin("curator@example.com".into(), "s3cret!".into())
        .await
        .unwrap();

    let session = auth
        .login_admin("curator@example.com".into(), "s3cret!".into())
        .await
        .unwrap();
    let claims = auth.verify_token(&session.token.access_token).unwrap();

    assert_eq!(claims.sub, admin.id);
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.account_type, AccountType::Admin);
    assert_eq!(session.token.expires_in, 24 * 3600);
}

#[tokio::test]
async fn test_unknown_admin_and_wrong_password_look_the_same() {
    let store = Arc::new(InMemoryStore::default());
    let auth = authenticator(store);
    auth.register_admin("curator@example.com".into(), "s3cret!".into())
        .await
        .unwrap();

    let wrong_password = auth
        .login_admin("curator@example.com".into(), "nope!!".into())
        .await;
    let unknown = auth
        .login_admin("ghost@example.com".into(), "s3cret!".into())
        .await;

    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_social_relogin_reuses_account() {
    let store = Arc::new(InMemoryStore::default());
    let auth = authenticator(store.clone());

    let first = auth
        .login_social_user(social_profile(AuthProvider::Google, "g-1", "ada@example.com"))
        .await
        .unwrap();

    let mut renamed = social_profile(AuthProvider::Google, "g-1", "ada@example.com");
    renamed.name = "Ada O.".to_string();
    let second = auth.login_social_user(renamed).await.unwrap();

    assert_eq!(first.user.id, second.user.id);
    assert_eq!(second.user.name, "Ada O.");
    assert_eq!(second.user.role, Role::User);
    assert_eq!(store.users.count(), 1);
}

#[tokio::test]
async fn test_social_login_merges_by_email_across_providers() {
    let store = Arc::new(InMemoryStore::default());
    let auth = authenticator(store.clone());

    let google = auth
        .login_social_user(social_profile(AuthProvider::Google, "g-1", "ada@example.com"))
        .await
        .unwrap();
    let facebook = auth
        .login_social_user(social_profile(AuthProvider::Facebook, "f-9", "ada@example.com"))
        .await
        .unwrap();

    assert_eq!(google.user.id, facebook.user.id);
    // The first provider stays the account's provider
    assert_eq!(facebook.user.provider, AuthProvider::Google);
    assert_eq!(store.users.count(), 1);
}

#[tokio::test]
async fn test_validate_principal_checks_the_right_table() {
    let store = Arc::new(InMemoryStore::default());
    let auth = authenticator(store);
    let session = auth
        .login_social_user(social_profile(AuthProvider::Google, "g-1", "ada@example.com"))
        .await
        .unwrap();

    let as_user = auth
        .validate_principal(session.user.id, AccountType::User)
        .await
        .unwrap();
    assert!(matches!(as_user, Some(Identity::User(_))));

    // Same id looked up as an admin finds nothing
    let as_admin = auth
        .validate_principal(session.user.id, AccountType::Admin)
        .await
        .unwrap();
    assert!(as_admin.is_none());
}

#[tokio::test]
async fn test_token_from_another_secret_is_rejected() {
    use artisan_catalog::config::Config;
    use artisan_catalog::services::{Authenticator, TokenIssuer};

    let store = Arc::new(InMemoryStore::default());
    let issuer_auth = authenticator(store.clone());
    let session = issuer_auth
        .login_social_user(social_profile(AuthProvider::Google, "g-1", "ada@example.com"))
        .await
        .unwrap();

    let other = Config::with_secret("a-completely-different-secret-value!!").unwrap();
    let verifier = Authenticator::new(store, TokenIssuer::new(&other));
    assert!(verifier.verify_token(&session.token.access_token).is_err());
}
