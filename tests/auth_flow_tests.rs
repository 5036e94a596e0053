// SPDX-License-Identifier: MIT

//! Orchestrator-level tests for local credentials, refresh, logout, and
//! tier upgrades.

use auth_service::db::UserDirectory;
use auth_service::error::AppError;
use auth_service::models::AccountTier;

mod common;

#[tokio::test]
async fn test_register_then_login() {
    let (auth, _, _) = common::test_auth_service();

    let registered = auth
        .register(
            "alice@example.com",
            "pw1-secret",
            Some("Alice".to_string()),
            None,
        )
        .await
        .unwrap();
    assert_eq!(registered.user.email, "alice@example.com");

    let session = auth.login("alice@example.com", "pw1-secret").await.unwrap();

    // Token subject equals the registered email
    let claims = auth.tokens().verify(&session.access_token).unwrap();
    assert_eq!(claims.sub, "alice@example.com");
    assert_eq!(session.user.id, registered.user.id);
    assert_eq!(session.expires_in, auth.tokens().access_ttl_seconds());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (auth, store, _) = common::test_auth_service();

    auth.register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();
    let err = auth
        .register("alice@example.com", "other-secret", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    assert!(store.exists_by_email("alice@example.com").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_registration_single_winner() {
    let (auth, _, _) = common::test_auth_service();

    let (a, b) = futures::join!(
        auth.register("race@example.com", "pw-aaaaaaaa", None, None),
        auth.register("race@example.com", "pw-bbbbbbbb", None, None),
    );

    // Exactly one wins; the loser sees Conflict from the atomic create
    // even when both passed the existence pre-check.
    let ok_count = [a.is_ok(), b.is_ok()].iter().filter(|&&ok| ok).count();
    assert_eq!(ok_count, 1);
    for result in [a, b] {
        if let Err(e) = result {
            assert!(matches!(e, AppError::Conflict(_)));
        }
    }
}

#[tokio::test]
async fn test_login_failures_are_unauthorized() {
    let (auth, store, _) = common::test_auth_service();

    auth.register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();

    let err = auth
        .login("alice@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let err = auth
        .login("nobody@example.com", "pw1-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // Disabled users cannot authenticate
    let mut user = store
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    user.enabled = false;
    store.save(&user).await.unwrap();

    let err = auth
        .login("alice@example.com", "pw1-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_email_is_normalized() {
    let (auth, _, _) = common::test_auth_service();

    auth.register(" Alice@Example.COM ", "pw1-secret", None, None)
        .await
        .unwrap();

    // Same identity regardless of case
    auth.login("alice@example.com", "pw1-secret").await.unwrap();
    let err = auth
        .register("ALICE@example.com", "pw2-secret", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let (auth, _, _) = common::test_auth_service();

    let session = auth
        .register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();

    let refreshed = auth.refresh(&session.refresh_token).await.unwrap();
    let old = auth.tokens().verify(&session.access_token).unwrap();
    let new = auth.tokens().verify(&refreshed.access_token).unwrap();
    assert!(new.exp >= old.exp);
    assert_eq!(new.sub, "alice@example.com");

    // No rotation: the presented refresh token stays usable
    auth.refresh(&session.refresh_token).await.unwrap();
}

#[tokio::test]
async fn test_refresh_rejects_garbage_and_revoked() {
    let (auth, _, _) = common::test_auth_service();

    let err = auth.refresh("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let session = auth
        .register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();
    auth.logout(&session.refresh_token).await;

    let err = auth.refresh(&session.refresh_token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_refresh_honors_disabled_user() {
    let (auth, store, _) = common::test_auth_service();

    let session = auth
        .register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();

    let mut user = store
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    user.enabled = false;
    store.save(&user).await.unwrap();

    let err = auth.refresh(&session.refresh_token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_logout_revokes_until_expiry() {
    let (auth, _, _) = common::test_auth_service();

    let session = auth
        .register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();

    assert!(!auth.is_revoked(&session.access_token).await.unwrap());

    auth.logout(&session.access_token).await;
    assert!(auth.is_revoked(&session.access_token).await.unwrap());

    // Tokens never logged out are unaffected
    assert!(!auth.is_revoked(&session.refresh_token).await.unwrap());
}

#[tokio::test]
async fn test_logout_swallows_unparseable_tokens() {
    let (auth, _, _) = common::test_auth_service();

    // Does not panic or error, and records nothing
    auth.logout("garbage-token").await;
    assert!(!auth.is_revoked("garbage-token").await.unwrap());
}

#[tokio::test]
async fn test_change_password() {
    let (auth, _, _) = common::test_auth_service();

    auth.register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();

    let err = auth
        .change_password("alice@example.com", "pw1-secret", "new-secret", "different")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = auth
        .change_password("alice@example.com", "wrong", "new-secret", "new-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    auth.change_password("alice@example.com", "pw1-secret", "new-secret", "new-secret")
        .await
        .unwrap();

    assert!(auth.login("alice@example.com", "pw1-secret").await.is_err());
    auth.login("alice@example.com", "new-secret").await.unwrap();
}

#[tokio::test]
async fn test_change_password_keeps_existing_tokens_valid() {
    let (auth, _, _) = common::test_auth_service();

    let session = auth
        .register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();

    auth.change_password("alice@example.com", "pw1-secret", "new-secret", "new-secret")
        .await
        .unwrap();

    // Issued tokens stay valid until natural expiry unless blacklisted
    assert!(auth.tokens().verify(&session.access_token).is_ok());
    assert!(!auth.is_revoked(&session.access_token).await.unwrap());
}

#[tokio::test]
async fn test_upgrade_tier() {
    let (auth, _, _) = common::test_auth_service();

    auth.register("alice@example.com", "pw1-secret", None, None)
        .await
        .unwrap();

    let upgraded = auth
        .upgrade_tier("alice@example.com", AccountTier::Vip)
        .await
        .unwrap();
    assert_eq!(upgraded.account_tier, AccountTier::Vip);

    // Reflected in the next profile read
    let profile = auth.profile("alice@example.com").await.unwrap();
    assert_eq!(profile.account_tier, AccountTier::Vip);

    let err = auth
        .upgrade_tier("alice@example.com", AccountTier::Vip)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}
