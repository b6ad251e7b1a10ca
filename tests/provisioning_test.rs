//! Provisioning saga behavior: happy path, compensation, and escalation.

mod helpers;

use helpers::{new_user, TestHarness};
use ledger_backend::error::AppError;
use ledger_backend::repositories::LedgerStore;

#[tokio::test]
async fn create_user_with_wallet_leaves_one_zero_balance_wallet() {
    let h = TestHarness::new();

    let user = h.provision_user("alice@example.com").await;

    let wallet = h
        .ledger_store
        .find_wallet(user.id)
        .await
        .unwrap()
        .expect("wallet must exist immediately after provisioning");
    assert_eq!(wallet.balance, 0);

    let fetched = h.user_service.get_user(user.id).await.unwrap();
    assert_eq!(fetched.email, "alice@example.com");
}

#[tokio::test]
async fn wallet_failure_compensates_and_surfaces_original_error() {
    let h = TestHarness::new();
    h.ledger_store.fail_next_wallet_creation();

    let err = h
        .user_service
        .create_user_with_wallet(new_user("bob@example.com"))
        .await
        .unwrap_err();

    // The original wallet-creation failure is what surfaces
    let user_id = match err {
        AppError::Provisioning { user_id, .. } => user_id,
        other => panic!("expected Provisioning error, got {:?}", other),
    };

    // Compensating delete ran: the user is not retrievable
    let err = h.user_service.get_user(user_id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(h.user_service.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_compensation_escalates_as_unrecoverable() {
    let h = TestHarness::new();
    h.ledger_store.fail_next_wallet_creation();
    h.user_store.fail_next_delete();

    let err = h
        .user_service
        .create_user_with_wallet(new_user("carol@example.com"))
        .await
        .unwrap_err();

    assert!(err.is_unrecoverable());
    let user_id = match err {
        AppError::UnrecoverableProvisioning { user_id, .. } => user_id,
        other => panic!("expected UnrecoverableProvisioning, got {:?}", other),
    };

    // The orphaned user row is still there, awaiting operator repair
    let orphan = h.user_service.get_user(user_id).await.unwrap();
    assert_eq!(orphan.email, "carol@example.com");
    assert!(h.ledger_store.find_wallet(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_surfaces_uniqueness_violation() {
    let h = TestHarness::new();
    h.provision_user("dup@example.com").await;

    let err = h
        .user_service
        .create_user_with_wallet(new_user("dup@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Duplicate(_)));
    assert_eq!(err.status_code(), 409);
    assert_eq!(h.user_service.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_email_rejected_before_any_store_access() {
    let h = TestHarness::new();

    let err = h
        .user_service
        .create_user_with_wallet(new_user("  "))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(h.user_service.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_and_delete_user_round_trip() {
    let h = TestHarness::new();
    let user = h.provision_user("dave@example.com").await;

    let mut attrs = new_user("dave@example.com");
    attrs.first_name = "David".to_string();
    h.user_service.update_user(user.id, attrs).await.unwrap();
    assert_eq!(
        h.user_service.get_user(user.id).await.unwrap().first_name,
        "David"
    );

    h.user_service.delete_user(user.id).await.unwrap();
    assert!(h.user_service.get_user(user.id).await.unwrap_err().is_not_found());
    // Wallet goes with the user
    assert!(h.ledger_store.find_wallet(user.id).await.unwrap().is_none());
}
