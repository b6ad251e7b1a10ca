//! Balance engine and auditor behavior over the in-memory ledger store.

mod helpers;

use helpers::TestHarness;
use ledger_backend::error::AppError;
use ledger_backend::models::TransactionType;
use ledger_backend::repositories::LedgerStore;
use uuid::Uuid;

#[tokio::test]
async fn credit_and_debit_sequence_matches_signed_sum() {
    let h = TestHarness::new();
    let user = h.provision_user("sum@example.com").await;

    let ops = [
        (TransactionType::Credit, 100),
        (TransactionType::Credit, 250),
        (TransactionType::Debit, 30),
        (TransactionType::Credit, 5),
        (TransactionType::Debit, 125),
    ];

    let mut expected = 0i64;
    for (tx_type, amount) in ops {
        h.wallet_service
            .apply_transaction(user.id, amount, tx_type)
            .await
            .expect("operation within balance should succeed");
        expected += tx_type.signed(amount);
    }

    let balance = h.auditor.compute_balance(user.id).await.unwrap();
    assert_eq!(balance.amount, expected);

    // Cached balance agrees with the ledger aggregate
    let wallet = h.ledger_store.find_wallet(user.id).await.unwrap().unwrap();
    assert_eq!(wallet.balance, expected);
}

#[tokio::test]
async fn oversized_debit_appends_nothing() {
    let h = TestHarness::new();
    let user = h.provision_user("overdraft@example.com").await;

    h.wallet_service
        .apply_transaction(user.id, 50, TransactionType::Credit)
        .await
        .unwrap();

    let err = h
        .wallet_service
        .apply_transaction(user.id, 51, TransactionType::Debit)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientFunds {
            balance: 50,
            requested: 51
        }
    ));

    // No ledger entry was appended and the balance is unchanged
    let entries = h.wallet_service.list_transactions(None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(h.auditor.compute_balance(user.id).await.unwrap().amount, 50);
    let wallet = h.ledger_store.find_wallet(user.id).await.unwrap().unwrap();
    assert_eq!(wallet.balance, 50);
}

#[tokio::test]
async fn concrete_scenario_credit_debit_reject() {
    let h = TestHarness::new();
    let user = h.provision_user("scenario@example.com").await;

    h.wallet_service
        .apply_transaction(user.id, 100, TransactionType::Credit)
        .await
        .unwrap();
    assert_eq!(
        h.auditor.compute_balance(user.id).await.unwrap().amount,
        100
    );

    h.wallet_service
        .apply_transaction(user.id, 40, TransactionType::Debit)
        .await
        .unwrap();
    assert_eq!(h.auditor.compute_balance(user.id).await.unwrap().amount, 60);

    let err = h
        .wallet_service
        .apply_transaction(user.id, 1000, TransactionType::Debit)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));
    assert_eq!(h.auditor.compute_balance(user.id).await.unwrap().amount, 60);
}

#[tokio::test]
async fn non_positive_amount_rejected_before_store_access() {
    let h = TestHarness::new();

    // Even for a user with no wallet, validation fires first
    let err = h
        .wallet_service
        .apply_transaction(Uuid::new_v4(), 0, TransactionType::Credit)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = h
        .wallet_service
        .apply_transaction(Uuid::new_v4(), -5, TransactionType::Debit)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn missing_wallet_is_not_found_and_appends_nothing() {
    let h = TestHarness::new();

    let err = h
        .wallet_service
        .apply_transaction(Uuid::new_v4(), 10, TransactionType::Credit)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let entries = h.wallet_service.list_transactions(None).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn auditor_returns_zero_for_wallet_without_transactions() {
    let h = TestHarness::new();
    let user = h.provision_user("fresh@example.com").await;

    let balance = h.auditor.compute_balance(user.id).await.unwrap();
    assert_eq!(balance.amount, 0);
}

#[tokio::test]
async fn auditor_not_found_only_when_wallet_missing() {
    let h = TestHarness::new();

    let err = h.auditor.compute_balance(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_transactions_newest_first_with_type_filter() {
    let h = TestHarness::new();
    let user = h.provision_user("history@example.com").await;

    h.wallet_service
        .apply_transaction(user.id, 100, TransactionType::Credit)
        .await
        .unwrap();
    h.wallet_service
        .apply_transaction(user.id, 40, TransactionType::Debit)
        .await
        .unwrap();
    h.wallet_service
        .apply_transaction(user.id, 7, TransactionType::Credit)
        .await
        .unwrap();

    let all = h.wallet_service.list_transactions(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].amount, 7);
    assert_eq!(all[1].amount, 40);
    assert_eq!(all[2].amount, 100);

    let credits = h
        .wallet_service
        .list_transactions(Some(TransactionType::Credit))
        .await
        .unwrap();
    assert_eq!(credits.len(), 2);
    assert!(credits
        .iter()
        .all(|t| t.tx_type() == Some(TransactionType::Credit)));

    let debits = h
        .wallet_service
        .list_transactions(Some(TransactionType::Debit))
        .await
        .unwrap();
    assert_eq!(debits.len(), 1);
    assert_eq!(debits[0].amount, 40);
}
