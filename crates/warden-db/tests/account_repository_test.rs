//! Integration tests for the Account repository using in-memory SurrealDB.

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use warden_core::error::WardenError;
use warden_core::models::account::{AccountStatus, CreateAccount, Role, UpdateAccount};
use warden_core::repository::AccountRepository;
use warden_db::repository::SurrealAccountRepository;

async fn setup() -> SurrealAccountRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();
    SurrealAccountRepository::new(db)
}

fn new_account(identity: &str) -> CreateAccount {
    CreateAccount {
        identity: identity.into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
    }
}

#[tokio::test]
async fn create_starts_as_active_user() {
    let repo = setup().await;

    let account = repo.create(new_account("alice")).await.unwrap();

    assert_eq!(account.identity, "alice");
    assert_eq!(account.role, Role::User);
    assert_eq!(account.status, AccountStatus::Active);
    assert!(account.last_login_at.is_none());

    let fetched = repo.get_by_id(account.id).await.unwrap();
    assert_eq!(fetched.identity, "alice");
    assert_eq!(fetched.password_hash, account.password_hash);
}

#[tokio::test]
async fn get_by_identity_finds_account() {
    let repo = setup().await;
    let created = repo.create(new_account("bob")).await.unwrap();

    let found = repo.get_by_identity("bob").await.unwrap();
    assert_eq!(found.id, created.id);
}

#[tokio::test]
async fn get_by_identity_missing_is_not_found() {
    let repo = setup().await;

    let err = repo.get_by_identity("nobody").await.unwrap_err();
    assert!(
        matches!(err, WardenError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn duplicate_identity_is_rejected() {
    let repo = setup().await;
    repo.create(new_account("carol")).await.unwrap();

    let err = repo.create(new_account("carol")).await.unwrap_err();
    assert!(
        matches!(err, WardenError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn concurrent_duplicate_creates_insert_once() {
    let repo = setup().await;

    let (a, b) = tokio::join!(
        repo.create(new_account("dave")),
        repo.create(new_account("dave"))
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one insert should win: {a:?} / {b:?}");
    let loser = if a.is_err() { a } else { b };
    assert!(matches!(
        loser.unwrap_err(),
        WardenError::AlreadyExists { .. }
    ));
}

#[tokio::test]
async fn touch_last_login_sets_timestamp() {
    let repo = setup().await;
    let account = repo.create(new_account("erin")).await.unwrap();

    let at = Utc::now();
    repo.touch_last_login(account.id, at).await.unwrap();
    // Idempotent.
    repo.touch_last_login(account.id, at).await.unwrap();

    let fetched = repo.get_by_id(account.id).await.unwrap();
    let stored = fetched.last_login_at.expect("last login should be set");
    assert_eq!(stored.timestamp_millis(), at.timestamp_millis());
}

#[tokio::test]
async fn touch_last_login_missing_account() {
    let repo = setup().await;

    let err = repo
        .touch_last_login(uuid::Uuid::new_v4(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::NotFound { .. }));
}

#[tokio::test]
async fn update_changes_role_and_status() {
    let repo = setup().await;
    let account = repo.create(new_account("frank")).await.unwrap();

    let updated = repo
        .update(
            account.id,
            UpdateAccount {
                role: Some(Role::Administrator),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Administrator);
    assert_eq!(updated.status, AccountStatus::Active);

    let updated = repo
        .update(
            account.id,
            UpdateAccount {
                status: Some(AccountStatus::Blocked),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Administrator);
    assert_eq!(updated.status, AccountStatus::Blocked);
}

#[tokio::test]
async fn update_missing_account() {
    let repo = setup().await;

    let err = repo
        .update(uuid::Uuid::new_v4(), UpdateAccount::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::NotFound { .. }));
}
