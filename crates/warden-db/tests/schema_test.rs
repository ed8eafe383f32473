//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn fresh_db() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = fresh_db().await;

    warden_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("account"), "missing account table");
    assert!(info_str.contains("session"), "missing session table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = fresh_db().await;

    warden_db::run_migrations(&db).await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 2, "expected one record per migration");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_identities() {
    let db = fresh_db().await;
    warden_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE account SET \
         identity = 'alice', \
         password_hash = 'x', \
         role = 'user', \
         status = 'active'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let result = db
        .query(
            "CREATE account SET \
             identity = 'alice', \
             password_hash = 'y', \
             role = 'user', \
             status = 'active'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "duplicate identity should be rejected");
}

#[tokio::test]
async fn role_assertion_rejects_unknown_values() {
    let db = fresh_db().await;
    warden_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE account SET \
             identity = 'mallory', \
             password_hash = 'x', \
             role = 'root', \
             status = 'active'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown role should be rejected");
}
