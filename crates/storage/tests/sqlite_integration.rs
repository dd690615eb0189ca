use exam_core::model::{AnswerLedger, ExamId, ProgressSnapshot, QuestionId};
use exam_core::time::fixed_now;
use storage::repository::{ProgressStore, StorageError};
use storage::sqlite::SqliteProgressStore;

fn build_snapshot(exam_id: ExamId) -> ProgressSnapshot {
    let mut ledger = AnswerLedger::new();
    ledger.set(QuestionId::new(3), Some("Paris".into()), None);
    ledger.set(QuestionId::new(4), None, None);
    ProgressSnapshot::capture(exam_id, &ledger, 1, fixed_now())
}

#[tokio::test]
async fn sqlite_roundtrip_persists_snapshot() {
    let store = SqliteProgressStore::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    let exam_id = ExamId::new(7);
    assert!(store.load(exam_id).await.unwrap().is_none());

    let snapshot = build_snapshot(exam_id);
    store.save(exam_id, &snapshot).await.unwrap();

    let loaded = store.load(exam_id).await.unwrap().expect("snapshot stored");
    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.current_index, 1);
    assert_eq!(
        loaded.answers[&QuestionId::new(3)].text.as_deref(),
        Some("Paris")
    );
}

#[tokio::test]
async fn sqlite_save_replaces_previous_value() {
    let store = SqliteProgressStore::connect("sqlite:file:memdb_replace?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    let exam_id = ExamId::new(8);
    let mut snapshot = build_snapshot(exam_id);
    store.save(exam_id, &snapshot).await.unwrap();

    snapshot.current_index = 3;
    store.save(exam_id, &snapshot).await.unwrap();

    let loaded = store.load(exam_id).await.unwrap().unwrap();
    assert_eq!(loaded.current_index, 3);
}

#[tokio::test]
async fn sqlite_clear_is_idempotent() {
    let store = SqliteProgressStore::connect("sqlite:file:memdb_clear?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    let exam_id = ExamId::new(9);
    store.save(exam_id, &build_snapshot(exam_id)).await.unwrap();

    store.clear(exam_id).await.unwrap();
    assert!(store.load(exam_id).await.unwrap().is_none());
    store.clear(exam_id).await.unwrap();
}

#[tokio::test]
async fn sqlite_corrupt_value_surfaces_serialization_error() {
    let store = SqliteProgressStore::connect("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    sqlx::query("INSERT INTO exam_progress (key, value, updated_at) VALUES (?1, ?2, ?3)")
        .bind("exam_progress_10")
        .bind("{broken")
        .bind("2026-01-01T00:00:00Z")
        .execute(store.pool())
        .await
        .unwrap();

    let err = store.load(ExamId::new(10)).await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn sqlite_migrations_run_twice_without_error() {
    let store = SqliteProgressStore::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("first migrate");
    store.migrate().await.expect("second migrate");
}
