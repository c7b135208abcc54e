use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn missing_key_reads_as_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.get_value("absent").await.expect("read").is_none());
    assert!(storage.last_token_id().await.expect("read").is_none());
}

#[tokio::test]
async fn set_value_overwrites_existing_key() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_value("theme", "dark").await.expect("write");
    storage.set_value("theme", "light").await.expect("overwrite");

    let stored = storage.get_value("theme").await.expect("read").expect("value");
    assert_eq!(stored.key, "theme");
    assert_eq!(stored.value, "light");
    assert!(stored.updated_at <= Utc::now());
}

#[tokio::test]
async fn last_token_id_round_trips_under_fixed_key() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .set_last_token_id(&TokenId::sanitize("1234"))
        .await
        .expect("write");

    let raw = storage
        .get_value(LAST_TOKEN_ID_KEY)
        .await
        .expect("read")
        .expect("value");
    assert_eq!(raw.value, "1234");
    assert_eq!(
        storage.last_token_id().await.expect("read"),
        Some(TokenId::sanitize("1234"))
    );
}

#[tokio::test]
async fn empty_token_id_does_not_clobber_previous_value() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .set_last_token_id(&TokenId::sanitize("77"))
        .await
        .expect("write");
    storage
        .set_last_token_id(&TokenId::default())
        .await
        .expect("write empty");

    assert_eq!(
        storage.last_token_id().await.expect("read"),
        Some(TokenId::sanitize("77"))
    );
}

#[tokio::test]
async fn clear_last_token_id_reports_whether_a_row_was_removed() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(!storage.clear_last_token_id().await.expect("clear empty"));

    storage
        .set_last_token_id(&TokenId::sanitize("5"))
        .await
        .expect("write");
    assert!(storage.clear_last_token_id().await.expect("clear"));
    assert!(storage.last_token_id().await.expect("read").is_none());
}

#[tokio::test]
async fn non_digit_persisted_value_is_sanitized_on_read() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .set_value(LAST_TOKEN_ID_KEY, "#00-9")
        .await
        .expect("write");

    assert_eq!(
        storage.last_token_id().await.expect("read"),
        Some(TokenId::sanitize("009"))
    );
}

#[test]
fn memory_urls_have_no_filesystem_path() {
    assert!(sqlite_path("sqlite::memory:").is_none());
    assert!(sqlite_path("sqlite://file:kv?mode=memory&cache=shared").is_none());
    assert_eq!(
        sqlite_path("sqlite://./data/client.db"),
        Some(PathBuf::from("./data/client.db"))
    );
}
