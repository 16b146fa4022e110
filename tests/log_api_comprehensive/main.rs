//! End-to-end exercise of the public API: write, paginate, window, update,
//! delete, registry - all against the in-memory reference store.

use std::sync::Arc;
use tracklog::{
    ephemeral, key, Error, ErrorKind, Limits, MemoryStore, QueryRequest, RecordKey, Store,
    StreamRecord, TimeLog, UpdateRequest, WriteRequest,
};

/// Route engine warnings into the captured test output
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn write(stream: &str, date: &str, start: &str, end: Option<&str>) -> WriteRequest {
    WriteRequest {
        stream_display_name: stream.to_string(),
        calendar_date: date.to_string(),
        start_time: start.to_string(),
        end_time: end.map(str::to_string),
        text: None,
    }
}

fn query(stream: &str) -> QueryRequest {
    QueryRequest {
        stream_display_name: stream.to_string(),
        ..QueryRequest::default()
    }
}

// ========== Pagination ==========

#[test]
fn pagination_is_exhaustive_and_non_duplicating() {
    let store = Arc::new(MemoryStore::new());
    let log = TimeLog::with_limits(
        store,
        Limits {
            page_size: 7,
            ..Limits::default()
        },
    );

    // Three weeks of entries, two per day, written out of order
    let mut expected = Vec::new();
    for day in (1..=21).rev() {
        for start in ["19:15", "07:30"] {
            let date = format!("2024-03-{day:02}");
            log.record(write("Deep Work", &date, start, None)).unwrap();
            expected.push(key::sort_key(
                tracklog::reconcile::canonical_instant(&date, start).unwrap(),
            ));
        }
    }
    expected.sort_by(|a, b| b.cmp(a));

    let mut collected = Vec::new();
    let mut cursor = None;
    let mut pages = 0;
    loop {
        let page = log
            .query(QueryRequest {
                cursor: cursor.take(),
                ..query("deep-work")
            })
            .unwrap();
        assert!(page.records.len() <= 7);
        collected.extend(page.records.iter().map(|r| r.sort_key.clone()));
        pages += 1;
        match page.cursor {
            Some(token) => cursor = Some(token),
            None => break,
        }
    }

    assert_eq!(pages, 6); // 42 records / 7 per page
    assert_eq!(collected, expected); // no repeats, no gaps, strictly descending
}

#[test]
fn full_page_does_not_dangle_a_cursor() {
    let store = Arc::new(MemoryStore::new());
    let log = TimeLog::with_limits(
        store,
        Limits {
            page_size: 3,
            ..Limits::default()
        },
    );
    for start in ["09:00", "10:00", "11:00"] {
        log.record(write("Gym", "2024-03-15", start, None)).unwrap();
    }

    let page = log.query(query("Gym")).unwrap();
    assert_eq!(page.records.len(), 3);
    assert!(page.cursor.is_none());
}

// ========== Date Windowing ==========

#[test]
fn date_filter_windows_one_utc_day() {
    let log = ephemeral();
    log.record(write("Gym", "2024-03-14", "11:59 PM", None)).unwrap();
    log.record(write("Gym", "2024-03-15", "12:00 AM", None)).unwrap();
    log.record(write("Gym", "2024-03-15", "11:59 PM", None)).unwrap();
    log.record(write("Gym", "2024-03-16", "12:00 AM", None)).unwrap();

    let page = log
        .query(QueryRequest {
            calendar_date: Some("2024-03-15".to_string()),
            ..query("Gym")
        })
        .unwrap();

    assert_eq!(page.records.len(), 2);
    for rec in &page.records {
        assert!(rec.sort_key.starts_with("TIME#2024-03-15T"));
    }
}

#[test]
fn malformed_date_filter_returns_most_recent_page() {
    init_tracing();
    let log = ephemeral();
    log.record(write("Gym", "2024-03-15", "09:00", None)).unwrap();
    log.record(write("Gym", "2024-03-16", "09:00", None)).unwrap();

    let page = log
        .query(QueryRequest {
            calendar_date: Some("not-a-date".to_string()),
            ..query("Gym")
        })
        .unwrap();

    assert_eq!(page.records.len(), 2);
    assert!(page.records[0].sort_key.contains("2024-03-16"));
}

// ========== Durations Through the Write Path ==========

#[test]
fn stored_instants_support_duration_display() {
    let log = ephemeral();
    log.record(write("Gym", "2024-03-15", "09:00", Some("10:30")))
        .unwrap();
    log.record(write("Gym", "2024-03-15", "11:00 PM", Some("12:30 AM")))
        .unwrap();

    let page = log.query(query("Gym")).unwrap();
    for rec in &page.records {
        let end = rec.canonical_end.expect("both records have ends");
        assert!(end >= rec.canonical_start);
        let minutes = tracklog::reconcile::duration_minutes(rec.canonical_start, end);
        assert_eq!(tracklog::reconcile::format_duration(minutes), "1h 30m");
    }
}

// ========== Update Guard ==========

#[test]
fn disallowed_only_update_leaves_store_unchanged() {
    let log = ephemeral();
    let receipt = log
        .record(write("Gym", "2024-03-15", "09:00", None))
        .unwrap();

    let mut fields = serde_json::Map::new();
    fields.insert("sortKey".to_string(), "TIME#2030-01-01T00:00:00Z".into());
    fields.insert("shardKey".to_string(), 9.into());

    let err = log
        .update(UpdateRequest {
            key: receipt.key.clone(),
            fields,
        })
        .unwrap_err();
    assert!(matches!(err, Error::NothingToUpdate));

    // The record is untouched and still found where it was
    let page = log.query(query("Gym")).unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].sort_key, receipt.key.sort_key);
}

#[test]
fn end_instant_update_cannot_precede_start() {
    init_tracing();
    let log = ephemeral();
    let receipt = log
        .record(write("Gym", "2024-03-15", "09:00", None))
        .unwrap();

    // An end a full day before the start must never land
    let mut fields = serde_json::Map::new();
    fields.insert("endInstant".to_string(), "2024-03-14T01:00:00Z".into());
    let err = log
        .update(UpdateRequest {
            key: receipt.key.clone(),
            fields,
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Guard);

    let page = log.query(query("Gym")).unwrap();
    assert!(page.records[0].canonical_end.is_none());

    // A well-ordered end is accepted through the same path
    let mut fields = serde_json::Map::new();
    fields.insert("endInstant".to_string(), "2024-03-15T10:30:00Z".into());
    log.update(UpdateRequest {
        key: receipt.key,
        fields,
    })
    .unwrap();

    let page = log.query(query("Gym")).unwrap();
    let rec = &page.records[0];
    assert!(rec.canonical_end.unwrap() >= rec.canonical_start);
}

#[test]
fn update_against_deleted_record_fails_atomically() {
    let log = ephemeral();
    let receipt = log
        .record(write("Gym", "2024-03-15", "09:00", None))
        .unwrap();
    log.delete(receipt.key.clone()).unwrap();

    let mut fields = serde_json::Map::new();
    fields.insert("text".to_string(), "too late".into());
    let err = log
        .update(UpdateRequest {
            key: receipt.key,
            fields,
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Guard);
}

// ========== Delete Guard ==========

#[test]
fn delete_of_registry_entity_fails_and_entity_survives() {
    let store = Arc::new(MemoryStore::new());
    let log = TimeLog::new(store.clone());
    log.create_stream("Gym").unwrap();

    // Aim the delete at the registry row's physical key
    let registry_key = RecordKey {
        partition_key: "STREAM#gym".to_string(),
        sort_key: "META".to_string(),
    };
    let err = log.delete(registry_key).unwrap_err();
    assert!(matches!(err, Error::NotFound));
    assert_eq!(err.to_string(), "record not found or not a log record");

    assert_eq!(log.streams().unwrap().len(), 1);
}

// ========== Shard Distribution ==========

#[test]
fn writes_spread_across_shards_independent_of_stream_and_time() {
    let log = ephemeral();
    let mut shards = std::collections::HashSet::new();
    for _ in 0..200 {
        let receipt = log
            .record(write("Gym", "2024-03-15", "09:00", None))
            .unwrap();
        let shard: u8 = receipt.key.partition_key
            .strip_prefix("LOG#")
            .unwrap()
            .parse()
            .unwrap();
        assert!(shard < 10);
        shards.insert(shard);
    }
    // Identical stream and instant, many distinct shards
    assert!(shards.len() >= 5);
}

// ========== Custom Store Injection ==========

/// A store that always fails, standing in for an unreachable service.
struct DownStore;

impl Store for DownStore {
    fn put_log(&self, _: tracklog::LogRecord) -> tracklog::Result<()> {
        Err(Error::Store("service unavailable".to_string()))
    }
    fn update_log(
        &self,
        _: &RecordKey,
        _: &tracklog::UpdatePatch,
    ) -> tracklog::Result<()> {
        Err(Error::Store("service unavailable".to_string()))
    }
    fn delete_log(&self, _: &RecordKey) -> tracklog::Result<()> {
        Err(Error::Store("service unavailable".to_string()))
    }
    fn query_index(
        &self,
        _: &tracklog::IndexQuery,
    ) -> tracklog::Result<tracklog::IndexPage> {
        Err(Error::Store("service unavailable".to_string()))
    }
    fn create_stream(&self, _: StreamRecord) -> tracklog::Result<()> {
        Err(Error::Store("service unavailable".to_string()))
    }
    fn list_streams(&self) -> tracklog::Result<Vec<StreamRecord>> {
        Err(Error::Store("service unavailable".to_string()))
    }
}

#[test]
fn store_failures_surface_as_retryable_with_message() {
    let log = TimeLog::new(Arc::new(DownStore));

    let err = log
        .record(write("Gym", "2024-03-15", "09:00", None))
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("service unavailable"));

    // Validation still happens before the store is contacted
    let err = log.query(query("")).unwrap_err();
    assert!(!err.is_retryable());
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ========== Registry ==========

#[test]
fn registry_round_trip_and_conflict() {
    let log = ephemeral();
    log.create_stream("MIT 6.S081").unwrap();
    log.create_stream("Gym").unwrap();

    let err = log.create_stream("mit-6-s081").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let mut names: Vec<_> = log
        .streams()
        .unwrap()
        .into_iter()
        .map(|s| s.stream_id)
        .collect();
    names.sort();
    assert_eq!(names, vec!["gym", "mit6s081"]);
}
