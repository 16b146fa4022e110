//! BTreeMap-backed store with secondary time index
//!
//! ## Design
//!
//! - Primary map: `RecordKey -> Record`, the single physical table shared by
//!   log and stream-registry rows.
//! - Secondary index: `(stream_id, sort_key, partition_key) -> RecordKey`,
//!   maintained on every log write/delete. The tuple ordering makes an
//!   ascending range scan per stream trivial; descending traversal reverses
//!   it. The partition key is part of the index key only to disambiguate
//!   records sharing a sort key, mirroring how a real secondary index carries
//!   the primary key.
//! - One `RwLock` over both maps gives each call the per-key atomicity the
//!   store contract requires; the guarded update/delete check the
//!   discriminator and apply under the same lock.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound::{Included, Unbounded};
use tracing::debug;
use tracklog_core::error::{Error, Result};
use tracklog_core::traits::{IndexPage, IndexPosition, IndexQuery, Store};
use tracklog_core::types::{FieldUpdate, LogRecord, Record, RecordKey, StreamRecord, UpdatePatch};

type IndexKey = (String, String, String);

#[derive(Default)]
struct Inner {
    rows: BTreeMap<RecordKey, Record>,
    by_stream: BTreeMap<IndexKey, RecordKey>,
}

/// In-memory store with the same observable semantics as the external
/// store service.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored (both kinds)
    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    /// Whether the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a raw row by key. Test/diagnostic helper; the engine never
    /// reads rows point-wise.
    pub fn get(&self, key: &RecordKey) -> Option<Record> {
        self.inner.read().rows.get(key).cloned()
    }

    fn index_key(record: &LogRecord, key: &RecordKey) -> IndexKey {
        (
            record.stream_id.clone(),
            key.sort_key.clone(),
            key.partition_key.clone(),
        )
    }

    fn stream_row_key(stream_id: &str) -> RecordKey {
        RecordKey {
            partition_key: format!("STREAM#{stream_id}"),
            sort_key: "META".to_string(),
        }
    }
}

impl Store for MemoryStore {
    fn put_log(&self, record: LogRecord) -> Result<()> {
        let key = record.key();
        let mut inner = self.inner.write();

        // Point-write overwrite: drop the stale index entry if the same
        // primary key previously indexed under another stream.
        let stale = match inner.rows.get(&key) {
            Some(Record::Log(prior)) if prior.stream_id != record.stream_id => {
                Some(Self::index_key(prior, &key))
            }
            _ => None,
        };
        if let Some(stale) = stale {
            inner.by_stream.remove(&stale);
        }

        debug!(partition = %key.partition_key, sort = %key.sort_key, "put log row");
        inner
            .by_stream
            .insert(Self::index_key(&record, &key), key.clone());
        inner.rows.insert(key, Record::Log(record));
        Ok(())
    }

    fn update_log(&self, key: &RecordKey, patch: &UpdatePatch) -> Result<()> {
        let mut inner = self.inner.write();
        // Guard and apply under one lock: the discriminator is checked at
        // apply time, never via a separate read.
        match inner.rows.get_mut(key) {
            Some(Record::Log(record)) => {
                // The canonical start is immutable, so the end ordering
                // invariant can be checked before anything is applied.
                for field in patch.fields() {
                    if let FieldUpdate::CanonicalEnd(end) = field {
                        if *end < record.canonical_start {
                            return Err(Error::EndBeforeStart);
                        }
                    }
                }
                patch.apply(record);
                Ok(())
            }
            _ => Err(Error::NotFound),
        }
    }

    fn delete_log(&self, key: &RecordKey) -> Result<()> {
        let mut inner = self.inner.write();
        let index_key = match inner.rows.get(key) {
            Some(Record::Log(record)) => Self::index_key(record, key),
            _ => return Err(Error::NotFound),
        };
        inner.rows.remove(key);
        inner.by_stream.remove(&index_key);
        Ok(())
    }

    fn query_index(&self, query: &IndexQuery) -> Result<IndexPage> {
        let inner = self.inner.read();

        let start: IndexKey = (query.stream_id.clone(), String::new(), String::new());
        let entries: Vec<(&IndexKey, &RecordKey)> = inner
            .by_stream
            .range((Included(start), Unbounded))
            .take_while(|((sid, _, _), _)| sid == &query.stream_id)
            .filter(|((_, sk, _), _)| match &query.range {
                Some((lo, hi)) => sk >= lo && sk <= hi,
                None => true,
            })
            .collect();

        let mut records = Vec::new();
        let mut more = false;
        for ((_, sort_key, partition_key), key) in entries.iter().rev() {
            if let Some(pos) = &query.start_after {
                // Descending traversal resumes strictly past the position.
                if (sort_key.as_str(), partition_key.as_str())
                    >= (pos.sort_key.as_str(), pos.partition_key.as_str())
                {
                    continue;
                }
            }
            if records.len() == query.limit {
                more = true;
                break;
            }
            match inner.rows.get(*key) {
                Some(Record::Log(record)) => records.push(record.clone()),
                _ => {
                    return Err(Error::Store(format!(
                        "index entry without log row: {sort_key}"
                    )))
                }
            }
        }

        let last_evaluated = if more {
            records.last().map(|record| IndexPosition {
                stream_id: record.stream_id.clone(),
                sort_key: record.sort_key.clone(),
                partition_key: tracklog_core::key::partition_key(record.shard_key),
            })
        } else {
            None
        };

        Ok(IndexPage {
            records,
            last_evaluated,
        })
    }

    fn create_stream(&self, stream: StreamRecord) -> Result<()> {
        let key = Self::stream_row_key(&stream.stream_id);
        let mut inner = self.inner.write();
        if inner.rows.contains_key(&key) {
            return Err(Error::StreamExists(stream.stream_id));
        }
        debug!(stream = %stream.stream_id, "register stream");
        inner.rows.insert(key, Record::Stream(stream));
        Ok(())
    }

    fn list_streams(&self) -> Result<Vec<StreamRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .rows
            .values()
            .filter_map(|row| match row {
                Record::Stream(stream) => Some(stream.clone()),
                Record::Log(_) => None,
            })
            .collect())
    }
}
