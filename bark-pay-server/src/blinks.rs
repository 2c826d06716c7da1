//! Pass-through store for Blink records.
//!
//! Blinks are shareable action cards created by the marketing pages. They
//! carry no transfer logic; the dispatcher exposes plain CRUD over an
//! in-memory store and treats the payload as opaque JSON.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use bark_pay::timestamp::UnixTimestamp;

/// A stored Blink record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blink {
    /// Server-assigned identifier.
    pub id: String,
    /// Creation time.
    pub created_at: UnixTimestamp,
    /// Opaque record payload.
    pub data: serde_json::Value,
}

/// In-memory Blink store.
#[derive(Debug, Default)]
pub struct BlinkStore {
    records: DashMap<String, Blink>,
    counter: std::sync::atomic::AtomicU64,
}

impl BlinkStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record and returns it.
    pub fn create(&self, data: serde_json::Value) -> Blink {
        let n = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let blink = Blink {
            id: format!("blink-{n}"),
            created_at: UnixTimestamp::now(),
            data,
        };
        self.records.insert(blink.id.clone(), blink.clone());
        blink
    }

    /// Fetches a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Blink> {
        self.records.get(id).map(|entry| entry.clone())
    }

    /// Lists all records.
    #[must_use]
    pub fn list(&self) -> Vec<Blink> {
        self.records.iter().map(|entry| entry.clone()).collect()
    }

    /// Replaces a record's payload, returning the updated record.
    #[must_use]
    pub fn update(&self, id: &str, data: serde_json::Value) -> Option<Blink> {
        self.records.get_mut(id).map(|mut entry| {
            entry.data = data;
            entry.clone()
        })
    }

    /// Deletes a record, returning whether it existed.
    #[must_use]
    pub fn delete(&self, id: &str) -> bool {
        self.records.remove(id).is_some()
    }
}
