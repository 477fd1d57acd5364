//! Adapter-wide extra request parameters and privacy persistence.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Parameter keys fixed by the partner SDK, not by this adapter.
pub mod keys {
    /// Request flag marking a hybrid mediation setup.
    pub const IS_HYBRID_SETUP: &str = "is_hybrid_setup";
    /// Echoed load-request identifier, sent only on hybrid setups.
    pub const PLACEMENT_REQUEST_ID: &str = "placement_request_id";
    /// Non-personalized-ads flag set while GDPR consent is withheld.
    pub const NON_PERSONALIZED_ADS: &str = "npa";
    /// Persisted restricted-data-processing setting the partner reads.
    pub const RESTRICTED_DATA_PROCESSING: &str = "gap_rdp";
    /// Query type stamped on every request from this adapter.
    pub const QUERY_TYPE: &str = "query_info_type";
    /// [`QUERY_TYPE`] value identifying bidding query-info requests.
    pub const QUERY_TYPE_BIDDING: &str = "requester_type_2";
}

/// Extra parameters included in every partner request.
///
/// Privacy-signal propagation mutates this map between requests; the
/// request builder snapshots it on every build and never caches the
/// result.
#[derive(Clone, Default)]
pub struct SharedExtras {
    inner: Arc<Mutex<Map<String, Value>>>,
}

impl SharedExtras {
    pub fn new() -> Self {
        SharedExtras::default()
    }

    pub fn set(&self, key: &str, value: Value) {
        self.inner.lock().insert(key.to_string(), value);
    }

    pub fn remove(&self, key: &str) {
        self.inner.lock().remove(key);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().get(key).cloned()
    }

    /// Current contents, copied; later mutations do not affect the
    /// snapshot.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.inner.lock().clone()
    }
}

/// Persisted boolean privacy settings (the platform's defaults store).
pub trait PrivacyStore: Send + Sync {
    fn set_flag(&self, key: &str, value: bool);
    fn flag(&self, key: &str) -> Option<bool>;
}

/// In-memory [`PrivacyStore`] for hosts without a platform store, and for
/// tests.
#[derive(Default)]
pub struct MemoryPrivacyStore {
    flags: Mutex<HashMap<String, bool>>,
}

impl MemoryPrivacyStore {
    pub fn new() -> Self {
        MemoryPrivacyStore::default()
    }
}

impl PrivacyStore for MemoryPrivacyStore {
    fn set_flag(&self, key: &str, value: bool) {
        self.flags.lock().insert(key.to_string(), value);
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.flags.lock().get(key).copied()
    }
}
