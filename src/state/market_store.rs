use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::{MarketField, MarketRecord, MarketSnapshot};

// ---------------------------------------------------------------------------
// MarketStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    /// Market ids in insertion order. Exactly the key set of `records`.
    order: Vec<String>,
    records: HashMap<String, MarketRecord>,
}

/// Authoritative market id → record mapping. Presence here is the only
/// definition of "which markets exist"; views keep display caches at most.
///
/// Every operation is total: a missing id is a no-op or `None`, never an error.
#[derive(Debug, Default)]
pub struct MarketStore {
    inner: RwLock<Inner>,
}

impl MarketStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an empty record for `market_id` unless one already exists.
    pub fn add(&self, market_id: &str) {
        let mut inner = self.write();
        Self::add_locked(&mut inner, market_id);
    }

    fn add_locked(inner: &mut Inner, market_id: &str) {
        if !inner.records.contains_key(market_id) {
            inner.order.push(market_id.to_string());
            inner.records.insert(market_id.to_string(), MarketRecord::default());
        }
    }

    #[allow(dead_code)]
    pub fn remove(&self, market_id: &str) {
        let mut inner = self.write();
        if inner.records.remove(market_id).is_some() {
            inner.order.retain(|id| id != market_id);
        }
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.read().order.clone()
    }

    /// Overwrite exactly one field, creating the market first if it is unseen.
    pub fn set_field(&self, market_id: &str, field: MarketField) {
        let mut inner = self.write();
        Self::add_locked(&mut inner, market_id);
        if let Some(record) = inner.records.get_mut(market_id) {
            record.apply(field);
        }
    }

    pub fn get(&self, market_id: &str) -> Option<MarketRecord> {
        self.read().records.get(market_id).cloned()
    }

    /// Deep copy of every record, blobs included, in insertion order.
    /// Later mutations of the store are never visible through the snapshot.
    pub fn snapshot(&self) -> MarketSnapshot {
        let inner = self.read();
        let entries = inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id).map(|rec| (id.clone(), rec.clone())))
            .collect();
        MarketSnapshot::new(entries)
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        inner.order.clear();
        inner.records.clear();
    }

    pub fn market_count(&self) -> usize {
        self.read().order.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent_and_keeps_existing_fields() {
        let store = MarketStore::new();
        store.set_field("EURUSD", MarketField::Timeframe("H1".to_string()));
        store.add("EURUSD");

        assert_eq!(store.list_ids(), vec!["EURUSD".to_string()]);
        assert_eq!(store.get("EURUSD").unwrap().timeframe, "H1");
    }

    #[test]
    fn list_ids_tracks_added_minus_removed_in_insertion_order() {
        let store = MarketStore::new();
        store.add("A");
        store.set_field("B", MarketField::Notes("n".to_string()));
        store.add("C");
        store.add("A");
        store.remove("B");
        store.remove("missing");
        store.set_field("D", MarketField::DataSource("x".to_string()));
        store.add("B");

        assert_eq!(store.list_ids(), vec!["A", "C", "D", "B"]);
        assert_eq!(store.market_count(), 4);
    }

    #[test]
    fn set_field_on_unseen_market_defaults_every_other_field() {
        let store = MarketStore::new();
        store.set_field("GBPUSD", MarketField::OutOfSampleTimespan("2022".to_string()));

        let rec = store.get("GBPUSD").expect("market should be created");
        assert_eq!(rec.timeframe, "");
        assert_eq!(rec.data_source, "");
        assert_eq!(rec.optimisation_timespan, "");
        assert_eq!(rec.out_of_sample_timespan, "2022");
        assert!(rec.equity_curve.is_none());
        assert!(rec.performance_metrics.is_none());
        assert_eq!(rec.notes, "");
    }

    #[test]
    fn set_field_overwrites_only_the_targeted_field() {
        let store = MarketStore::new();
        store.set_field("X", MarketField::EquityCurve(Some(vec![1, 2, 3])));
        store.set_field("X", MarketField::Notes("first".to_string()));
        store.set_field("X", MarketField::Notes("second".to_string()));

        let rec = store.get("X").unwrap();
        assert_eq!(rec.equity_curve, Some(vec![1, 2, 3]));
        assert_eq!(rec.notes, "second");
        assert!(rec.performance_metrics.is_none());
    }

    #[test]
    fn get_missing_market_is_none() {
        let store = MarketStore::new();
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn clear_forgets_every_market() {
        let store = MarketStore::new();
        for id in ["A", "B", "C"] {
            store.set_field(id, MarketField::PerformanceMetrics(Some(vec![9])));
        }
        store.clear();

        for id in ["A", "B", "C"] {
            assert!(store.get(id).is_none(), "{id} should be gone");
        }
        assert!(store.list_ids().is_empty());
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let store = MarketStore::new();
        store.set_field("A", MarketField::EquityCurve(Some(vec![1, 2])));
        store.add("B");

        let snap = store.snapshot();
        store.set_field("A", MarketField::EquityCurve(Some(vec![7])));
        store.remove("B");
        store.add("C");

        assert_eq!(snap.ids(), vec!["A", "B"]);
        assert_eq!(snap.get("A").unwrap().equity_curve, Some(vec![1, 2]));
        assert_eq!(store.get("A").unwrap().equity_curve, Some(vec![7]));
    }
}
