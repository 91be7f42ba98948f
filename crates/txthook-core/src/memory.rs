// # Memory Zone Provider
//
// In-memory implementation of ZoneProvider.
//
// ## Purpose
//
// Stands in for a real zone API in tests and local experiments. State lives
// for as long as the value (and its clones) do.
//
// ## Semantics
//
// - `add_records` skips values the set already holds
// - `remove_records` ignores values the set does not hold
// - Removing the last value leaves an empty RRSet behind; only
//   `delete_rrset` removes the set itself

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::{RRSet, RecordType, Zone, ZoneProvider};

type RRSetKey = (String, String, RecordType);

#[derive(Debug, Default)]
struct Inner {
    zones: HashMap<String, Zone>,
    rrsets: HashMap<RRSetKey, RRSet>,
}

/// In-memory zone provider
///
/// # Example
///
/// ```rust
/// use txthook_core::memory::MemoryZoneProvider;
/// use txthook_core::traits::{RecordType, ZoneProvider};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = MemoryZoneProvider::new();
///     provider.add_zone("example.com").await;
///
///     let zone = provider.get_zone("example.com").await?.expect("zone exists");
///     provider
///         .create_rrset(&zone, "_acme-challenge", RecordType::Txt, 3600, &["\"abc\"".to_string()])
///         .await?;
///
///     let rrset = provider.get_rrset(&zone, "_acme-challenge", RecordType::Txt).await?;
///     assert_eq!(rrset.map(|r| r.records.len()), Some(1));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryZoneProvider {
    inner: Arc<RwLock<Inner>>,
    next_zone_id: Arc<AtomicUsize>,
}

impl MemoryZoneProvider {
    /// Create a provider with no zones
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty zone and return it
    pub async fn add_zone(&self, name: &str) -> Zone {
        let id = self.next_zone_id.fetch_add(1, Ordering::SeqCst) + 1;
        let zone = Zone {
            id: id.to_string(),
            name: name.to_string(),
            ttl: Some(crate::config::DEFAULT_TTL),
        };

        let mut guard = self.inner.write().await;
        guard.zones.insert(name.to_string(), zone.clone());
        zone
    }

    /// Current records at `name`/`record_type` in the zone called `zone_name`
    ///
    /// `None` when the zone or the RRSet does not exist.
    pub async fn records(
        &self,
        zone_name: &str,
        name: &str,
        record_type: RecordType,
    ) -> Option<Vec<String>> {
        let guard = self.inner.read().await;
        let zone = guard.zones.get(zone_name)?;
        guard
            .rrsets
            .get(&(zone.id.clone(), name.to_string(), record_type))
            .map(|rrset| rrset.records.clone())
    }

    /// Number of RRSets across all zones
    pub async fn rrset_count(&self) -> usize {
        self.inner.read().await.rrsets.len()
    }

    fn key(rrset: &RRSet) -> RRSetKey {
        (rrset.zone.clone(), rrset.name.clone(), rrset.record_type)
    }
}

#[async_trait]
impl ZoneProvider for MemoryZoneProvider {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.zones.get(name).cloned())
    }

    async fn get_rrset(
        &self,
        zone: &Zone,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<RRSet>, Error> {
        let guard = self.inner.read().await;
        Ok(guard
            .rrsets
            .get(&(zone.id.clone(), name.to_string(), record_type))
            .cloned())
    }

    async fn create_rrset(
        &self,
        zone: &Zone,
        name: &str,
        record_type: RecordType,
        ttl: u32,
        records: &[String],
    ) -> Result<RRSet, Error> {
        let mut guard = self.inner.write().await;
        let key = (zone.id.clone(), name.to_string(), record_type);

        if guard.rrsets.contains_key(&key) {
            return Err(Error::provider(
                "memory",
                format!("RRSet {}/{} already exists in zone {}", name, record_type, zone.name),
            ));
        }

        let rrset = RRSet {
            zone: zone.id.clone(),
            name: name.to_string(),
            record_type,
            ttl: Some(ttl),
            records: records.to_vec(),
        };
        guard.rrsets.insert(key, rrset.clone());
        Ok(rrset)
    }

    async fn add_records(&self, rrset: &RRSet, records: &[String]) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let stored = guard.rrsets.get_mut(&Self::key(rrset)).ok_or_else(|| {
            Error::not_found(format!("RRSet {}/{}", rrset.name, rrset.record_type))
        })?;

        for record in records {
            if !stored.records.contains(record) {
                stored.records.push(record.clone());
            }
        }
        Ok(())
    }

    async fn remove_records(&self, rrset: &RRSet, records: &[String]) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let stored = guard.rrsets.get_mut(&Self::key(rrset)).ok_or_else(|| {
            Error::not_found(format!("RRSet {}/{}", rrset.name, rrset.record_type))
        })?;

        stored.records.retain(|existing| !records.contains(existing));
        Ok(())
    }

    async fn delete_rrset(&self, rrset: &RRSet) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard
            .rrsets
            .remove(&Self::key(rrset))
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("RRSet {}/{}", rrset.name, rrset.record_type)))
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
