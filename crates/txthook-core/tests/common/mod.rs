//! Test doubles and common utilities for reconciler contract tests
//!
//! `RecordingProvider` wraps the in-memory provider, logs every call in
//! order and can be told to fail specific operations a number of times.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use txthook_core::config::ReconcilerConfig;
use txthook_core::error::{Error, Result};
use txthook_core::memory::MemoryZoneProvider;
use txthook_core::reconciler::{ChallengeTarget, Reconciler};
use txthook_core::traits::{RRSet, RecordType, Zone, ZoneProvider};

/// One provider operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetZone,
    GetRRSet,
    Create,
    Add,
    Remove,
    Delete,
}

/// A recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetZone(String),
    GetRRSet(String),
    Create {
        name: String,
        ttl: u32,
        records: Vec<String>,
    },
    Add {
        name: String,
        records: Vec<String>,
    },
    Remove {
        name: String,
        records: Vec<String>,
    },
    Delete(String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::GetZone(_) | Call::GetRRSet(_))
    }
}

/// A provider that records calls and fails on demand
#[derive(Clone, Default)]
pub struct RecordingProvider {
    pub memory: MemoryZoneProvider,
    calls: Arc<Mutex<Vec<Call>>>,
    failures: Arc<Mutex<HashMap<Op, usize>>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with one zone already present
    pub async fn with_zone(zone: &str) -> Self {
        let provider = Self::new();
        provider.memory.add_zone(zone).await;
        provider
    }

    /// Seed a TXT RRSet without recording calls
    pub async fn seed_txt(&self, zone: &str, name: &str, records: &[&str]) {
        let zone = self
            .memory
            .get_zone(zone)
            .await
            .unwrap()
            .expect("seeded zone exists");
        let records: Vec<String> = records.iter().map(|r| r.to_string()).collect();
        self.memory
            .create_rrset(&zone, name, RecordType::Txt, 3600, &records)
            .await
            .unwrap();
    }

    /// Make the next `times` calls of `op` fail
    pub fn fail(&self, op: Op, times: usize) {
        self.failures.lock().unwrap().insert(op, times);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub async fn txt(&self, zone: &str, name: &str) -> Option<Vec<String>> {
        self.memory.records(zone, name, RecordType::Txt).await
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op) -> Result<()> {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(Error::provider("recording", format!("injected {:?} failure", op)))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ZoneProvider for RecordingProvider {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>> {
        self.record(Call::GetZone(name.to_string()));
        self.check(Op::GetZone)?;
        self.memory.get_zone(name).await
    }

    async fn get_rrset(
        &self,
        zone: &Zone,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<RRSet>> {
        self.record(Call::GetRRSet(name.to_string()));
        self.check(Op::GetRRSet)?;
        self.memory.get_rrset(zone, name, record_type).await
    }

    async fn create_rrset(
        &self,
        zone: &Zone,
        name: &str,
        record_type: RecordType,
        ttl: u32,
        records: &[String],
    ) -> Result<RRSet> {
        self.record(Call::Create {
            name: name.to_string(),
            ttl,
            records: records.to_vec(),
        });
        self.check(Op::Create)?;
        self.memory
            .create_rrset(zone, name, record_type, ttl, records)
            .await
    }

    async fn add_records(&self, rrset: &RRSet, records: &[String]) -> Result<()> {
        self.record(Call::Add {
            name: rrset.name.clone(),
            records: records.to_vec(),
        });
        self.check(Op::Add)?;
        self.memory.add_records(rrset, records).await
    }

    async fn remove_records(&self, rrset: &RRSet, records: &[String]) -> Result<()> {
        self.record(Call::Remove {
            name: rrset.name.clone(),
            records: records.to_vec(),
        });
        self.check(Op::Remove)?;
        self.memory.remove_records(rrset, records).await
    }

    async fn delete_rrset(&self, rrset: &RRSet) -> Result<()> {
        self.record(Call::Delete(rrset.name.clone()));
        self.check(Op::Delete)?;
        self.memory.delete_rrset(rrset).await
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Reconciler over a clone of `provider` with default settings
pub fn reconciler(provider: &RecordingProvider) -> Reconciler {
    Reconciler::new(Box::new(provider.clone()), ReconcilerConfig::default())
}

/// Target for the usual `_acme-challenge.<domain>` challenge name
pub fn challenge(domain: &str) -> ChallengeTarget {
    ChallengeTarget::from_fqdns(domain, &format!("_acme-challenge.{}", domain))
        .expect("domain has a registrable part")
}

/// TXT literal form of a value
pub fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}
