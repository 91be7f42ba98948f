// # Zone Provider Trait
//
// Defines the narrow slice of a DNS zone API the reconciler needs.
//
// ## Implementations
//
// - Hetzner Cloud DNS: `txthook-provider-hetzner` crate
// - In-memory: `txthook_core::memory::MemoryZoneProvider` (tests)
//
// ## Usage
//
// ```rust,ignore
// use txthook_core::traits::{RecordType, ZoneProvider};
//
// async fn show(provider: &dyn ZoneProvider) -> txthook_core::Result<()> {
//     if let Some(zone) = provider.get_zone("example.com").await? {
//         let rrset = provider
//             .get_rrset(&zone, "_acme-challenge", RecordType::Txt)
//             .await?;
//         println!("{:?}", rrset);
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record type of an RRSet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Free-form text (ACME challenges live here)
    Txt,
}

impl RecordType {
    /// Wire name of the type, as used in provider URLs and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-side DNS zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Provider-specific zone ID
    pub id: String,
    /// Zone name without trailing dot (e.g. "example.co.uk")
    pub name: String,
    /// Default TTL of the zone, if the provider reports one
    pub ttl: Option<u32>,
}

/// A set of records sharing zone, name and type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RRSet {
    /// ID of the owning zone
    pub zone: String,
    /// Record name relative to the zone ("" at the apex)
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// TTL of the set
    pub ttl: Option<u32>,
    /// Record values in provider literal form (TXT values are quoted)
    pub records: Vec<String>,
}

impl RRSet {
    /// Whether the set holds exactly this literal value
    pub fn contains(&self, value: &str) -> bool {
        self.records.iter().any(|record| record == value)
    }
}

/// Trait for DNS zone provider implementations
///
/// # Contract
///
/// - Lookups return `Ok(None)` when the zone or RRSet does not exist and
///   `Err` only when the remote call itself failed.
/// - Every method is a single remote operation. No retries, no backoff,
///   no caching across calls: each hook invocation re-fetches state.
/// - Implementations must never log credentials.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// Look up a zone by its name (no trailing dot)
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, crate::Error>;

    /// Look up the RRSet at `name`/`record_type` inside `zone`
    async fn get_rrset(
        &self,
        zone: &Zone,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<RRSet>, crate::Error>;

    /// Create a new RRSet holding `records`
    async fn create_rrset(
        &self,
        zone: &Zone,
        name: &str,
        record_type: RecordType,
        ttl: u32,
        records: &[String],
    ) -> Result<RRSet, crate::Error>;

    /// Add `records` to an existing RRSet, leaving present values alone
    async fn add_records(&self, rrset: &RRSet, records: &[String]) -> Result<(), crate::Error>;

    /// Remove `records` from an existing RRSet, leaving other values alone
    async fn remove_records(&self, rrset: &RRSet, records: &[String])
    -> Result<(), crate::Error>;

    /// Delete the whole RRSet
    async fn delete_rrset(&self, rrset: &RRSet) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Whether mutations are only logged, never sent
    ///
    /// A dry-run provider answers lookups from the real zone, so nothing it
    /// pretended to create can be found again.
    fn dry_run(&self) -> bool {
        false
    }
}

/// Helper trait for constructing zone providers from configuration
pub trait ZoneProviderFactory: Send + Sync {
    /// Create a ZoneProvider instance
    ///
    /// # Parameters
    ///
    /// - `config`: Provider configuration, including the API token
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn ZoneProvider>, crate::Error>;
}
