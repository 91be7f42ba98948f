//! TXT RRSet reconciler
//!
//! The Reconciler converges the TXT RRSet at one (zone, record name) pair
//! toward a desired membership, one value at a time:
//!
//! ```text
//!                 ┌──────────────┐
//!   set(v) ──────►│ lookup zone  │── none ──► ZoneNotFound
//!   unset(v)      └──────┬───────┘
//!                        ▼
//!                 ┌──────────────┐
//!                 │ lookup RRSet │
//!                 └──────┬───────┘
//!        ┌───────────────┼─────────────────┬──────────────────┐
//!        ▼               ▼                 ▼                  ▼
//!   set, absent     set, present      unset, absent      unset, present
//!     Create       Append / no-op     RRSetNotFound     Remove / Delete
//! ```
//!
//! ## Failure model
//!
//! Every remote failure aborts the operation and is returned as-is. There
//! is no retry loop here and no state kept between calls: a failed
//! invocation is recovered by running the same command again.
//!
//! ## Concurrency
//!
//! Lookups and mutations are not atomic. Two hooks racing on an empty name
//! may both observe "absent" and both try to create the set; the provider
//! decides the outcome.

use tracing::{debug, info, warn};

use crate::config::ReconcilerConfig;
use crate::error::{Error, Result};
use crate::names;
use crate::traits::{RRSet, RecordType, Zone, ZoneProvider};

/// Where a challenge value lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeTarget {
    /// Zone name (registrable domain, no trailing dot)
    pub zone: String,
    /// Record name relative to the zone, "" at the apex
    pub record_name: String,
}

impl ChallengeTarget {
    /// Build a target from the hook's `domain` and `validation_name` arguments
    ///
    /// The zone comes from `domain`; the record name is `validation_name`
    /// relative to its own registrable domain.
    pub fn from_fqdns(domain: &str, validation_name: &str) -> Result<Self> {
        let zone = names::registrable_domain(domain);
        if zone.is_empty() {
            return Err(Error::invalid_input(format!(
                "no registrable domain in '{}'",
                domain
            )));
        }

        Ok(Self {
            zone,
            record_name: names::relative_name(validation_name),
        })
    }
}

/// Wrap a TXT value in the provider's literal quotes
///
/// Values containing quotes, backslashes or control characters would need
/// escaping and are rejected instead. ACME tokens are base64url and never
/// contain any of them.
pub fn quote_txt_value(value: &str) -> Result<String> {
    if let Some(bad) = value
        .chars()
        .find(|c| *c == '"' || *c == '\\' || c.is_control())
    {
        return Err(Error::invalid_input(format!(
            "TXT value contains unsupported character {:?}",
            bad
        )));
    }

    Ok(format!("\"{}\"", value))
}

/// Result of a `set` operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// No RRSet existed; a new one was created with the value
    Created {
        /// TTL of the new set
        ttl: u32,
    },
    /// The value was appended to an existing RRSet
    Appended {
        /// Number of values present before the append
        existing: usize,
    },
    /// The RRSet already held the value (no-op)
    Unchanged,
}

/// Result of an `unset` operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsetOutcome {
    /// The value was removed; other values (if any) stay
    Removed {
        /// Number of values present before the removal
        existing: usize,
    },
    /// The value was the only one left, so the whole RRSet was deleted
    Deleted,
}

/// TXT RRSet reconciler
///
/// Owns a provider built with the invocation's credentials. Nothing else is
/// shared or cached, so every call re-reads remote state before mutating.
pub struct Reconciler {
    /// Zone provider for lookups and mutations
    provider: Box<dyn ZoneProvider>,

    /// TTL and probe settings
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler
    pub fn new(provider: Box<dyn ZoneProvider>, config: ReconcilerConfig) -> Self {
        Self { provider, config }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Fetch the zone by name, turning absence into `ZoneNotFound`
    pub async fn lookup_zone(&self, name: &str) -> Result<Zone> {
        let name = name.strip_suffix('.').unwrap_or(name);
        debug!(zone = %name, provider = self.provider_name(), "Looking up zone");

        self.provider
            .get_zone(name)
            .await?
            .ok_or_else(|| Error::zone_not_found(name))
    }

    async fn lookup_txt(&self, zone: &Zone, name: &str) -> Result<Option<RRSet>> {
        debug!(zone = %zone.name, name = %name, "Looking up TXT RRSet");
        self.provider.get_rrset(zone, name, RecordType::Txt).await
    }

    /// Publish `value` at the target, keeping any other values present
    pub async fn set(&self, target: &ChallengeTarget, value: &str) -> Result<SetOutcome> {
        let quoted = quote_txt_value(value)?;
        let zone = self.lookup_zone(&target.zone).await?;

        match self.lookup_txt(&zone, &target.record_name).await? {
            None => {
                let ttl = self.config.ttl;
                self.provider
                    .create_rrset(
                        &zone,
                        &target.record_name,
                        RecordType::Txt,
                        ttl,
                        std::slice::from_ref(&quoted),
                    )
                    .await?;
                info!(zone = %zone.name, name = %target.record_name, ttl, "Created TXT RRSet");
                Ok(SetOutcome::Created { ttl })
            }
            Some(rrset) if rrset.contains(&quoted) => {
                info!(zone = %zone.name, name = %target.record_name, "TXT value already present");
                Ok(SetOutcome::Unchanged)
            }
            Some(rrset) => {
                let existing = rrset.records.len();
                self.provider
                    .add_records(&rrset, std::slice::from_ref(&quoted))
                    .await?;
                info!(
                    zone = %zone.name,
                    name = %target.record_name,
                    existing,
                    "Appended value to TXT RRSet"
                );
                Ok(SetOutcome::Appended { existing })
            }
        }
    }

    /// Withdraw `value` from the target, keeping any other values present
    ///
    /// A value that is not in the set is handed to the provider anyway;
    /// what happens then is up to the provider.
    pub async fn unset(&self, target: &ChallengeTarget, value: &str) -> Result<UnsetOutcome> {
        let quoted = quote_txt_value(value)?;
        let zone = self.lookup_zone(&target.zone).await?;

        let rrset = self
            .lookup_txt(&zone, &target.record_name)
            .await?
            .ok_or_else(|| {
                Error::rrset_not_found(&zone.name, &target.record_name, RecordType::Txt.as_str())
            })?;

        if rrset.records.len() == 1 && rrset.contains(&quoted) {
            self.provider.delete_rrset(&rrset).await?;
            info!(zone = %zone.name, name = %target.record_name, "Deleted TXT RRSet with its last value");
            return Ok(UnsetOutcome::Deleted);
        }

        let existing = rrset.records.len();
        self.provider
            .remove_records(&rrset, std::slice::from_ref(&quoted))
            .await?;
        info!(
            zone = %zone.name,
            name = %target.record_name,
            existing,
            "Removed value from TXT RRSet"
        );
        Ok(UnsetOutcome::Removed { existing })
    }

    /// Create and delete a probe RRSet in `zone_name`
    ///
    /// The probe set is deleted as a whole. If that fails, a second
    /// lookup-and-delete is attempted so the probe does not leak; failures
    /// during that cleanup are only logged and the first error is returned.
    ///
    /// A dry-run provider never creates the probe, so the set it returned
    /// is handed straight to `delete_rrset` without a lookup.
    pub async fn self_test(&self, zone_name: &str) -> Result<()> {
        let zone = self.lookup_zone(zone_name).await?;
        let name = self.config.probe_name.as_str();
        let quoted = quote_txt_value(&self.config.probe_value)?;

        info!(zone = %zone.name, name = %name, value = %quoted, "Creating probe TXT RRSet");
        let created = self
            .provider
            .create_rrset(
                &zone,
                name,
                RecordType::Txt,
                self.config.ttl,
                std::slice::from_ref(&quoted),
            )
            .await?;

        if self.provider.dry_run() {
            info!(zone = %zone.name, name = %name, "Deleting planned probe TXT RRSet (dry run)");
            return self.provider.delete_rrset(&created).await;
        }

        info!(zone = %zone.name, name = %name, "Deleting probe TXT RRSet");
        if let Err(e) = self.delete_probe(&zone, name).await {
            self.cleanup_probe(&zone, name).await;
            return Err(e);
        }

        Ok(())
    }

    async fn delete_probe(&self, zone: &Zone, name: &str) -> Result<()> {
        let rrset = self.lookup_txt(zone, name).await?.ok_or_else(|| {
            Error::rrset_not_found(&zone.name, name, RecordType::Txt.as_str())
        })?;
        self.provider.delete_rrset(&rrset).await
    }

    async fn cleanup_probe(&self, zone: &Zone, name: &str) {
        match self.lookup_txt(zone, name).await {
            Ok(Some(rrset)) => {
                if let Err(e) = self.provider.delete_rrset(&rrset).await {
                    warn!(zone = %zone.name, name = %name, error = %e, "Probe cleanup failed");
                }
            }
            Ok(None) => debug!(zone = %zone.name, name = %name, "Probe already gone"),
            Err(e) => {
                warn!(zone = %zone.name, name = %name, error = %e, "Probe cleanup lookup failed")
            }
        }
    }
}
