//! Core traits for the TXT record hook
//!
//! - [`ZoneProvider`]: Read and mutate RRSets through a provider's zone API
//! - [`ZoneProviderFactory`]: Build a provider from configuration

pub mod zone_provider;

pub use zone_provider::{RRSet, RecordType, Zone, ZoneProvider, ZoneProviderFactory};
