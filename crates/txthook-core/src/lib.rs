// # txthook-core
//
// Core library for the ACME DNS-01 TXT record hook.
//
// ## Architecture Overview
//
// An ACME client calls the hook with a challenge name and a token. This
// library turns that into one change to one TXT RRSet:
// - **names**: FQDN → (registrable zone, record name in the zone)
// - **Reconciler**: create / append / remove / delete against the zone
// - **ZoneProvider**: narrow trait over the provider's zone API
// - **ProviderRegistry**: builds the configured provider by type name
// - **TokenFile**: the API token on disk, its bootstrap and permission check
//
// ## Design Principles
//
// 1. **Stateless**: every invocation re-reads remote state before mutating
// 2. **Fail fast**: remote failures are returned, never retried here
// 3. **Injected credentials**: the token reaches the provider through its
//    configuration, never through globals
// 4. **Library-First**: the binary only parses arguments and maps exit codes

pub mod config;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod names;
pub mod reconciler;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{HookConfig, Mode, ProviderConfig, ReconcilerConfig};
pub use credentials::{PermissionWarning, TokenFile};
pub use error::{Error, Result};
pub use memory::MemoryZoneProvider;
pub use reconciler::{ChallengeTarget, Reconciler, SetOutcome, UnsetOutcome};
pub use registry::ProviderRegistry;
pub use traits::{RRSet, RecordType, Zone, ZoneProvider, ZoneProviderFactory};
