// # Hetzner Cloud DNS Provider
//
// This crate provides the Hetzner Cloud zone provider for the TXT record hook.
//
// ## Behaviour
//
// - One HTTP request per trait call; retries are left to whoever re-runs the hook
// - HTTP timeout configured (30 seconds by default)
// - Specific error handling for HTTP status codes (401/403, 404, 409, 422, 429, 5xx)
// - Dry-run mode: lookups are sent, mutations are only logged
// - The zone apex is "@" on the wire and "" everywhere else
// - No caching: every invocation re-reads zone and RRSet
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider MUST fail fast if the token is empty
//
// ## API Reference
//
// - Hetzner Cloud API: https://docs.hetzner.cloud/reference/cloud#zones
// - Find zone: GET `/zones?name=...`
// - Get RRSet: GET `/zones/:zone/rrsets/:name/:type`
// - Create RRSet: POST `/zones/:zone/rrsets`
// - Add records: POST `/zones/:zone/rrsets/:name/:type/actions/add_records`
// - Remove records: POST `/zones/:zone/rrsets/:name/:type/actions/remove_records`
// - Delete RRSet: DELETE `/zones/:zone/rrsets/:name/:type`

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use txthook_core::config::ProviderConfig;
use txthook_core::registry::ProviderRegistry;
use txthook_core::traits::{RRSet, RecordType, Zone, ZoneProvider, ZoneProviderFactory};
use txthook_core::{Error, Result};

/// Name used in logs and provider errors
const PROVIDER_NAME: &str = "hetzner";

/// Wire name of the zone apex
const APEX: &str = "@";

/// Hetzner Cloud zone provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, RRSet lookup)
/// - Log the intended POST/DELETE request
/// - **NOT** actually modify the zone
///
/// # Security
///
/// The Debug implementation does NOT expose the API token.
pub struct HetznerProvider {
    /// Hetzner Cloud API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip mutations
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for HetznerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HetznerProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ZonesResponse {
    zones: Vec<ApiZone>,
}

#[derive(Debug, Deserialize)]
struct ApiZone {
    id: u64,
    name: String,
    #[serde(default)]
    ttl: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RRSetResponse {
    rrset: ApiRRSet,
}

#[derive(Debug, Deserialize)]
struct ApiRRSet {
    name: String,
    #[serde(default)]
    ttl: Option<u32>,
    #[serde(default)]
    records: Vec<ApiRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiRecord {
    value: String,
}

#[derive(Debug, Serialize)]
struct CreateRRSetRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: RecordType,
    ttl: u32,
    records: Vec<ApiRecord>,
}

#[derive(Debug, Serialize)]
struct RecordsRequest {
    records: Vec<ApiRecord>,
}

fn api_records(values: &[String]) -> Vec<ApiRecord> {
    values
        .iter()
        .map(|value| ApiRecord {
            value: value.clone(),
        })
        .collect()
}

/// Record name as the API expects it
fn wire_name(name: &str) -> &str {
    if name.is_empty() { APEX } else { name }
}

/// Record name as the rest of the hook expects it
fn local_name(name: &str) -> &str {
    if name == APEX { "" } else { name }
}

impl HetznerProvider {
    /// Create a new Hetzner provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Hetzner Cloud API token with read/write access to zones
    /// - `api_base`: API base URL, e.g. `https://api.hetzner.cloud/v1`
    /// - `timeout`: Transport timeout for every request
    /// - `dry_run`: If true, perform GET requests but skip mutations
    pub fn new(
        api_token: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Hetzner API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn rrset_path(zone_id: &str, name: &str, record_type: RecordType) -> String {
        format!(
            "/zones/{}/rrsets/{}/{}",
            zone_id,
            wire_name(name),
            record_type
        )
    }

    /// Attach credentials, send, and map transport failures
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::http(format!("Request to Hetzner API timed out: {}", e))
                } else {
                    Error::http(format!("HTTP request failed: {}", e))
                }
            })
    }

    /// Turn a non-success response into the matching error kind
    async fn check_status(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        Err(match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Invalid API token or insufficient permissions. Status: {}",
                status
            )),
            404 => Error::not_found(format!("{}: {} - {}", action, status, error_text)),
            409 => Error::provider(
                PROVIDER_NAME,
                format!("Conflict during {}: {} - {}", action, status, error_text),
            ),
            422 => Error::provider(
                PROVIDER_NAME,
                format!("Request rejected during {}: {} - {}", action, status, error_text),
            ),
            429 => Error::rate_limited(format!(
                "Rate limit exceeded. Please retry later. Status: {}",
                status
            )),
            500..=599 => Error::provider(
                PROVIDER_NAME,
                format!("Hetzner server error (transient): {} - {}", status, error_text),
            ),
            _ => Error::provider(
                PROVIDER_NAME,
                format!("{} failed: {} - {}", action, status, error_text),
            ),
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        response.json().await.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })
    }

    /// POST a record list to one of the RRSet actions
    async fn rrset_action(&self, rrset: &RRSet, action: &str, records: &[String]) -> Result<()> {
        let url = self.url(&format!(
            "{}/actions/{}",
            Self::rrset_path(&rrset.zone, &rrset.name, rrset.record_type),
            action
        ));
        let body = RecordsRequest {
            records: api_records(records),
        };

        if self.dry_run {
            info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                url,
                serde_json::to_string(&body)?
            );
            return Ok(());
        }

        debug!(zone = %rrset.zone, name = %rrset.name, action, "Sending RRSet action");
        let response = self.send(self.client.post(&url).json(&body)).await?;
        Self::check_status(response, action).await?;
        Ok(())
    }
}

#[async_trait]
impl ZoneProvider for HetznerProvider {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>> {
        debug!(zone = %name, "Looking up Hetzner zone");

        let request = self.client.get(self.url("/zones")).query(&[("name", name)]);
        let response = self.send(request).await?;
        let response = Self::check_status(response, "zone lookup").await?;
        let zones: ZonesResponse = Self::parse(response).await?;

        let zone = zones
            .zones
            .into_iter()
            .find(|zone| zone.name.eq_ignore_ascii_case(name))
            .map(|zone| Zone {
                id: zone.id.to_string(),
                name: zone.name,
                ttl: zone.ttl,
            });

        if let Some(ref zone) = zone {
            debug!(zone = %zone.name, zone_id = %zone.id, "Found zone");
        }
        Ok(zone)
    }

    async fn get_rrset(
        &self,
        zone: &Zone,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<RRSet>> {
        let url = self.url(&Self::rrset_path(&zone.id, name, record_type));
        let response = self.send(self.client.get(&url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(zone = %zone.name, name = %name, %record_type, "RRSet does not exist");
            return Ok(None);
        }

        let response = Self::check_status(response, "RRSet lookup").await?;
        let body: RRSetResponse = Self::parse(response).await?;

        Ok(Some(RRSet {
            zone: zone.id.clone(),
            name: local_name(&body.rrset.name).to_string(),
            record_type,
            ttl: body.rrset.ttl,
            records: body.rrset.records.into_iter().map(|r| r.value).collect(),
        }))
    }

    async fn create_rrset(
        &self,
        zone: &Zone,
        name: &str,
        record_type: RecordType,
        ttl: u32,
        records: &[String],
    ) -> Result<RRSet> {
        let url = self.url(&format!("/zones/{}/rrsets", zone.id));
        let body = CreateRRSetRequest {
            name: wire_name(name),
            record_type,
            ttl,
            records: api_records(records),
        };

        let planned = RRSet {
            zone: zone.id.clone(),
            name: name.to_string(),
            record_type,
            ttl: Some(ttl),
            records: records.to_vec(),
        };

        if self.dry_run {
            info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                url,
                serde_json::to_string(&body)?
            );
            return Ok(planned);
        }

        debug!(zone = %zone.name, name = %name, %record_type, ttl, "Creating RRSet");
        let response = self.send(self.client.post(&url).json(&body)).await?;
        let response = Self::check_status(response, "RRSet creation").await?;

        // The API echoes the new set; fall back to what was sent if it doesn't
        match Self::parse::<RRSetResponse>(response).await {
            Ok(created) => Ok(RRSet {
                ttl: created.rrset.ttl.or(Some(ttl)),
                records: created.rrset.records.into_iter().map(|r| r.value).collect(),
                ..planned
            }),
            Err(e) => {
                warn!(error = %e, "RRSet created but response was not understood");
                Ok(planned)
            }
        }
    }

    async fn add_records(&self, rrset: &RRSet, records: &[String]) -> Result<()> {
        self.rrset_action(rrset, "add_records", records).await
    }

    async fn remove_records(&self, rrset: &RRSet, records: &[String]) -> Result<()> {
        self.rrset_action(rrset, "remove_records", records).await
    }

    async fn delete_rrset(&self, rrset: &RRSet) -> Result<()> {
        let url = self.url(&Self::rrset_path(&rrset.zone, &rrset.name, rrset.record_type));

        if self.dry_run {
            info!("[DRY-RUN] Would send DELETE request to {}", url);
            return Ok(());
        }

        debug!(zone = %rrset.zone, name = %rrset.name, "Deleting RRSet");
        let response = self.send(self.client.delete(&url)).await?;
        Self::check_status(response, "RRSet deletion").await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Factory for creating Hetzner providers
pub struct HetznerFactory;

impl ZoneProviderFactory for HetznerFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ZoneProvider>> {
        match config {
            ProviderConfig::Hetzner {
                api_token,
                api_base,
                timeout_secs,
                dry_run,
            } => {
                if *dry_run {
                    warn!("Hetzner provider running in DRY-RUN mode - no changes will be made");
                }

                Ok(Box::new(HetznerProvider::new(
                    api_token.clone(),
                    api_base.clone(),
                    Duration::from_secs(*timeout_secs),
                    *dry_run,
                )?))
            }
            _ => Err(Error::config("Invalid config for Hetzner provider")),
        }
    }
}

/// Register the Hetzner provider with a registry
///
/// # Example
///
/// ```rust
/// use txthook_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// txthook_provider_hetzner::register(&registry);
/// assert!(registry.has_provider("hetzner"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(HetznerFactory));
}
