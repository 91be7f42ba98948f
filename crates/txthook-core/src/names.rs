//! Name splitting
//!
//! Maps a fully-qualified name onto the zone that owns it and the record
//! name inside that zone, using the public suffix list compiled into the
//! `psl` crate:
//!
//! ```text
//! _acme-challenge.sub.example.co.uk.
//! └──────┬──────────┘ └─────┬─────┘
//!   relative_name    registrable_domain
//! ```
//!
//! Input is trusted: no case folding and no label validation happens here.

/// Strip at most one trailing dot (absolute form)
fn trim_root(fqdn: &str) -> &str {
    fqdn.strip_suffix('.').unwrap_or(fqdn)
}

/// The registrable domain (public suffix plus one label) of `fqdn`
///
/// Returns an empty string when `fqdn` has no registrable domain, e.g. when
/// it is itself a public suffix. Callers treat that as fatal.
///
/// ```
/// use txthook_core::names::registrable_domain;
///
/// assert_eq!(registrable_domain("a.b.example.co.uk"), "example.co.uk");
/// assert_eq!(registrable_domain("example.com."), "example.com");
/// ```
pub fn registrable_domain(fqdn: &str) -> String {
    psl::domain_str(trim_root(fqdn))
        .map(str::to_string)
        .unwrap_or_default()
}

/// The part of `fqdn` left of its registrable domain
///
/// Empty when `fqdn` is the registrable domain itself (zone apex).
///
/// ```
/// use txthook_core::names::relative_name;
///
/// assert_eq!(relative_name("_acme-challenge.sub.example.com"), "_acme-challenge.sub");
/// assert_eq!(relative_name("example.com"), "");
/// ```
pub fn relative_name(fqdn: &str) -> String {
    let domain = registrable_domain(fqdn);
    let fqdn = trim_root(fqdn);

    if domain.is_empty() || fqdn == domain {
        return String::new();
    }

    // A name that does not end in ".<domain>" has no place in that zone
    fqdn.strip_suffix(domain.as_str())
        .and_then(|rest| rest.strip_suffix('.'))
        .map(str::to_string)
        .unwrap_or_default()
}
