//! Feed URL safety checks
//!
//! Blocks feed URLs that would make the sync engine request loopback or
//! private-network targets (SSRF).
//!
//! Known limitations:
//! - Hostnames are not resolved, so a public name that later resolves to a
//!   private address (DNS rebinding) passes.
//! - IPv6 coverage is limited to loopback, unique-local, link-local and
//!   IPv4-mapped addresses.

use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::debug;
use url::{Host, Url};

/// Decides whether a subscription URL may be fetched
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlSafetyValidator;

impl UrlSafetyValidator {
    /// Check a feed URL
    ///
    /// Returns `false` for anything that does not parse, uses a scheme other
    /// than `http`/`https`, or points at a loopback or private address.
    pub fn is_safe(url: &str) -> bool {
        let Ok(parsed) = Url::parse(url.trim()) else {
            debug!(url, "Feed URL does not parse");
            return false;
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            debug!(url, scheme = parsed.scheme(), "Feed URL scheme not allowed");
            return false;
        }

        let safe = match parsed.host() {
            Some(Host::Domain(domain)) => is_safe_domain(domain),
            Some(Host::Ipv4(addr)) => is_public_ipv4(addr),
            Some(Host::Ipv6(addr)) => is_public_ipv6(addr),
            None => false,
        };

        if !safe {
            debug!(url, "Feed URL targets a blocked host");
        }
        safe
    }
}

fn is_safe_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    if domain.eq_ignore_ascii_case("localhost") {
        return false;
    }

    // `Url` normalizes well-formed IPv4 literals to `Host::Ipv4`; anything
    // still shaped like a dotted quad here is malformed.
    match dotted_quad(domain) {
        Some(Some(addr)) => is_public_ipv4(addr),
        Some(None) => false,
        None => true,
    }
}

/// `None` if `host` is not four numeric labels, `Some(None)` if an octet
/// exceeds 255
fn dotted_quad(host: &str) -> Option<Option<Ipv4Addr>> {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() != 4
        || labels
            .iter()
            .any(|l| l.is_empty() || !l.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let mut octets = [0u8; 4];
    for (octet, label) in octets.iter_mut().zip(&labels) {
        match label.parse::<u8>() {
            Ok(value) => *octet = value,
            Err(_) => return Some(None),
        }
    }
    Some(Some(Ipv4Addr::from(octets)))
}

fn is_public_ipv4(addr: Ipv4Addr) -> bool {
    !(addr.is_loopback() || addr.is_private())
}

fn is_public_ipv6(addr: Ipv6Addr) -> bool {
    let first = addr.segments()[0];
    let unique_local = first & 0xfe00 == 0xfc00;
    let link_local = first & 0xffc0 == 0xfe80;

    !(addr.is_loopback() || unique_local || link_local || addr.to_ipv4_mapped().is_some())
}
