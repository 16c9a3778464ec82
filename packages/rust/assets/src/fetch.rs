//! Remote asset download with a hard size cap.

use std::net::IpAddr;

use guidegen_shared::{GuideError, Result};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

// ---------------------------------------------------------------------------
// SSRF guard
// ---------------------------------------------------------------------------

/// Maximum redirects followed for one asset download.
pub(crate) const MAX_REDIRECTS: usize = 5;

/// Check if a URL targets a potentially dangerous resource.
///
/// With `allow_loopback`, loopback hosts pass; every other private or
/// reserved range is still refused.
pub(crate) fn is_ssrf_target(url: &Url, allow_loopback: bool) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(url::Host::Ipv4(v4)) => is_blocked_ip(IpAddr::V4(v4), allow_loopback),
        Some(url::Host::Ipv6(v6)) => is_blocked_ip(IpAddr::V6(v6), allow_loopback),
        Some(url::Host::Domain(host)) => {
            if host == "localhost" {
                !allow_loopback
            } else {
                host.ends_with(".local") || host.ends_with(".internal")
            }
        }
        None => true,
    }
}

/// Redirect policy that re-applies the SSRF guard to every hop.
pub(crate) fn redirect_policy(allow_loopback: bool) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.stop()
        } else if is_ssrf_target(attempt.url(), allow_loopback) {
            warn!(location = %attempt.url(), "refusing redirect to blocked host");
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

fn is_blocked_ip(ip: IpAddr, allow_loopback: bool) -> bool {
    let ip = canonical_ip(ip);
    if ip.is_loopback() {
        return !allow_loopback;
    }
    is_private_ip(&ip)
}

/// IPv4-mapped IPv6 addresses are judged by their IPv4 form.
fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match canonical_ip(*ip) {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_unique_local()
                || v6.is_unicast_link_local()
        }
    }
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// Filename a URL resolves to: its last non-empty path segment.
pub(crate) fn url_filename(url: &Url) -> Option<&str> {
    url.path_segments()?.rev().find(|s| !s.is_empty())
}

/// GET `url` and collect the body, giving up once it exceeds `max_bytes`.
pub(crate) async fn fetch_capped(client: &Client, url: &Url, max_bytes: usize) -> Result<Vec<u8>> {
    debug!(%url, "fetching asset");

    let mut response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| GuideError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GuideError::Network(format!("{url}: HTTP {status}")));
    }

    if let Some(declared) = response.content_length() {
        if declared > max_bytes as u64 {
            return Err(GuideError::Network(format!(
                "{url}: declared size {declared} exceeds {max_bytes} bytes"
            )));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| GuideError::Network(format!("{url}: body read failed: {e}")))?
    {
        if body.len() + chunk.len() > max_bytes {
            return Err(GuideError::Network(format!(
                "{url}: body exceeds {max_bytes} bytes"
            )));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
