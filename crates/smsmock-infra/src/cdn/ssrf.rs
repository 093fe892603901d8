//! Guards for server-side fetches of caller-supplied URLs
//!
//! A URL is only fetched when its host is public: literal private addresses,
//! localhost and internal names are refused outright, and hostnames are
//! resolved so every address they point at can be checked too.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use reqwest::Url;
use tokio::net::lookup_host;

/// Validate `url` as a fetch target and return it parsed.
///
/// With `allow_private` set only the scheme and host presence are checked.
pub async fn validate_remote_url(url: &str, allow_private: bool) -> Result<Url, String> {
    let parsed = Url::parse(url).map_err(|e| format!("Invalid URL format: {}", e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err("Only HTTP and HTTPS URLs are allowed".to_string());
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| "URL must have a host".to_string())?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_ascii_lowercase();

    if allow_private {
        return Ok(parsed);
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err("Private/internal IP addresses are not allowed".to_string());
        }
        return Ok(parsed);
    }

    if host == "localhost"
        || host.ends_with(".localhost")
        || host.ends_with(".local")
        || host.ends_with(".internal")
        || host.ends_with(".corp")
        || host.ends_with(".lan")
        || !host.contains('.')
    {
        return Err("Localhost and internal hostnames are not allowed".to_string());
    }

    let port = parsed.port_or_known_default().unwrap_or(80);
    match lookup_host((host.as_str(), port)).await {
        Ok(addrs) => {
            for addr in addrs {
                if is_private_ip(&addr.ip()) {
                    return Err(format!(
                        "Hostname resolves to private/internal IP address: {}",
                        addr.ip()
                    ));
                }
            }
        }
        Err(e) => {
            // The download itself will fail on an unresolvable host
            tracing::warn!(host = %host, error = %e, "Failed to resolve hostname for URL validation");
        }
    }

    Ok(parsed)
}

/// Loopback, private, link-local, CGNAT, multicast, unspecified and reserved ranges
pub(crate) fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => is_private_ipv4(ipv4),
        IpAddr::V6(ipv6) => {
            if let Some(mapped) = ipv6.to_ipv4_mapped() {
                return is_private_ipv4(&mapped);
            }
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || ipv6.is_multicast()
                || is_ipv6_link_local(ipv6)
                || is_ipv6_unique_local(ipv6)
        }
    }
}

fn is_private_ipv4(ip: &Ipv4Addr) -> bool {
    let octets = ip.octets();
    ip.is_private() // 10/8, 172.16/12, 192.168/16
        || ip.is_loopback() // 127/8
        || ip.is_link_local() // 169.254/16
        || ip.is_broadcast()
        || ip.is_multicast() // 224/4
        || octets[0] == 0 // 0/8
        || (octets[0] == 100 && (64..=127).contains(&octets[1])) // 100.64/10 shared
        || octets[0] >= 240 // 240/4 reserved
}

/// fe80::/10
fn is_ipv6_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}

/// fc00::/7
fn is_ipv6_unique_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xfe00 == 0xfc00
}
