//! Host validation against private and local address space

use if_addrs::IfAddr;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// DNS resolution failed, so the host could not be classified
#[derive(Debug, Error)]
pub enum HostResolutionError {
    #[error("failed to resolve host {host}: {source}")]
    Lookup {
        host: String,
        source: std::io::Error,
    },

    #[error("host {host} has no IPv4 address")]
    NoIpv4 { host: String },
}

/// An IPv4 network attached to one of this machine's interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalNetwork {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl LocalNetwork {
    pub fn new(address: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Self { address, netmask }
    }

    /// Returns true if `ip` is inside this network
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let mask = u32::from(self.netmask);
        u32::from(self.address) & mask == u32::from(ip) & mask
    }
}

/// Classifies hosts as private or public
///
/// A host is private when its first IPv4 address is in a reserved range
/// (see [`is_ip_private`]) or inside the network of any local interface, so
/// the crawler's own LAN is never crawled.
#[derive(Debug, Clone, Default)]
pub struct HostValidator {
    local_networks: Vec<LocalNetwork>,
}

impl HostValidator {
    /// Creates a validator from the machine's current IPv4 interfaces
    ///
    /// If interfaces cannot be enumerated the validator still rejects the
    /// fixed private ranges.
    pub fn from_system() -> Self {
        match if_addrs::get_if_addrs() {
            Ok(interfaces) => {
                let local_networks: Vec<LocalNetwork> = interfaces
                    .into_iter()
                    .filter_map(|iface| match iface.addr {
                        IfAddr::V4(v4) => Some(LocalNetwork::new(v4.ip, v4.netmask)),
                        IfAddr::V6(_) => None,
                    })
                    // A zero netmask would match every address
                    .filter(|network| !network.netmask.is_unspecified())
                    .collect();

                tracing::debug!("Found {} local IPv4 networks", local_networks.len());
                Self { local_networks }
            }
            Err(e) => {
                tracing::warn!("Could not enumerate network interfaces: {}", e);
                Self::default()
            }
        }
    }

    /// Creates a validator with an explicit set of local networks
    pub fn with_networks(local_networks: Vec<LocalNetwork>) -> Self {
        Self { local_networks }
    }

    /// The local networks this validator treats as private
    pub fn local_networks(&self) -> &[LocalNetwork] {
        &self.local_networks
    }

    /// Resolves `host` and checks whether it points into private space
    ///
    /// Hosts containing `[` or `]` (IPv6 literals) are always private.
    ///
    /// # Errors
    ///
    /// Returns [`HostResolutionError`] if the host cannot be resolved to an
    /// IPv4 address. Callers decide how to treat that.
    pub async fn is_host_private(&self, host: &str) -> Result<bool, HostResolutionError> {
        if host.contains('[') || host.contains(']') {
            return Ok(true);
        }

        let ip = resolve_ipv4(host).await?;
        Ok(self.is_ip_private(ip))
    }

    /// Checks an address against the reserved ranges and local networks
    pub fn is_ip_private(&self, ip: Ipv4Addr) -> bool {
        is_ip_private(ip) || self.local_networks.iter().any(|network| network.contains(ip))
    }
}

/// Checks `host` with a validator built from the current interfaces
pub async fn is_host_private(host: &str) -> Result<bool, HostResolutionError> {
    HostValidator::from_system().is_host_private(host).await
}

/// Returns true if the address is loopback, RFC 1918, link-local, or otherwise
/// not publicly routable
pub fn is_ip_private(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();

    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_multicast()
        // 0.0.0.0/8
        || a == 0
        // 100.64.0.0/10 (carrier-grade NAT)
        || (a == 100 && (b & 0xC0) == 64)
        // 192.0.0.0/24
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 (benchmarking)
        || (a == 198 && (b & 0xFE) == 18)
        // 240.0.0.0/4 (reserved)
        || a >= 240
}

async fn resolve_ipv4(host: &str) -> Result<Ipv4Addr, HostResolutionError> {
    let addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|source| HostResolutionError::Lookup {
            host: host.to_string(),
            source,
        })?;

    addrs
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| HostResolutionError::NoIpv4 {
            host: host.to_string(),
        })
}
