//! Network helpers for SSRF protection
//!
//! Decides whether a host resolves into private, loopback, or local network
//! address space, so the crawler never requests internal targets.

mod host;

pub use host::{is_host_private, is_ip_private, HostResolutionError, HostValidator, LocalNetwork};
