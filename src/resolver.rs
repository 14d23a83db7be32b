//! Finds the VOICEVOX engine when it runs on the host and we run in a container.
//!
//! Order: explicit URL, configured host, the `host.docker.internal` alias, the
//! default gateway, then loopback. Every probe is read-only, bounded in time,
//! and answers "no" on failure so the next step gets a turn.

use crate::config_loader::Settings;
use std::fmt;
use std::net::{Ipv4Addr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;
use tracing::debug;

pub const LOOPBACK: &str = "127.0.0.1";

#[cfg_attr(test, mockall::automock)]
pub trait HostLookup {
    /// True when `host` resolves to at least one address.
    fn resolves(&self, host: &str) -> bool;
}

#[cfg_attr(test, mockall::automock)]
pub trait GatewayProbe {
    fn discover_gateway(&self) -> Option<Ipv4Addr>;
}

/// DNS lookup through the system resolver, abandoned after `timeout`.
pub struct SystemLookup {
    timeout: Duration,
}

impl SystemLookup {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl HostLookup for SystemLookup {
    fn resolves(&self, host: &str) -> bool {
        let (tx, rx) = channel();
        let target = format!("{}:0", host);

        // getaddrinfo cannot be cancelled; a stuck lookup thread is left to die with the process
        thread::spawn(move || {
            let found = target
                .to_socket_addrs()
                .map(|mut addrs| addrs.next().is_some())
                .unwrap_or(false);
            let _ = tx.send(found);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(found) => found,
            Err(_) => {
                debug!(host, timeout_ms = self.timeout.as_millis() as u64, "host lookup timed out");
                false
            }
        }
    }
}

/// Reads the IPv4 routing table in `/proc/net/route` format.
pub struct RouteTableGateway {
    path: PathBuf,
}

impl RouteTableGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GatewayProbe for RouteTableGateway {
    fn discover_gateway(&self) -> Option<Ipv4Addr> {
        match std::fs::read_to_string(&self.path) {
            Ok(table) => parse_default_gateway(&table),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "route table unavailable");
                None
            }
        }
    }
}

/// Gateway of the first default route (destination `00000000`).
///
/// The kernel prints addresses as the hex of the in-memory (network order)
/// u32, so on little-endian hosts `0100007F` is 127.0.0.1.
pub fn parse_default_gateway(table: &str) -> Option<Ipv4Addr> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 || fields[1] != "00000000" {
                return None;
            }
            let raw = u32::from_str_radix(fields[2], 16).ok()?;
            let gateway = Ipv4Addr::from(raw.to_le_bytes());
            // on-link default route, nothing to reach
            (!gateway.is_unspecified()).then_some(gateway)
        })
        .next()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSource {
    Flag,
    EnvUrl,
    ConfiguredHost,
    HostAlias,
    Gateway,
    Loopback,
}

impl fmt::Display for EndpointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EndpointSource::Flag => "--url flag",
            EndpointSource::EnvUrl => "VOICEVOX_URL",
            EndpointSource::ConfiguredHost => "VOICEVOX_HOST",
            EndpointSource::HostAlias => "host alias",
            EndpointSource::Gateway => "default gateway",
            EndpointSource::Loopback => "loopback fallback",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub source: EndpointSource,
}

pub struct EndpointResolver<'a> {
    lookup: &'a dyn HostLookup,
    gateway: &'a dyn GatewayProbe,
}

impl<'a> EndpointResolver<'a> {
    pub fn new(lookup: &'a dyn HostLookup, gateway: &'a dyn GatewayProbe) -> Self {
        Self { lookup, gateway }
    }

    /// Never fails: the last step always produces the loopback URL.
    pub fn resolve(&self, settings: &Settings, flag_url: Option<&str>) -> Endpoint {
        if let Some(url) = flag_url.filter(|u| !u.trim().is_empty()) {
            return Endpoint {
                url: url.to_string(),
                source: EndpointSource::Flag,
            };
        }
        if let Some(url) = settings.url.as_deref() {
            return Endpoint {
                url: url.to_string(),
                source: EndpointSource::EnvUrl,
            };
        }

        let (host, source) = self.resolve_host(settings);
        Endpoint {
            url: format!("http://{}:{}", host, settings.port),
            source,
        }
    }

    fn resolve_host(&self, settings: &Settings) -> (String, EndpointSource) {
        if let Some(host) = settings.host.as_deref() {
            return (host.to_string(), EndpointSource::ConfiguredHost);
        }

        let alias = settings.host_alias.as_str();
        if !alias.is_empty() && self.lookup.resolves(alias) {
            return (alias.to_string(), EndpointSource::HostAlias);
        }
        debug!(alias, "host alias does not resolve");

        if let Some(gateway) = self.gateway.discover_gateway() {
            return (gateway.to_string(), EndpointSource::Gateway);
        }
        debug!("no default gateway found");

        (LOOPBACK.to_string(), EndpointSource::Loopback)
    }
}
