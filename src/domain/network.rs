// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// SSH port, opened on every security group
pub const SSH_PORT: u16 = 22;

/// HTTP port, opened on web and edge workloads
pub const HTTP_PORT: u16 = 80;

/// UDP tunnel port (OpenVPN) opened on edge workloads
pub const TUNNEL_PORT: u16 = 1194;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("Host bits set in CIDR block {0} (expected network address {1})")]
    HostBitsSet(String, String),
}

/// IPv4 CIDR block value object
///
/// Invariants:
/// - Valid dotted-quad address
/// - Prefix length 0-32
/// - Address is the network address (no host bits set)
///
/// # Examples
///
/// ```rust
/// use mec_infrastructure::domain::Ipv4Cidr;
///
/// let vpc: Ipv4Cidr = "172.26.0.0/16".parse().unwrap();
/// let subnet: Ipv4Cidr = "172.26.128.0/18".parse().unwrap();
/// assert!(subnet.is_strict_subnet_of(&vpc));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Cidr {
    /// The default route destination, `0.0.0.0/0`
    pub const ANY: Ipv4Cidr = Ipv4Cidr {
        address: Ipv4Addr::UNSPECIFIED,
        prefix_len: 0,
    };

    /// Create a CIDR block from parts
    ///
    /// # Invariants
    /// - Prefix length must be <= 32
    /// - Host bits of `address` must be zero
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self, NetworkError> {
        if prefix_len > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_len));
        }

        let network = Ipv4Addr::from(u32::from(address) & mask(prefix_len));
        if network != address {
            return Err(NetworkError::HostBitsSet(
                format!("{}/{}", address, prefix_len),
                format!("{}/{}", network, prefix_len),
            ));
        }

        Ok(Self { address, prefix_len })
    }

    /// Network address of the block
    pub fn network(&self) -> Ipv4Addr {
        self.address
    }

    /// Highest address in the block
    pub fn last_address(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.address) | !mask(self.prefix_len))
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Number of addresses covered by the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len))
    }

    /// Whether `other` lies entirely within this block (equal blocks included)
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix_len >= self.prefix_len
            && u32::from(other.address) & mask(self.prefix_len) == u32::from(self.address)
    }

    /// Whether this block lies within `parent` and is strictly smaller
    pub fn is_strict_subnet_of(&self, parent: &Ipv4Cidr) -> bool {
        self.prefix_len > parent.prefix_len && parent.contains(self)
    }

    /// Whether the two blocks share at least one address
    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.contains(other) || other.contains(self)
    }
}

fn mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, prefix_str) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(s.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_len = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(s.to_string()))?;

        Self::new(address, prefix_len)
    }
}

impl Serialize for Ipv4Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Transport protocol of an ingress rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    /// Every protocol (used for the allow-all egress rule)
    All,
}

impl Protocol {
    /// CloudFormation `IpProtocol` value
    pub fn as_ip_protocol(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::All => "-1",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::All => write!(f, "all"),
        }
    }
}

/// Inline security group ingress rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IngressRule {
    pub protocol: Protocol,
    pub port: u16,
    pub source: Ipv4Cidr,
}

impl IngressRule {
    /// TCP port open to the world
    pub fn tcp(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            port,
            source: Ipv4Cidr::ANY,
        }
    }

    /// UDP port open to the world
    pub fn udp(port: u16) -> Self {
        Self {
            protocol: Protocol::Udp,
            port,
            source: Ipv4Cidr::ANY,
        }
    }

    pub fn ssh() -> Self {
        Self::tcp(SSH_PORT)
    }

    pub fn http() -> Self {
        Self::tcp(HTTP_PORT)
    }

    pub fn tunnel() -> Self {
        Self::udp(TUNNEL_PORT)
    }
}

impl fmt::Display for IngressRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} from {}", self.port, self.protocol, self.source)
    }
}

/// Kind of zone a subnet lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Regular availability zone, routed through an internet gateway
    Core,
    /// Carrier edge (wavelength) zone, routed through a carrier gateway
    Edge,
}

impl ZoneKind {
    /// Address type requested by instances placed in this zone kind
    pub fn address_kind(&self) -> AddressKind {
        match self {
            ZoneKind::Core => AddressKind::Public,
            ZoneKind::Edge => AddressKind::Carrier,
        }
    }

    /// Short label used in logical ids (`az` / `wlz`)
    pub fn label(&self) -> &'static str {
        match self {
            ZoneKind::Core => "az",
            ZoneKind::Edge => "wlz",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneKind::Core => write!(f, "core"),
            ZoneKind::Edge => write!(f, "edge"),
        }
    }
}

/// Address requested on an instance's primary network interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    Public,
    Carrier,
}
