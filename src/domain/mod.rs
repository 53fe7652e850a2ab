// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Stack Domain Models
//!
//! Value objects and pure invariants shared by the stack builder, the
//! resource graph, template synthesis and provisioning engines.
//!
//! # Value Objects with Invariants
//!
//! - [`Ipv4Cidr`] - IPv4 CIDR block, canonical network address
//! - [`IngressRule`] - protocol, port and source block of a security group rule
//! - [`ZoneKind`] - core availability zone or carrier edge zone
//! - [`ResourceKind`] - stack resource taxonomy
//!
//! # Invariants
//!
//! See [`invariants`] for the addressing, placement, routing and access rules
//! every built graph satisfies.

pub mod invariants;
pub mod network;
pub mod resource_type;

// Re-export value objects
pub use invariants::{ValidationError, ValidationResult};
pub use network::{
    AddressKind, IngressRule, Ipv4Cidr, NetworkError, Protocol, ZoneKind, HTTP_PORT, SSH_PORT,
    TUNNEL_PORT,
};
pub use resource_type::ResourceKind;
