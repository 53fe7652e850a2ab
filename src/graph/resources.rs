// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource entities held in a [`ResourceGraph`](super::ResourceGraph)
//!
//! Entities are configuration values, not runtime state. Cross-references
//! between them are [`ResourceRef`] indices into the owning graph.

use serde::Serialize;

use super::{sealed, AnyRef, ArenaMut, GraphResource, ResourceGraph, ResourceRef};
use crate::domain::{AddressKind, IngressRule, Ipv4Cidr, ResourceKind, ZoneKind};

/// The single virtual network of a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkResource {
    pub logical_id: String,
    pub cidr: Ipv4Cidr,
    /// Zones the network spans, in declaration order
    pub zones: Vec<String>,
    pub enable_dns_hostnames: bool,
}

/// Gateway flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayKind {
    Internet,
    Carrier,
}

impl GatewayKind {
    /// Gateway that serves subnets of the given zone kind
    pub fn for_zone(kind: ZoneKind) -> Self {
        match kind {
            ZoneKind::Core => GatewayKind::Internet,
            ZoneKind::Edge => GatewayKind::Carrier,
        }
    }

    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            GatewayKind::Internet => ResourceKind::InternetGateway,
            GatewayKind::Carrier => ResourceKind::CarrierGateway,
        }
    }
}

/// Internet or carrier gateway attached to exactly one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayResource {
    pub logical_id: String,
    pub kind: GatewayKind,
    pub network: ResourceRef<NetworkResource>,
}

/// A sub-range of the network's block bound to one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetResource {
    pub logical_id: String,
    pub network: ResourceRef<NetworkResource>,
    pub zone: String,
    pub zone_kind: ZoneKind,
    pub cidr: Ipv4Cidr,
    pub map_public_ip_on_launch: bool,
}

/// Destination block routed to a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    pub destination: Ipv4Cidr,
    pub gateway: ResourceRef<GatewayResource>,
}

/// Route table owned by, and associated with, exactly one subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTableResource {
    pub logical_id: String,
    pub network: ResourceRef<NetworkResource>,
    pub subnet: ResourceRef<SubnetResource>,
    pub routes: Vec<Route>,
}

impl RouteTableResource {
    /// The `0.0.0.0/0` route, if present
    pub fn default_route(&self) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.destination == Ipv4Cidr::ANY)
    }
}

/// Security group scoped to a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityGroupResource {
    pub logical_id: String,
    pub network: ResourceRef<NetworkResource>,
    pub description: String,
    pub ingress: Vec<IngressRule>,
    pub allow_all_outbound: bool,
}

impl SecurityGroupResource {
    pub fn allows(&self, rule: &IngressRule) -> bool {
        self.ingress.contains(rule)
    }

    /// Whether any rule opens `port`, regardless of protocol or source
    pub fn opens_port(&self, port: u16) -> bool {
        self.ingress.iter().any(|rule| rule.port == port)
    }
}

/// Compute instance with a single network interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceResource {
    pub logical_id: String,
    pub zone: String,
    pub subnet: ResourceRef<SubnetResource>,
    pub security_groups: Vec<ResourceRef<SecurityGroupResource>>,
    pub image_id: String,
    pub instance_type: String,
    pub key_name: String,
    pub address: AddressKind,
}

macro_rules! graph_resource {
    ($ty:ty, $field:ident, $variant:ident) => {
        impl GraphResource for $ty {
            fn logical_id(&self) -> &str {
                &self.logical_id
            }

            fn arena(graph: &ResourceGraph) -> &[Self] {
                &graph.$field
            }
        }

        impl sealed::Sealed for $ty {}

        impl ArenaMut for $ty {
            fn arena_mut(graph: &mut ResourceGraph) -> &mut Vec<Self> {
                &mut graph.$field
            }

            fn wrap(r: ResourceRef<Self>) -> AnyRef {
                AnyRef::$variant(r)
            }
        }
    };
}

graph_resource!(NetworkResource, networks, Network);
graph_resource!(GatewayResource, gateways, Gateway);
graph_resource!(SubnetResource, subnets, Subnet);
graph_resource!(RouteTableResource, route_tables, RouteTable);
graph_resource!(SecurityGroupResource, security_groups, SecurityGroup);
graph_resource!(InstanceResource, instances, Instance);
