// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Resource Type Taxonomy
//!
//! The closed set of resource kinds a network stack is composed of, with the
//! names each kind carries in synthesized templates and deployed state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource kind taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Virtual network (VPC)
    Network,
    /// Internet-facing gateway
    InternetGateway,
    /// Carrier gateway for wavelength zones
    CarrierGateway,
    /// Subnet bound to one zone
    Subnet,
    /// Route table owned by one subnet
    RouteTable,
    /// Security group with inline ingress rules
    SecurityGroup,
    /// Compute instance
    Instance,
}

impl ResourceKind {
    /// All kinds, in dependency order
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Network,
        ResourceKind::InternetGateway,
        ResourceKind::CarrierGateway,
        ResourceKind::Subnet,
        ResourceKind::RouteTable,
        ResourceKind::SecurityGroup,
        ResourceKind::Instance,
    ];

    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::InternetGateway => "internet_gateway",
            Self::CarrierGateway => "carrier_gateway",
            Self::Subnet => "subnet",
            Self::RouteTable => "route_table",
            Self::SecurityGroup => "security_group",
            Self::Instance => "instance",
        }
    }

    /// CloudFormation resource type
    pub fn cfn_type(&self) -> &'static str {
        match self {
            Self::Network => "AWS::EC2::VPC",
            Self::InternetGateway => "AWS::EC2::InternetGateway",
            Self::CarrierGateway => "AWS::EC2::CarrierGateway",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::RouteTable => "AWS::EC2::RouteTable",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::Instance => "AWS::EC2::Instance",
        }
    }

    /// Prefix of provider-assigned identifiers for this kind
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Network => "vpc",
            Self::InternetGateway => "igw",
            Self::CarrierGateway => "cagw",
            Self::Subnet => "subnet",
            Self::RouteTable => "rtb",
            Self::SecurityGroup => "sg",
            Self::Instance => "i",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
