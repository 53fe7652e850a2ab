// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for mec-infrastructure
//!
//! Deterministic parameter sets shared by the integration tests.
//!
//! # Design Principles
//! - Fixtures are the only place that spells out zone ids, CIDRs and images
//! - Every fixture builds successfully unless its name says otherwise

#![allow(dead_code)]

use mec_infrastructure::domain::ZoneKind;
use mec_infrastructure::stack::{InstanceRole, InstanceSpec, StackParameters, ZoneSpec};

pub const REGION: &str = "us-east-1";
pub const CORE_ZONE: &str = "us-east-1a";
pub const EDGE_ZONE: &str = "us-east-1-wl1-dfw-wlz-1";
pub const NETWORK_CIDR: &str = "10.0.0.0/16";
pub const CORE_SUBNET_CIDR: &str = "10.0.128.0/18";
pub const EDGE_SUBNET_CIDR: &str = "10.0.0.0/17";
pub const IMAGE_ID: &str = "ami-x";
pub const INSTANCE_TYPE: &str = "t2.micro";
pub const KEY_NAME: &str = "k";

/// One core zone with a single SSH-only instance
pub fn single_core_params() -> StackParameters {
    StackParameters::new("CoreStack", "core", REGION, KEY_NAME, NETWORK_CIDR).with_zone(
        ZoneSpec::new(CORE_ZONE, ZoneKind::Core, CORE_SUBNET_CIDR).with_instance(
            InstanceSpec::new("bastion", InstanceRole::Bastion, IMAGE_ID, INSTANCE_TYPE),
        ),
    )
}

/// Core zone plus an edge zone hosting two workloads
pub fn core_and_edge_params() -> StackParameters {
    single_core_params().with_zone(
        ZoneSpec::new(EDGE_ZONE, ZoneKind::Edge, EDGE_SUBNET_CIDR)
            .with_instance(InstanceSpec::new(
                "edge-1",
                InstanceRole::EdgeWorkload,
                IMAGE_ID,
                "g4dn.2xlarge",
            ))
            .with_instance(InstanceSpec::new(
                "edge-2",
                InstanceRole::EdgeWorkload,
                IMAGE_ID,
                "g4dn.2xlarge",
            )),
    )
}

/// Edge zone only: no internet gateway is needed
pub fn edge_only_params() -> StackParameters {
    StackParameters::new("EdgeStack", "edge", REGION, KEY_NAME, NETWORK_CIDR).with_zone(
        ZoneSpec::new(EDGE_ZONE, ZoneKind::Edge, EDGE_SUBNET_CIDR).with_instance(
            InstanceSpec::new("worker", InstanceRole::EdgeWorkload, IMAGE_ID, INSTANCE_TYPE),
        ),
    )
}
