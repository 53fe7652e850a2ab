// Copyright (c) 2025 - Cowboy AI, Inc.
//! Flat property sets for the two stock stacks
//!
//! [`MecStackProps`] describes the Mobile Edge Computing stack: a bastion host
//! in a core availability zone plus two edge workloads in a wavelength zone.
//! [`Ec2InstanceStackProps`] describes a single web server in one core zone.
//! Both expand into general [`StackParameters`].

use serde::{Deserialize, Serialize};

use super::{InstanceRole, InstanceSpec, StackParameters, ZoneSpec};
use crate::domain::ZoneKind;

/// Properties of the MEC stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MecStackProps {
    pub region: String,
    /// Core availability zone
    pub az: String,
    /// Wavelength (edge) zone
    pub wlz: String,
    pub keyname: String,
    #[serde(rename = "vpcCIDR")]
    pub vpc_cidr: String,
    #[serde(rename = "publicAZSubnetCIDR")]
    pub public_az_subnet_cidr: String,
    #[serde(rename = "publicWLZSubnetCIDR")]
    pub public_wlz_subnet_cidr: String,
    pub bastionhost_image_id: String,
    pub bastionhost_instance_type: String,
    #[serde(rename = "publicWLZInstance1ImageId")]
    pub public_wlz_instance1_image_id: String,
    #[serde(rename = "publicWLZInstance1Type")]
    pub public_wlz_instance1_type: String,
    #[serde(rename = "publicWLZInstance2ImageId")]
    pub public_wlz_instance2_image_id: String,
    #[serde(rename = "publicWLZInstance2Type")]
    pub public_wlz_instance2_type: String,
}

impl MecStackProps {
    pub fn into_parameters(self, stack_name: impl Into<String>) -> StackParameters {
        let core = ZoneSpec::new(self.az, ZoneKind::Core, self.public_az_subnet_cidr).with_instance(
            InstanceSpec::new(
                "bastionhost",
                InstanceRole::Bastion,
                self.bastionhost_image_id,
                self.bastionhost_instance_type,
            ),
        );

        let edge = ZoneSpec::new(self.wlz, ZoneKind::Edge, self.public_wlz_subnet_cidr)
            .with_instance(InstanceSpec::new(
                "ec2-instance-1",
                InstanceRole::EdgeWorkload,
                self.public_wlz_instance1_image_id,
                self.public_wlz_instance1_type,
            ))
            .with_instance(InstanceSpec::new(
                "ec2-instance-2",
                InstanceRole::EdgeWorkload,
                self.public_wlz_instance2_image_id,
                self.public_wlz_instance2_type,
            ));

        StackParameters::new(stack_name, "mec", self.region, self.keyname, self.vpc_cidr)
            .with_zone(core)
            .with_zone(edge)
    }
}

/// Properties of the single-instance EC2 stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ec2InstanceStackProps {
    pub region: String,
    pub az: String,
    pub keyname: String,
    #[serde(rename = "vpcCIDR")]
    pub vpc_cidr: String,
    #[serde(rename = "publicAZSubnetCIDR")]
    pub public_az_subnet_cidr: String,
    pub image_id: String,
    pub instance_type: String,
}

impl Ec2InstanceStackProps {
    pub fn into_parameters(self, stack_name: impl Into<String>) -> StackParameters {
        let core = ZoneSpec::new(self.az, ZoneKind::Core, self.public_az_subnet_cidr).with_instance(
            InstanceSpec::new(
                "instance",
                InstanceRole::WebServer,
                self.image_id,
                self.instance_type,
            ),
        );

        StackParameters::new(stack_name, "ec2", self.region, self.keyname, self.vpc_cidr)
            .with_zone(core)
    }
}
