// Copyright (c) 2025 - Cowboy AI, Inc.
//! Named Environment Profiles
//!
//! Each deployment target is a named parameter set. The MEC profiles differ
//! only in region, zones, key pair and machine images.

use super::{Ec2InstanceStackProps, MecStackProps, StackParameters};
use crate::errors::{StackError, StackResult};

/// A named, ready-to-build parameter set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: StackParameters,
}

/// MEC stack in Paris (eu-west-3) with the pilot wavelength zone
pub fn mec_cdg() -> EnvironmentProfile {
    let props = MecStackProps {
        region: "eu-west-3".into(),
        az: "eu-west-3a".into(),
        wlz: "eu-west-3-pilot-1a".into(),
        keyname: "eu-west-3".into(),
        vpc_cidr: "172.26.0.0/16".into(),
        public_az_subnet_cidr: "172.26.128.0/18".into(),
        public_wlz_subnet_cidr: "172.26.0.0/17".into(),
        bastionhost_image_id: "ami-0afd55c0c8a52973a".into(),
        bastionhost_instance_type: "t2.micro".into(),
        public_wlz_instance1_image_id: "ami-0afd55c0c8a52973a".into(),
        public_wlz_instance1_type: "g4dn.2xlarge".into(),
        public_wlz_instance2_image_id: "ami-0afd55c0c8a52973a".into(),
        public_wlz_instance2_type: "g4dn.2xlarge".into(),
    };

    EnvironmentProfile {
        name: "MecStackCDG",
        description: "MEC stack, eu-west-3 with the eu-west-3-pilot-1a wavelength zone",
        parameters: props.into_parameters("MecStackCDG"),
    }
}

/// MEC stack in us-east-1 with the Dallas wavelength zone
pub fn mec_dfw() -> EnvironmentProfile {
    let props = MecStackProps {
        region: "us-east-1".into(),
        az: "us-east-1a".into(),
        wlz: "us-east-1-wl1-dfw-wlz-1".into(),
        keyname: "manual-us-east-1".into(),
        vpc_cidr: "172.26.0.0/16".into(),
        public_az_subnet_cidr: "172.26.128.0/18".into(),
        public_wlz_subnet_cidr: "172.26.0.0/17".into(),
        bastionhost_image_id: "ami-08c40ec9ead489470".into(),
        bastionhost_instance_type: "t2.micro".into(),
        public_wlz_instance1_image_id: "ami-08c40ec9ead489470".into(),
        public_wlz_instance1_type: "g4dn.2xlarge".into(),
        public_wlz_instance2_image_id: "ami-08c40ec9ead489470".into(),
        public_wlz_instance2_type: "g4dn.2xlarge".into(),
    };

    EnvironmentProfile {
        name: "MecStackDFW",
        description: "MEC stack, us-east-1 with the us-east-1-wl1-dfw-wlz-1 wavelength zone",
        parameters: props.into_parameters("MecStackDFW"),
    }
}

/// Single web server in one us-east-1 availability zone
pub fn ec2_instance() -> EnvironmentProfile {
    let props = Ec2InstanceStackProps {
        region: "us-east-1".into(),
        az: "us-east-1a".into(),
        keyname: "manual-us-east-1".into(),
        vpc_cidr: "10.0.0.0/16".into(),
        public_az_subnet_cidr: "10.0.128.0/18".into(),
        image_id: "ami-08c40ec9ead489470".into(),
        instance_type: "t2.micro".into(),
    };

    EnvironmentProfile {
        name: "Ec2InstanceStack",
        description: "Single EC2 web server in us-east-1a",
        parameters: props.into_parameters("Ec2InstanceStack"),
    }
}

/// Every built-in profile
pub fn builtin_profiles() -> Vec<EnvironmentProfile> {
    vec![mec_cdg(), mec_dfw(), ec2_instance()]
}

/// Look up a built-in profile by name (case-insensitive)
pub fn find_profile(name: &str) -> StackResult<EnvironmentProfile> {
    builtin_profiles()
        .into_iter()
        .find(|profile| profile.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| StackError::UnknownProfile(name.to_string()))
}
