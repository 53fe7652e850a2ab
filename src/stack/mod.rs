// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Stack Builder
//!
//! Pure composition of a [`ResourceGraph`] from a [`StackParameters`] value.
//!
//! # Build Order
//!
//! ```text
//! validate params ──> network ──> gateways ──> per zone: subnet, route table
//!                                              per instance: security group, instance
//!                                 ──> outputs ──> validate graph
//! ```
//!
//! A resource is always inserted before anything that references it, so the
//! graph's creation order is a valid deployment order. Any failure aborts the
//! build with [`StackError::InvalidParameter`]; no partial graph is returned.

pub mod profiles;
pub mod props;

pub use profiles::{builtin_profiles, find_profile, EnvironmentProfile};
pub use props::{Ec2InstanceStackProps, MecStackProps};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, instrument};

use crate::domain::invariants::{
    required_ingress, validate_disjoint_subnets, validate_graph, validate_subnet_within_network,
    validate_zone_in_region,
};
use crate::domain::{IngressRule, Ipv4Cidr, ZoneKind};
use crate::errors::{StackError, StackResult};
use crate::graph::{
    AnyRef, GatewayKind, GatewayResource, InstanceResource, NetworkResource, ResourceGraph,
    ResourceRef, Route, RouteTableResource, SecurityGroupResource, SubnetResource,
};
use crate::template::validate_template_ids;

/// Purpose of an instance, which decides its ingress rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceRole {
    /// SSH jump host in a core zone
    Bastion,
    /// Public web server (SSH + HTTP)
    WebServer,
    /// Edge workload (SSH + tunnel + HTTP)
    EdgeWorkload,
}

impl InstanceRole {
    /// Ingress rules the role asks for
    pub fn ingress_rules(&self) -> Vec<IngressRule> {
        match self {
            InstanceRole::Bastion => vec![IngressRule::ssh()],
            InstanceRole::WebServer => vec![IngressRule::ssh(), IngressRule::http()],
            InstanceRole::EdgeWorkload => {
                vec![IngressRule::ssh(), IngressRule::tunnel(), IngressRule::http()]
            }
        }
    }
}

impl fmt::Display for InstanceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceRole::Bastion => write!(f, "bastion"),
            InstanceRole::WebServer => write!(f, "web-server"),
            InstanceRole::EdgeWorkload => write!(f, "edge-workload"),
        }
    }
}

/// Instance to launch in a zone's subnet
///
/// Image and size identifiers are opaque: only presence is checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub name: String,
    pub role: InstanceRole,
    pub image_id: String,
    pub instance_type: String,
}

impl InstanceSpec {
    pub fn new(
        name: impl Into<String>,
        role: InstanceRole,
        image_id: impl Into<String>,
        instance_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            image_id: image_id.into(),
            instance_type: instance_type.into(),
        }
    }
}

/// One subnet: its zone, zone kind, block and instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub zone: String,
    pub kind: ZoneKind,
    pub subnet_cidr: String,
    #[serde(default)]
    pub instances: Vec<InstanceSpec>,
}

impl ZoneSpec {
    pub fn new(zone: impl Into<String>, kind: ZoneKind, subnet_cidr: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            kind,
            subnet_cidr: subnet_cidr.into(),
            instances: Vec::new(),
        }
    }

    pub fn with_instance(mut self, instance: InstanceSpec) -> Self {
        self.instances.push(instance);
        self
    }
}

/// Everything that determines a stack's resource graph
///
/// Immutable once supplied; two equal values always build structurally
/// identical graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackParameters {
    /// Deployment stack name (`MecStackCDG`)
    pub stack_name: String,
    /// Prefix of every logical id (`mec`)
    pub prefix: String,
    pub region: String,
    /// SSH key pair name used by every instance
    pub key_name: String,
    pub network_cidr: String,
    /// Subnets in declaration order
    pub zones: Vec<ZoneSpec>,
}

impl StackParameters {
    pub fn new(
        stack_name: impl Into<String>,
        prefix: impl Into<String>,
        region: impl Into<String>,
        key_name: impl Into<String>,
        network_cidr: impl Into<String>,
    ) -> Self {
        Self {
            stack_name: stack_name.into(),
            prefix: prefix.into(),
            region: region.into(),
            key_name: key_name.into(),
            network_cidr: network_cidr.into(),
            zones: Vec::new(),
        }
    }

    pub fn with_zone(mut self, zone: ZoneSpec) -> Self {
        self.zones.push(zone);
        self
    }

    /// Number of instances declared across all zones
    pub fn instance_count(&self) -> usize {
        self.zones.iter().map(|zone| zone.instances.len()).sum()
    }

    pub fn has_zone_kind(&self, kind: ZoneKind) -> bool {
        self.zones.iter().any(|zone| zone.kind == kind)
    }
}

/// Builds resource graphs from stack parameters
#[derive(Debug, Clone)]
pub struct NetworkStackBuilder {
    /// Whether the network resolves public DNS hostnames
    pub enable_dns_hostnames: bool,
    /// Whether operator outputs are declared
    pub emit_outputs: bool,
}

impl Default for NetworkStackBuilder {
    fn default() -> Self {
        Self {
            enable_dns_hostnames: false,
            emit_outputs: true,
        }
    }
}

/// Parameters after parsing and cross-checking
struct CheckedZone<'a> {
    spec: &'a ZoneSpec,
    cidr: Ipv4Cidr,
    label: String,
}

impl NetworkStackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dns_hostnames(mut self, enabled: bool) -> Self {
        self.enable_dns_hostnames = enabled;
        self
    }

    pub fn with_outputs(mut self, enabled: bool) -> Self {
        self.emit_outputs = enabled;
        self
    }

    /// Build the resource graph for `params`
    ///
    /// # Errors
    /// [`StackError::InvalidParameter`] when a CIDR is malformed, a required
    /// parameter is absent, a zone lies outside the region, subnets fall
    /// outside the network or overlap, or two resources share a logical id,
    /// template id or output name.
    #[instrument(skip(self, params), fields(stack = %params.stack_name))]
    pub fn build(&self, params: &StackParameters) -> StackResult<ResourceGraph> {
        let network_cidr = check_parameters(params)?;
        let zones = check_zones(params, &network_cidr)?;

        let mut graph = ResourceGraph::new(&params.stack_name, &params.region);
        let prefix = params.prefix.as_str();

        // Network spanning every declared zone
        let mut zone_ids: Vec<String> = Vec::new();
        for zone in &params.zones {
            if !zone_ids.contains(&zone.zone) {
                zone_ids.push(zone.zone.clone());
            }
        }
        let network = graph.insert(NetworkResource {
            logical_id: format!("{prefix}-vpc"),
            cidr: network_cidr,
            zones: zone_ids,
            enable_dns_hostnames: self.enable_dns_hostnames,
        });
        debug!("Declared network {} ({})", network_cidr, prefix);

        // One gateway per zone kind in use
        let mut gateways: HashMap<GatewayKind, ResourceRef<GatewayResource>> = HashMap::new();
        for (kind, zone_kind, suffix) in [
            (GatewayKind::Internet, ZoneKind::Core, "igw"),
            (GatewayKind::Carrier, ZoneKind::Edge, "cgw"),
        ] {
            if params.has_zone_kind(zone_kind) {
                let gateway = graph.insert(GatewayResource {
                    logical_id: format!("{prefix}-{suffix}"),
                    kind,
                    network,
                });
                debug!("Declared {:?} gateway", kind);
                gateways.insert(kind, gateway);
            }
        }

        if self.emit_outputs {
            graph.add_output("vpcId", AnyRef::Network(network));
        }

        for zone in &zones {
            let gateway_kind = GatewayKind::for_zone(zone.spec.kind);
            let gateway = *gateways.get(&gateway_kind).ok_or_else(|| {
                StackError::invalid("zones", format!("no {gateway_kind:?} gateway declared"))
            })?;

            let subnet_id = format!("{prefix}-{}-subnet", zone.label);
            let subnet = graph.insert(SubnetResource {
                logical_id: subnet_id.clone(),
                network,
                zone: zone.spec.zone.clone(),
                zone_kind: zone.spec.kind,
                cidr: zone.cidr,
                map_public_ip_on_launch: zone.spec.kind == ZoneKind::Core,
            });

            graph.insert(RouteTableResource {
                logical_id: format!("{subnet_id}-rtb"),
                network,
                subnet,
                routes: vec![Route {
                    destination: Ipv4Cidr::ANY,
                    gateway,
                }],
            });
            debug!(
                "Declared {} subnet {} in {} routed via {:?} gateway",
                zone.spec.kind, zone.cidr, zone.spec.zone, gateway_kind
            );

            if self.emit_outputs {
                graph.add_output(
                    format!("{}SubnetId", camel_case(&zone.label)),
                    AnyRef::Subnet(subnet),
                );
            }

            for spec in &zone.spec.instances {
                let group = graph.insert(SecurityGroupResource {
                    logical_id: format!("{prefix}-{}-sg", spec.name),
                    network,
                    description: format!("{} {} ({})", params.stack_name, spec.name, spec.role),
                    ingress: ingress_for(spec.role, zone.spec.kind),
                    allow_all_outbound: true,
                });

                let instance = graph.insert(InstanceResource {
                    logical_id: format!("{prefix}-{}", spec.name),
                    zone: zone.spec.zone.clone(),
                    subnet,
                    security_groups: vec![group],
                    image_id: spec.image_id.clone(),
                    instance_type: spec.instance_type.clone(),
                    key_name: params.key_name.clone(),
                    address: zone.spec.kind.address_kind(),
                });
                debug!(
                    "Declared {} instance {} ({}) in {}",
                    spec.role, spec.name, spec.instance_type, zone.spec.zone
                );

                if self.emit_outputs {
                    let name = camel_case(&spec.name);
                    graph.add_output(format!("{name}SgId"), AnyRef::SecurityGroup(group));
                    graph.add_output(format!("{name}InstanceId"), AnyRef::Instance(instance));
                }
            }
        }

        validate_graph(&graph)?;
        validate_template_ids(&graph)?;

        info!(
            stack = %params.stack_name,
            resources = graph.len(),
            subnets = graph.subnets().len(),
            instances = graph.instances().len(),
            "Built resource graph"
        );
        Ok(graph)
    }
}

/// Build `params` with the default builder
pub fn build(params: &StackParameters) -> StackResult<ResourceGraph> {
    NetworkStackBuilder::default().build(params)
}

/// Role rules followed by whatever the zone baseline adds
fn ingress_for(role: InstanceRole, zone_kind: ZoneKind) -> Vec<IngressRule> {
    let mut rules = role.ingress_rules();
    for rule in required_ingress(zone_kind) {
        if !rules.contains(&rule) {
            rules.push(rule);
        }
    }
    rules
}

fn require(name: &str, value: &str) -> StackResult<()> {
    if value.trim().is_empty() {
        return Err(StackError::invalid(name, "required parameter is absent"));
    }
    Ok(())
}

/// Lowercase letters, digits and single hyphens; usable inside logical ids
fn require_slug(name: &str, value: &str) -> StackResult<()> {
    require(name, value)?;
    let valid = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--");
    if !valid {
        return Err(StackError::invalid(
            name,
            format!("{value:?} must be lowercase letters, digits and single hyphens"),
        ));
    }
    Ok(())
}

fn check_parameters(params: &StackParameters) -> StackResult<Ipv4Cidr> {
    require("stack_name", &params.stack_name)?;
    if !params.stack_name.starts_with(|c: char| c.is_ascii_alphabetic())
        || !params
            .stack_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(StackError::invalid(
            "stack_name",
            format!("{:?} must start with a letter and contain only letters, digits and hyphens", params.stack_name),
        ));
    }
    require_slug("prefix", &params.prefix)?;
    require("region", &params.region)?;
    require("key_name", &params.key_name)?;
    require("network_cidr", &params.network_cidr)?;

    if params.zones.is_empty() {
        return Err(StackError::invalid("zones", "at least one zone is required"));
    }

    params
        .network_cidr
        .parse::<Ipv4Cidr>()
        .map_err(|e| StackError::from_network("network_cidr", e))
}

fn check_zones<'a>(params: &'a StackParameters, network: &Ipv4Cidr) -> StackResult<Vec<CheckedZone<'a>>> {
    let per_kind = |kind: ZoneKind| params.zones.iter().filter(|z| z.kind == kind).count();
    let mut seen: HashMap<ZoneKind, usize> = HashMap::new();
    let mut checked = Vec::with_capacity(params.zones.len());

    for zone in &params.zones {
        require("zone", &zone.zone)?;
        validate_zone_in_region(&zone.zone, &params.region)?;

        let cidr = zone
            .subnet_cidr
            .parse::<Ipv4Cidr>()
            .map_err(|e| StackError::from_network("subnet_cidr", e))?;

        let ordinal = seen.entry(zone.kind).or_insert(0);
        *ordinal += 1;
        let label = if per_kind(zone.kind) > 1 {
            format!("public-{}-{}", zone.kind.label(), ordinal)
        } else {
            format!("public-{}", zone.kind.label())
        };

        validate_subnet_within_network(&label, &cidr, network)?;

        for instance in &zone.instances {
            require_slug("instance.name", &instance.name)?;
            require("instance.image_id", &instance.image_id)?;
            require("instance.instance_type", &instance.instance_type)?;
        }

        checked.push(CheckedZone {
            spec: zone,
            cidr,
            label,
        });
    }

    let cidrs: Vec<Ipv4Cidr> = checked.iter().map(|zone| zone.cidr).collect();
    validate_disjoint_subnets(&cidrs)?;

    Ok(checked)
}

/// `ec2-instance-1` -> `ec2Instance1`
fn camel_case(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    for (i, part) in slug.split('-').filter(|p| !p.is_empty()).enumerate() {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.push(first);
            } else {
                out.push(first.to_ascii_uppercase());
            }
            out.extend(chars);
        }
    }
    out
}
