// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Topology Invariants
//!
//! Business rules every stack must satisfy, checked both on raw parameters
//! (before anything is built) and on a finished [`ResourceGraph`].
//! All functions are pure: no I/O, no mutation, deterministic.
//!
//! # Invariant Categories
//!
//! 1. **Addressing**: subnets are strict, disjoint sub-ranges of the network
//! 2. **Placement**: zones belong to the region; instances sit in their subnet's zone
//! 3. **Routing**: default routes target a gateway of the right kind on the same network
//! 4. **Access**: SSH is always reachable; edge workloads also expose HTTP and the tunnel

use std::collections::HashSet;

use crate::domain::{IngressRule, Ipv4Cidr, ZoneKind};
use crate::graph::{
    AnyRef, GatewayKind, InstanceResource, ResourceGraph, SecurityGroupResource, SubnetResource,
};

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Zone id does not belong to the target region
    #[error("Zone {zone} is not in region {region}")]
    ZoneOutsideRegion { zone: String, region: String },

    /// Subnet block is not a strict sub-range of the network block
    #[error("Subnet {subnet} ({cidr}) is not a strict sub-range of network {network}")]
    SubnetOutsideNetwork {
        subnet: String,
        cidr: Ipv4Cidr,
        network: Ipv4Cidr,
    },

    /// Two subnets of the same network overlap
    #[error("Subnets {first} and {second} overlap")]
    OverlappingSubnets { first: Ipv4Cidr, second: Ipv4Cidr },

    /// A stack has other than exactly one network
    #[error("Expected exactly one network, found {0}")]
    NetworkCount(usize),

    /// Subnet has no (or more than one) route table
    #[error("Subnet {subnet} must own exactly one route table, found {found}")]
    RouteTableCount { subnet: String, found: usize },

    /// Route table has no usable default route
    #[error("Route table {route_table}: {reason}")]
    InvalidRoute { route_table: String, reason: String },

    /// Subnet or instance placement is inconsistent
    #[error("{resource}: {reason}")]
    InvalidPlacement { resource: String, reason: String },

    /// Required ingress rule missing
    #[error("{resource} is missing required ingress rule {rule}")]
    MissingIngress { resource: String, rule: IngressRule },

    /// Two resources share a logical id
    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    /// A reference does not resolve inside the graph
    #[error("Dangling reference from {0}")]
    DanglingReference(String),

    /// Two outputs share a name
    #[error("Duplicate output name: {0}")]
    DuplicateOutput(String),

    /// Two resources map to the same template id
    #[error("Template id {id} is claimed by both {first} and {second}")]
    IdentifierCollision {
        id: String,
        first: String,
        second: String,
    },
}

impl ValidationError {
    /// Stack parameter the failure is attributed to
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::ZoneOutsideRegion { .. } => "zone",
            Self::SubnetOutsideNetwork { .. } | Self::OverlappingSubnets { .. } => "subnet_cidr",
            Self::NetworkCount(_) => "network_cidr",
            Self::RouteTableCount { .. } | Self::InvalidRoute { .. } => "zones",
            Self::InvalidPlacement { .. } | Self::MissingIngress { .. } => "instances",
            Self::DuplicateLogicalId(_)
            | Self::DuplicateOutput(_)
            | Self::IdentifierCollision { .. } => "name",
            Self::DanglingReference(_) => "graph",
        }
    }
}

/// Validate a zone id belongs to a region
///
/// # Rules
/// - Availability zones are the region plus a letter (`eu-west-3a`)
/// - Wavelength zones extend the region with a suffix (`us-east-1-wl1-dfw-wlz-1`)
pub fn validate_zone_in_region(zone: &str, region: &str) -> ValidationResult {
    let suffix = zone.strip_prefix(region).unwrap_or_default();
    let belongs = !region.is_empty()
        && zone.len() > region.len()
        && zone.starts_with(region)
        && (suffix.starts_with('-') || suffix.chars().all(|c| c.is_ascii_lowercase()));

    if !belongs {
        return Err(ValidationError::ZoneOutsideRegion {
            zone: zone.to_string(),
            region: region.to_string(),
        });
    }
    Ok(())
}

/// Validate a subnet block is a strict sub-range of its network block
pub fn validate_subnet_within_network(
    subnet: &str,
    cidr: &Ipv4Cidr,
    network: &Ipv4Cidr,
) -> ValidationResult {
    if !cidr.is_strict_subnet_of(network) {
        return Err(ValidationError::SubnetOutsideNetwork {
            subnet: subnet.to_string(),
            cidr: *cidr,
            network: *network,
        });
    }
    Ok(())
}

/// Validate no two subnet blocks overlap
pub fn validate_disjoint_subnets(cidrs: &[Ipv4Cidr]) -> ValidationResult {
    for (i, first) in cidrs.iter().enumerate() {
        if let Some(second) = cidrs[i + 1..].iter().find(|other| first.overlaps(other)) {
            return Err(ValidationError::OverlappingSubnets {
                first: *first,
                second: *second,
            });
        }
    }
    Ok(())
}

/// Ingress rules every instance in a zone of this kind must expose
pub fn required_ingress(zone_kind: ZoneKind) -> Vec<IngressRule> {
    match zone_kind {
        ZoneKind::Core => vec![IngressRule::ssh()],
        ZoneKind::Edge => vec![IngressRule::ssh(), IngressRule::http(), IngressRule::tunnel()],
    }
}

/// Validate the union of an instance's rules covers its zone's baseline
pub fn validate_ingress_baseline(
    resource: &str,
    rules: &[IngressRule],
    zone_kind: ZoneKind,
) -> ValidationResult {
    match required_ingress(zone_kind)
        .into_iter()
        .find(|rule| !rules.contains(rule))
    {
        Some(rule) => Err(ValidationError::MissingIngress {
            resource: resource.to_string(),
            rule,
        }),
        None => Ok(()),
    }
}

/// Validate every topology invariant of a built graph
///
/// # Rules
/// - Exactly one network; every resource references it
/// - Subnets: strict, disjoint sub-ranges in one of the network's zones
/// - Each subnet owns exactly one route table whose default route targets
///   the gateway matching its zone kind, attached to the same network
/// - Security groups always allow SSH
/// - Instances sit in their subnet's zone with the matching address kind and
///   expose the zone's baseline ingress
/// - Logical ids and output names are unique and every reference resolves
pub fn validate_graph(graph: &ResourceGraph) -> ValidationResult {
    validate_references(graph)?;
    validate_unique_logical_ids(graph)?;
    validate_unique_outputs(graph)?;

    let [network] = graph.networks() else {
        return Err(ValidationError::NetworkCount(graph.networks().len()));
    };

    for (subnet_ref, subnet) in graph.iter::<SubnetResource>() {
        validate_subnet_within_network(&subnet.logical_id, &subnet.cidr, &network.cidr)?;

        if !network.zones.contains(&subnet.zone) {
            return Err(ValidationError::InvalidPlacement {
                resource: subnet.logical_id.clone(),
                reason: format!("zone {} is not spanned by the network", subnet.zone),
            });
        }

        let tables: Vec<_> = graph
            .route_tables()
            .iter()
            .filter(|table| table.subnet == subnet_ref)
            .collect();
        let [table] = tables.as_slice() else {
            return Err(ValidationError::RouteTableCount {
                subnet: subnet.logical_id.clone(),
                found: tables.len(),
            });
        };

        let route = table
            .default_route()
            .ok_or_else(|| ValidationError::InvalidRoute {
                route_table: table.logical_id.clone(),
                reason: "no 0.0.0.0/0 route".to_string(),
            })?;
        let gateway = graph
            .get(route.gateway)
            .ok_or_else(|| ValidationError::DanglingReference(table.logical_id.clone()))?;

        if gateway.network != subnet.network || table.network != subnet.network {
            return Err(ValidationError::InvalidRoute {
                route_table: table.logical_id.clone(),
                reason: format!("gateway {} is attached to another network", gateway.logical_id),
            });
        }

        let expected = GatewayKind::for_zone(subnet.zone_kind);
        if gateway.kind != expected {
            return Err(ValidationError::InvalidRoute {
                route_table: table.logical_id.clone(),
                reason: format!(
                    "{} zone subnet routed through {:?} gateway {}",
                    subnet.zone_kind, gateway.kind, gateway.logical_id
                ),
            });
        }
    }

    let cidrs: Vec<Ipv4Cidr> = graph.subnets().iter().map(|subnet| subnet.cidr).collect();
    validate_disjoint_subnets(&cidrs)?;

    for group in graph.security_groups() {
        if !group.allows(&IngressRule::ssh()) {
            return Err(ValidationError::MissingIngress {
                resource: group.logical_id.clone(),
                rule: IngressRule::ssh(),
            });
        }
    }

    for instance in graph.instances() {
        validate_instance(graph, instance)?;
    }

    Ok(())
}

fn validate_instance(graph: &ResourceGraph, instance: &InstanceResource) -> ValidationResult {
    let dangling = || ValidationError::DanglingReference(instance.logical_id.clone());
    let subnet = graph.get(instance.subnet).ok_or_else(dangling)?;

    if instance.zone != subnet.zone {
        return Err(ValidationError::InvalidPlacement {
            resource: instance.logical_id.clone(),
            reason: format!(
                "declared in zone {} but subnet {} is in {}",
                instance.zone, subnet.logical_id, subnet.zone
            ),
        });
    }

    if instance.address != subnet.zone_kind.address_kind() {
        return Err(ValidationError::InvalidPlacement {
            resource: instance.logical_id.clone(),
            reason: format!("{:?} address requested in a {} zone", instance.address, subnet.zone_kind),
        });
    }

    if instance.security_groups.is_empty() {
        return Err(ValidationError::InvalidPlacement {
            resource: instance.logical_id.clone(),
            reason: "no security group attached".to_string(),
        });
    }

    let groups: Vec<&SecurityGroupResource> = instance
        .security_groups
        .iter()
        .map(|&group| graph.get(group).ok_or_else(dangling))
        .collect::<Result<_, _>>()?;

    if let Some(group) = groups.iter().find(|group| group.network != subnet.network) {
        return Err(ValidationError::InvalidPlacement {
            resource: instance.logical_id.clone(),
            reason: format!("security group {} belongs to another network", group.logical_id),
        });
    }

    let rules: Vec<IngressRule> = groups
        .iter()
        .flat_map(|group| group.ingress.iter().copied())
        .collect();
    validate_ingress_baseline(&instance.logical_id, &rules, subnet.zone_kind)
}

fn validate_references(graph: &ResourceGraph) -> ValidationResult {
    for &r in graph.creation_order() {
        let source = graph.logical_id(r).unwrap_or("<unknown>");
        if graph
            .references(r)
            .into_iter()
            .any(|target| graph.kind_of(target).is_none())
        {
            return Err(ValidationError::DanglingReference(source.to_string()));
        }
    }

    for output in graph.outputs() {
        if graph.kind_of(output.value).is_none() {
            return Err(ValidationError::DanglingReference(format!(
                "output {}",
                output.name
            )));
        }
    }
    Ok(())
}

fn validate_unique_logical_ids(graph: &ResourceGraph) -> ValidationResult {
    let mut seen = HashSet::new();
    let ids = graph
        .creation_order()
        .iter()
        .filter_map(|&r: &AnyRef| graph.logical_id(r));

    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateLogicalId(id.to_string()));
        }
    }
    Ok(())
}

fn validate_unique_outputs(graph: &ResourceGraph) -> ValidationResult {
    let mut seen = HashSet::new();
    for output in graph.outputs() {
        if !seen.insert(output.name.as_str()) {
            return Err(ValidationError::DuplicateOutput(output.name.clone()));
        }
    }
    Ok(())
}
