// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Graph - Arena of Declared Resources
//!
//! A [`ResourceGraph`] is the in-memory collection of resources declared by a
//! stack, prior to deployment. Every resource lives in a per-kind arena and is
//! addressed by a typed [`ResourceRef`]; cross-references between resources
//! are refs, resolved to provider identifiers only when an engine applies the
//! graph.
//!
//! # Structure
//!
//! ```text
//! Instance ──> Subnet ──> Network <── Gateway
//!    │           ▲           ▲           ▲
//!    ▼           │           │           │
//! SecurityGroup  RouteTable ─┴── routes ─┘
//! ```
//!
//! Graphs are only mutated while a builder constructs them; once handed out
//! they are read-only.

mod resources;

pub use resources::{
    GatewayKind, GatewayResource, InstanceResource, NetworkResource, Route, RouteTableResource,
    SecurityGroupResource, SubnetResource,
};

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::domain::ResourceKind;

/// Synthetic identity of one built graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GraphId(Uuid);

impl GraphId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed index of a resource within its graph's arena
pub struct ResourceRef<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ResourceRef<T> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for ResourceRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ResourceRef<T> {}

impl<T> PartialEq for ResourceRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for ResourceRef<T> {}

impl<T> Hash for ResourceRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for ResourceRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

impl<T> Serialize for ResourceRef<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.index.serialize(serializer)
    }
}

/// A ref to a resource of any kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "arena", content = "index", rename_all = "snake_case")]
pub enum AnyRef {
    Network(ResourceRef<NetworkResource>),
    Gateway(ResourceRef<GatewayResource>),
    Subnet(ResourceRef<SubnetResource>),
    RouteTable(ResourceRef<RouteTableResource>),
    SecurityGroup(ResourceRef<SecurityGroupResource>),
    Instance(ResourceRef<InstanceResource>),
}

mod sealed {
    pub trait Sealed {}
}

/// A resource type stored in one of the graph's arenas
///
/// Sealed: only the resource types of this module live in a graph, and a
/// built graph cannot be edited from outside the crate.
///
/// ```rust,compile_fail
/// use mec_infrastructure::graph::{GraphResource, RouteTableResource};
/// use mec_infrastructure::stack::{build, find_profile};
///
/// let mut graph = build(&find_profile("MecStackCDG").unwrap().parameters).unwrap();
/// RouteTableResource::arena_mut(&mut graph)[1].routes.clear();
/// ```
pub trait GraphResource: sealed::Sealed + Sized + 'static {
    fn logical_id(&self) -> &str;

    fn arena(graph: &ResourceGraph) -> &[Self];
}

/// Write access to an arena, reserved to builders inside the crate
pub(crate) trait ArenaMut: GraphResource {
    fn arena_mut(graph: &mut ResourceGraph) -> &mut Vec<Self>;

    fn wrap(r: ResourceRef<Self>) -> AnyRef;
}

/// Named identifier surfaced to operators after apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackOutput {
    pub name: String,
    pub value: AnyRef,
}

/// Dependency edge: `from` references `to`, so `to` must exist first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: AnyRef,
    pub to: AnyRef,
}

/// Structure of a graph with synthetic identity removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphShape {
    pub counts: BTreeMap<ResourceKind, usize>,
    /// `(from, to)` logical ids, in creation order
    pub edges: Vec<(String, String)>,
    pub outputs: Vec<String>,
}

/// The declared resources of one stack and their cross-references
#[derive(Debug, Clone, Serialize)]
pub struct ResourceGraph {
    id: GraphId,
    stack_name: String,
    region: String,
    networks: Vec<NetworkResource>,
    gateways: Vec<GatewayResource>,
    subnets: Vec<SubnetResource>,
    route_tables: Vec<RouteTableResource>,
    security_groups: Vec<SecurityGroupResource>,
    instances: Vec<InstanceResource>,
    outputs: Vec<StackOutput>,
    #[serde(skip)]
    order: Vec<AnyRef>,
}

impl ResourceGraph {
    pub(crate) fn new(stack_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: GraphId::new(),
            stack_name: stack_name.into(),
            region: region.into(),
            networks: Vec::new(),
            gateways: Vec::new(),
            subnets: Vec::new(),
            route_tables: Vec::new(),
            security_groups: Vec::new(),
            instances: Vec::new(),
            outputs: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Add a resource to its arena, recording creation order
    pub(crate) fn insert<T: ArenaMut>(&mut self, resource: T) -> ResourceRef<T> {
        let arena = T::arena_mut(self);
        let r = ResourceRef::new(arena.len());
        arena.push(resource);
        self.order.push(T::wrap(r));
        r
    }

    pub(crate) fn add_output(&mut self, name: impl Into<String>, value: AnyRef) {
        self.outputs.push(StackOutput {
            name: name.into(),
            value,
        });
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Look up a resource by ref
    pub fn get<T: GraphResource>(&self, r: ResourceRef<T>) -> Option<&T> {
        T::arena(self).get(r.index())
    }

    /// Iterate one arena together with the refs of its members
    pub fn iter<T: GraphResource>(&self) -> impl Iterator<Item = (ResourceRef<T>, &T)> {
        T::arena(self)
            .iter()
            .enumerate()
            .map(|(index, resource)| (ResourceRef::new(index), resource))
    }

    pub fn networks(&self) -> &[NetworkResource] {
        &self.networks
    }

    pub fn gateways(&self) -> &[GatewayResource] {
        &self.gateways
    }

    pub fn subnets(&self) -> &[SubnetResource] {
        &self.subnets
    }

    pub fn route_tables(&self) -> &[RouteTableResource] {
        &self.route_tables
    }

    pub fn security_groups(&self) -> &[SecurityGroupResource] {
        &self.security_groups
    }

    pub fn instances(&self) -> &[InstanceResource] {
        &self.instances
    }

    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }

    /// Every resource, in the order it was declared
    pub fn creation_order(&self) -> &[AnyRef] {
        &self.order
    }

    /// Total number of resources
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Gateway of the given flavour, if declared
    pub fn gateway(&self, kind: GatewayKind) -> Option<(ResourceRef<GatewayResource>, &GatewayResource)> {
        self.iter::<GatewayResource>()
            .find(|(_, gateway)| gateway.kind == kind)
    }

    /// Route table owned by a subnet
    pub fn route_table_for(&self, subnet: ResourceRef<SubnetResource>) -> Option<&RouteTableResource> {
        self.route_tables
            .iter()
            .find(|table| table.subnet == subnet)
    }

    /// Resource kind behind a ref, if it resolves
    pub fn kind_of(&self, r: AnyRef) -> Option<ResourceKind> {
        match r {
            AnyRef::Network(r) => self.get(r).map(|_| ResourceKind::Network),
            AnyRef::Gateway(r) => self.get(r).map(|gateway| gateway.kind.resource_kind()),
            AnyRef::Subnet(r) => self.get(r).map(|_| ResourceKind::Subnet),
            AnyRef::RouteTable(r) => self.get(r).map(|_| ResourceKind::RouteTable),
            AnyRef::SecurityGroup(r) => self.get(r).map(|_| ResourceKind::SecurityGroup),
            AnyRef::Instance(r) => self.get(r).map(|_| ResourceKind::Instance),
        }
    }

    /// Logical id behind a ref, if it resolves
    pub fn logical_id(&self, r: AnyRef) -> Option<&str> {
        match r {
            AnyRef::Network(r) => self.get(r).map(GraphResource::logical_id),
            AnyRef::Gateway(r) => self.get(r).map(GraphResource::logical_id),
            AnyRef::Subnet(r) => self.get(r).map(GraphResource::logical_id),
            AnyRef::RouteTable(r) => self.get(r).map(GraphResource::logical_id),
            AnyRef::SecurityGroup(r) => self.get(r).map(GraphResource::logical_id),
            AnyRef::Instance(r) => self.get(r).map(GraphResource::logical_id),
        }
    }

    /// Resources directly referenced by `r`
    pub fn references(&self, r: AnyRef) -> Vec<AnyRef> {
        match r {
            AnyRef::Network(_) => Vec::new(),
            AnyRef::Gateway(r) => self
                .get(r)
                .map(|gateway| vec![AnyRef::Network(gateway.network)])
                .unwrap_or_default(),
            AnyRef::Subnet(r) => self
                .get(r)
                .map(|subnet| vec![AnyRef::Network(subnet.network)])
                .unwrap_or_default(),
            AnyRef::RouteTable(r) => self
                .get(r)
                .map(|table| {
                    let mut refs = vec![AnyRef::Network(table.network), AnyRef::Subnet(table.subnet)];
                    refs.extend(table.routes.iter().map(|route| AnyRef::Gateway(route.gateway)));
                    refs
                })
                .unwrap_or_default(),
            AnyRef::SecurityGroup(r) => self
                .get(r)
                .map(|group| vec![AnyRef::Network(group.network)])
                .unwrap_or_default(),
            AnyRef::Instance(r) => self
                .get(r)
                .map(|instance| {
                    let mut refs = vec![AnyRef::Subnet(instance.subnet)];
                    refs.extend(instance.security_groups.iter().copied().map(AnyRef::SecurityGroup));
                    refs
                })
                .unwrap_or_default(),
        }
    }

    /// All dependency edges, in creation order of their source
    pub fn edges(&self) -> Vec<Edge> {
        self.order
            .iter()
            .flat_map(|&from| {
                self.references(from)
                    .into_iter()
                    .map(move |to| Edge { from, to })
            })
            .collect()
    }

    /// Number of resources of one kind
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.order
            .iter()
            .filter(|&&r| self.kind_of(r) == Some(kind))
            .count()
    }

    /// Structure of the graph, comparable across builds
    pub fn shape(&self) -> GraphShape {
        let counts = ResourceKind::ALL
            .iter()
            .map(|&kind| (kind, self.count(kind)))
            .collect();

        let name = |r: AnyRef| self.logical_id(r).unwrap_or("<dangling>").to_string();
        let edges = self
            .edges()
            .into_iter()
            .map(|edge| (name(edge.from), name(edge.to)))
            .collect();

        let outputs = self
            .outputs
            .iter()
            .map(|output| format!("{}={}", output.name, name(output.value)))
            .collect();

        GraphShape {
            counts,
            edges,
            outputs,
        }
    }
}
