// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Synthesis - Projection F: ResourceGraph → Template
//!
//! Pure projection of a built [`ResourceGraph`] into a CloudFormation-format
//! JSON document that an external provisioning service can deploy.
//!
//! ```text
//! ResourceGraph ────synthesize────> Template
//!   network                           AWS::EC2::VPC
//!   gateway (internet)                AWS::EC2::InternetGateway + VPCGatewayAttachment
//!   gateway (carrier)                 AWS::EC2::CarrierGateway
//!   subnet                            AWS::EC2::Subnet
//!   route table                       AWS::EC2::RouteTable + Route + SubnetRouteTableAssociation
//!   security group                    AWS::EC2::SecurityGroup
//!   instance                          AWS::EC2::Instance
//!   outputs                           Outputs
//! ```
//!
//! No I/O happens here; writing the document is the caller's concern.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::domain::invariants::validate_graph;
use crate::domain::{
    AddressKind, IngressRule, Ipv4Cidr, Protocol, ResourceKind, ValidationError, ValidationResult,
};
use crate::errors::{StackError, StackResult};
use crate::graph::{
    AnyRef, GatewayKind, GatewayResource, GraphResource, InstanceResource, NetworkResource,
    ResourceGraph, ResourceRef, RouteTableResource, SecurityGroupResource, SubnetResource,
};

/// Template format version understood by the provisioning service
pub const FORMAT_VERSION: &str = "2010-09-09";

/// One entry of the `Resources` section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(rename = "Properties")]
    pub properties: Value,
    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// One entry of the `Outputs` section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateOutput {
    #[serde(rename = "Value")]
    pub value: Value,
}

/// Synthesized deployment document for one stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(skip)]
    pub stack_name: String,
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, TemplateResource>,
    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, TemplateOutput>,
}

impl Template {
    /// Pretty-printed JSON document
    pub fn to_json_pretty(&self) -> StackResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> StackResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// File name the template is conventionally written to
    pub fn file_name(&self) -> String {
        format!("{}.template.json", self.stack_name)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&TemplateResource> {
        self.resources.get(logical_id)
    }

    /// Logical ids of every resource of a given type, sorted
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|(_, resource)| resource.resource_type == resource_type)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Template-safe logical id: `mec-public-az-subnet` → `MecPublicAzSubnet`
pub fn template_logical_id(logical_id: &str) -> String {
    logical_id
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn reference(logical_id: &str) -> Value {
    json!({ "Ref": template_logical_id(logical_id) })
}

fn group_id(logical_id: &str) -> Value {
    json!({ "Fn::GetAtt": [template_logical_id(logical_id), "GroupId"] })
}

fn attachment_id(gateway: &GatewayResource) -> String {
    template_logical_id(&format!("{}-attachment", gateway.logical_id))
}

fn route_id(table_id: &str, n: usize) -> String {
    if n == 0 {
        format!("{table_id}Route")
    } else {
        format!("{table_id}Route{}", n + 1)
    }
}

fn association_id(table_id: &str) -> String {
    format!("{table_id}Association")
}

/// Template ids a resource occupies, its own id first
fn claimed_ids(graph: &ResourceGraph, r: AnyRef) -> Vec<String> {
    let Some(logical_id) = graph.logical_id(r) else {
        return Vec::new();
    };
    let id = template_logical_id(logical_id);
    let mut ids = Vec::new();

    match r {
        AnyRef::Gateway(r) => {
            if let Some(gateway) = graph.get(r).filter(|g| g.kind == GatewayKind::Internet) {
                ids.push(attachment_id(gateway));
            }
        }
        AnyRef::RouteTable(r) => {
            if let Some(table) = graph.get(r) {
                ids.extend((0..table.routes.len()).map(|n| route_id(&id, n)));
                ids.push(association_id(&id));
            }
        }
        _ => {}
    }

    ids.insert(0, id);
    ids
}

/// Check that no two resources map to the same template id
///
/// Covers the PascalCase form of every logical id and the ids derived from
/// them (gateway attachments, routes, route table associations).
pub fn validate_template_ids(graph: &ResourceGraph) -> ValidationResult {
    let mut claimed: HashMap<String, &str> = HashMap::new();

    for &r in graph.creation_order() {
        let owner = graph.logical_id(r).unwrap_or_default();
        for id in claimed_ids(graph, r) {
            if let Some(first) = claimed.insert(id.clone(), owner) {
                return Err(ValidationError::IdentifierCollision {
                    id,
                    first: first.to_string(),
                    second: owner.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn ingress_json(rule: &IngressRule) -> Value {
    json!({
        "IpProtocol": rule.protocol.as_ip_protocol(),
        "FromPort": rule.port,
        "ToPort": rule.port,
        "CidrIp": rule.source.to_string(),
    })
}

/// Projection context: resolves refs against the graph being synthesized
struct Synth<'g> {
    graph: &'g ResourceGraph,
    resources: BTreeMap<String, TemplateResource>,
}

impl<'g> Synth<'g> {
    fn resolve<T: GraphResource>(&self, r: ResourceRef<T>) -> StackResult<&'g T> {
        self.graph.get(r).ok_or_else(|| {
            StackError::Serialization(format!(
                "dangling reference #{} in stack {}",
                r.index(),
                self.graph.stack_name()
            ))
        })
    }

    fn emit(
        &mut self,
        logical_id: String,
        kind: &str,
        properties: Value,
        depends_on: Vec<String>,
    ) -> StackResult<()> {
        match self.resources.entry(logical_id) {
            Entry::Occupied(entry) => Err(StackError::Serialization(format!(
                "template id {} emitted twice",
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                debug!("Synthesized {} {}", kind, entry.key());
                entry.insert(TemplateResource {
                    resource_type: kind.to_string(),
                    properties,
                    depends_on,
                });
                Ok(())
            }
        }
    }

    fn network(&mut self, network: &NetworkResource) -> StackResult<()> {
        self.emit(
            template_logical_id(&network.logical_id),
            ResourceKind::Network.cfn_type(),
            json!({
                "CidrBlock": network.cidr.to_string(),
                "EnableDnsHostnames": network.enable_dns_hostnames,
                "EnableDnsSupport": true,
            }),
            Vec::new(),
        )
    }

    fn gateway(&mut self, gateway: &GatewayResource) -> StackResult<()> {
        let vpc = &self.resolve(gateway.network)?.logical_id;
        let id = template_logical_id(&gateway.logical_id);
        match gateway.kind {
            GatewayKind::Internet => {
                let vpc_ref = reference(vpc);
                self.emit(id.clone(), ResourceKind::InternetGateway.cfn_type(), json!({}), Vec::new())?;
                self.emit(
                    attachment_id(gateway),
                    "AWS::EC2::VPCGatewayAttachment",
                    json!({ "VpcId": vpc_ref, "InternetGatewayId": { "Ref": id } }),
                    Vec::new(),
                )
            }
            GatewayKind::Carrier => {
                let vpc_ref = reference(vpc);
                self.emit(
                    id,
                    ResourceKind::CarrierGateway.cfn_type(),
                    json!({ "VpcId": vpc_ref }),
                    Vec::new(),
                )
            }
        }
    }

    fn subnet(&mut self, subnet: &SubnetResource) -> StackResult<()> {
        let vpc = &self.resolve(subnet.network)?.logical_id;
        self.emit(
            template_logical_id(&subnet.logical_id),
            ResourceKind::Subnet.cfn_type(),
            json!({
                "VpcId": reference(vpc),
                "AvailabilityZone": subnet.zone,
                "CidrBlock": subnet.cidr.to_string(),
                "MapPublicIpOnLaunch": subnet.map_public_ip_on_launch,
            }),
            Vec::new(),
        )
    }

    fn route_table(&mut self, table: &RouteTableResource) -> StackResult<()> {
        let vpc = &self.resolve(table.network)?.logical_id;
        let subnet = &self.resolve(table.subnet)?.logical_id;
        let id = template_logical_id(&table.logical_id);

        self.emit(
            id.clone(),
            ResourceKind::RouteTable.cfn_type(),
            json!({ "VpcId": reference(vpc) }),
            Vec::new(),
        )?;

        for (n, route) in table.routes.iter().enumerate() {
            let gateway = self.resolve(route.gateway)?;
            let (target_key, depends_on) = match gateway.kind {
                GatewayKind::Internet => ("GatewayId", vec![attachment_id(gateway)]),
                GatewayKind::Carrier => ("CarrierGatewayId", Vec::new()),
            };
            let mut properties = json!({
                "RouteTableId": { "Ref": id },
                "DestinationCidrBlock": route.destination.to_string(),
            });
            properties[target_key] = reference(&gateway.logical_id);
            self.emit(route_id(&id, n), "AWS::EC2::Route", properties, depends_on)?;
        }

        self.emit(
            association_id(&id),
            "AWS::EC2::SubnetRouteTableAssociation",
            json!({ "SubnetId": reference(subnet), "RouteTableId": { "Ref": id } }),
            Vec::new(),
        )
    }

    fn security_group(&mut self, group: &SecurityGroupResource) -> StackResult<()> {
        let vpc = &self.resolve(group.network)?.logical_id;
        let ingress: Vec<Value> = group.ingress.iter().map(ingress_json).collect();

        let mut properties = json!({
            "GroupDescription": group.description,
            "VpcId": reference(vpc),
            "SecurityGroupIngress": ingress,
        });
        if group.allow_all_outbound {
            properties["SecurityGroupEgress"] = json!([{
                "IpProtocol": Protocol::All.as_ip_protocol(),
                "CidrIp": Ipv4Cidr::ANY.to_string(),
                "Description": "Allow all outbound traffic by default",
            }]);
        }

        self.emit(
            template_logical_id(&group.logical_id),
            ResourceKind::SecurityGroup.cfn_type(),
            properties,
            Vec::new(),
        )
    }

    fn instance(&mut self, instance: &InstanceResource) -> StackResult<()> {
        let subnet = &self.resolve(instance.subnet)?.logical_id;
        let groups = instance
            .security_groups
            .iter()
            .map(|&group| self.resolve(group).map(|g| group_id(&g.logical_id)))
            .collect::<StackResult<Vec<Value>>>()?;

        let mut interface = json!({
            "DeviceIndex": "0",
            "GroupSet": groups,
            "SubnetId": reference(subnet),
        });
        let address_key = match instance.address {
            AddressKind::Public => "AssociatePublicIpAddress",
            AddressKind::Carrier => "AssociateCarrierIpAddress",
        };
        interface[address_key] = Value::Bool(true);

        self.emit(
            template_logical_id(&instance.logical_id),
            ResourceKind::Instance.cfn_type(),
            json!({
                "AvailabilityZone": instance.zone,
                "ImageId": instance.image_id,
                "InstanceType": instance.instance_type,
                "KeyName": instance.key_name,
                "NetworkInterfaces": [interface],
            }),
            Vec::new(),
        )
    }
}

/// Project a graph into its deployment template
///
/// # Errors
/// [`StackError::InvalidParameter`] when the graph breaks a topology invariant
/// or two resources would share a template id.
pub fn synthesize(graph: &ResourceGraph) -> StackResult<Template> {
    validate_graph(graph)?;
    validate_template_ids(graph)?;

    let mut synth = Synth {
        graph,
        resources: BTreeMap::new(),
    };

    for &r in graph.creation_order() {
        match r {
            AnyRef::Network(r) => {
                let network = synth.resolve(r)?;
                synth.network(network)?;
            }
            AnyRef::Gateway(r) => {
                let gateway = synth.resolve(r)?;
                synth.gateway(gateway)?;
            }
            AnyRef::Subnet(r) => {
                let subnet = synth.resolve(r)?;
                synth.subnet(subnet)?;
            }
            AnyRef::RouteTable(r) => {
                let table = synth.resolve(r)?;
                synth.route_table(table)?;
            }
            AnyRef::SecurityGroup(r) => {
                let group = synth.resolve(r)?;
                synth.security_group(group)?;
            }
            AnyRef::Instance(r) => {
                let instance = synth.resolve(r)?;
                synth.instance(instance)?;
            }
        }
    }

    let mut outputs = BTreeMap::new();
    for output in graph.outputs() {
        let logical_id = graph.logical_id(output.value).ok_or_else(|| {
            StackError::Serialization(format!("output {} has a dangling reference", output.name))
        })?;
        let value = match output.value {
            AnyRef::SecurityGroup(_) => group_id(logical_id),
            _ => reference(logical_id),
        };
        if outputs
            .insert(output.name.clone(), TemplateOutput { value })
            .is_some()
        {
            return Err(ValidationError::DuplicateOutput(output.name.clone()).into());
        }
    }

    Ok(Template {
        stack_name: graph.stack_name().to_string(),
        format_version: FORMAT_VERSION.to_string(),
        description: format!("{} network stack ({})", graph.stack_name(), graph.region()),
        resources: synth.resources,
        outputs,
    })
}
