// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Stack Builder Tests
//!
//! Verifies the graphs produced for the documented parameter sets:
//! - Single core zone
//! - Core zone plus edge zone
//! - Malformed and inconsistent parameters

mod fixtures;

use fixtures::*;
use mec_infrastructure::domain::{AddressKind, Ipv4Cidr, ResourceKind, ZoneKind, HTTP_PORT, SSH_PORT, TUNNEL_PORT};
use mec_infrastructure::graph::GatewayKind;
use mec_infrastructure::stack::{build, find_profile, NetworkStackBuilder, ZoneSpec};
use mec_infrastructure::StackError;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test]
fn test_single_core_zone_graph() {
    let graph = build(&single_core_params()).unwrap();

    assert_eq!(graph.count(ResourceKind::Network), 1);
    assert_eq!(graph.count(ResourceKind::InternetGateway), 1);
    assert_eq!(graph.count(ResourceKind::CarrierGateway), 0);
    assert_eq!(graph.count(ResourceKind::Subnet), 1);
    assert_eq!(graph.count(ResourceKind::RouteTable), 1);
    assert_eq!(graph.count(ResourceKind::SecurityGroup), 1);
    assert_eq!(graph.count(ResourceKind::Instance), 1);

    let (igw, _) = graph.gateway(GatewayKind::Internet).unwrap();
    let table = &graph.route_tables()[0];
    assert_eq!(table.routes.len(), 1);
    assert_eq!(table.routes[0].destination, Ipv4Cidr::ANY);
    assert_eq!(table.routes[0].gateway, igw);

    let group = &graph.security_groups()[0];
    assert_eq!(group.ingress.len(), 1);
    assert_eq!(group.ingress[0].port, SSH_PORT);

    let (subnet_ref, _) = graph.iter::<mec_infrastructure::graph::SubnetResource>().next().unwrap();
    let (group_ref, _) = graph
        .iter::<mec_infrastructure::graph::SecurityGroupResource>()
        .next()
        .unwrap();
    let instance = &graph.instances()[0];
    assert_eq!(instance.subnet, subnet_ref);
    assert_eq!(instance.security_groups, vec![group_ref]);
    assert_eq!(instance.address, AddressKind::Public);
    assert_eq!(instance.image_id, IMAGE_ID);
    assert_eq!(instance.key_name, KEY_NAME);
}

#[test]
fn test_core_and_edge_graph() {
    let graph = build(&core_and_edge_params()).unwrap();

    assert_eq!(graph.count(ResourceKind::InternetGateway), 1);
    assert_eq!(graph.count(ResourceKind::CarrierGateway), 1);
    assert_eq!(graph.count(ResourceKind::Subnet), 2);
    assert_eq!(graph.count(ResourceKind::Instance), 3);

    let (carrier, _) = graph.gateway(GatewayKind::Carrier).unwrap();
    let (edge_subnet, subnet) = graph
        .iter::<mec_infrastructure::graph::SubnetResource>()
        .find(|(_, subnet)| subnet.zone_kind == ZoneKind::Edge)
        .unwrap();
    assert_eq!(subnet.zone, EDGE_ZONE);
    assert!(!subnet.map_public_ip_on_launch);

    let table = graph.route_table_for(edge_subnet).unwrap();
    assert_eq!(table.default_route().unwrap().gateway, carrier);

    let edge_instances: Vec<_> = graph
        .instances()
        .iter()
        .filter(|instance| instance.subnet == edge_subnet)
        .collect();
    assert_eq!(edge_instances.len(), 2);
    for instance in edge_instances {
        assert_eq!(instance.address, AddressKind::Carrier);
        assert_eq!(instance.zone, EDGE_ZONE);
        for &group in &instance.security_groups {
            let group = graph.get(group).unwrap();
            assert!(group.opens_port(SSH_PORT));
            assert!(group.opens_port(HTTP_PORT));
            assert!(group.opens_port(TUNNEL_PORT));
        }
    }
}

#[test]
fn test_edge_only_stack_has_no_internet_gateway() {
    let graph = build(&edge_only_params()).unwrap();
    assert_eq!(graph.count(ResourceKind::InternetGateway), 0);
    assert_eq!(graph.count(ResourceKind::CarrierGateway), 1);
    assert_eq!(graph.instances()[0].address, AddressKind::Carrier);
}

#[test]
fn test_build_is_idempotent_modulo_ids() {
    let params = core_and_edge_params();
    let first = build(&params).unwrap();
    let second = build(&params).unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(first.shape(), second.shape());
}

#[test]
fn test_outputs_name_operator_identifiers() {
    let graph = build(&core_and_edge_params()).unwrap();
    let names: Vec<&str> = graph.outputs().iter().map(|o| o.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "vpcId",
            "publicAzSubnetId",
            "bastionSgId",
            "bastionInstanceId",
            "publicWlzSubnetId",
            "edge1SgId",
            "edge1InstanceId",
            "edge2SgId",
            "edge2InstanceId",
        ]
    );
}

#[test]
fn test_creation_order_respects_references() {
    let graph = build(&core_and_edge_params()).unwrap();
    let order = graph.creation_order();
    for edge in graph.edges() {
        let from = order.iter().position(|&r| r == edge.from).unwrap();
        let to = order.iter().position(|&r| r == edge.to).unwrap();
        assert!(to < from, "{:?} must precede {:?}", edge.to, edge.from);
    }
}

#[test_case("10.0.0.0/33" ; "prefix too long")]
#[test_case("10.0.0/16" ; "three octets")]
#[test_case("10.0.0.1/16" ; "host bits set")]
#[test_case("ten.0.0.0/16" ; "not numeric")]
#[test_case("" ; "absent")]
fn test_malformed_network_cidr(cidr: &str) {
    let mut params = single_core_params();
    params.network_cidr = cidr.to_string();

    match build(&params) {
        Err(StackError::InvalidParameter { name, .. }) => assert_eq!(name, "network_cidr"),
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
}

#[test_case("10.0.128.0/33" ; "malformed")]
#[test_case("10.1.0.0/24" ; "outside network")]
#[test_case("10.0.0.0/16" ; "equal to network")]
fn test_bad_subnet_cidr(cidr: &str) {
    let mut params = single_core_params();
    params.zones[0].subnet_cidr = cidr.to_string();

    match build(&params) {
        Err(StackError::InvalidParameter { name, .. }) => assert_eq!(name, "subnet_cidr"),
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
}

#[test]
fn test_overlapping_subnets_rejected() {
    let params = single_core_params().with_zone(ZoneSpec::new(
        "us-east-1b",
        ZoneKind::Core,
        "10.0.160.0/19",
    ));
    let err = build(&params).unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[test_case("eu-west-3a" ; "other region")]
#[test_case("us-east-10a" ; "region prefix only")]
fn test_zone_outside_region(zone: &str) {
    let mut params = single_core_params();
    params.zones[0].zone = zone.to_string();

    match build(&params) {
        Err(StackError::InvalidParameter { name, .. }) => assert_eq!(name, "zone"),
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
}

#[test]
fn test_missing_zones_rejected() {
    let mut params = single_core_params();
    params.zones.clear();
    assert!(build(&params).unwrap_err().is_invalid_parameter());
}

#[test]
fn test_duplicate_instance_names_rejected() {
    let mut params = single_core_params();
    let duplicate = params.zones[0].instances[0].clone();
    params.zones[0].instances.push(duplicate);
    assert!(build(&params).unwrap_err().is_invalid_parameter());
}

fn rename_instances(params: &mut mec_infrastructure::StackParameters, names: &[&str]) {
    let template = params.zones[0].instances[0].clone();
    params.zones[0].instances = names
        .iter()
        .map(|name| {
            let mut instance = template.clone();
            instance.name = name.to_string();
            instance
        })
        .collect();
}

#[test_case(&["igw-attachment"] ; "shadows gateway attachment")]
#[test_case(&["public-az-subnet-rtb-route"] ; "shadows default route")]
#[test_case(&["public-az-subnet-rtb-association"] ; "shadows route table association")]
#[test_case(&["a-1", "a1"] ; "same template id")]
fn test_template_id_collisions_rejected(names: &[&str]) {
    let mut params = single_core_params();
    rename_instances(&mut params, names);

    for builder in [NetworkStackBuilder::new(), NetworkStackBuilder::new().with_outputs(false)] {
        match builder.build(&params).unwrap_err() {
            StackError::InvalidParameter { name, .. } => assert_eq!(name, "name"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[test]
fn test_similar_names_with_distinct_ids_build() {
    let mut params = single_core_params();
    rename_instances(&mut params, &["igw-attached", "a-1", "a-2"]);

    let graph = build(&params).unwrap();
    assert_eq!(graph.count(ResourceKind::Instance), 3);
    let template = mec_infrastructure::synthesize(&graph).unwrap();
    assert!(template.resources.contains_key("CoreIgwAttachment"));
    assert!(template.resources.contains_key("CorePublicAzSubnetRtbRoute"));
    assert!(template.outputs.contains_key("a1InstanceId"));
    assert!(template.outputs.contains_key("a2InstanceId"));
}

#[test_case("MecStackCDG", "eu-west-3", 3 ; "paris")]
#[test_case("MecStackDFW", "us-east-1", 3 ; "dallas")]
#[test_case("Ec2InstanceStack", "us-east-1", 1 ; "single instance")]
fn test_builtin_profiles_build(name: &str, region: &str, instances: usize) {
    let profile = find_profile(name).unwrap();
    let graph = NetworkStackBuilder::new().build(&profile.parameters).unwrap();

    assert_eq!(graph.stack_name(), name);
    assert_eq!(graph.region(), region);
    assert_eq!(graph.count(ResourceKind::Network), 1);
    assert_eq!(graph.count(ResourceKind::Instance), instances);
}
