// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Built Stacks
//!
//! Random zone layouts inside `10.0.0.0/16`, each subnet a distinct `/20`.

use mec_infrastructure::domain::{
    AddressKind, ResourceKind, ZoneKind, HTTP_PORT, SSH_PORT, TUNNEL_PORT,
};
use mec_infrastructure::engine::{DryRunEngine, ProvisioningEngine};
use mec_infrastructure::graph::{GatewayKind, SubnetResource};
use mec_infrastructure::stack::{build, InstanceRole, InstanceSpec, StackParameters, ZoneSpec};
use mec_infrastructure::template::synthesize;
use proptest::prelude::*;

const ROLES: [InstanceRole; 3] = [
    InstanceRole::Bastion,
    InstanceRole::WebServer,
    InstanceRole::EdgeWorkload,
];

/// (is_edge, instance count) per zone
fn layout() -> impl Strategy<Value = Vec<(bool, usize)>> {
    prop::collection::vec((any::<bool>(), 0usize..3), 1..6)
}

fn params_for(layout: &[(bool, usize)]) -> StackParameters {
    let mut params = StackParameters::new("PropStack", "prop", "us-east-1", "k", "10.0.0.0/16");
    for (z, &(is_edge, instances)) in layout.iter().enumerate() {
        let (zone, kind) = if is_edge {
            (format!("us-east-1-wl1-z{z}-wlz-1"), ZoneKind::Edge)
        } else {
            (format!("us-east-1{}", char::from(b'a' + z as u8)), ZoneKind::Core)
        };
        let mut spec = ZoneSpec::new(zone, kind, format!("10.0.{}.0/20", z * 16));
        for i in 0..instances {
            spec = spec.with_instance(InstanceSpec::new(
                format!("z{z}-i{i}"),
                ROLES[(z + i) % ROLES.len()],
                "ami-x",
                "t2.micro",
            ));
        }
        params = params.with_zone(spec);
    }
    params
}

proptest! {
    #[test]
    fn prop_counts_match_parameters(layout in layout()) {
        let params = params_for(&layout);
        let graph = build(&params).unwrap();

        let edges = layout.iter().filter(|(is_edge, _)| *is_edge).count();
        let cores = layout.len() - edges;

        prop_assert_eq!(graph.count(ResourceKind::Network), 1);
        prop_assert_eq!(graph.count(ResourceKind::Subnet), layout.len());
        prop_assert_eq!(graph.count(ResourceKind::RouteTable), layout.len());
        prop_assert_eq!(graph.count(ResourceKind::InternetGateway), usize::from(cores > 0));
        prop_assert_eq!(graph.count(ResourceKind::CarrierGateway), usize::from(edges > 0));
        prop_assert_eq!(graph.count(ResourceKind::Instance), params.instance_count());
        prop_assert_eq!(graph.count(ResourceKind::SecurityGroup), params.instance_count());
    }

    #[test]
    fn prop_subnets_are_strict_subranges(layout in layout()) {
        let graph = build(&params_for(&layout)).unwrap();
        let network = &graph.networks()[0];

        for subnet in graph.subnets() {
            prop_assert!(subnet.cidr.is_strict_subnet_of(&network.cidr));
        }
    }

    #[test]
    fn prop_default_routes_match_zone_kind(layout in layout()) {
        let graph = build(&params_for(&layout)).unwrap();

        for (subnet_ref, subnet) in graph.iter::<SubnetResource>() {
            let table = graph.route_table_for(subnet_ref).unwrap();
            let route = table.default_route().unwrap();
            let gateway = graph.get(route.gateway).unwrap();

            prop_assert_eq!(gateway.network, subnet.network);
            prop_assert_eq!(gateway.kind, GatewayKind::for_zone(subnet.zone_kind));
        }
    }

    #[test]
    fn prop_ingress_baseline_holds(layout in layout()) {
        let graph = build(&params_for(&layout)).unwrap();

        for group in graph.security_groups() {
            prop_assert!(group.opens_port(SSH_PORT));
        }
        for instance in graph.instances() {
            let subnet = graph.get(instance.subnet).unwrap();
            prop_assert_eq!(instance.zone.as_str(), subnet.zone.as_str());
            prop_assert_eq!(instance.address, subnet.zone_kind.address_kind());

            if subnet.zone_kind == ZoneKind::Edge {
                prop_assert_eq!(instance.address, AddressKind::Carrier);
                for &group in &instance.security_groups {
                    let group = graph.get(group).unwrap();
                    prop_assert!(group.opens_port(HTTP_PORT));
                    prop_assert!(group.opens_port(TUNNEL_PORT));
                }
            }
        }
    }

    #[test]
    fn prop_build_is_idempotent(layout in layout()) {
        let params = params_for(&layout);
        let first = build(&params).unwrap();
        let second = build(&params).unwrap();

        prop_assert_eq!(first.shape(), second.shape());
        prop_assert_eq!(
            synthesize(&first).unwrap().to_json_pretty().unwrap(),
            synthesize(&second).unwrap().to_json_pretty().unwrap()
        );
    }

    #[test]
    fn prop_dry_run_resolves_every_output(layout in layout()) {
        let graph = build(&params_for(&layout)).unwrap();
        let mut engine = DryRunEngine::new();
        let state = tokio_test::block_on(engine.apply(&graph)).unwrap();

        prop_assert_eq!(state.physical_ids.len(), graph.len());
        prop_assert_eq!(state.outputs.len(), graph.outputs().len());
    }
}
