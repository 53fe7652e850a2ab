// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Synthesis Tests
//!
//! Checks the CloudFormation document produced from built graphs.

mod fixtures;

use fixtures::*;
use mec_infrastructure::stack::{build, find_profile};
use mec_infrastructure::template::{synthesize, FORMAT_VERSION};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_single_core_template_resources() {
    let template = synthesize(&build(&single_core_params()).unwrap()).unwrap();

    assert_eq!(template.format_version, FORMAT_VERSION);
    assert_eq!(template.resources_of_type("AWS::EC2::VPC"), vec!["CoreVpc"]);
    assert_eq!(template.resources_of_type("AWS::EC2::InternetGateway"), vec!["CoreIgw"]);
    assert_eq!(
        template.resources_of_type("AWS::EC2::VPCGatewayAttachment"),
        vec!["CoreIgwAttachment"]
    );
    assert!(template.resources_of_type("AWS::EC2::CarrierGateway").is_empty());
    assert_eq!(
        template.resources_of_type("AWS::EC2::SubnetRouteTableAssociation"),
        vec!["CorePublicAzSubnetRtbAssociation"]
    );

    let vpc = template.resource("CoreVpc").unwrap();
    assert_eq!(vpc.properties["CidrBlock"], NETWORK_CIDR);

    let subnet = template.resource("CorePublicAzSubnet").unwrap();
    assert_eq!(subnet.properties["VpcId"], json!({ "Ref": "CoreVpc" }));
    assert_eq!(subnet.properties["AvailabilityZone"], CORE_ZONE);
    assert_eq!(subnet.properties["CidrBlock"], CORE_SUBNET_CIDR);
    assert_eq!(subnet.properties["MapPublicIpOnLaunch"], true);
}

#[test]
fn test_internet_route_waits_for_attachment() {
    let template = synthesize(&build(&single_core_params()).unwrap()).unwrap();
    let route = template.resource("CorePublicAzSubnetRtbRoute").unwrap();

    assert_eq!(route.resource_type, "AWS::EC2::Route");
    assert_eq!(route.depends_on, vec!["CoreIgwAttachment".to_string()]);
    assert_eq!(
        route.properties,
        json!({
            "RouteTableId": { "Ref": "CorePublicAzSubnetRtb" },
            "DestinationCidrBlock": "0.0.0.0/0",
            "GatewayId": { "Ref": "CoreIgw" },
        })
    );
}

#[test]
fn test_edge_route_targets_carrier_gateway() {
    let template = synthesize(&build(&core_and_edge_params()).unwrap()).unwrap();
    let route = template.resource("CorePublicWlzSubnetRtbRoute").unwrap();

    assert!(route.depends_on.is_empty());
    assert_eq!(route.properties["CarrierGatewayId"], json!({ "Ref": "CoreCgw" }));
    assert!(route.properties.get("GatewayId").is_none());
}

#[test]
fn test_security_group_ingress_and_egress() {
    let template = synthesize(&build(&single_core_params()).unwrap()).unwrap();
    let group = template.resource("CoreBastionSg").unwrap();

    assert_eq!(
        group.properties["SecurityGroupIngress"],
        json!([{ "IpProtocol": "tcp", "FromPort": 22, "ToPort": 22, "CidrIp": "0.0.0.0/0" }])
    );
    assert_eq!(group.properties["SecurityGroupEgress"][0]["IpProtocol"], "-1");
    assert_eq!(group.properties["VpcId"], json!({ "Ref": "CoreVpc" }));
}

#[test]
fn test_instance_network_interfaces() {
    let template = synthesize(&build(&core_and_edge_params()).unwrap()).unwrap();

    let bastion = template.resource("CoreBastion").unwrap();
    let interface = &bastion.properties["NetworkInterfaces"][0];
    assert_eq!(interface["AssociatePublicIpAddress"], true);
    assert!(interface.get("AssociateCarrierIpAddress").is_none());
    assert_eq!(interface["DeviceIndex"], "0");
    assert_eq!(interface["SubnetId"], json!({ "Ref": "CorePublicAzSubnet" }));
    assert_eq!(
        interface["GroupSet"],
        json!([{ "Fn::GetAtt": ["CoreBastionSg", "GroupId"] }])
    );
    assert_eq!(bastion.properties["KeyName"], KEY_NAME);

    let edge = template.resource("CoreEdge1").unwrap();
    let interface = &edge.properties["NetworkInterfaces"][0];
    assert_eq!(interface["AssociateCarrierIpAddress"], true);
    assert!(interface.get("AssociatePublicIpAddress").is_none());
    assert_eq!(edge.properties["InstanceType"], "g4dn.2xlarge");
    assert_eq!(edge.properties["AvailabilityZone"], EDGE_ZONE);
}

#[test]
fn test_outputs_reference_resources() {
    let template = synthesize(&build(&single_core_params()).unwrap()).unwrap();
    let value = template.to_value().unwrap();

    assert_eq!(value["Outputs"]["vpcId"]["Value"], json!({ "Ref": "CoreVpc" }));
    assert_eq!(
        value["Outputs"]["bastionSgId"]["Value"],
        json!({ "Fn::GetAtt": ["CoreBastionSg", "GroupId"] })
    );
    assert_eq!(
        value["Outputs"]["bastionInstanceId"]["Value"],
        json!({ "Ref": "CoreBastion" })
    );
}

#[test]
fn test_synthesis_is_deterministic() {
    let params = find_profile("MecStackCDG").unwrap().parameters;
    let first = synthesize(&build(&params).unwrap()).unwrap();
    let second = synthesize(&build(&params).unwrap()).unwrap();

    assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    assert_eq!(first.file_name(), "MecStackCDG.template.json");
}

#[test]
fn test_mec_template_counts() {
    let template = synthesize(&build(&find_profile("MecStackDFW").unwrap().parameters).unwrap()).unwrap();

    assert_eq!(template.resources_of_type("AWS::EC2::Instance").len(), 3);
    assert_eq!(template.resources_of_type("AWS::EC2::SecurityGroup").len(), 3);
    assert_eq!(template.resources_of_type("AWS::EC2::Subnet").len(), 2);
    assert_eq!(template.resources_of_type("AWS::EC2::Route").len(), 2);
    assert_eq!(template.resources_of_type("AWS::EC2::CarrierGateway"), vec!["MecCgw"]);
    assert_eq!(template.outputs.len(), 9);
}
