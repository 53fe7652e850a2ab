// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for CIDR Arithmetic

use mec_infrastructure::domain::Ipv4Cidr;
use proptest::prelude::*;
use std::net::Ipv4Addr;

/// Any well-formed block: a random address masked to a random prefix
fn any_cidr() -> impl Strategy<Value = Ipv4Cidr> {
    (any::<u32>(), 0u8..=32).prop_map(|(raw, prefix)| {
        let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - u32::from(prefix)) };
        Ipv4Cidr::new(Ipv4Addr::from(raw & mask), prefix).unwrap()
    })
}

proptest! {
    #[test]
    fn prop_display_parses_back(cidr in any_cidr()) {
        let parsed: Ipv4Cidr = cidr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, cidr);
    }

    #[test]
    fn prop_contains_is_reflexive_but_not_strict(cidr in any_cidr()) {
        prop_assert!(cidr.contains(&cidr));
        prop_assert!(!cidr.is_strict_subnet_of(&cidr));
        prop_assert!(cidr.overlaps(&cidr));
    }

    #[test]
    fn prop_overlap_is_symmetric(a in any_cidr(), b in any_cidr()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn prop_blocks_either_nest_or_are_disjoint(a in any_cidr(), b in any_cidr()) {
        if a.overlaps(&b) {
            prop_assert!(a.contains(&b) || b.contains(&a));
        }
    }

    #[test]
    fn prop_longer_prefix_inside_is_strict_subnet(cidr in any_cidr(), extra in 1u8..=8) {
        prop_assume!(cidr.prefix_len() + extra <= 32);
        let child = Ipv4Cidr::new(cidr.network(), cidr.prefix_len() + extra).unwrap();
        prop_assert!(child.is_strict_subnet_of(&cidr));
        prop_assert!(!cidr.is_strict_subnet_of(&child));
    }

    #[test]
    fn prop_host_bits_rejected(raw in any::<u32>(), prefix in 0u8..32) {
        let host_mask = u32::MAX >> prefix;
        prop_assume!(raw & host_mask != 0);
        prop_assert!(Ipv4Cidr::new(Ipv4Addr::from(raw), prefix).is_err());
    }
}
