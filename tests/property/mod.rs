// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod cidr_properties;
mod graph_properties;
