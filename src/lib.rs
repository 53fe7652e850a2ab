//! Declarative network stacks for Mobile Edge Computing
//!
//! This crate builds a typed resource graph (network, gateways, subnets,
//! route tables, security groups, instances) from a parameter set, checks the
//! topology invariants, and synthesizes it into a deployment template. Actual
//! provisioning sits behind the [`engine::ProvisioningEngine`] trait.

pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod stack;
pub mod template;

// Re-export commonly used types
pub use config::SynthConfig;
pub use engine::{DeployedState, DryRunEngine, ProvisioningEngine};
pub use errors::{StackError, StackResult};
pub use graph::{ResourceGraph, ResourceRef};
pub use stack::{build, NetworkStackBuilder, StackParameters};
pub use template::{synthesize, Template};
