// Copyright (c) 2025 - Cowboy AI, Inc.

//! Provisioning Engine - the seam between declared and deployed resources
//!
//! A [`ProvisioningEngine`] consumes a finished [`ResourceGraph`] and turns it
//! into real resources, returning the provider identifiers it assigned as a
//! [`DeployedState`]. Stack builders never depend on a concrete engine.
//!
//! # Architecture
//!
//! ```text
//! StackParameters ──build──> ResourceGraph ──apply──> DeployedState
//!                               (pure)         (engine: validation,
//!                                               ordering, provider calls)
//! ```
//!
//! # Example Implementation
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use mec_infrastructure::engine::{DeployedState, EngineError, ProvisioningEngine};
//! use mec_infrastructure::graph::ResourceGraph;
//!
//! struct RejectEverything;
//!
//! #[async_trait]
//! impl ProvisioningEngine for RejectEverything {
//!     type Error = EngineError;
//!
//!     async fn apply(&mut self, graph: &ResourceGraph) -> Result<DeployedState, Self::Error> {
//!         Err(EngineError::Rejected(graph.stack_name().to_string()))
//!     }
//!
//!     async fn destroy(&mut self, stack_name: &str) -> Result<(), Self::Error> {
//!         Err(EngineError::UnknownStack(stack_name.to_string()))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "reject"
//!     }
//! }
//! ```

pub mod dry_run;

pub use dry_run::DryRunEngine;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::ValidationError;
use crate::errors::StackError;
use crate::graph::ResourceGraph;

/// Provisioning engine trait
///
/// Implementations must:
/// - Create a resource only after everything it references
/// - Keep identifiers stable when the same stack is applied again
/// - Surface every stack output as a concrete identifier
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Error type for engine operations
    type Error: std::error::Error + Send + Sync;

    /// Create or update the stack described by `graph`
    async fn apply(&mut self, graph: &ResourceGraph) -> Result<DeployedState, Self::Error>;

    /// Tear down a previously applied stack
    async fn destroy(&mut self, stack_name: &str) -> Result<(), Self::Error>;

    /// Get the name of this engine
    fn name(&self) -> &str;
}

/// Errors raised by engines shipped with this crate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The graph violates a topology invariant
    #[error("Graph failed validation: {0}")]
    InvalidGraph(#[from] ValidationError),

    /// A resource was scheduled before one of its dependencies
    #[error("{resource} scheduled before its dependency {dependency}")]
    OrderViolation { resource: String, dependency: String },

    /// No stack with this name has been applied
    #[error("Stack {0} is not deployed")]
    UnknownStack(String),

    /// The engine refused the stack
    #[error("Stack {0} was rejected")]
    Rejected(String),
}

impl From<EngineError> for StackError {
    fn from(err: EngineError) -> Self {
        StackError::Engine(err.to_string())
    }
}

/// What an engine reports after a successful apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedState {
    pub stack_name: String,
    pub region: String,
    /// Logical id → provider identifier
    pub physical_ids: BTreeMap<String, String>,
    /// Output name → provider identifier
    pub outputs: BTreeMap<String, String>,
    /// Incremented on every apply of the same stack
    pub revision: u64,
    pub applied_at: DateTime<Utc>,
}

impl DeployedState {
    pub fn physical_id(&self, logical_id: &str) -> Option<&str> {
        self.physical_ids.get(logical_id).map(String::as_str)
    }

    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(String::as_str)
    }
}
