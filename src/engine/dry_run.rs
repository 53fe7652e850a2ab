// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory dry-run engine
//!
//! Walks a graph in creation order exactly as a real engine would, assigning
//! synthetic provider identifiers (`vpc-00000000000000001`) instead of calling
//! a cloud API. Useful for previewing outputs and for tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, instrument};

use super::{DeployedState, EngineError, ProvisioningEngine};
use crate::domain::invariants::validate_graph;
use crate::domain::ResourceKind;
use crate::graph::{AnyRef, ResourceGraph};

/// Dry-run engine - records deployments without side effects
#[derive(Debug, Clone, Default)]
pub struct DryRunEngine {
    next_serial: u64,
    stacks: HashMap<String, DeployedState>,
}

impl DryRunEngine {
    /// Create a new dry-run engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of an applied stack
    pub fn deployment(&self, stack_name: &str) -> Option<&DeployedState> {
        self.stacks.get(stack_name)
    }

    /// Names of every applied stack, sorted
    pub fn stack_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stacks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn allocate(&mut self, kind: ResourceKind) -> String {
        self.next_serial += 1;
        format!("{}-{:017x}", kind.id_prefix(), self.next_serial)
    }
}

#[async_trait]
impl ProvisioningEngine for DryRunEngine {
    type Error = EngineError;

    #[instrument(skip(self, graph), fields(stack = %graph.stack_name()))]
    async fn apply(&mut self, graph: &ResourceGraph) -> Result<DeployedState, Self::Error> {
        validate_graph(graph)?;

        let previous = self.stacks.get(graph.stack_name()).cloned();
        let mut created: HashSet<AnyRef> = HashSet::new();
        let mut physical_ids = BTreeMap::new();
        let mut kept = 0usize;

        for &r in graph.creation_order() {
            let logical_id = graph.logical_id(r).unwrap_or_default().to_string();

            for dependency in graph.references(r) {
                if !created.contains(&dependency) {
                    return Err(EngineError::OrderViolation {
                        resource: logical_id,
                        dependency: graph.logical_id(dependency).unwrap_or_default().to_string(),
                    });
                }
            }

            let existing = previous
                .as_ref()
                .and_then(|state| state.physical_ids.get(&logical_id))
                .cloned();
            let physical_id = match (existing, graph.kind_of(r)) {
                (Some(id), _) => {
                    kept += 1;
                    id
                }
                (None, Some(kind)) => self.allocate(kind),
                (None, None) => {
                    return Err(EngineError::Rejected(format!(
                        "{}: unresolvable resource {}",
                        graph.stack_name(),
                        logical_id
                    )))
                }
            };

            debug!("{} -> {}", logical_id, physical_id);
            physical_ids.insert(logical_id, physical_id);
            created.insert(r);
        }

        let outputs = graph
            .outputs()
            .iter()
            .filter_map(|output| {
                let logical_id = graph.logical_id(output.value)?;
                let id = physical_ids.get(logical_id)?;
                Some((output.name.clone(), id.clone()))
            })
            .collect();

        let removed = previous
            .as_ref()
            .map(|state| {
                state
                    .physical_ids
                    .keys()
                    .filter(|id| !physical_ids.contains_key(*id))
                    .count()
            })
            .unwrap_or(0);

        let state = DeployedState {
            stack_name: graph.stack_name().to_string(),
            region: graph.region().to_string(),
            physical_ids,
            outputs,
            revision: previous.map(|state| state.revision + 1).unwrap_or(1),
            applied_at: Utc::now(),
        };

        info!(
            revision = state.revision,
            created = state.physical_ids.len() - kept,
            kept,
            removed,
            "Applied stack"
        );

        self.stacks
            .insert(state.stack_name.clone(), state.clone());
        Ok(state)
    }

    #[instrument(skip(self))]
    async fn destroy(&mut self, stack_name: &str) -> Result<(), Self::Error> {
        match self.stacks.remove(stack_name) {
            Some(state) => {
                info!(resources = state.physical_ids.len(), "Destroyed stack");
                Ok(())
            }
            None => Err(EngineError::UnknownStack(stack_name.to_string())),
        }
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
