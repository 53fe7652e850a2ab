// Copyright (c) 2025 - Cowboy AI, Inc.
//! Synthesizer configuration
//!
//! Read from environment variables with defaults:
//!
//! | Variable          | Default        | Meaning                                 |
//! |-------------------|----------------|-----------------------------------------|
//! | `MEC_PROFILES`    | all built-ins  | comma separated profile names           |
//! | `MEC_PARAMS_FILE` | unset          | JSON `StackParameters` for an extra stack |
//! | `MEC_OUT_DIR`     | `cdk.out`      | directory receiving templates           |
//! | `MEC_DRY_RUN`     | `true`         | apply each graph to the dry-run engine  |

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::{StackError, StackResult};
use crate::stack::{builtin_profiles, find_profile, StackParameters};

pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// Configuration of the `mec-synth` binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthConfig {
    /// Profiles to synthesize; empty means every built-in profile
    pub profiles: Vec<String>,
    pub params_file: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub dry_run: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            params_file: None,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            dry_run: true,
        }
    }
}

impl SynthConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> StackResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> StackResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let profiles = lookup("MEC_PROFILES")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.profiles);

        let params_file = lookup("MEC_PARAMS_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let out_dir = lookup("MEC_OUT_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.out_dir);

        let dry_run = match lookup("MEC_DRY_RUN") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| StackError::Configuration(format!("MEC_DRY_RUN: {value}")))?,
            None => defaults.dry_run,
        };

        Ok(Self {
            profiles,
            params_file,
            out_dir,
            dry_run,
        })
    }

    /// Parameter sets selected by this configuration, in synthesis order
    ///
    /// Named profiles come first, then the parameters file when one is set.
    /// Selecting the same stack name twice is a configuration error, since
    /// both would write the same template file.
    pub fn stack_parameters(&self) -> StackResult<Vec<StackParameters>> {
        let mut stacks = if self.profiles.is_empty() && self.params_file.is_none() {
            builtin_profiles()
                .into_iter()
                .map(|profile| profile.parameters)
                .collect()
        } else {
            self.profiles
                .iter()
                .map(|name| find_profile(name).map(|profile| profile.parameters))
                .collect::<StackResult<Vec<_>>>()?
        };

        if let Some(path) = &self.params_file {
            stacks.push(load_parameters(path)?);
        }

        let mut seen = HashSet::new();
        for params in &stacks {
            if !seen.insert(params.stack_name.as_str()) {
                return Err(StackError::Configuration(format!(
                    "stack {} is selected more than once",
                    params.stack_name
                )));
            }
        }

        Ok(stacks)
    }
}

/// Read a JSON [`StackParameters`] document
pub fn load_parameters(path: impl AsRef<Path>) -> StackResult<StackParameters> {
    let content = std::fs::read_to_string(path.as_ref())
        .map_err(|e| StackError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
    Ok(serde_json::from_str(&content)?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
