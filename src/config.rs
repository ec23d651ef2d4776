// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{requests, DEFAULT_FIELD_MANAGER};
use anyhow::{bail, Context, Result};
use kube::api::{DeleteParams, ListParams, PostParams};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Request options shared by every call the reconciler makes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Field manager recorded as the owner of created and updated fields
    pub field_manager: String,
    pub list_timeout_secs: u32,
    pub delete_grace_period_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            list_timeout_secs: requests::LIST_TIMEOUT_SECS,
            delete_grace_period_secs: requests::DELETE_GRACE_PERIOD_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let field_manager = lookup("FIELD_MANAGER")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.field_manager);
        let list_timeout_secs = parse_or("LIST_TIMEOUT_SECONDS", &lookup, defaults.list_timeout_secs)?;
        let delete_grace_period_secs = parse_or(
            "DELETE_GRACE_PERIOD_SECONDS",
            &lookup,
            defaults.delete_grace_period_secs,
        )?;

        Ok(Config {
            field_manager,
            list_timeout_secs,
            delete_grace_period_secs,
        })
    }

    pub fn post_params(&self) -> PostParams {
        PostParams {
            dry_run: false,
            field_manager: Some(self.field_manager.clone()),
        }
    }

    pub fn list_params(&self) -> ListParams {
        ListParams::default().timeout(self.list_timeout_secs)
    }

    /// Foreground cascading delete: dependents are removed before the owner is gone
    pub fn delete_params(&self) -> DeleteParams {
        DeleteParams::foreground().grace_period(self.delete_grace_period_secs)
    }
}

fn parse_or(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: u32) -> Result<u32> {
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got '{}'", key, raw)),
        None => Ok(default),
    }
}

/// What the binary should do with the bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Apply,
    CleanUp,
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "apply" => Ok(Action::Apply),
            "cleanup" | "clean-up" => Ok(Action::CleanUp),
            other => bail!("unknown reconcile action '{}', expected apply or cleanup", other),
        }
    }
}

/// Settings for a single run of the binary
#[derive(Debug, Clone)]
pub struct Invocation {
    pub bundle_path: PathBuf,
    pub action: Action,
}

impl Invocation {
    pub fn from_env() -> Result<Self> {
        let bundle_path = env::var("BUNDLE_PATH")
            .context("BUNDLE_PATH environment variable not set")?
            .into();
        let action = env::var("RECONCILE_ACTION")
            .unwrap_or("apply".to_string())
            .parse()?;

        Ok(Invocation {
            bundle_path,
            action,
        })
    }
}
