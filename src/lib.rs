// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod kubernetes;
pub mod reconcile;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::{ReconcileError, Result};
pub use reconcile::ClusterManager;
pub use types::ClusterResources;
