// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mesh_reconciler::config::{Action, Config, Invocation};
use mesh_reconciler::{ClusterManager, ClusterResources};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let invocation = Invocation::from_env()?;
    info!(
        "Configuration loaded: field_manager={}, action={:?}",
        config.field_manager, invocation.action
    );

    let document = tokio::fs::read_to_string(&invocation.bundle_path)
        .await
        .with_context(|| format!("Failed to read bundle {}", invocation.bundle_path.display()))?;
    let resources = ClusterResources::from_yaml(&document)?;

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let manager = ClusterManager::new(client, config);
    match invocation.action {
        Action::Apply => manager
            .apply_cluster_resources(&resources)
            .await
            .context("Failed to apply cluster resources")?,
        Action::CleanUp => manager
            .clean_up_cluster_resources(&resources)
            .await
            .context("Failed to clean up cluster resources")?,
    }

    info!("Reconciliation pass finished");
    Ok(())
}
