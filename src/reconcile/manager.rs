// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Single-pass reconciliation of a desired bundle against the live cluster.

use crate::config::Config;
use crate::error::Result;
use crate::kubernetes::resources::{kind_of, NamespacedResource};
use crate::kubernetes::{
    create_or_update, ensure_namespace, get_in_namespace, list_in_namespace, prune_namespace,
};
use crate::reconcile::routing;
use crate::types::bundle::{keep_sets, ClusterResources};
use crate::types::istio::{DestinationRule, HttpRoute, Subset, VirtualService};
use kube::Client;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, instrument};

/// Applies and cleans up cluster resources.
///
/// Holds no state between calls; every write is preceded by a fresh read.
/// Nothing is retried here, the first failure aborts the pass and writes
/// already made stay in place.
#[derive(Clone)]
pub struct ClusterManager {
    client: Client,
    config: Config,
}

impl ClusterManager {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    /// Ensure every touched namespace, then create or update every resource,
    /// kind by kind: services, deployments, virtual services, destination
    /// rules and finally the gateway.
    #[instrument(skip(self, resources))]
    pub async fn apply_cluster_resources(&self, resources: &ClusterResources) -> Result<()> {
        if !resources.is_valid() {
            debug!("The received cluster resources are empty, nothing to apply");
            return Ok(());
        }

        for namespace in resources.namespaces() {
            ensure_namespace(&self.client, &self.config, &namespace)
                .await
                .inspect_err(|e| error!("Aborting apply: {}", e))?;
        }

        self.apply_all(resources.services.as_deref()).await?;
        self.apply_all(resources.deployments.as_deref()).await?;
        self.apply_all(resources.virtual_services.as_deref()).await?;
        self.apply_all(resources.destination_rules.as_deref()).await?;
        if let Some(gateway) = &resources.gateway {
            self.apply_all(Some(std::slice::from_ref(gateway))).await?;
        }

        info!("Applied cluster resources");
        Ok(())
    }

    /// Delete live resources that the bundle does not mention.
    ///
    /// Only (namespace, kind) pairs that appear in the bundle are pruned; a kind
    /// with no resources in a namespace is left alone there.
    #[instrument(skip(self, resources))]
    pub async fn clean_up_cluster_resources(&self, resources: &ClusterResources) -> Result<()> {
        if !resources.is_valid() {
            debug!("The received cluster resources are empty, nothing to clean up");
            return Ok(());
        }

        self.prune_all(resources.services.as_deref()).await?;
        self.prune_all(resources.deployments.as_deref()).await?;
        self.prune_all(resources.virtual_services.as_deref()).await?;
        self.prune_all(resources.destination_rules.as_deref()).await?;
        if let Some(gateway) = &resources.gateway {
            self.prune_all(Some(std::slice::from_ref(gateway))).await?;
        }

        info!("Cleaned up cluster resources");
        Ok(())
    }

    pub async fn get_virtual_services(&self, namespace: &str) -> Result<Vec<VirtualService>> {
        list_in_namespace(&self.client, &self.config, namespace).await
    }

    pub async fn get_virtual_service(&self, namespace: &str, name: &str) -> Result<VirtualService> {
        get_in_namespace(&self.client, namespace, name).await
    }

    pub async fn get_destination_rules(&self, namespace: &str) -> Result<Vec<DestinationRule>> {
        list_in_namespace(&self.client, &self.config, namespace).await
    }

    pub async fn get_destination_rule(&self, namespace: &str, name: &str) -> Result<DestinationRule> {
        get_in_namespace(&self.client, namespace, name).await
    }

    pub async fn add_routing_rule(
        &self,
        namespace: &str,
        virtual_service: &str,
        rule: HttpRoute,
    ) -> Result<()> {
        routing::add_routing_rule(&self.client, &self.config, namespace, virtual_service, rule).await
    }

    pub async fn add_subset(
        &self,
        namespace: &str,
        destination_rule: &str,
        subset: Subset,
    ) -> Result<()> {
        routing::add_subset(&self.client, &self.config, namespace, destination_rule, subset).await
    }

    async fn apply_all<K: NamespacedResource>(&self, items: Option<&[K]>) -> Result<()> {
        for item in items.unwrap_or_default() {
            create_or_update(&self.client, &self.config, item)
                .await
                .inspect_err(|e| error!("Aborting apply: {}", e))?;
        }
        Ok(())
    }

    async fn prune_all<K: NamespacedResource>(&self, items: Option<&[K]>) -> Result<()> {
        let groups: BTreeMap<String, BTreeSet<String>> = keep_sets(items.unwrap_or_default());

        for (namespace, keep) in &groups {
            debug!(
                "Pruning {} in namespace {}, keeping {:?}",
                kind_of::<K>(),
                namespace,
                keep
            );
            prune_namespace::<K>(&self.client, &self.config, namespace, keep)
                .await
                .inspect_err(|e| error!("Aborting clean up: {}", e))?;
        }
        Ok(())
    }
}
