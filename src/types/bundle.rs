// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The desired-state bundle handed to the reconciler on every call.

use crate::constants::DEFAULT_NAMESPACE;
use crate::error::{ReconcileError, Result};
use crate::types::istio::{DestinationRule, Gateway, VirtualService};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Desired resources grouped by kind.
///
/// A `None` collection means the kind is not managed by this call, which is
/// different from `Some(vec![])`: cleanup only prunes kinds that are present.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<Service>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployments: Option<Vec<Deployment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_services: Option<Vec<VirtualService>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_rules: Option<Vec<DestinationRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Gateway>,
}

impl ClusterResources {
    pub fn from_yaml(document: &str) -> Result<Self> {
        serde_yaml::from_str(document).map_err(|e| ReconcileError::BundleError(e.to_string()))
    }

    pub fn from_json(document: &str) -> Result<Self> {
        serde_json::from_str(document).map_err(|e| ReconcileError::BundleError(e.to_string()))
    }

    /// A bundle with no collection at all carries nothing to reconcile
    pub fn is_valid(&self) -> bool {
        self.services.is_some()
            || self.deployments.is_some()
            || self.virtual_services.is_some()
            || self.destination_rules.is_some()
            || self.gateway.is_some()
    }

    /// Every namespace touched by the bundle, deduplicated, in first-seen order
    pub fn namespaces(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut namespaces = Vec::new();

        let all = namespaces_of(self.services.as_deref())
            .chain(namespaces_of(self.deployments.as_deref()))
            .chain(namespaces_of(self.virtual_services.as_deref()))
            .chain(namespaces_of(self.destination_rules.as_deref()))
            .chain(self.gateway.iter().map(namespace_of));

        for namespace in all {
            if seen.insert(namespace.clone()) {
                namespaces.push(namespace);
            }
        }
        namespaces
    }
}

/// Namespace a resource will be reconciled in
pub fn namespace_of<K: ResourceExt>(resource: &K) -> String {
    resource
        .namespace()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

fn namespaces_of<K: ResourceExt>(items: Option<&[K]>) -> impl Iterator<Item = String> + '_ {
    items.unwrap_or_default().iter().map(namespace_of)
}

/// Names to keep per namespace, for pruning
pub fn keep_sets<K: ResourceExt>(items: &[K]) -> BTreeMap<String, BTreeSet<String>> {
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for item in items {
        groups
            .entry(namespace_of(item))
            .or_default()
            .insert(item.name_any());
    }
    groups
}
