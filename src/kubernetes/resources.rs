// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Create-or-update and prune for any namespaced resource kind.

use crate::config::Config;
use crate::error::{ReconcileError, Result};
use crate::types::bundle::namespace_of;
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Debug;
use tracing::{debug, info, instrument};

/// Bounds shared by every kind the reconciler manages
pub trait NamespacedResource:
    Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + Clone
    + Serialize
    + DeserializeOwned
    + Debug
    + Send
    + Sync
    + 'static
{
}

impl<K> NamespacedResource for K where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Serialize
        + DeserializeOwned
        + Debug
        + Send
        + Sync
        + 'static
{
}

pub fn kind_of<K: NamespacedResource>() -> String {
    K::kind(&()).to_string()
}

/// Create the resource, or replace the live one if it already exists.
///
/// The replacement carries the live resourceVersion so a concurrent writer
/// surfaces as a conflict instead of a lost update.
#[instrument(skip(client, config, resource), fields(kind = %kind_of::<K>(), name = %resource.name_any()))]
pub async fn create_or_update<K: NamespacedResource>(
    client: &Client,
    config: &Config,
    resource: &K,
) -> Result<()> {
    let namespace = namespace_of(resource);
    let name = resource.name_any();
    let api: Api<K> = Api::namespaced(client.clone(), &namespace);

    let live = api
        .get_opt(&name)
        .await
        .map_err(|source| read_error::<K>(&namespace, &name, source))?;

    match live {
        None => {
            debug!("{} {}/{} does not exist, creating", kind_of::<K>(), namespace, name);
            api.create(&config.post_params(), resource)
                .await
                .map_err(|source| write_error::<K>("create", &name, source))?;
            info!("Created {} {}/{}", kind_of::<K>(), namespace, name);
        }
        Some(existing) => {
            let mut desired = resource.clone();
            desired.meta_mut().resource_version = existing.resource_version();
            api.replace(&name, &config.post_params(), &desired)
                .await
                .map_err(|source| write_error::<K>("update", &name, source))?;
            debug!("Updated {} {}/{}", kind_of::<K>(), namespace, name);
        }
    }

    Ok(())
}

/// Delete every live resource of kind `K` in `namespace` whose name is not in `keep`.
///
/// Stops at the first failed delete; resources already deleted stay deleted.
#[instrument(skip(client, config, keep), fields(kind = %kind_of::<K>(), keep = keep.len()))]
pub async fn prune_namespace<K: NamespacedResource>(
    client: &Client,
    config: &Config,
    namespace: &str,
    keep: &BTreeSet<String>,
) -> Result<()> {
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let live = list_in_namespace::<K>(client, config, namespace).await?;

    for name in stale_names(&live, keep) {
        info!("Deleting {} {}/{}", kind_of::<K>(), namespace, name);
        api.delete(&name, &config.delete_params())
            .await
            .map_err(|source| write_error::<K>("delete", &name, source))?;
    }

    Ok(())
}

/// Names of live resources that are absent from the keep set
fn stale_names<K: ResourceExt>(live: &[K], keep: &BTreeSet<String>) -> Vec<String> {
    live.iter()
        .map(|r| r.name_any())
        .filter(|name| !keep.contains(name))
        .collect()
}

pub async fn list_in_namespace<K: NamespacedResource>(
    client: &Client,
    config: &Config,
    namespace: &str,
) -> Result<Vec<K>> {
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let list = api
        .list(&config.list_params())
        .await
        .map_err(|source| ReconcileError::ListError {
            kind: kind_of::<K>(),
            namespace: namespace.to_string(),
            source,
        })?;
    Ok(list.items)
}

/// Read a single resource, treating absence as an error
pub async fn get_in_namespace<K: NamespacedResource>(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<K> {
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    api.get_opt(name)
        .await
        .map_err(|source| read_error::<K>(namespace, name, source))?
        .ok_or_else(|| ReconcileError::NotFound {
            kind: kind_of::<K>(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
}

fn read_error<K: NamespacedResource>(
    namespace: &str,
    name: &str,
    source: kube::Error,
) -> ReconcileError {
    ReconcileError::ReadError {
        kind: kind_of::<K>(),
        namespace: namespace.to_string(),
        name: name.to_string(),
        source,
    }
}

pub(crate) fn write_error<K: NamespacedResource>(
    operation: &'static str,
    name: &str,
    source: kube::Error,
) -> ReconcileError {
    ReconcileError::WriteError {
        operation,
        kind: kind_of::<K>(),
        name: name.to_string(),
        source,
    }
}
