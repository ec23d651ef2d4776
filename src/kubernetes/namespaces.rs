// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::config::Config;
use crate::constants::labels::{ISTIO_INJECTION, ISTIO_INJECTION_ENABLED};
use crate::error::{ReconcileError, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::ObjectMeta, Api, Client};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Ensure a namespace exists and has sidecar injection enabled.
///
/// An existing namespace is relabelled in place; it is never recreated.
#[instrument(skip(client, config))]
pub async fn ensure_namespace(client: &Client, config: &Config, namespace: &str) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let existing = namespaces
        .get_opt(namespace)
        .await
        .map_err(|source| ReconcileError::NamespaceError {
            namespace: namespace.to_string(),
            source,
        })?;

    match existing {
        Some(mut ns) => {
            if has_injection_enabled(&ns) {
                debug!("Namespace {} already exists with injection enabled", namespace);
                return Ok(());
            }

            info!("Enabling sidecar injection on namespace {}", namespace);
            ns.metadata
                .labels
                .get_or_insert_with(BTreeMap::new)
                .insert(ISTIO_INJECTION.to_string(), ISTIO_INJECTION_ENABLED.to_string());

            if let Err(source) = namespaces.replace(namespace, &config.post_params(), &ns).await {
                warn!("Failed to label namespace {}: {}", namespace, source);
                return Err(ReconcileError::NamespaceError {
                    namespace: namespace.to_string(),
                    source,
                });
            }
            Ok(())
        }
        None => {
            info!("Creating namespace {}", namespace);
            let ns = Namespace {
                metadata: ObjectMeta {
                    name: Some(namespace.to_string()),
                    labels: Some(BTreeMap::from([(
                        ISTIO_INJECTION.to_string(),
                        ISTIO_INJECTION_ENABLED.to_string(),
                    )])),
                    ..Default::default()
                },
                ..Default::default()
            };
            namespaces
                .create(&config.post_params(), &ns)
                .await
                .map_err(|source| ReconcileError::NamespaceError {
                    namespace: namespace.to_string(),
                    source,
                })?;
            info!("Namespace {} created successfully", namespace);
            Ok(())
        }
    }
}

fn has_injection_enabled(ns: &Namespace) -> bool {
    ns.metadata
        .labels
        .as_ref()
        .and_then(|l| l.get(ISTIO_INJECTION))
        .is_some_and(|v| v == ISTIO_INJECTION_ENABLED)
}
