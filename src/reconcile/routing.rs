// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Point mutations of a single VirtualService or DestinationRule.
//!
//! These write back the object exactly as read, so the resourceVersion is the
//! one observed at read time. Callers must not run them concurrently with a
//! full apply touching the same object.

use crate::config::Config;
use crate::error::Result;
use crate::kubernetes::get_in_namespace;
use crate::kubernetes::resources::write_error;
use crate::types::istio::{DestinationRule, HttpRoute, Subset, VirtualService};
use kube::{Api, Client};
use tracing::{info, instrument};

/// Insert `rule` at the head of the VirtualService's HTTP rules
#[instrument(skip(client, config, rule), fields(rule = ?rule.name))]
pub async fn add_routing_rule(
    client: &Client,
    config: &Config,
    namespace: &str,
    virtual_service: &str,
    rule: HttpRoute,
) -> Result<()> {
    let mut vs: VirtualService = get_in_namespace(client, namespace, virtual_service).await?;
    vs.prepend_http_route(rule);

    let api: Api<VirtualService> = Api::namespaced(client.clone(), namespace);
    api.replace(virtual_service, &config.post_params(), &vs)
        .await
        .map_err(|source| write_error::<VirtualService>("update", virtual_service, source))?;

    info!(
        "Added routing rule to virtual service {}/{} ({} rules)",
        namespace,
        virtual_service,
        vs.spec.http.len()
    );
    Ok(())
}

/// Replace the same-named subset of the DestinationRule in place, or append it
#[instrument(skip(client, config, subset), fields(subset = %subset.name))]
pub async fn add_subset(
    client: &Client,
    config: &Config,
    namespace: &str,
    destination_rule: &str,
    subset: Subset,
) -> Result<()> {
    let mut dr: DestinationRule = get_in_namespace(client, namespace, destination_rule).await?;
    dr.upsert_subset(subset);

    let api: Api<DestinationRule> = Api::namespaced(client.clone(), namespace);
    api.replace(destination_rule, &config.post_params(), &dr)
        .await
        .map_err(|source| write_error::<DestinationRule>("update", destination_rule, source))?;

    info!(
        "Updated subsets of destination rule {}/{}",
        namespace, destination_rule
    );
    Ok(())
}
