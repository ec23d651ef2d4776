// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities: namespace management and generic resource reconciliation.

pub mod namespaces;
pub mod resources;

pub use namespaces::ensure_namespace;
pub use resources::{create_or_update, get_in_namespace, list_in_namespace, prune_namespace};
