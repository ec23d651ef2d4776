// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bundle reconciliation and point mutations of routing objects.

pub mod manager;
pub mod routing;

pub use manager::ClusterManager;
pub use routing::{add_routing_rule, add_subset};
