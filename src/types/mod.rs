// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types and the desired-state bundle.

pub mod bundle;
pub mod istio;

pub use bundle::ClusterResources;
