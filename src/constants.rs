// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Namespace labels managed by the reconciler
pub mod labels {
    /// Enables sidecar injection for every pod in the namespace
    pub const ISTIO_INJECTION: &str = "istio-injection";
    pub const ISTIO_INJECTION_ENABLED: &str = "enabled";
}

/// The field manager stamped on every create and update
pub const DEFAULT_FIELD_MANAGER: &str = "mesh-reconciler";

/// Namespace used for resources that do not declare one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Request option defaults
pub mod requests {
    /// Server-side timeout for list calls, in seconds
    pub const LIST_TIMEOUT_SECS: u32 = 10;
    /// Grace period applied to every delete, in seconds
    pub const DELETE_GRACE_PERIOD_SECS: u32 = 0;
}
