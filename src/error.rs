// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to ensure namespace {namespace}: {source}")]
    NamespaceError {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to {operation} {kind} '{name}': {source}")]
    WriteError {
        operation: &'static str,
        kind: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to read {kind} '{name}' in namespace {namespace}: {source}")]
    ReadError {
        kind: String,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to list {kind} in namespace {namespace}: {source}")]
    ListError {
        kind: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("{kind} '{name}' not found in namespace {namespace}")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("Invalid cluster resources bundle: {0}")]
    BundleError(String),
}

impl ReconcileError {
    /// HTTP status code of the underlying API failure, if any
    pub fn api_code(&self) -> Option<u16> {
        let source = match self {
            Self::KubeError(e) => e,
            Self::NamespaceError { source, .. }
            | Self::WriteError { source, .. }
            | Self::ReadError { source, .. }
            | Self::ListError { source, .. } => source,
            Self::NotFound { .. } => return Some(404),
            Self::BundleError(_) => return None,
        };
        match source {
            kube::Error::Api(err) => Some(err.code),
            _ => None,
        }
    }

    /// A write was rejected because it carried a stale resourceVersion.
    /// Retrying the whole call is safe.
    pub fn is_conflict(&self) -> bool {
        self.api_code() == Some(409)
    }

    pub fn is_not_found(&self) -> bool {
        self.api_code() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
