// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::K8sError;
use crate::types::{Deployment, PatchOptions, PersistentVolumeClaim, Pod};

/// Trait for K8s client operations.
///
/// This abstraction is the only way the provisioner talks to a cluster, which
/// lets tests script responses and record call order without a live API
/// server.
#[async_trait]
pub trait ClusterClient: Send + Sync {
	/// Create a persistent volume claim in the specified namespace.
	///
	/// Fails with `AlreadyExists`, `Invalid` or `Forbidden`.
	async fn create_volume_claim(
		&self,
		namespace: &str,
		claim: PersistentVolumeClaim,
	) -> Result<PersistentVolumeClaim, K8sError>;

	/// Create a deployment in the specified namespace.
	///
	/// Fails with `AlreadyExists`, `Invalid` or `Forbidden`.
	async fn create_deployment(
		&self,
		namespace: &str,
		deployment: Deployment,
	) -> Result<Deployment, K8sError>;

	/// List pods in a namespace matching the given label selector.
	///
	/// An empty selector matches every pod in the namespace.
	async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, K8sError>;

	/// Apply a strategic merge patch to an existing deployment.
	///
	/// List entries with merge keys (containers by name) merge rather than
	/// replace.
	///
	/// Fails with `NotFound`, `Conflict` or `Invalid`.
	async fn patch_deployment(
		&self,
		namespace: &str,
		name: &str,
		options: &PatchOptions,
		patch: serde_json::Value,
	) -> Result<Deployment, K8sError>;
}
