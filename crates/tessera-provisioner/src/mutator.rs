// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-place updates of an existing workload.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tessera_k8s::{ClusterClient, Deployment, K8sError, PatchOptions};

use crate::error::ProvisionerError;
use crate::spec::ImageRef;

/// Pod template annotation whose change triggers a rolling restart.
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

/// A new image for one named container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImage {
	pub container: String,
	pub image: ImageRef,
}

/// What to change on a workload. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadUpdate {
	pub replicas: Option<u32>,
	pub image: Option<ContainerImage>,
	/// Merged into the workload's own annotations. Does not roll pods.
	pub annotations: BTreeMap<String, String>,
	/// Stamp the pod template so every pod is replaced
	pub restart: bool,
}

impl WorkloadUpdate {
	pub fn is_empty(&self) -> bool {
		self.replicas.is_none() && self.image.is_none() && self.annotations.is_empty() && !self.restart
	}

	/// Render the strategic merge patch body.
	pub fn to_patch(&self, now: DateTime<Utc>) -> Value {
		let mut patch = Map::new();
		if !self.annotations.is_empty() {
			patch.insert("metadata".to_string(), json!({ "annotations": self.annotations }));
		}

		let mut spec = Map::new();
		if let Some(replicas) = self.replicas {
			spec.insert("replicas".to_string(), json!(replicas));
		}

		let mut template = Map::new();
		if self.restart {
			template.insert(
				"metadata".to_string(),
				json!({
					"annotations": {
						RESTARTED_AT_ANNOTATION: now.to_rfc3339_opts(SecondsFormat::Secs, true),
					}
				}),
			);
		}
		if let Some(image) = &self.image {
			template.insert(
				"spec".to_string(),
				json!({
					"containers": [{
						"name": image.container,
						"image": image.image.to_string(),
					}]
				}),
			);
		}
		if !template.is_empty() {
			spec.insert("template".to_string(), Value::Object(template));
		}
		if !spec.is_empty() {
			patch.insert("spec".to_string(), Value::Object(spec));
		}

		Value::Object(patch)
	}
}

pub struct WorkloadMutator {
	client: Arc<dyn ClusterClient>,
}

impl WorkloadMutator {
	pub fn new(client: Arc<dyn ClusterClient>) -> Self {
		Self { client }
	}

	/// Patch the named workload.
	///
	/// There is no existence pre-check; a missing workload surfaces as
	/// [`ProvisionerError::NotFound`]. An empty update, or one whose replica
	/// count overflows `int32`, never reaches the cluster.
	pub async fn update(
		&self,
		namespace: &str,
		workload_name: &str,
		options: &PatchOptions,
		update: &WorkloadUpdate,
	) -> Result<Deployment, ProvisionerError> {
		if update.is_empty() {
			return Err(ProvisionerError::EmptyUpdate {
				name: workload_name.to_string(),
			});
		}

		if let Some(replicas) = update.replicas.filter(|r| i32::try_from(*r).is_err()) {
			return Err(ProvisionerError::ReplicasOutOfRange {
				name: workload_name.to_string(),
				replicas,
			});
		}

		let patch = update.to_patch(Utc::now());
		tracing::info!(
			namespace = %namespace,
			deployment = %workload_name,
			dry_run = options.is_dry_run(),
			replicas = ?update.replicas,
			restart = update.restart,
			"Updating deployment"
		);

		self
			.client
			.patch_deployment(namespace, workload_name, options, patch)
			.await
			.map_err(|err| match err {
				K8sError::NotFound { .. } => ProvisionerError::NotFound {
					name: workload_name.to_string(),
					namespace: namespace.to_string(),
				},
				source => ProvisionerError::UpdateRejected {
					name: workload_name.to_string(),
					source,
				},
			})
	}
}
