// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Submission of the volume claim and the workload that mounts it.

use std::sync::Arc;

use tessera_k8s::{ClusterClient, ResourceKind};

use crate::error::ProvisionerError;
use crate::spec::{VolumeClaimSpec, WorkloadSpec};

/// Names of the objects a successful [`Provisioner::provision`] created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedResources {
	pub namespace: String,
	pub claim_name: String,
	pub workload_name: String,
}

/// Creates the claim and then the workload, in that order.
pub struct Provisioner {
	client: Arc<dyn ClusterClient>,
}

impl Provisioner {
	pub fn new(client: Arc<dyn ClusterClient>) -> Self {
		Self { client }
	}

	/// Submit the claim, then the workload.
	///
	/// Both objects are rendered before anything is submitted, so a workload
	/// that cannot be rendered creates nothing. The workload is never
	/// submitted when the claim fails. A claim created before a workload
	/// failure is left in place.
	pub async fn provision(
		&self,
		claim: &VolumeClaimSpec,
		workload: &WorkloadSpec,
	) -> Result<ProvisionedResources, ProvisionerError> {
		if claim.namespace != workload.namespace {
			return Err(ProvisionerError::NamespaceMismatch {
				claim: claim.namespace.clone(),
				workload: workload.namespace.clone(),
			});
		}
		if claim.name != workload.claim_name {
			tracing::warn!(
				claim = %claim.name,
				mounted = %workload.claim_name,
				"Workload mounts a claim other than the one being created"
			);
		}

		let namespace = &claim.namespace;
		let workload_name = workload.name();
		let deployment = workload.to_deployment()?;

		tracing::info!(
			namespace = %namespace,
			claim = %claim.name,
			storage_class = %claim.storage_class,
			capacity = %claim.capacity.0,
			"Creating volume claim"
		);
		self
			.client
			.create_volume_claim(namespace, claim.to_claim())
			.await
			.map_err(|source| ProvisionerError::CreateFailed {
				kind: ResourceKind::PersistentVolumeClaim,
				name: claim.name.clone(),
				source,
			})?;

		tracing::info!(
			namespace = %namespace,
			deployment = %workload_name,
			image = %workload.image,
			replicas = workload.replicas,
			"Creating deployment"
		);
		if let Err(source) = self
			.client
			.create_deployment(namespace, deployment)
			.await
		{
			tracing::warn!(
				claim = %claim.name,
				"Deployment creation failed; volume claim left in place"
			);
			return Err(ProvisionerError::CreateFailed {
				kind: ResourceKind::Deployment,
				name: workload_name,
				source,
			});
		}

		Ok(ProvisionedResources {
			namespace: namespace.clone(),
			claim_name: claim.name.clone(),
			workload_name,
		})
	}
}
