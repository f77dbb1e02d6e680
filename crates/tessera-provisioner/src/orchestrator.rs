// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end provisioning run.
//!
//! Steps always execute in this order:
//!
//! 1. create the volume claim
//! 2. create the workload mounting it
//! 3. reject zero-replica workloads
//! 4. wait until every selected pod is running
//! 5. optionally list pod names
//! 6. optionally update the workload
//!
//! The first failing step ends the run.

use std::fmt;
use std::sync::Arc;

use tessera_k8s::{ClusterClient, PatchOptions, ResourceKind};
use tokio_util::sync::CancellationToken;

use crate::config::ProvisionerConfig;
use crate::error::ProvisionerError;
use crate::mutator::{WorkloadMutator, WorkloadUpdate};
use crate::pods::PodLister;
use crate::provisioner::Provisioner;
use crate::readiness::ReadinessPoller;
use crate::spec::{VolumeClaimSpec, WorkloadRequest, WorkloadSpec};

/// Storage requested for the workload's shared volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeRequest {
	pub storage_class: String,
	pub capacity: String,
}

/// An update applied once the workload is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
	pub options: PatchOptions,
	pub update: WorkloadUpdate,
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
	pub workload: WorkloadRequest,
	pub volume: VolumeRequest,
	pub list_pods: bool,
	pub update: Option<UpdatePlan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
	CreateClaim,
	CreateWorkload,
	CheckReplicas,
	AwaitReady,
	ListPods,
	Update,
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Step::CreateClaim => "create_claim",
			Step::CreateWorkload => "create_workload",
			Step::CheckReplicas => "check_replicas",
			Step::AwaitReady => "await_ready",
			Step::ListPods => "list_pods",
			Step::Update => "update",
		};
		f.write_str(s)
	}
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
	pub claim_name: String,
	pub workload_name: String,
	pub ready_pods: usize,
	/// Empty when listing was disabled
	pub pod_names: Vec<String>,
	pub updated: bool,
}

pub struct Orchestrator {
	client: Arc<dyn ClusterClient>,
	config: ProvisionerConfig,
}

fn failed(step: Step, err: ProvisionerError) -> ProvisionerError {
	tracing::error!(step = %step, error = %err, "Step failed");
	err
}

impl Orchestrator {
	pub fn new(client: Arc<dyn ClusterClient>, config: ProvisionerConfig) -> Self {
		Self { client, config }
	}

	pub async fn run(
		&self,
		plan: &ProvisionPlan,
		cancel: &CancellationToken,
	) -> Result<RunReport, ProvisionerError> {
		let req = &plan.workload;
		let namespace = req.namespace.as_str();

		let claim = VolumeClaimSpec::new(
			namespace,
			&req.app_name,
			&plan.volume.storage_class,
			&plan.volume.capacity,
		)
		.map_err(|e| failed(Step::CreateClaim, e))?;
		let workload = WorkloadSpec::build(req, &self.config.workload);

		tracing::info!(step = %Step::CreateClaim, namespace = %namespace, name = %claim.name, "Starting step");
		let provisioned = Provisioner::new(self.client.clone())
			.provision(&claim, &workload)
			.await
			.map_err(|e| {
				let step = match &e {
					ProvisionerError::CreateFailed {
						kind: ResourceKind::Deployment,
						..
					} => Step::CreateWorkload,
					ProvisionerError::ReplicasOutOfRange { .. } => Step::CheckReplicas,
					_ => Step::CreateClaim,
				};
				failed(step, e)
			})?;
		tracing::info!(
			step = %Step::CreateWorkload,
			namespace = %namespace,
			name = %provisioned.workload_name,
			"Step complete"
		);

		if workload.replicas == 0 {
			return Err(failed(
				Step::CheckReplicas,
				ProvisionerError::ZeroReplicas {
					name: provisioned.workload_name,
				},
			));
		}

		tracing::info!(step = %Step::AwaitReady, namespace = %namespace, "Starting step");
		let ready = ReadinessPoller::new(self.client.clone(), self.config.readiness.clone())
			.await_ready(namespace, &workload.labels(), cancel)
			.await
			.map_err(|e| failed(Step::AwaitReady, e))?;

		let pod_names = if plan.list_pods {
			tracing::info!(step = %Step::ListPods, namespace = %namespace, "Starting step");
			let names: Vec<String> = PodLister::new(self.client.clone()).list(namespace).await.collect();
			for name in &names {
				tracing::info!(step = %Step::ListPods, name = %name, "Pod");
			}
			names
		} else {
			Vec::new()
		};

		let updated = match &plan.update {
			Some(update) => {
				tracing::info!(
					step = %Step::Update,
					namespace = %namespace,
					name = %provisioned.workload_name,
					"Starting step"
				);
				WorkloadMutator::new(self.client.clone())
					.update(
						namespace,
						&provisioned.workload_name,
						&update.options,
						&update.update,
					)
					.await
					.map_err(|e| failed(Step::Update, e))?;
				true
			}
			None => false,
		};

		Ok(RunReport {
			claim_name: provisioned.claim_name,
			workload_name: provisioned.workload_name,
			ready_pods: ready.count(),
			pod_names,
			updated,
		})
	}
}
