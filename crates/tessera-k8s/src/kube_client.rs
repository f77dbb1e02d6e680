// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use kube::{
	api::{Api, ListParams, Patch, PatchParams, PostParams, ValidationDirective},
	Client,
};
use tracing::{debug, instrument};

use crate::client::ClusterClient;
use crate::connection::ClusterConnection;
use crate::error::K8sError;
use crate::types::{
	Deployment, FieldValidation, PatchOptions, PersistentVolumeClaim, Pod, ResourceKind,
};

/// Production K8s client implementation using the kube crate.
pub struct KubeClient {
	client: Client,
}

impl KubeClient {
	/// Create a client for the given connection mode.
	///
	/// Credential resolution failures are returned, never panicked on.
	pub async fn connect(connection: &ClusterConnection) -> Result<Self, K8sError> {
		let config = connection.resolve().await?;
		let client = Client::try_from(config).map_err(|e| K8sError::Config {
			message: e.to_string(),
		})?;
		debug!(mode = %connection, "K8s client initialized");
		Ok(Self { client })
	}
}

fn patch_params(options: &PatchOptions) -> PatchParams {
	let mut params = PatchParams::default();
	params.dry_run = options.is_dry_run();
	params.field_manager = options.field_manager.clone();
	params.field_validation = Some(match options.field_validation {
		FieldValidation::Strict => ValidationDirective::Strict,
		FieldValidation::Warn => ValidationDirective::Warn,
		FieldValidation::Ignore => ValidationDirective::Ignore,
	});
	params
}

#[async_trait]
impl ClusterClient for KubeClient {
	#[instrument(skip(self, claim))]
	async fn create_volume_claim(
		&self,
		namespace: &str,
		claim: PersistentVolumeClaim,
	) -> Result<PersistentVolumeClaim, K8sError> {
		let name = claim.metadata.name.clone().unwrap_or_default();
		let claims: Api<PersistentVolumeClaim> = Api::namespaced(self.client.clone(), namespace);
		claims
			.create(&PostParams::default(), &claim)
			.await
			.map_err(|e| K8sError::classify(e, ResourceKind::PersistentVolumeClaim, &name))
	}

	#[instrument(skip(self, deployment))]
	async fn create_deployment(
		&self,
		namespace: &str,
		deployment: Deployment,
	) -> Result<Deployment, K8sError> {
		let name = deployment.metadata.name.clone().unwrap_or_default();
		let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
		deployments
			.create(&PostParams::default(), &deployment)
			.await
			.map_err(|e| K8sError::classify(e, ResourceKind::Deployment, &name))
	}

	async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, K8sError> {
		let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
		let lp = if label_selector.is_empty() {
			ListParams::default()
		} else {
			ListParams::default().labels(label_selector)
		};
		let pod_list = pods
			.list(&lp)
			.await
			.map_err(|e| K8sError::classify(e, ResourceKind::Pod, label_selector))?;
		Ok(pod_list.items)
	}

	#[instrument(skip(self, patch), fields(dry_run = options.is_dry_run()))]
	async fn patch_deployment(
		&self,
		namespace: &str,
		name: &str,
		options: &PatchOptions,
		patch: serde_json::Value,
	) -> Result<Deployment, K8sError> {
		let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
		deployments
			.patch(name, &patch_params(options), &Patch::Strategic(&patch))
			.await
			.map_err(|e| K8sError::classify(e, ResourceKind::Deployment, name))
	}
}
