// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scripted cluster client for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tessera_k8s::{
	ClusterClient, Deployment, K8sError, ObjectMeta, PatchOptions, PersistentVolumeClaim, Pod,
	PodStatus,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
	CreateClaim {
		namespace: String,
		name: String,
	},
	CreateDeployment {
		namespace: String,
		name: String,
	},
	ListPods {
		namespace: String,
		selector: String,
	},
	PatchDeployment {
		namespace: String,
		name: String,
		options: PatchOptions,
		patch: serde_json::Value,
	},
}

/// Records every call and answers from scripted responses.
///
/// Pod lists are served from a queue; once it drains, the last successful
/// list is repeated.
#[derive(Default)]
pub(crate) struct ScriptedClient {
	calls: Mutex<Vec<Call>>,
	claims: Mutex<Vec<PersistentVolumeClaim>>,
	deployments: Mutex<Vec<Deployment>>,
	claim_error: Mutex<Option<K8sError>>,
	deployment_error: Mutex<Option<K8sError>>,
	patch_error: Mutex<Option<K8sError>>,
	pod_lists: Mutex<VecDeque<Result<Vec<Pod>, K8sError>>>,
	last_pods: Mutex<Vec<Pod>>,
	cancel_on_list: Mutex<Option<(usize, CancellationToken)>>,
}

impl ScriptedClient {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fail_claim(self, err: K8sError) -> Self {
		*self.claim_error.lock().unwrap() = Some(err);
		self
	}

	pub fn fail_deployment(self, err: K8sError) -> Self {
		*self.deployment_error.lock().unwrap() = Some(err);
		self
	}

	pub fn fail_patch(self, err: K8sError) -> Self {
		*self.patch_error.lock().unwrap() = Some(err);
		self
	}

	pub fn with_pods(self, pods: Vec<Pod>) -> Self {
		self.pod_lists.lock().unwrap().push_back(Ok(pods));
		self
	}

	pub fn with_list_error(self, err: K8sError) -> Self {
		self.pod_lists.lock().unwrap().push_back(Err(err));
		self
	}

	/// Cancel `token` once the `n`th list call has been answered.
	pub fn cancel_after_lists(self, n: usize, token: CancellationToken) -> Self {
		*self.cancel_on_list.lock().unwrap() = Some((n, token));
		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().unwrap().clone()
	}

	pub fn list_calls(&self) -> usize {
		self
			.calls()
			.iter()
			.filter(|c| matches!(c, Call::ListPods { .. }))
			.count()
	}

	pub fn created_claims(&self) -> Vec<PersistentVolumeClaim> {
		self.claims.lock().unwrap().clone()
	}

	pub fn created_deployments(&self) -> Vec<Deployment> {
		self.deployments.lock().unwrap().clone()
	}

	fn record(&self, call: Call) {
		self.calls.lock().unwrap().push(call);
	}
}

#[async_trait]
impl ClusterClient for ScriptedClient {
	async fn create_volume_claim(
		&self,
		namespace: &str,
		claim: PersistentVolumeClaim,
	) -> Result<PersistentVolumeClaim, K8sError> {
		self.record(Call::CreateClaim {
			namespace: namespace.to_string(),
			name: claim.metadata.name.clone().unwrap_or_default(),
		});
		if let Some(err) = self.claim_error.lock().unwrap().take() {
			return Err(err);
		}
		self.claims.lock().unwrap().push(claim.clone());
		Ok(claim)
	}

	async fn create_deployment(
		&self,
		namespace: &str,
		deployment: Deployment,
	) -> Result<Deployment, K8sError> {
		self.record(Call::CreateDeployment {
			namespace: namespace.to_string(),
			name: deployment.metadata.name.clone().unwrap_or_default(),
		});
		if let Some(err) = self.deployment_error.lock().unwrap().take() {
			return Err(err);
		}
		self.deployments.lock().unwrap().push(deployment.clone());
		Ok(deployment)
	}

	async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, K8sError> {
		self.record(Call::ListPods {
			namespace: namespace.to_string(),
			selector: label_selector.to_string(),
		});

		let next = self.pod_lists.lock().unwrap().pop_front();
		let result = match next {
			Some(Ok(pods)) => {
				*self.last_pods.lock().unwrap() = pods.clone();
				Ok(pods)
			}
			Some(Err(err)) => Err(err),
			None => Ok(self.last_pods.lock().unwrap().clone()),
		};

		let count = self.list_calls();
		if let Some((n, token)) = self.cancel_on_list.lock().unwrap().as_ref() {
			if count >= *n {
				token.cancel();
			}
		}
		result
	}

	async fn patch_deployment(
		&self,
		namespace: &str,
		name: &str,
		options: &PatchOptions,
		patch: serde_json::Value,
	) -> Result<Deployment, K8sError> {
		self.record(Call::PatchDeployment {
			namespace: namespace.to_string(),
			name: name.to_string(),
			options: options.clone(),
			patch,
		});
		if let Some(err) = self.patch_error.lock().unwrap().take() {
			return Err(err);
		}
		Ok(Deployment {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				namespace: Some(namespace.to_string()),
				..Default::default()
			},
			..Default::default()
		})
	}
}

/// A pod with the given name and phase. `None` leaves the status unset.
pub(crate) fn pod(name: &str, phase: Option<&str>) -> Pod {
	Pod {
		metadata: ObjectMeta {
			name: Some(name.to_string()),
			..Default::default()
		},
		spec: None,
		status: phase.map(|p| PodStatus {
			phase: Some(p.to_string()),
			..Default::default()
		}),
	}
}

pub(crate) fn running(names: &[&str]) -> Vec<Pod> {
	names.iter().map(|n| pod(n, Some("Running"))).collect()
}
