// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative specs for the volume claim and the workload that mounts it.

use std::collections::BTreeMap;
use std::fmt;

use tessera_k8s::{
	Affinity, Container, ContainerPort, Deployment, DeploymentSpec, LabelSelector,
	LabelSelectorRequirement, ObjectMeta, PersistentVolumeClaim, PersistentVolumeClaimSpec,
	PersistentVolumeClaimVolumeSource, PodAffinityTerm, PodAntiAffinity, PodSpec, PodTemplateSpec,
	Quantity, ResourceRequirements, Volume, VolumeMount, VolumeResourceRequirements,
};

use crate::config::{ResourcePolicy, WorkloadDefaults};
use crate::error::ProvisionerError;
use crate::labels::{app_labels, Labels};
use crate::quantity::parse_quantity;

const HOSTNAME_TOPOLOGY_KEY: &str = "kubernetes.io/hostname";
const OPERATOR_IN: &str = "In";
const SHARED_ACCESS_MODE: &str = "ReadWriteMany";
const STORAGE_RESOURCE: &str = "storage";

/// Name of the claim backing `app_name`'s shared volume.
pub fn claim_name(app_name: &str) -> String {
	format!("{app_name}-pvc")
}

/// Name of the deployment running `app_name`.
pub fn deployment_name(app_name: &str) -> String {
	format!("{app_name}-deployment")
}

fn volume_name(app_name: &str) -> String {
	format!("{app_name}-volume")
}

/// A container image reference split into repository and tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
	pub repository: String,
	pub tag: String,
}

impl ImageRef {
	pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
		Self {
			repository: repository.into(),
			tag: tag.into(),
		}
	}
}

impl fmt::Display for ImageRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.repository, self.tag)
	}
}

/// Caller-supplied identity and shape of a workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRequest {
	pub namespace: String,
	pub app_name: String,
	pub image: ImageRef,
	pub container_port: i32,
	pub replicas: u32,
}

/// A fully assembled workload, ready to render as a `Deployment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
	pub namespace: String,
	pub app_name: String,
	pub image: ImageRef,
	pub container_port: i32,
	pub replicas: u32,
	pub resources: ResourcePolicy,
	pub claim_name: String,
	pub mount_path: String,
	pub scheduler_name: Option<String>,
	pub image_pull_policy: String,
}

impl WorkloadSpec {
	/// Assemble a workload spec. Pure data assembly; errors only surface on
	/// submission.
	pub fn build(req: &WorkloadRequest, defaults: &WorkloadDefaults) -> Self {
		Self {
			namespace: req.namespace.clone(),
			app_name: req.app_name.clone(),
			image: req.image.clone(),
			container_port: req.container_port,
			replicas: req.replicas,
			resources: defaults.resources.clone(),
			claim_name: claim_name(&req.app_name),
			mount_path: defaults.mount_path.clone(),
			scheduler_name: defaults.scheduler_name.clone().filter(|s| !s.is_empty()),
			image_pull_policy: defaults.image_pull_policy.clone(),
		}
	}

	pub fn name(&self) -> String {
		deployment_name(&self.app_name)
	}

	/// Labels selecting this workload's pods.
	pub fn labels(&self) -> Labels {
		app_labels(&self.app_name)
	}

	/// Required anti-affinity keeping replicas on distinct hosts.
	///
	/// Replicas stay Pending rather than co-locate when no free host exists.
	pub fn placement(&self) -> Affinity {
		let match_expressions = self
			.labels()
			.iter()
			.map(|(key, value)| LabelSelectorRequirement {
				key: key.to_string(),
				operator: OPERATOR_IN.to_string(),
				values: Some(vec![value.to_string()]),
			})
			.collect();

		Affinity {
			pod_anti_affinity: Some(PodAntiAffinity {
				required_during_scheduling_ignored_during_execution: Some(vec![PodAffinityTerm {
					label_selector: Some(LabelSelector {
						match_expressions: Some(match_expressions),
						match_labels: None,
					}),
					topology_key: HOSTNAME_TOPOLOGY_KEY.to_string(),
					..Default::default()
				}]),
				preferred_during_scheduling_ignored_during_execution: None,
			}),
			..Default::default()
		}
	}

	fn container(&self) -> Container {
		Container {
			name: self.app_name.clone(),
			image: Some(self.image.to_string()),
			image_pull_policy: Some(self.image_pull_policy.clone()),
			ports: Some(vec![ContainerPort {
				container_port: self.container_port,
				..Default::default()
			}]),
			resources: Some(self.resources.to_requirements()),
			volume_mounts: Some(vec![VolumeMount {
				name: volume_name(&self.app_name),
				mount_path: self.mount_path.clone(),
				..Default::default()
			}]),
			..Default::default()
		}
	}

	/// Render the K8s `Deployment` object.
	///
	/// Fails when the replica count does not fit the API's `int32` field.
	pub fn to_deployment(&self) -> Result<Deployment, ProvisionerError> {
		let replicas =
			i32::try_from(self.replicas).map_err(|_| ProvisionerError::ReplicasOutOfRange {
				name: self.name(),
				replicas: self.replicas,
			})?;
		let labels = self.labels().to_map();

		Ok(Deployment {
			metadata: ObjectMeta {
				name: Some(self.name()),
				namespace: Some(self.namespace.clone()),
				labels: Some(labels.clone()),
				..Default::default()
			},
			spec: Some(DeploymentSpec {
				replicas: Some(replicas),
				selector: LabelSelector {
					match_labels: Some(labels.clone()),
					match_expressions: None,
				},
				template: PodTemplateSpec {
					metadata: Some(ObjectMeta {
						labels: Some(labels),
						..Default::default()
					}),
					spec: Some(PodSpec {
						affinity: Some(self.placement()),
						scheduler_name: self.scheduler_name.clone(),
						containers: vec![self.container()],
						volumes: Some(vec![Volume {
							name: volume_name(&self.app_name),
							persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
								claim_name: self.claim_name.clone(),
								read_only: None,
							}),
							..Default::default()
						}]),
						..Default::default()
					}),
				},
				..Default::default()
			}),
			status: None,
		})
	}
}

impl ResourcePolicy {
	pub fn to_requirements(&self) -> ResourceRequirements {
		let mut requests = BTreeMap::new();
		requests.insert("cpu".to_string(), Quantity(self.cpu_request.clone()));
		requests.insert("memory".to_string(), Quantity(self.memory_request.clone()));

		let mut limits = BTreeMap::new();
		limits.insert("cpu".to_string(), Quantity(self.cpu_limit.clone()));
		limits.insert("memory".to_string(), Quantity(self.memory_limit.clone()));

		ResourceRequirements {
			limits: Some(limits),
			requests: Some(requests),
			claims: None,
		}
	}
}

/// A shared (multi-writer) volume claim for a workload.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeClaimSpec {
	pub namespace: String,
	pub name: String,
	pub storage_class: String,
	pub capacity: Quantity,
}

impl VolumeClaimSpec {
	/// Fails when `capacity` is not a valid quantity.
	pub fn new(
		namespace: &str,
		app_name: &str,
		storage_class: &str,
		capacity: &str,
	) -> Result<Self, ProvisionerError> {
		let capacity = parse_quantity(capacity).map_err(|source| ProvisionerError::InvalidQuantity {
			field: "volume capacity",
			source,
		})?;
		Ok(Self {
			namespace: namespace.to_string(),
			name: claim_name(app_name),
			storage_class: storage_class.to_string(),
			capacity,
		})
	}

	pub fn access_mode(&self) -> &'static str {
		SHARED_ACCESS_MODE
	}

	/// Render the K8s `PersistentVolumeClaim` object.
	pub fn to_claim(&self) -> PersistentVolumeClaim {
		let mut requests = BTreeMap::new();
		requests.insert(STORAGE_RESOURCE.to_string(), self.capacity.clone());

		PersistentVolumeClaim {
			metadata: ObjectMeta {
				name: Some(self.name.clone()),
				namespace: Some(self.namespace.clone()),
				..Default::default()
			},
			spec: Some(PersistentVolumeClaimSpec {
				access_modes: Some(vec![self.access_mode().to_string()]),
				resources: Some(VolumeResourceRequirements {
					requests: Some(requests),
					limits: None,
				}),
				storage_class_name: Some(self.storage_class.clone()),
				..Default::default()
			}),
			status: None,
		}
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn label_triple_is_consistent(
			namespace in "[a-z][a-z0-9-]{0,20}",
			app in "[a-z]([a-z0-9-]{0,30}[a-z0-9])?",
			replicas in 0u32..20,
		) {
			let req = WorkloadRequest {
				namespace,
				app_name: app.clone(),
				image: ImageRef::new("registry.example.com/app", "v1"),
				container_port: 8080,
				replicas,
			};
			let deployment = WorkloadSpec::build(&req, &WorkloadDefaults::default())
				.to_deployment()
				.unwrap();
			let spec = deployment.spec.unwrap();

			let template = spec.template.metadata.unwrap().labels.unwrap();
			let selector = spec.selector.match_labels.unwrap();
			prop_assert_eq!(&template, &selector);

			let expr = spec.template.spec.unwrap().affinity.unwrap()
				.pod_anti_affinity.unwrap()
				.required_during_scheduling_ignored_during_execution.unwrap()[0]
				.label_selector.clone().unwrap()
				.match_expressions.unwrap()[0].clone();
			prop_assert_eq!(template.get(&expr.key), Some(&app));
			prop_assert_eq!(expr.values, Some(vec![app.clone()]));
		}

		#[test]
		fn derived_names_follow_app_name(app in "[a-z]([a-z0-9-]{0,30}[a-z0-9])?") {
			prop_assert_eq!(claim_name(&app), format!("{app}-pvc"));
			prop_assert_eq!(deployment_name(&app), format!("{app}-deployment"));
		}
	}
}
