// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

pub use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
pub use k8s_openapi::api::core::v1::{
	Affinity, Container, ContainerPort, PersistentVolumeClaim, PersistentVolumeClaimSpec,
	PersistentVolumeClaimVolumeSource, Pod, PodAffinityTerm, PodAntiAffinity, PodSpec, PodStatus,
	PodTemplateSpec, ResourceRequirements, Volume, VolumeMount, VolumeResourceRequirements,
};
pub use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
	LabelSelector, LabelSelectorRequirement, ObjectMeta,
};

/// Resource kinds the client can mutate or query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
	PersistentVolumeClaim,
	Deployment,
	Pod,
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
			ResourceKind::Deployment => "Deployment",
			ResourceKind::Pod => "Pod",
		};
		f.write_str(s)
	}
}

/// Server-side field validation applied to a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldValidation {
	/// Reject unknown or duplicate fields.
	#[default]
	Strict,
	/// Accept the request but report unknown fields as warnings.
	Warn,
	/// Silently drop unknown fields.
	Ignore,
}

/// Dry-run directive. The API server only defines `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRun {
	All,
}

/// Options attached to a patch request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOptions {
	/// Identity recorded in `managedFields` for this mutation.
	pub field_manager: Option<String>,
	pub field_validation: FieldValidation,
	/// Empty means the mutation is persisted.
	pub dry_run: Vec<DryRun>,
}

impl PatchOptions {
	pub fn is_dry_run(&self) -> bool {
		!self.dry_run.is_empty()
	}
}
