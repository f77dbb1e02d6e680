// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! K8s client abstraction for tessera workload provisioning.
//!
//! This crate provides:
//! - A trait-based K8s client abstraction for testability
//! - Production implementation using the kube crate
//! - Connection bootstrap (in-cluster or kubeconfig)
//! - Common types for claims, deployments and pods

mod client;
mod connection;
mod error;
mod kube_client;
mod types;

pub use client::ClusterClient;
pub use connection::ClusterConnection;
pub use error::K8sError;
pub use kube_client::KubeClient;
pub use types::{
	Affinity, Container, ContainerPort, Deployment, DeploymentSpec, DryRun, FieldValidation,
	LabelSelector, LabelSelectorRequirement, ObjectMeta, PatchOptions, PersistentVolumeClaim,
	PersistentVolumeClaimSpec, PersistentVolumeClaimVolumeSource, Pod, PodAffinityTerm,
	PodAntiAffinity, PodSpec, PodStatus, PodTemplateSpec, Quantity, ResourceKind,
	ResourceRequirements, Volume, VolumeMount, VolumeResourceRequirements,
};
