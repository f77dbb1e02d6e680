// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioner error types.

use std::time::Duration;

use tessera_k8s::{K8sError, ResourceKind};

use crate::labels::LabelError;
use crate::quantity::QuantityError;

/// Errors that can occur while provisioning, converging or updating a workload.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionerError {
	/// Selector labels failed validation
	#[error("Invalid selector: {0}")]
	InvalidSelector(#[from] LabelError),

	/// A resource quantity failed validation
	#[error("Invalid {field}: {source}")]
	InvalidQuantity {
		field: &'static str,
		#[source]
		source: QuantityError,
	},

	/// Claim and workload target different namespaces
	#[error("Namespace mismatch: claim in '{claim}', workload in '{workload}'")]
	NamespaceMismatch { claim: String, workload: String },

	/// The cluster refused to create a resource
	#[error("Failed to create {kind} {name}: {source}")]
	CreateFailed {
		kind: ResourceKind,
		name: String,
		#[source]
		source: K8sError,
	},

	/// Listing pods failed
	#[error("Failed to list pods matching '{selector}': {source}")]
	ListFailed {
		selector: String,
		#[source]
		source: K8sError,
	},

	/// Pods did not converge before the deadline
	#[error("Timed out after {timeout:?} waiting for pods matching '{selector}' to run")]
	ReadyTimeout { selector: String, timeout: Duration },

	/// The readiness wait was cancelled
	#[error("Cancelled while waiting for pods matching '{selector}'")]
	Cancelled { selector: String },

	/// Replica count does not fit the API's 32-bit signed field
	#[error("Workload {name} requests {replicas} replicas, more than a deployment can hold")]
	ReplicasOutOfRange { name: String, replicas: u32 },

	/// A zero-replica workload can never converge
	#[error("Workload {name} has zero replicas and will never become ready")]
	ZeroReplicas { name: String },

	/// Update target does not exist
	#[error("Deployment {name} not found in namespace {namespace}")]
	NotFound { name: String, namespace: String },

	/// The cluster rejected an update
	#[error("Update of deployment {name} rejected: {source}")]
	UpdateRejected {
		name: String,
		#[source]
		source: K8sError,
	},

	/// An update with nothing to change
	#[error("Update of deployment {name} changes nothing")]
	EmptyUpdate { name: String },
}
