// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::types::ResourceKind;

/// Errors that can occur during K8s operations.
#[derive(Error, Debug)]
pub enum K8sError {
	#[error("{kind} {name} already exists")]
	AlreadyExists { kind: ResourceKind, name: String },

	#[error("{kind} {name} not found")]
	NotFound { kind: ResourceKind, name: String },

	#[error("Conflict on {kind} {name}: {message}")]
	Conflict {
		kind: ResourceKind,
		name: String,
		message: String,
	},

	#[error("Invalid {kind}: {message}")]
	Invalid { kind: ResourceKind, message: String },

	#[error("Forbidden: {message}")]
	Forbidden { message: String },

	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },

	#[error("K8s API error: {message}")]
	ApiError { message: String },

	#[error("Cluster connection error: {message}")]
	Config { message: String },
}

impl From<kube::Error> for K8sError {
	fn from(err: kube::Error) -> Self {
		K8sError::ApiError {
			message: err.to_string(),
		}
	}
}

impl K8sError {
	/// Classify a kube error for a request against `kind`/`name`.
	pub fn classify(err: kube::Error, kind: ResourceKind, name: &str) -> Self {
		match err {
			kube::Error::Api(resp) => match resp.code {
				401 => K8sError::Unauthorized {
					message: resp.message,
				},
				403 => K8sError::Forbidden {
					message: resp.message,
				},
				404 => K8sError::NotFound {
					kind,
					name: name.to_string(),
				},
				409 if resp.reason == "AlreadyExists" => K8sError::AlreadyExists {
					kind,
					name: name.to_string(),
				},
				409 => K8sError::Conflict {
					kind,
					name: name.to_string(),
					message: resp.message,
				},
				422 => K8sError::Invalid {
					kind,
					message: resp.message,
				},
				_ => K8sError::ApiError {
					message: resp.message,
				},
			},
			other => other.into(),
		}
	}
}
