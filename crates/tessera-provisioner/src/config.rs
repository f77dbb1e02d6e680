// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioner configuration.

use std::time::Duration;

/// Configuration for the provisioner, poller and orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionerConfig {
	/// Defaults stamped onto every workload
	pub workload: WorkloadDefaults,
	/// How readiness is polled
	pub readiness: ReadinessPolicy,
}

/// Container resource floor and ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePolicy {
	pub cpu_request: String,
	pub memory_request: String,
	pub cpu_limit: String,
	pub memory_limit: String,
}

impl Default for ResourcePolicy {
	fn default() -> Self {
		Self {
			cpu_request: "10m".to_string(),
			memory_request: "10Mi".to_string(),
			cpu_limit: "100m".to_string(),
			memory_limit: "100Mi".to_string(),
		}
	}
}

/// Workload settings that are not part of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadDefaults {
	pub resources: ResourcePolicy,
	/// Where the shared volume is mounted in the container
	pub mount_path: String,
	/// Scheduler override (e.g. a storage-aware scheduler). `None` uses the
	/// cluster default.
	pub scheduler_name: Option<String>,
	pub image_pull_policy: String,
}

impl Default for WorkloadDefaults {
	fn default() -> Self {
		Self {
			resources: ResourcePolicy::default(),
			mount_path: "/data".to_string(),
			scheduler_name: None,
			image_pull_policy: "Always".to_string(),
		}
	}
}

/// Poll cadence and optional deadline for the readiness wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
	pub poll_interval: Duration,
	/// `None` waits until cancelled.
	pub timeout: Option<Duration>,
}

impl Default for ReadinessPolicy {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_secs(2),
			timeout: None,
		}
	}
}
