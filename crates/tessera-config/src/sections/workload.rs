// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workload configuration section.

use serde::{Deserialize, Serialize};

fn default_namespace() -> String {
	"default".to_string()
}

fn default_app_name() -> String {
	"nginx".to_string()
}

fn default_image_repository() -> String {
	"nginx".to_string()
}

fn default_image_tag() -> String {
	"1.19.0".to_string()
}

fn default_container_port() -> i32 {
	80
}

fn default_replicas() -> u32 {
	3
}

fn default_mount_path() -> String {
	"/data".to_string()
}

fn default_image_pull_policy() -> String {
	"Always".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkloadConfigLayer {
	pub namespace: Option<String>,
	pub app_name: Option<String>,
	pub image_repository: Option<String>,
	pub image_tag: Option<String>,
	pub container_port: Option<i32>,
	pub replicas: Option<u32>,
	pub mount_path: Option<String>,
	pub scheduler_name: Option<String>,
	pub image_pull_policy: Option<String>,
	pub cpu_request: Option<String>,
	pub memory_request: Option<String>,
	pub cpu_limit: Option<String>,
	pub memory_limit: Option<String>,
}

impl WorkloadConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.namespace.is_some() {
			self.namespace = other.namespace;
		}
		if other.app_name.is_some() {
			self.app_name = other.app_name;
		}
		if other.image_repository.is_some() {
			self.image_repository = other.image_repository;
		}
		if other.image_tag.is_some() {
			self.image_tag = other.image_tag;
		}
		if other.container_port.is_some() {
			self.container_port = other.container_port;
		}
		if other.replicas.is_some() {
			self.replicas = other.replicas;
		}
		if other.mount_path.is_some() {
			self.mount_path = other.mount_path;
		}
		if other.scheduler_name.is_some() {
			self.scheduler_name = other.scheduler_name;
		}
		if other.image_pull_policy.is_some() {
			self.image_pull_policy = other.image_pull_policy;
		}
		if other.cpu_request.is_some() {
			self.cpu_request = other.cpu_request;
		}
		if other.memory_request.is_some() {
			self.memory_request = other.memory_request;
		}
		if other.cpu_limit.is_some() {
			self.cpu_limit = other.cpu_limit;
		}
		if other.memory_limit.is_some() {
			self.memory_limit = other.memory_limit;
		}
	}

	pub fn finalize(self) -> WorkloadConfig {
		let defaults = WorkloadConfig::default();
		WorkloadConfig {
			namespace: self.namespace.unwrap_or(defaults.namespace),
			app_name: self.app_name.unwrap_or(defaults.app_name),
			image_repository: self.image_repository.unwrap_or(defaults.image_repository),
			image_tag: self.image_tag.unwrap_or(defaults.image_tag),
			container_port: self.container_port.unwrap_or(defaults.container_port),
			replicas: self.replicas.unwrap_or(defaults.replicas),
			mount_path: self.mount_path.unwrap_or(defaults.mount_path),
			scheduler_name: self.scheduler_name.filter(|s| !s.is_empty()),
			image_pull_policy: self.image_pull_policy.unwrap_or(defaults.image_pull_policy),
			cpu_request: self.cpu_request.unwrap_or(defaults.cpu_request),
			memory_request: self.memory_request.unwrap_or(defaults.memory_request),
			cpu_limit: self.cpu_limit.unwrap_or(defaults.cpu_limit),
			memory_limit: self.memory_limit.unwrap_or(defaults.memory_limit),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadConfig {
	pub namespace: String,
	pub app_name: String,
	pub image_repository: String,
	pub image_tag: String,
	pub container_port: i32,
	pub replicas: u32,
	pub mount_path: String,
	/// Scheduler override; unset uses the cluster default
	pub scheduler_name: Option<String>,
	pub image_pull_policy: String,
	pub cpu_request: String,
	pub memory_request: String,
	pub cpu_limit: String,
	pub memory_limit: String,
}

impl Default for WorkloadConfig {
	fn default() -> Self {
		Self {
			namespace: default_namespace(),
			app_name: default_app_name(),
			image_repository: default_image_repository(),
			image_tag: default_image_tag(),
			container_port: default_container_port(),
			replicas: default_replicas(),
			mount_path: default_mount_path(),
			scheduler_name: None,
			image_pull_policy: default_image_pull_policy(),
			cpu_request: "10m".to_string(),
			memory_request: "10Mi".to_string(),
			cpu_limit: "100m".to_string(),
			memory_limit: "100Mi".to_string(),
		}
	}
}
