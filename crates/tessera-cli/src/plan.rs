// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translation from resolved configuration to provisioner inputs.

use tessera_config::{ClusterConfig, ClusterMode, FieldValidationMode, TesseraConfig};
use tessera_k8s::{ClusterConnection, DryRun, FieldValidation, PatchOptions};
use tessera_provisioner::{
	ContainerImage, ImageRef, ProvisionPlan, ProvisionerConfig, ReadinessPolicy, ResourcePolicy,
	UpdatePlan, VolumeRequest, WorkloadDefaults, WorkloadRequest, WorkloadUpdate,
};

/// Command-line values that override every configuration source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	pub namespace: Option<String>,
	pub log_level: Option<String>,
	pub json_logs: bool,
	pub timeout_secs: Option<u64>,
	pub skip_update: bool,
}

impl Overrides {
	pub fn apply(self, config: &mut TesseraConfig) -> anyhow::Result<()> {
		if let Some(namespace) = self.namespace {
			anyhow::ensure!(!namespace.trim().is_empty(), "--namespace must not be empty");
			config.workload.namespace = namespace;
		}
		if let Some(level) = self.log_level {
			config.logging.level = level;
		}
		if self.json_logs {
			config.logging.json = true;
		}
		if let Some(timeout) = self.timeout_secs {
			anyhow::ensure!(timeout > 0, "--timeout-secs must be at least 1");
			config.readiness.timeout_secs = Some(timeout);
		}
		if self.skip_update {
			config.update.enabled = false;
		}
		Ok(())
	}
}

pub fn connection(cluster: &ClusterConfig) -> ClusterConnection {
	match cluster.mode {
		ClusterMode::Auto => ClusterConnection::Auto,
		ClusterMode::InCluster => ClusterConnection::InCluster,
		ClusterMode::Kubeconfig => ClusterConnection::Kubeconfig {
			path: cluster.kubeconfig.clone(),
		},
	}
}

pub fn provisioner_config(config: &TesseraConfig) -> ProvisionerConfig {
	let workload = &config.workload;
	ProvisionerConfig {
		workload: WorkloadDefaults {
			resources: ResourcePolicy {
				cpu_request: workload.cpu_request.clone(),
				memory_request: workload.memory_request.clone(),
				cpu_limit: workload.cpu_limit.clone(),
				memory_limit: workload.memory_limit.clone(),
			},
			mount_path: workload.mount_path.clone(),
			scheduler_name: workload.scheduler_name.clone(),
			image_pull_policy: workload.image_pull_policy.clone(),
		},
		readiness: ReadinessPolicy {
			poll_interval: config.readiness.poll_interval(),
			timeout: config.readiness.timeout(),
		},
	}
}

fn field_validation(mode: FieldValidationMode) -> FieldValidation {
	match mode {
		FieldValidationMode::Strict => FieldValidation::Strict,
		FieldValidationMode::Warn => FieldValidation::Warn,
		FieldValidationMode::Ignore => FieldValidation::Ignore,
	}
}

fn update_plan(config: &TesseraConfig) -> Option<UpdatePlan> {
	let update = &config.update;
	if !update.enabled {
		return None;
	}

	let workload = &config.workload;
	Some(UpdatePlan {
		options: PatchOptions {
			field_manager: Some(update.field_manager.clone()),
			field_validation: field_validation(update.field_validation),
			dry_run: if update.dry_run {
				vec![DryRun::All]
			} else {
				Vec::new()
			},
		},
		update: WorkloadUpdate {
			replicas: update.replicas,
			image: update.image_tag.as_ref().map(|tag| ContainerImage {
				container: workload.app_name.clone(),
				image: ImageRef::new(workload.image_repository.clone(), tag.clone()),
			}),
			annotations: update.annotations.clone(),
			restart: update.restart,
		},
	})
}

pub fn provision_plan(config: &TesseraConfig, list_pods: bool) -> ProvisionPlan {
	let workload = &config.workload;
	ProvisionPlan {
		workload: WorkloadRequest {
			namespace: workload.namespace.clone(),
			app_name: workload.app_name.clone(),
			image: ImageRef::new(workload.image_repository.clone(), workload.image_tag.clone()),
			container_port: workload.container_port,
			replicas: workload.replicas,
		},
		volume: VolumeRequest {
			storage_class: config.volume.storage_class.clone(),
			capacity: config.volume.size.clone(),
		},
		list_pods,
		update: update_plan(config),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::PathBuf;
	use std::time::Duration;

	#[test]
	fn default_plan_is_reference_nginx_run() {
		let config = TesseraConfig::default();
		let plan = provision_plan(&config, true);

		assert_eq!(plan.workload.namespace, "default");
		assert_eq!(plan.workload.app_name, "nginx");
		assert_eq!(plan.workload.image.to_string(), "nginx:1.19.0");
		assert_eq!(plan.workload.container_port, 80);
		assert_eq!(plan.workload.replicas, 3);
		assert_eq!(plan.volume.storage_class, "portworx-sharedv4-csi");
		assert_eq!(plan.volume.capacity, "2Gi");
		assert!(plan.list_pods);

		let update = plan.update.unwrap();
		assert_eq!(update.options.field_manager.as_deref(), Some("tessera"));
		assert_eq!(update.options.field_validation, FieldValidation::Strict);
		assert!(!update.options.is_dry_run());
		assert!(!update.update.is_empty());
	}

	#[test]
	fn image_tag_update_targets_app_container() {
		let mut config = TesseraConfig::default();
		config.update.image_tag = Some("1.21.0".to_string());
		config.update.dry_run = true;

		let update = provision_plan(&config, false).update.unwrap();
		let image = update.update.image.unwrap();
		assert_eq!(image.container, "nginx");
		assert_eq!(image.image.to_string(), "nginx:1.21.0");
		assert_eq!(update.options.dry_run, vec![DryRun::All]);
	}

	#[test]
	fn overrides_take_precedence() {
		let mut config = TesseraConfig::default();
		Overrides {
			namespace: Some("storage".to_string()),
			log_level: Some("debug".to_string()),
			json_logs: true,
			timeout_secs: Some(90),
			skip_update: true,
		}
		.apply(&mut config)
		.unwrap();

		assert_eq!(config.workload.namespace, "storage");
		assert_eq!(config.logging.level, "debug");
		assert!(config.logging.json);
		assert!(provision_plan(&config, false).update.is_none());
		assert_eq!(
			provisioner_config(&config).readiness.timeout,
			Some(Duration::from_secs(90))
		);
	}

	#[test]
	fn overrides_reject_blank_namespace_and_zero_timeout() {
		let mut config = TesseraConfig::default();
		assert!(Overrides {
			namespace: Some(" ".to_string()),
			..Default::default()
		}
		.apply(&mut config)
		.is_err());
		assert!(Overrides {
			timeout_secs: Some(0),
			..Default::default()
		}
		.apply(&mut config)
		.is_err());
	}

	#[test]
	fn provisioner_config_carries_workload_defaults() {
		let mut config = TesseraConfig::default();
		config.workload.scheduler_name = Some("stork".to_string());
		config.workload.memory_limit = "256Mi".to_string();

		let pc = provisioner_config(&config);
		assert_eq!(pc.workload.scheduler_name.as_deref(), Some("stork"));
		assert_eq!(pc.workload.resources.memory_limit, "256Mi");
		assert_eq!(pc.workload.mount_path, "/data");
		assert_eq!(pc.readiness.poll_interval, Duration::from_secs(2));
		assert_eq!(pc.readiness.timeout, None);
	}

	#[test]
	fn cluster_modes_map_to_connections() {
		let kubeconfig = ClusterConfig {
			mode: ClusterMode::Kubeconfig,
			kubeconfig: Some(PathBuf::from("/etc/kc")),
		};
		assert_eq!(
			connection(&kubeconfig),
			ClusterConnection::Kubeconfig {
				path: Some(PathBuf::from("/etc/kc"))
			}
		);
		assert_eq!(connection(&ClusterConfig::default()), ClusterConnection::Auto);
		assert_eq!(
			connection(&ClusterConfig {
				mode: ClusterMode::InCluster,
				kubeconfig: None,
			}),
			ClusterConnection::InCluster
		);
	}
}
