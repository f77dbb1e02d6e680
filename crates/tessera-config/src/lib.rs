// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for tessera.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`TESSERA_<SECTION>_<FIELD>`)
//!
//! # Usage
//!
//! ```ignore
//! use tessera_config::load_config;
//!
//! let config = load_config()?;
//! println!("Provisioning {} in {}", config.workload.app_name, config.workload.namespace);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::TesseraConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tessera_provisioner::{app_labels, parse_quantity};
use tracing::{debug, info};

/// Fully resolved tessera configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TesseraConfig {
	pub cluster: ClusterConfig,
	pub workload: WorkloadConfig,
	pub volume: VolumeConfig,
	pub readiness: ReadinessConfig,
	pub update: UpdateConfig,
	pub logging: LoggingConfig,
}

impl TesseraConfig {
	/// Log the settings that shape a run.
	///
	/// Loading happens before a subscriber exists, so callers emit this once
	/// logging is installed.
	pub fn log_summary(&self) {
		info!(
			cluster_mode = %self.cluster.mode,
			namespace = %self.workload.namespace,
			app = %self.workload.app_name,
			replicas = self.workload.replicas,
			storage_class = %self.volume.storage_class,
			timeout_secs = ?self.readiness.timeout_secs,
			update_enabled = self.update.enabled,
			"Tessera configuration loaded"
		);
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`TESSERA_*`)
/// 2. Config file (`/etc/tessera/tessera.toml`, skipped when absent)
/// 3. Built-in defaults
pub fn load_config() -> Result<TesseraConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path, which must exist.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<TesseraConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge `sources` in precedence order and finalize the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<TesseraConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = TesseraConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: TesseraConfigLayer) -> Result<TesseraConfig, ConfigError> {
	let config = TesseraConfig {
		cluster: layer.cluster.unwrap_or_default().finalize(),
		workload: layer.workload.unwrap_or_default().finalize(),
		volume: layer.volume.unwrap_or_default().finalize(),
		readiness: layer.readiness.unwrap_or_default().finalize(),
		update: layer.update.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;
	debug!("configuration validated");

	Ok(config)
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() {
		return Err(ConfigError::Validation(format!("{field} must not be empty")));
	}
	Ok(())
}

fn require_quantity(field: &str, value: &str) -> Result<(), ConfigError> {
	parse_quantity(value)
		.map(|_| ())
		.map_err(|e| ConfigError::Validation(format!("{field}: {e}")))
}

fn require_replicas(field: &str, value: u32) -> Result<(), ConfigError> {
	if i32::try_from(value).is_err() {
		return Err(ConfigError::Validation(format!(
			"{field} {value} exceeds the maximum of {}",
			i32::MAX
		)));
	}
	Ok(())
}

/// Validate cross-field configuration rules.
fn validate_config(config: &TesseraConfig) -> Result<(), ConfigError> {
	let workload = &config.workload;
	require_non_empty("workload.namespace", &workload.namespace)?;
	require_non_empty("workload.app_name", &workload.app_name)?;
	require_non_empty("workload.image_repository", &workload.image_repository)?;
	require_non_empty("workload.image_tag", &workload.image_tag)?;
	require_non_empty("volume.storage_class", &config.volume.storage_class)?;
	require_non_empty("update.field_manager", &config.update.field_manager)?;

	app_labels(&workload.app_name)
		.validate()
		.map_err(|e| ConfigError::Validation(format!("workload.app_name: {e}")))?;

	if !(1..=65535).contains(&workload.container_port) {
		return Err(ConfigError::Validation(format!(
			"workload.container_port {} is outside 1-65535",
			workload.container_port
		)));
	}

	require_replicas("workload.replicas", workload.replicas)?;
	if let Some(replicas) = config.update.replicas {
		require_replicas("update.replicas", replicas)?;
	}
	if config.update.enabled && config.update.changes_nothing() {
		return Err(ConfigError::Validation(
			"update is enabled but sets no replicas, image_tag, annotations or restart".to_string(),
		));
	}

	require_quantity("volume.size", &config.volume.size)?;
	require_quantity("workload.cpu_request", &workload.cpu_request)?;
	require_quantity("workload.memory_request", &workload.memory_request)?;
	require_quantity("workload.cpu_limit", &workload.cpu_limit)?;
	require_quantity("workload.memory_limit", &workload.memory_limit)?;

	if config.readiness.poll_interval_secs == 0 {
		return Err(ConfigError::Validation(
			"readiness.poll_interval_secs must be at least 1".to_string(),
		));
	}
	if config.readiness.timeout_secs == Some(0) {
		return Err(ConfigError::Validation(
			"readiness.timeout_secs must be at least 1 when set".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::{BTreeMap, HashMap};
	use std::sync::{Arc, Mutex};
	use std::io::Write;

	struct LayerSource(Precedence, TesseraConfigLayer);

	impl ConfigSource for LayerSource {
		fn name(&self) -> &'static str {
			"test"
		}

		fn precedence(&self) -> Precedence {
			self.0
		}

		fn load(&self) -> Result<TesseraConfigLayer, ConfigError> {
			Ok(self.1.clone())
		}
	}

	#[test]
	fn test_defaults_validate() {
		let config = finalize(TesseraConfigLayer::default()).unwrap();
		assert_eq!(config, TesseraConfig::default());
		assert_eq!(config.workload.app_name, "nginx");
		assert_eq!(config.volume.size, "2Gi");
	}

	#[test]
	fn test_env_overrides_toml_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[workload]
namespace = "from-file"
app_name = "web"
replicas = 2
"#
		)
		.unwrap();

		let env = HashMap::from([("TESSERA_WORKLOAD_REPLICAS", "7")]);
		let env_layer = sources::load_from_map(&env).unwrap();

		// Listed out of order; precedence decides.
		let config = load_from_sources(vec![
			Box::new(LayerSource(Precedence::Environment, env_layer)),
			Box::new(TomlSource::new(file.path())),
			Box::new(DefaultsSource),
		])
		.unwrap();

		assert_eq!(config.workload.replicas, 7);
		assert_eq!(config.workload.namespace, "from-file");
		assert_eq!(config.workload.app_name, "web");
		assert_eq!(config.workload.image_tag, "1.19.0");
	}

	#[test]
	fn test_rejects_empty_names() {
		let layer = TesseraConfigLayer {
			workload: Some(WorkloadConfigLayer {
				namespace: Some("  ".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_rejects_invalid_app_label() {
		let layer = TesseraConfigLayer {
			workload: Some(WorkloadConfigLayer {
				app_name: Some("my app".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(err.to_string().contains("workload.app_name"), "{err}");
	}

	#[test]
	fn test_rejects_invalid_quantity() {
		let layer = TesseraConfigLayer {
			volume: Some(VolumeConfigLayer {
				size: Some("2 gigs".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(err.to_string().contains("volume.size"), "{err}");
	}

	#[test]
	fn test_rejects_zero_poll_interval() {
		let layer = TesseraConfigLayer {
			readiness: Some(ReadinessConfigLayer {
				poll_interval_secs: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_rejects_out_of_range_port() {
		let layer = TesseraConfigLayer {
			workload: Some(WorkloadConfigLayer {
				container_port: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_rejects_enabled_update_with_nothing_to_change() {
		let layer = TesseraConfigLayer {
			update: Some(UpdateConfigLayer {
				annotations: Some(BTreeMap::new()),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(err.to_string().contains("update is enabled"), "{err}");
	}

	#[test]
	fn test_disabled_update_may_be_empty() {
		let layer = TesseraConfigLayer {
			update: Some(UpdateConfigLayer {
				enabled: Some(false),
				annotations: Some(BTreeMap::new()),
				..Default::default()
			}),
			..Default::default()
		};
		let config = finalize(layer).unwrap();
		assert!(!config.update.enabled);
	}

	#[test]
	fn test_empty_annotation_env_with_restart_is_valid() {
		let env = HashMap::from([
			("TESSERA_UPDATE_ANNOTATIONS", " , "),
			("TESSERA_UPDATE_RESTART", "true"),
		]);
		let config = finalize(sources::load_from_map(&env).unwrap()).unwrap();
		assert!(config.update.annotations.is_empty());
		assert!(config.update.restart);
	}

	#[test]
	fn test_rejects_replicas_beyond_int32() {
		let layer = TesseraConfigLayer {
			workload: Some(WorkloadConfigLayer {
				replicas: Some(u32::MAX),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(err.to_string().contains("workload.replicas"), "{err}");

		let layer = TesseraConfigLayer {
			update: Some(UpdateConfigLayer {
				replicas: Some(i32::MAX as u32 + 1),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(err.to_string().contains("update.replicas"), "{err}");
	}

	#[derive(Clone, Default)]
	struct Captured(Arc<Mutex<Vec<u8>>>);

	impl std::io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn test_log_summary_reports_run_shape() {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_writer(move || writer.clone())
			.with_ansi(false)
			.finish();

		let mut config = TesseraConfig::default();
		config.workload.namespace = "storage".to_string();
		tracing::subscriber::with_default(subscriber, || config.log_summary());

		let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
		assert!(output.contains("Tessera configuration loaded"), "{output}");
		assert!(output.contains("namespace=storage"), "{output}");
		assert!(output.contains("replicas=3"), "{output}");
	}
}
