// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::TesseraConfigLayer;
use crate::sections::{
	ClusterConfigLayer, ClusterMode, FieldValidationMode, LoggingConfigLayer, ReadinessConfigLayer,
	UpdateConfigLayer, VolumeConfigLayer, WorkloadConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<TesseraConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<TesseraConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(TesseraConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file that must exist.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	/// The system-wide file, skipped when absent.
	pub fn system() -> Self {
		Self {
			path: PathBuf::from("/etc/tessera/tessera.toml"),
			required: false,
		}
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<TesseraConfigLayer, ConfigError> {
		if !self.required && !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(TesseraConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: TesseraConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: TESSERA_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<TesseraConfigLayer, ConfigError> {
		debug!("loading environment variables");
		load_from_env(&Env(|name: &str| std::env::var(name).ok()))
	}
}

/// Variable lookup; empty values count as unset.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
	fn var(&self, name: &str) -> Option<String> {
		(self.0)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self
			.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parse<T: FromStr>(&self, name: &str, what: &str) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid {what} value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	fn i32(&self, name: &str) -> Result<Option<i32>, ConfigError> {
		self.parse(name, "i32")
	}

	fn u32(&self, name: &str) -> Result<Option<u32>, ConfigError> {
		self.parse(name, "u32")
	}

	fn u64(&self, name: &str) -> Result<Option<u64>, ConfigError> {
		self.parse(name, "u64")
	}

	fn with<T, P>(&self, name: &str, parse: P) -> Result<Option<T>, ConfigError>
	where
		P: FnOnce(&str) -> Result<T, String>,
	{
		match self.var(name) {
			Some(v) => parse(&v).map(Some).map_err(|message| ConfigError::InvalidValue {
				key: name.to_string(),
				message,
			}),
			None => Ok(None),
		}
	}
}

fn load_from_env<F: Fn(&str) -> Option<String>>(
	env: &Env<F>,
) -> Result<TesseraConfigLayer, ConfigError> {
	Ok(TesseraConfigLayer {
		cluster: Some(load_cluster_from_env(env)?),
		workload: Some(load_workload_from_env(env)?),
		volume: Some(load_volume_from_env(env)),
		readiness: Some(load_readiness_from_env(env)?),
		update: Some(load_update_from_env(env)?),
		logging: Some(load_logging_from_env(env)),
	})
}

fn load_cluster_from_env<F: Fn(&str) -> Option<String>>(
	env: &Env<F>,
) -> Result<ClusterConfigLayer, ConfigError> {
	Ok(ClusterConfigLayer {
		mode: env.with("TESSERA_CLUSTER_MODE", ClusterMode::from_str)?,
		kubeconfig: env.var("TESSERA_CLUSTER_KUBECONFIG").map(PathBuf::from),
	})
}

fn load_workload_from_env<F: Fn(&str) -> Option<String>>(
	env: &Env<F>,
) -> Result<WorkloadConfigLayer, ConfigError> {
	Ok(WorkloadConfigLayer {
		namespace: env.var("TESSERA_WORKLOAD_NAMESPACE"),
		app_name: env.var("TESSERA_WORKLOAD_APP_NAME"),
		image_repository: env.var("TESSERA_WORKLOAD_IMAGE_REPOSITORY"),
		image_tag: env.var("TESSERA_WORKLOAD_IMAGE_TAG"),
		container_port: env.i32("TESSERA_WORKLOAD_CONTAINER_PORT")?,
		replicas: env.u32("TESSERA_WORKLOAD_REPLICAS")?,
		mount_path: env.var("TESSERA_WORKLOAD_MOUNT_PATH"),
		scheduler_name: env.var("TESSERA_WORKLOAD_SCHEDULER_NAME"),
		image_pull_policy: env.var("TESSERA_WORKLOAD_IMAGE_PULL_POLICY"),
		cpu_request: env.var("TESSERA_WORKLOAD_CPU_REQUEST"),
		memory_request: env.var("TESSERA_WORKLOAD_MEMORY_REQUEST"),
		cpu_limit: env.var("TESSERA_WORKLOAD_CPU_LIMIT"),
		memory_limit: env.var("TESSERA_WORKLOAD_MEMORY_LIMIT"),
	})
}

fn load_volume_from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> VolumeConfigLayer {
	VolumeConfigLayer {
		storage_class: env.var("TESSERA_VOLUME_STORAGE_CLASS"),
		size: env.var("TESSERA_VOLUME_SIZE"),
	}
}

fn load_readiness_from_env<F: Fn(&str) -> Option<String>>(
	env: &Env<F>,
) -> Result<ReadinessConfigLayer, ConfigError> {
	Ok(ReadinessConfigLayer {
		poll_interval_secs: env.u64("TESSERA_READINESS_POLL_INTERVAL_SECS")?,
		timeout_secs: env.u64("TESSERA_READINESS_TIMEOUT_SECS")?,
	})
}

/// Parse `key=value,key2=value2`.
fn parse_annotations(s: &str) -> Result<BTreeMap<String, String>, String> {
	s.split(',')
		.map(str::trim)
		.filter(|pair| !pair.is_empty())
		.map(|pair| match pair.split_once('=') {
			Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
			_ => Err(format!("expected key=value, got '{pair}'")),
		})
		.collect()
}

fn load_update_from_env<F: Fn(&str) -> Option<String>>(
	env: &Env<F>,
) -> Result<UpdateConfigLayer, ConfigError> {
	Ok(UpdateConfigLayer {
		enabled: env.bool("TESSERA_UPDATE_ENABLED"),
		field_manager: env.var("TESSERA_UPDATE_FIELD_MANAGER"),
		field_validation: env.with("TESSERA_UPDATE_FIELD_VALIDATION", FieldValidationMode::from_str)?,
		dry_run: env.bool("TESSERA_UPDATE_DRY_RUN"),
		replicas: env.u32("TESSERA_UPDATE_REPLICAS")?,
		image_tag: env.var("TESSERA_UPDATE_IMAGE_TAG"),
		annotations: env.with("TESSERA_UPDATE_ANNOTATIONS", parse_annotations)?,
		restart: env.bool("TESSERA_UPDATE_RESTART"),
	})
}

fn load_logging_from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env.var("TESSERA_LOGGING_LEVEL"),
		json: env.bool("TESSERA_LOGGING_JSON"),
	}
}

#[cfg(test)]
pub(crate) fn load_from_map(
	vars: &std::collections::HashMap<&str, &str>,
) -> Result<TesseraConfigLayer, ConfigError> {
	load_from_env(&Env(|name: &str| vars.get(name).map(|v| v.to_string())))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert_eq!(layer, TesseraConfigLayer::default());
	}

	#[test]
	fn test_system_toml_missing_file_returns_empty() {
		let source = TomlSource {
			path: PathBuf::from("/nonexistent/tessera.toml"),
			required: false,
		};
		assert_eq!(source.load().unwrap(), TesseraConfigLayer::default());
	}

	#[test]
	fn test_explicit_toml_missing_file_is_an_error() {
		let err = TomlSource::new("/nonexistent/tessera.toml").load().unwrap_err();
		assert!(matches!(err, ConfigError::FileRead { .. }));
	}

	#[test]
	fn test_toml_source_parses_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[cluster]
mode = "kubeconfig"
kubeconfig = "/home/ops/.kube/lab"

[workload]
app_name = "web"
replicas = 2

[readiness]
timeout_secs = 120
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let cluster = layer.cluster.unwrap();
		assert_eq!(cluster.mode, Some(ClusterMode::Kubeconfig));
		assert_eq!(cluster.kubeconfig, Some(PathBuf::from("/home/ops/.kube/lab")));
		assert_eq!(layer.workload.unwrap().replicas, Some(2));
		assert_eq!(layer.readiness.unwrap().timeout_secs, Some(120));
		assert!(layer.volume.is_none());
	}

	#[test]
	fn test_toml_source_reports_parse_errors() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[workload]\nreplicas = \"three\"").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_reads_prefixed_variables() {
		let vars = HashMap::from([
			("TESSERA_WORKLOAD_NAMESPACE", "storage"),
			("TESSERA_WORKLOAD_REPLICAS", "5"),
			("TESSERA_CLUSTER_MODE", "in-cluster"),
			("TESSERA_UPDATE_FIELD_VALIDATION", "warn"),
			("TESSERA_UPDATE_DRY_RUN", "1"),
			("TESSERA_UPDATE_ANNOTATIONS", "team=storage, owner=ops"),
			("TESSERA_LOGGING_JSON", "true"),
		]);

		let layer = load_from_map(&vars).unwrap();

		let workload = layer.workload.unwrap();
		assert_eq!(workload.namespace.as_deref(), Some("storage"));
		assert_eq!(workload.replicas, Some(5));
		assert!(workload.app_name.is_none());
		assert_eq!(layer.cluster.unwrap().mode, Some(ClusterMode::InCluster));
		let update = layer.update.unwrap();
		assert_eq!(update.field_validation, Some(FieldValidationMode::Warn));
		assert_eq!(update.dry_run, Some(true));
		let annotations = update.annotations.unwrap();
		assert_eq!(annotations.get("owner").map(String::as_str), Some("ops"));
		assert_eq!(annotations.len(), 2);
		assert_eq!(layer.logging.unwrap().json, Some(true));
	}

	#[test]
	fn test_env_empty_values_are_unset() {
		let vars = HashMap::from([("TESSERA_WORKLOAD_NAMESPACE", "")]);
		let layer = load_from_map(&vars).unwrap();
		assert!(layer.workload.unwrap().namespace.is_none());
	}

	#[test]
	fn test_env_rejects_bad_numbers() {
		let vars = HashMap::from([("TESSERA_WORKLOAD_REPLICAS", "-1")]);
		let err = load_from_map(&vars).unwrap_err();
		match err {
			ConfigError::InvalidValue { key, .. } => assert_eq!(key, "TESSERA_WORKLOAD_REPLICAS"),
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn test_env_rejects_unknown_mode() {
		let vars = HashMap::from([("TESSERA_CLUSTER_MODE", "cloud")]);
		assert!(matches!(
			load_from_map(&vars),
			Err(ConfigError::InvalidValue { .. })
		));
	}

	#[test]
	fn test_parse_annotations() {
		let parsed = parse_annotations("a=1,b=").unwrap();
		assert_eq!(parsed.get("a").map(String::as_str), Some("1"));
		assert_eq!(parsed.get("b").map(String::as_str), Some(""));
		assert!(parse_annotations("novalue").is_err());
		assert!(parse_annotations("=x").is_err());
	}
}
