// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cluster connection bootstrap.
//!
//! Resolves a `kube::Config` either from the pod's service account or from a
//! kubeconfig file. Kept separate from `ClusterClient` so the provisioner never
//! performs discovery itself.

use std::fmt;
use std::path::PathBuf;

use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::debug;

use crate::error::K8sError;

const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";

/// How to locate cluster credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClusterConnection {
	/// In-cluster when the service environment is present, kubeconfig otherwise.
	#[default]
	Auto,
	/// Service account token and CA mounted into the pod.
	InCluster,
	/// A kubeconfig file. `None` means `~/.kube/config`.
	Kubeconfig { path: Option<PathBuf> },
}

impl fmt::Display for ClusterConnection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ClusterConnection::Auto => f.write_str("auto"),
			ClusterConnection::InCluster => f.write_str("in-cluster"),
			ClusterConnection::Kubeconfig { path: Some(p) } => {
				write!(f, "kubeconfig ({})", p.display())
			}
			ClusterConnection::Kubeconfig { path: None } => f.write_str("kubeconfig"),
		}
	}
}

fn running_in_cluster(host: Option<String>, port: Option<String>) -> bool {
	matches!((host, port), (Some(h), Some(p)) if !h.is_empty() && !p.is_empty())
}

fn default_kubeconfig_path() -> Result<PathBuf, K8sError> {
	dirs::home_dir()
		.map(|home| home.join(".kube").join("config"))
		.ok_or_else(|| K8sError::Config {
			message: "cannot locate home directory for default kubeconfig".to_string(),
		})
}

fn in_cluster_config() -> Result<kube::Config, K8sError> {
	debug!("resolving in-cluster configuration");
	kube::Config::incluster().map_err(|e| K8sError::Config {
		message: format!("in-cluster configuration: {e}"),
	})
}

async fn kubeconfig_config(path: Option<PathBuf>) -> Result<kube::Config, K8sError> {
	let path = match path {
		Some(p) => p,
		None => default_kubeconfig_path()?,
	};
	debug!(path = %path.display(), "resolving kubeconfig");
	let kubeconfig = Kubeconfig::read_from(&path).map_err(|e| K8sError::Config {
		message: format!("reading kubeconfig {}: {e}", path.display()),
	})?;
	kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
		.await
		.map_err(|e| K8sError::Config {
			message: format!("loading kubeconfig {}: {e}", path.display()),
		})
}

impl ClusterConnection {
	/// Pick the concrete mode for `Auto` from the process environment.
	pub fn detect(&self) -> ClusterConnection {
		match self {
			ClusterConnection::Auto => {
				if running_in_cluster(
					std::env::var(SERVICE_HOST_ENV).ok(),
					std::env::var(SERVICE_PORT_ENV).ok(),
				) {
					ClusterConnection::InCluster
				} else {
					ClusterConnection::Kubeconfig { path: None }
				}
			}
			other => other.clone(),
		}
	}

	/// Build a kube client configuration for this connection mode.
	pub async fn resolve(&self) -> Result<kube::Config, K8sError> {
		match self.detect() {
			ClusterConnection::InCluster => in_cluster_config(),
			ClusterConnection::Kubeconfig { path } => kubeconfig_config(path).await,
			ClusterConnection::Auto => kubeconfig_config(None).await,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn in_cluster_requires_host_and_port() {
		assert!(running_in_cluster(
			Some("10.0.0.1".to_string()),
			Some("443".to_string())
		));
		assert!(!running_in_cluster(Some("10.0.0.1".to_string()), None));
		assert!(!running_in_cluster(None, Some("443".to_string())));
		assert!(!running_in_cluster(
			Some(String::new()),
			Some("443".to_string())
		));
	}

	#[test]
	fn explicit_modes_are_not_redetected() {
		let explicit = ClusterConnection::Kubeconfig {
			path: Some(PathBuf::from("/tmp/kc")),
		};
		assert_eq!(explicit.detect(), explicit);
		assert_eq!(
			ClusterConnection::InCluster.detect(),
			ClusterConnection::InCluster
		);
	}

	#[tokio::test]
	async fn missing_kubeconfig_is_a_config_error() {
		let dir = tempfile::tempdir().unwrap();
		let connection = ClusterConnection::Kubeconfig {
			path: Some(dir.path().join("absent")),
		};
		let err = connection.resolve().await.unwrap_err();
		assert!(matches!(err, K8sError::Config { .. }));
		assert!(err.to_string().contains("absent"));
	}

	#[test]
	fn display_names_mode() {
		assert_eq!(ClusterConnection::Auto.to_string(), "auto");
		assert_eq!(ClusterConnection::InCluster.to_string(), "in-cluster");
		assert_eq!(
			ClusterConnection::Kubeconfig {
				path: Some(PathBuf::from("/etc/kc"))
			}
			.to_string(),
			"kubeconfig (/etc/kc)"
		);
	}
}
