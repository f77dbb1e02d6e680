// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cluster connection configuration section.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where cluster credentials come from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterMode {
	/// In-cluster when the service environment is present, kubeconfig otherwise
	#[default]
	Auto,
	InCluster,
	Kubeconfig,
}

impl fmt::Display for ClusterMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ClusterMode::Auto => "auto",
			ClusterMode::InCluster => "in-cluster",
			ClusterMode::Kubeconfig => "kubeconfig",
		})
	}
}

impl FromStr for ClusterMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"auto" => Ok(ClusterMode::Auto),
			"in-cluster" | "incluster" => Ok(ClusterMode::InCluster),
			"kubeconfig" => Ok(ClusterMode::Kubeconfig),
			other => Err(format!(
				"unknown cluster mode '{other}' (expected auto, in-cluster or kubeconfig)"
			)),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfigLayer {
	pub mode: Option<ClusterMode>,
	/// Kubeconfig path; only meaningful outside the cluster
	pub kubeconfig: Option<PathBuf>,
}

impl ClusterConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.mode.is_some() {
			self.mode = other.mode;
		}
		if other.kubeconfig.is_some() {
			self.kubeconfig = other.kubeconfig;
		}
	}

	pub fn finalize(self) -> ClusterConfig {
		ClusterConfig {
			mode: self.mode.unwrap_or_default(),
			kubeconfig: self.kubeconfig,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfig {
	pub mode: ClusterMode,
	pub kubeconfig: Option<PathBuf>,
}
