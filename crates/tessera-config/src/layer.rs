// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	ClusterConfigLayer, LoggingConfigLayer, ReadinessConfigLayer, UpdateConfigLayer,
	VolumeConfigLayer, WorkloadConfigLayer,
};

/// Tessera configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TesseraConfigLayer {
	#[serde(default)]
	pub cluster: Option<ClusterConfigLayer>,
	#[serde(default)]
	pub workload: Option<WorkloadConfigLayer>,
	#[serde(default)]
	pub volume: Option<VolumeConfigLayer>,
	#[serde(default)]
	pub readiness: Option<ReadinessConfigLayer>,
	#[serde(default)]
	pub update: Option<UpdateConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl TesseraConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: TesseraConfigLayer) {
		merge_option(&mut self.cluster, other.cluster, ClusterConfigLayer::merge);
		merge_option(&mut self.workload, other.workload, WorkloadConfigLayer::merge);
		merge_option(&mut self.volume, other.volume, VolumeConfigLayer::merge);
		merge_option(
			&mut self.readiness,
			other.readiness,
			ReadinessConfigLayer::merge,
		);
		merge_option(&mut self.update, other.update, UpdateConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = TesseraConfigLayer::default();
		base.merge(TesseraConfigLayer::default());
		assert_eq!(base, TesseraConfigLayer::default());
	}

	#[test]
	fn test_merge_other_overwrites() {
		let mut base = TesseraConfigLayer {
			workload: Some(WorkloadConfigLayer {
				app_name: Some("web".to_string()),
				replicas: Some(2),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(TesseraConfigLayer {
			workload: Some(WorkloadConfigLayer {
				replicas: Some(4),
				..Default::default()
			}),
			..Default::default()
		});
		let workload = base.workload.unwrap();
		assert_eq!(workload.replicas, Some(4));
		assert_eq!(workload.app_name.as_deref(), Some("web"));
	}

	#[test]
	fn test_merge_adds_missing_sections() {
		let mut base = TesseraConfigLayer::default();
		base.merge(TesseraConfigLayer {
			volume: Some(VolumeConfigLayer {
				size: Some("5Gi".to_string()),
				..Default::default()
			}),
			..Default::default()
		});
		assert_eq!(base.volume.unwrap().size.as_deref(), Some("5Gi"));
		assert!(base.workload.is_none());
	}
}
