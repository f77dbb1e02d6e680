// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared volume configuration section.

use serde::{Deserialize, Serialize};

fn default_storage_class() -> String {
	"portworx-sharedv4-csi".to_string()
}

fn default_size() -> String {
	"2Gi".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VolumeConfigLayer {
	pub storage_class: Option<String>,
	pub size: Option<String>,
}

impl VolumeConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.storage_class.is_some() {
			self.storage_class = other.storage_class;
		}
		if other.size.is_some() {
			self.size = other.size;
		}
	}

	pub fn finalize(self) -> VolumeConfig {
		VolumeConfig {
			storage_class: self.storage_class.unwrap_or_else(default_storage_class),
			size: self.size.unwrap_or_else(default_size),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolumeConfig {
	/// Must provision multi-writer volumes
	pub storage_class: String,
	pub size: String,
}

impl Default for VolumeConfig {
	fn default() -> Self {
		Self {
			storage_class: default_storage_class(),
			size: default_size(),
		}
	}
}
