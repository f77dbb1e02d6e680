// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post-readiness update configuration section.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const MANAGED_BY_ANNOTATION: &str = "tessera.dev/managed-by";

fn default_field_manager() -> String {
	"tessera".to_string()
}

fn default_annotations() -> BTreeMap<String, String> {
	let mut annotations = BTreeMap::new();
	annotations.insert(MANAGED_BY_ANNOTATION.to_string(), "tessera".to_string());
	annotations
}

/// Server-side handling of unknown or duplicate fields in the patch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldValidationMode {
	#[default]
	Strict,
	Warn,
	Ignore,
}

impl FromStr for FieldValidationMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"strict" => Ok(FieldValidationMode::Strict),
			"warn" => Ok(FieldValidationMode::Warn),
			"ignore" => Ok(FieldValidationMode::Ignore),
			other => Err(format!(
				"unknown field validation '{other}' (expected strict, warn or ignore)"
			)),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateConfigLayer {
	pub enabled: Option<bool>,
	pub field_manager: Option<String>,
	pub field_validation: Option<FieldValidationMode>,
	pub dry_run: Option<bool>,
	pub replicas: Option<u32>,
	pub image_tag: Option<String>,
	pub annotations: Option<BTreeMap<String, String>>,
	pub restart: Option<bool>,
}

impl UpdateConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.field_manager.is_some() {
			self.field_manager = other.field_manager;
		}
		if other.field_validation.is_some() {
			self.field_validation = other.field_validation;
		}
		if other.dry_run.is_some() {
			self.dry_run = other.dry_run;
		}
		if other.replicas.is_some() {
			self.replicas = other.replicas;
		}
		if other.image_tag.is_some() {
			self.image_tag = other.image_tag;
		}
		if other.annotations.is_some() {
			self.annotations = other.annotations;
		}
		if other.restart.is_some() {
			self.restart = other.restart;
		}
	}

	pub fn finalize(self) -> UpdateConfig {
		UpdateConfig {
			enabled: self.enabled.unwrap_or(true),
			field_manager: self.field_manager.unwrap_or_else(default_field_manager),
			field_validation: self.field_validation.unwrap_or_default(),
			dry_run: self.dry_run.unwrap_or(false),
			replicas: self.replicas,
			image_tag: self.image_tag.filter(|t| !t.is_empty()),
			annotations: self.annotations.unwrap_or_else(default_annotations),
			restart: self.restart.unwrap_or(false),
		}
	}
}

/// The update applied once the workload is ready.
///
/// The default stamps a managed-by annotation on the deployment, which
/// touches metadata only and does not roll pods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateConfig {
	pub enabled: bool,
	pub field_manager: String,
	pub field_validation: FieldValidationMode,
	pub dry_run: bool,
	pub replicas: Option<u32>,
	/// New tag for the workload's container
	pub image_tag: Option<String>,
	pub annotations: BTreeMap<String, String>,
	pub restart: bool,
}

impl UpdateConfig {
	/// True when no replica, image, annotation or restart change is set.
	pub fn changes_nothing(&self) -> bool {
		self.replicas.is_none()
			&& self.image_tag.is_none()
			&& self.annotations.is_empty()
			&& !self.restart
	}
}

impl Default for UpdateConfig {
	fn default() -> Self {
		UpdateConfigLayer::default().finalize()
	}
}
