// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Label construction and selector validation.
//!
//! Every label map that ties a workload to its pods comes from [`app_labels`].
//! The pod template labels, the deployment selector and the anti-affinity
//! match expression are all derived from one call, so they cannot drift apart.

use std::collections::BTreeMap;

/// Label key identifying the application a pod belongs to.
pub const APP_LABEL: &str = "app";

const MAX_NAME_LENGTH: usize = 63;
const MAX_PREFIX_LENGTH: usize = 253;

/// Errors raised while validating labels for use as a selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
	#[error("selector has no labels")]
	Empty,

	#[error("invalid label key '{key}': {reason}")]
	InvalidKey { key: String, reason: &'static str },

	#[error("invalid value '{value}' for label '{key}': {reason}")]
	InvalidValue {
		key: String,
		value: String,
		reason: &'static str,
	},
}

/// An ordered label map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(BTreeMap<String, String>);

/// Labels identifying the pods of `app_name`.
pub fn app_labels(app_name: &str) -> Labels {
	Labels::new().with(APP_LABEL, app_name)
}

impl Labels {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Clone into the map form the K8s API types expect.
	pub fn to_map(&self) -> BTreeMap<String, String> {
		self.0.clone()
	}

	/// Check every key and value against the K8s label syntax.
	pub fn validate(&self) -> Result<(), LabelError> {
		if self.0.is_empty() {
			return Err(LabelError::Empty);
		}
		for (key, value) in &self.0 {
			validate_key(key)?;
			validate_value(key, value)?;
		}
		Ok(())
	}

	/// Render an equality-based selector string (`k1=v1,k2=v2`) after validation.
	pub fn to_selector(&self) -> Result<String, LabelError> {
		self.validate()?;
		Ok(
			self
				.0
				.iter()
				.map(|(k, v)| format!("{k}={v}"))
				.collect::<Vec<_>>()
				.join(","),
		)
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}
}

fn is_name_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

/// Check the name segment shared by keys and values.
fn check_name(s: &str) -> Result<(), &'static str> {
	if s.len() > MAX_NAME_LENGTH {
		return Err("must be 63 characters or less");
	}
	if !s.chars().all(is_name_char) {
		return Err("must contain only alphanumerics, '-', '_' or '.'");
	}
	let starts_ok = s.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
	let ends_ok = s.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
	if !starts_ok || !ends_ok {
		return Err("must begin and end with an alphanumeric character");
	}
	Ok(())
}

fn check_prefix(prefix: &str) -> Result<(), &'static str> {
	if prefix.is_empty() {
		return Err("prefix must not be empty");
	}
	if prefix.len() > MAX_PREFIX_LENGTH {
		return Err("prefix must be 253 characters or less");
	}
	for part in prefix.split('.') {
		let valid = !part.is_empty()
			&& part
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
			&& !part.starts_with('-')
			&& !part.ends_with('-');
		if !valid {
			return Err("prefix must be a lowercase DNS subdomain");
		}
	}
	Ok(())
}

fn validate_key(key: &str) -> Result<(), LabelError> {
	let invalid = |reason| LabelError::InvalidKey {
		key: key.to_string(),
		reason,
	};
	let name = match key.split_once('/') {
		Some((prefix, name)) => {
			check_prefix(prefix).map_err(invalid)?;
			name
		}
		None => key,
	};
	if name.is_empty() {
		return Err(invalid("name must not be empty"));
	}
	check_name(name).map_err(invalid)
}

fn validate_value(key: &str, value: &str) -> Result<(), LabelError> {
	if value.is_empty() {
		return Ok(());
	}
	check_name(value).map_err(|reason| LabelError::InvalidValue {
		key: key.to_string(),
		value: value.to_string(),
		reason,
	})
}
