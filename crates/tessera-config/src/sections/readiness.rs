// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Readiness polling configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_poll_interval_secs() -> u64 {
	2
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReadinessConfigLayer {
	pub poll_interval_secs: Option<u64>,
	pub timeout_secs: Option<u64>,
}

impl ReadinessConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.poll_interval_secs.is_some() {
			self.poll_interval_secs = other.poll_interval_secs;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> ReadinessConfig {
		ReadinessConfig {
			poll_interval_secs: self
				.poll_interval_secs
				.unwrap_or_else(default_poll_interval_secs),
			timeout_secs: self.timeout_secs,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadinessConfig {
	pub poll_interval_secs: u64,
	/// Unset waits until interrupted
	pub timeout_secs: Option<u64>,
}

impl ReadinessConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.timeout_secs.map(Duration::from_secs)
	}
}

impl Default for ReadinessConfig {
	fn default() -> Self {
		Self {
			poll_interval_secs: default_poll_interval_secs(),
			timeout_secs: None,
		}
	}
}
