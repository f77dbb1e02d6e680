// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Readiness polling.
//!
//! Lists pods matching a selector until every one of them is `Running`. There
//! is no event watch; each round is a fresh list. A policy without a timeout
//! waits until the cancellation token fires.

use std::sync::Arc;

use tessera_k8s::{ClusterClient, Pod};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::ReadinessPolicy;
use crate::error::ProvisionerError;
use crate::labels::Labels;

const RUNNING_PHASE: &str = "Running";

/// Pods observed when the selector converged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyPods {
	pub selector: String,
	pub names: Vec<String>,
	/// List rounds it took to converge
	pub rounds: u32,
}

impl ReadyPods {
	pub fn count(&self) -> usize {
		self.names.len()
	}
}

/// Phase counts from a single list round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTally {
	pub running: usize,
	pub total: usize,
}

impl PhaseTally {
	pub fn of(pods: &[Pod]) -> Self {
		let running = pods
			.iter()
			.filter(|pod| pod_phase(pod) == Some(RUNNING_PHASE))
			.count();
		Self {
			running,
			total: pods.len(),
		}
	}

	/// At least one pod exists and all of them are running.
	pub fn converged(&self) -> bool {
		self.total > 0 && self.running == self.total
	}
}

fn pod_phase(pod: &Pod) -> Option<&str> {
	pod.status.as_ref().and_then(|s| s.phase.as_deref())
}

fn pod_names(pods: &[Pod]) -> Vec<String> {
	pods
		.iter()
		.filter_map(|p| p.metadata.name.clone())
		.collect()
}

pub struct ReadinessPoller {
	client: Arc<dyn ClusterClient>,
	policy: ReadinessPolicy,
}

impl ReadinessPoller {
	pub fn new(client: Arc<dyn ClusterClient>, policy: ReadinessPolicy) -> Self {
		Self { client, policy }
	}

	/// Block until every pod matching `labels` in `namespace` is running.
	///
	/// Labels are validated before the first list call. List failures end the
	/// wait immediately. Zero matching pods never counts as converged.
	pub async fn await_ready(
		&self,
		namespace: &str,
		labels: &Labels,
		cancel: &CancellationToken,
	) -> Result<ReadyPods, ProvisionerError> {
		let selector = labels.to_selector()?;
		let deadline = self.policy.timeout.map(|t| Instant::now() + t);
		let mut rounds = 0u32;

		tracing::info!(namespace = %namespace, selector = %selector, "Waiting for pods to run");

		loop {
			if cancel.is_cancelled() {
				return Err(ProvisionerError::Cancelled { selector });
			}
			if let (Some(deadline), Some(timeout)) = (deadline, self.policy.timeout) {
				if Instant::now() >= deadline {
					return Err(ProvisionerError::ReadyTimeout { selector, timeout });
				}
			}

			let pods = self
				.client
				.list_pods(namespace, &selector)
				.await
				.map_err(|source| ProvisionerError::ListFailed {
					selector: selector.clone(),
					source,
				})?;
			rounds += 1;

			let tally = PhaseTally::of(&pods);
			if tally.converged() {
				tracing::info!(
					selector = %selector,
					running = tally.running,
					rounds,
					"All pods running"
				);
				return Ok(ReadyPods {
					selector,
					names: pod_names(&pods),
					rounds,
				});
			}

			tracing::info!(
				selector = %selector,
				running = tally.running,
				total = tally.total,
				"Waiting for pods"
			);

			// Never sleep past the deadline.
			let wake = Instant::now() + self.policy.poll_interval;
			let wake = deadline.map_or(wake, |d| d.min(wake));
			tokio::select! {
				_ = cancel.cancelled() => return Err(ProvisionerError::Cancelled { selector }),
				_ = tokio::time::sleep_until(wake) => {}
			}
		}
	}
}
