// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Best-effort diagnostic listing of pod names.

use std::sync::Arc;

use tessera_k8s::ClusterClient;

/// Names of the pods in a namespace, in list order.
pub type PodNames = std::vec::IntoIter<String>;

pub struct PodLister {
	client: Arc<dyn ClusterClient>,
}

impl PodLister {
	pub fn new(client: Arc<dyn ClusterClient>) -> Self {
		Self { client }
	}

	/// List every pod in `namespace`. Failures are logged and yield no names.
	pub async fn list(&self, namespace: &str) -> PodNames {
		match self.client.list_pods(namespace, "").await {
			Ok(pods) => {
				let names: Vec<String> = pods.into_iter().filter_map(|p| p.metadata.name).collect();
				tracing::debug!(namespace = %namespace, count = names.len(), "Listed pods");
				names.into_iter()
			}
			Err(e) => {
				tracing::warn!(namespace = %namespace, error = %e, "Failed to list pods");
				Vec::new().into_iter()
			}
		}
	}
}
