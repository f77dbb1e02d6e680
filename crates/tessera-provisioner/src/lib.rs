// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workload provisioning and convergence for tessera.
//!
//! This crate provides the core logic for standing up a stateful workload on
//! Kubernetes: a shared volume claim, a deployment that mounts it with
//! one-replica-per-host placement, and a wait until every replica runs.
//!
//! # Architecture
//!
//! Everything talks to the cluster through an injected
//! [`tessera_k8s::ClusterClient`], implementing:
//!
//! - Resource spec building ([`spec`], [`labels`])
//! - Claim-then-workload submission ([`provisioner`])
//! - Readiness polling with deadline and cancellation ([`readiness`])
//! - Guarded workload updates ([`mutator`])
//! - Diagnostic pod listing ([`pods`])
//! - The fixed-order run tying them together ([`orchestrator`])

pub mod config;
pub mod error;
pub mod labels;
pub mod mutator;
pub mod orchestrator;
pub mod pods;
pub mod provisioner;
pub mod quantity;
pub mod readiness;
pub mod spec;

#[cfg(test)]
mod testing;

pub use config::{ProvisionerConfig, ReadinessPolicy, ResourcePolicy, WorkloadDefaults};
pub use error::ProvisionerError;
pub use labels::{app_labels, LabelError, Labels};
pub use mutator::{ContainerImage, WorkloadMutator, WorkloadUpdate};
pub use orchestrator::{Orchestrator, ProvisionPlan, RunReport, Step, UpdatePlan, VolumeRequest};
pub use pods::{PodLister, PodNames};
pub use provisioner::{ProvisionedResources, Provisioner};
pub use quantity::{parse_quantity, QuantityError};
pub use readiness::{PhaseTally, ReadinessPoller, ReadyPods};
pub use spec::{ImageRef, VolumeClaimSpec, WorkloadRequest, WorkloadSpec};
