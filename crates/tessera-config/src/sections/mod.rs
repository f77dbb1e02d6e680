// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for tessera.

pub mod cluster;
pub mod logging;
pub mod readiness;
pub mod update;
pub mod volume;
pub mod workload;

pub use cluster::{ClusterConfig, ClusterConfigLayer, ClusterMode};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use readiness::{ReadinessConfig, ReadinessConfigLayer};
pub use update::{FieldValidationMode, UpdateConfig, UpdateConfigLayer};
pub use volume::{VolumeConfig, VolumeConfigLayer};
pub use workload::{WorkloadConfig, WorkloadConfigLayer};
