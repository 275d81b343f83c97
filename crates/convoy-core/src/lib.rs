//! Convoy Core Library
//!
//! Provides the domain logic for installing, upgrading, and
//! uninstalling a multi-component application on a Kubernetes cluster:
//! the manifest model, dependency planning, the graph walkers, and the
//! per-component lifecycle actions.

pub mod actions;
pub mod checks;
pub mod cluster;
pub mod durations;
pub mod error;
pub mod exec;
pub mod manifest;
pub mod plan;
pub mod walker;

/// Re-exports of commonly used types
pub mod prelude {
    // Manifest
    pub use crate::manifest::{
        Check, CheckKind, Component, ComponentId, ComponentKind, Components, Manifest, Value,
        ValueKind,
    };

    // Planning and execution
    pub use crate::plan::{Plan, build_plan};
    pub use crate::walker::{Action, reverse_walk, walk, walk_serially};

    // Checks
    pub use crate::checks::{CheckRunner, UnknownCheckPolicy};

    // Actions
    pub use crate::actions::{Install, Uninstall, Upgrade};

    // Cluster
    pub use crate::cluster::{Cluster, ClusterOps, NamespaceMeta};

    // Errors
    pub use crate::error::{Error, Phase, Result};

    // Timeouts
    pub use crate::durations::Timeouts;
}
