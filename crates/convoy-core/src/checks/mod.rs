//! Runs one readiness check against the cluster.

use std::sync::Arc;

use crate::cluster::ClusterOps;
use crate::durations::Timeouts;
use crate::error::{Error, Result};
use crate::manifest::{Check, CheckKind, Component};

/// What to do with a check whose type is not part of the known
/// vocabulary. Manifests may declare hook points ahead of tool support,
/// so the default tolerates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCheckPolicy {
    /// Treat the check as an immediate success.
    #[default]
    Allow,
    /// Fail the component's apply.
    Deny,
}

/// Executes a component's readiness checks with per-kind budgets.
#[derive(Clone)]
pub struct CheckRunner {
    cluster: Arc<dyn ClusterOps>,
    timeouts: Timeouts,
    unknown: UnknownCheckPolicy,
}

impl CheckRunner {
    pub fn new(cluster: Arc<dyn ClusterOps>, timeouts: Timeouts, unknown: UnknownCheckPolicy) -> Self {
        Self {
            cluster,
            timeouts,
            unknown,
        }
    }

    /// Run a single check. The check's namespace override wins over the
    /// owning component's namespace. Adapter errors, including timeouts,
    /// surface unmodified.
    pub async fn run(&self, component: &Component, check: &Check) -> Result<()> {
        let namespace = check
            .namespace
            .as_deref()
            .unwrap_or(component.namespace.as_str());

        tracing::debug!(
            component = %component.id,
            check = check.kind.as_str(),
            selector = %check.selector,
            %namespace,
            "running check"
        );

        match &check.kind {
            CheckKind::Pod => {
                self.cluster
                    .wait_for_pod_by_selector(namespace, &check.selector, self.timeouts.pod_ready())
                    .await
            }
            CheckKind::Loadbalancer => {
                self.cluster
                    .wait_until_service_has_load_balancer(
                        namespace,
                        &check.selector,
                        self.timeouts.load_balancer(),
                    )
                    .await
            }
            CheckKind::Crd => {
                self.cluster
                    .wait_for_crd(&check.selector, self.timeouts.deployment())
                    .await
            }
            CheckKind::Job => {
                self.cluster
                    .wait_for_job_completed(namespace, &check.selector, self.timeouts.deployment())
                    .await
            }
            CheckKind::Other(name) => match self.unknown {
                UnknownCheckPolicy::Allow => {
                    tracing::debug!(check = %name, "skipping unknown check type");
                    Ok(())
                }
                UnknownCheckPolicy::Deny => Err(Error::UnknownCheck(name.clone())),
            },
        }
    }
}
