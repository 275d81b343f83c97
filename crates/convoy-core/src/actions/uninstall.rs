//! Uninstall action: tear one component down. Teardown has no
//! wait-complete phase.

use std::sync::Arc;

use async_trait::async_trait;

use crate::actions::{helm, namespace, yaml};
use crate::checks::CheckRunner;
use crate::cluster::ClusterOps;
use crate::error::{Error, Phase, Result};
use crate::manifest::{Component, ComponentKind};
use crate::walker::Action;

pub struct Uninstall {
    cluster: Arc<dyn ClusterOps>,
    checks: CheckRunner,
}

impl Uninstall {
    pub fn new(cluster: Arc<dyn ClusterOps>, checks: CheckRunner) -> Self {
        Self { cluster, checks }
    }
}

#[async_trait]
impl Action for Uninstall {
    async fn apply(&self, c: &Component) -> Result<()> {
        tracing::info!(component = %c.id, kind = %c.kind, "uninstalling");

        for check in &c.pre_delete {
            self.checks
                .run(c, check)
                .await
                .map_err(|err| Error::action(&c.id, Phase::PreDelete, err))?;
        }

        let deleted = match c.kind {
            ComponentKind::Namespace => namespace::delete(self.cluster.as_ref(), c).await,
            ComponentKind::Helm => helm::uninstall(c).await,
            ComponentKind::Yaml => yaml::delete(c).await,
        };
        deleted.map_err(|err| Error::action(&c.id, Phase::Delete, err))?;

        tracing::info!(component = %c.id, "uninstalled");
        Ok(())
    }
}
