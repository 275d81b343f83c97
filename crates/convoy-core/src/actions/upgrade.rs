//! Upgrade action: move one component to the manifest's declared state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::actions::{helm, namespace, yaml};
use crate::checks::CheckRunner;
use crate::cluster::ClusterOps;
use crate::error::{Error, Phase, Result};
use crate::manifest::{Component, ComponentKind};
use crate::walker::Action;

pub struct Upgrade {
    cluster: Arc<dyn ClusterOps>,
    checks: CheckRunner,
}

impl Upgrade {
    pub fn new(cluster: Arc<dyn ClusterOps>, checks: CheckRunner) -> Self {
        Self { cluster, checks }
    }
}

#[async_trait]
impl Action for Upgrade {
    async fn apply(&self, c: &Component) -> Result<()> {
        tracing::info!(component = %c.id, kind = %c.kind, "upgrading");

        for check in &c.pre_upgrade {
            self.checks
                .run(c, check)
                .await
                .map_err(|err| Error::action(&c.id, Phase::PreUpgrade, err))?;
        }

        let upgraded = match c.kind {
            ComponentKind::Namespace => namespace::upsert(self.cluster.as_ref(), c).await,
            ComponentKind::Helm => helm::upgrade(c).await,
            ComponentKind::Yaml => yaml::apply(c).await,
        };
        upgraded.map_err(|err| Error::action(&c.id, Phase::Upgrade, err))?;

        for check in &c.wait_complete {
            self.checks
                .run(c, check)
                .await
                .map_err(|err| Error::action(&c.id, Phase::WaitComplete, err))?;
        }

        tracing::info!(component = %c.id, "upgraded");
        Ok(())
    }
}
