//! Install action: bring one component up and wait for it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::actions::{helm, namespace, yaml};
use crate::checks::CheckRunner;
use crate::cluster::ClusterOps;
use crate::error::{Error, Phase, Result};
use crate::manifest::{Component, ComponentKind};
use crate::walker::Action;

pub struct Install {
    cluster: Arc<dyn ClusterOps>,
    checks: CheckRunner,
}

impl Install {
    pub fn new(cluster: Arc<dyn ClusterOps>, checks: CheckRunner) -> Self {
        Self { cluster, checks }
    }
}

#[async_trait]
impl Action for Install {
    async fn apply(&self, c: &Component) -> Result<()> {
        tracing::info!(component = %c.id, kind = %c.kind, "installing");

        for check in &c.pre_deploy {
            self.checks
                .run(c, check)
                .await
                .map_err(|err| Error::action(&c.id, Phase::PreDeploy, err))?;
        }

        let deployed = match c.kind {
            ComponentKind::Namespace => namespace::upsert(self.cluster.as_ref(), c).await,
            ComponentKind::Helm => helm::install(c).await,
            ComponentKind::Yaml => yaml::apply(c).await,
        };
        deployed.map_err(|err| Error::action(&c.id, Phase::Deploy, err))?;

        for check in &c.wait_complete {
            self.checks
                .run(c, check)
                .await
                .map_err(|err| Error::action(&c.id, Phase::WaitComplete, err))?;
        }

        tracing::info!(component = %c.id, "installed");
        Ok(())
    }
}
