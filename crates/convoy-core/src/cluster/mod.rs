//! Cluster adapter: readiness polling and namespace CRUD.
//!
//! [`ClusterOps`] is the seam the checks runner and the action variants
//! talk to; [`Cluster`] is the kube-client implementation. All waits
//! share one contract: poll at a fixed short interval until the
//! condition holds or the budget elapses, then fail with a timeout.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use tokio::time::{Instant, sleep};

use crate::durations::POLL_INTERVAL;
use crate::error::{Error, Result};

/// Labels and annotations of an existing namespace.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMeta {
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// Cluster operations the installer core depends on.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Wait until at least one pod matches the selector and every
    /// matching pod reports ready.
    async fn wait_for_pod_by_selector(
        &self,
        namespace: &str,
        selector: &str,
        timeout: Duration,
    ) -> Result<()>;

    /// Wait until the named service has at least one external ingress
    /// address.
    async fn wait_until_service_has_load_balancer(
        &self,
        namespace: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<()>;

    /// Wait until the named custom resource definition exists and
    /// reports established.
    async fn wait_for_crd(&self, name: &str, timeout: Duration) -> Result<()>;

    /// Wait until the named batch job reports completed.
    async fn wait_for_job_completed(
        &self,
        namespace: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<()>;

    async fn create_namespace(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
        annotations: BTreeMap<String, String>,
    ) -> Result<()>;

    async fn get_namespace(&self, name: &str) -> Result<NamespaceMeta>;

    async fn update_namespace(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
        annotations: BTreeMap<String, String>,
    ) -> Result<()>;

    async fn delete_namespace(&self, name: &str) -> Result<()>;
}

/// Kubernetes-backed [`ClusterOps`] implementation.
///
/// Built once per command invocation and passed down; there is no
/// process-wide handle.
#[derive(Clone)]
pub struct Cluster {
    client: kube::Client,
}

impl Cluster {
    /// Connect using the default kubeconfig/in-cluster discovery chain.
    pub async fn connect() -> Result<Self> {
        let client = kube::Client::try_default().await?;
        Ok(Self { client })
    }

    pub fn from_client(client: kube::Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl ClusterOps for Cluster {
    async fn wait_for_pod_by_selector(
        &self,
        namespace: &str,
        selector: &str,
        timeout: Duration,
    ) -> Result<()> {
        // A rollout may be in progress when we start looking; wait for
        // pods to exist first, then for all of them to be ready.
        let api = self.pods(namespace);
        let params = ListParams::default().labels(selector);

        let what = format!("pods '{selector}' in '{namespace}' to exist");
        let exists_api = api.clone();
        let exists_params = params.clone();
        poll_until(what, timeout, move || {
            let api = exists_api.clone();
            let params = exists_params.clone();
            async move {
                let pods = api.list(&params).await?;
                Ok(!pods.items.is_empty())
            }
            .boxed()
        })
        .await?;

        let what = format!("pods '{selector}' in '{namespace}' to be ready");
        poll_until(what, timeout, move || {
            let api = api.clone();
            let params = params.clone();
            async move {
                let pods = api.list(&params).await?;
                if pods.items.is_empty() {
                    return Ok(false);
                }
                Ok(pods.items.iter().all(pod_is_ready))
            }
            .boxed()
        })
        .await
    }

    async fn wait_until_service_has_load_balancer(
        &self,
        namespace: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<()> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let name = name.to_string();
        let what = format!("service '{name}' in '{namespace}' to have a load balancer");
        poll_until(what, timeout, move || {
            let api = api.clone();
            let name = name.clone();
            async move {
                let service = api.get(&name).await?;
                let has_ingress = service
                    .status
                    .and_then(|s| s.load_balancer)
                    .and_then(|lb| lb.ingress)
                    .map(|ingress| !ingress.is_empty())
                    .unwrap_or(false);
                Ok(has_ingress)
            }
            .boxed()
        })
        .await
    }

    async fn wait_for_crd(&self, name: &str, timeout: Duration) -> Result<()> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let name = name.to_string();
        let what = format!("custom resource definition '{name}' to be established");
        poll_until(what, timeout, move || {
            let api = api.clone();
            let name = name.clone();
            async move {
                let crd = match api.get(&name).await {
                    Ok(crd) => crd,
                    Err(err) if api_status(&err) == Some(404) => return Ok(false),
                    Err(err) => return Err(err.into()),
                };
                let established = crd
                    .status
                    .and_then(|s| s.conditions)
                    .unwrap_or_default()
                    .iter()
                    .any(|c| c.type_ == "Established" && c.status == "True");
                Ok(established)
            }
            .boxed()
        })
        .await
    }

    async fn wait_for_job_completed(
        &self,
        namespace: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<()> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        let name = name.to_string();
        let what = format!("job '{name}' in '{namespace}' to complete");
        poll_until(what, timeout, move || {
            let api = api.clone();
            let name = name.clone();
            async move {
                let job = api.get(&name).await?;
                let complete = job
                    .status
                    .and_then(|s| s.conditions)
                    .unwrap_or_default()
                    .iter()
                    .any(|c| c.type_ == "Complete" && c.status == "True");
                Ok(complete)
            }
            .boxed()
        })
        .await
    }

    async fn create_namespace(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
        annotations: BTreeMap<String, String>,
    ) -> Result<()> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(labels),
                annotations: Some(annotations),
                ..Default::default()
            },
            ..Default::default()
        };

        match self
            .namespaces()
            .create(&PostParams::default(), &namespace)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if api_status(&err) == Some(409) => Err(Error::AlreadyExists {
                kind: "namespace",
                name: name.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_namespace(&self, name: &str) -> Result<NamespaceMeta> {
        let namespace = match self.namespaces().get(name).await {
            Ok(ns) => ns,
            Err(err) if api_status(&err) == Some(404) => {
                return Err(Error::NotFound {
                    kind: "namespace",
                    name: name.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        Ok(NamespaceMeta {
            labels: namespace.metadata.labels.unwrap_or_default(),
            annotations: namespace.metadata.annotations.unwrap_or_default(),
        })
    }

    async fn update_namespace(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
        annotations: BTreeMap<String, String>,
    ) -> Result<()> {
        let api = self.namespaces();
        // replace needs the live resourceVersion
        let mut namespace = api.get(name).await?;
        namespace.metadata.labels = Some(labels);
        namespace.metadata.annotations = Some(annotations);
        api.replace(name, &PostParams::default(), &namespace)
            .await?;
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        match self
            .namespaces()
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if api_status(&err) == Some(404) => Err(Error::NotFound {
                kind: "namespace",
                name: name.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

/// HTTP status of a Kubernetes API error response, if that is what the
/// error is.
fn api_status(err: &kube::Error) -> Option<u16> {
    match err {
        kube::Error::Api(response) => Some(response.code),
        _ => None,
    }
}

fn pod_is_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
        .unwrap_or(false)
}

async fn poll_until(
    what: String,
    timeout: Duration,
    mut check: impl FnMut() -> BoxFuture<'static, Result<bool>> + Send,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if check().await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::Timeout { what, timeout });
        }
        sleep(POLL_INTERVAL).await;
    }
}
