//! Shared test helpers: a recording stub cluster and component builders.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use convoy_core::cluster::{ClusterOps, NamespaceMeta};
use convoy_core::error::{Error, Result};
use convoy_core::manifest::{Check, CheckKind, Component, ComponentKind, Value, ValueKind};

#[derive(Default)]
struct State {
    namespaces: BTreeMap<String, NamespaceMeta>,
    calls: Vec<String>,
    failing: HashSet<String>,
}

/// In-memory [`ClusterOps`] double. Records every call; readiness waits
/// succeed unless the selector/name was registered as failing.
#[derive(Default)]
pub struct StubCluster {
    state: Mutex<State>,
}

impl StubCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stub whose waits fail for the given selectors/names.
    pub fn failing(selectors: &[&str]) -> Self {
        let stub = Self::default();
        stub.state.lock().unwrap().failing = selectors.iter().map(|s| s.to_string()).collect();
        stub
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn wait_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("wait"))
            .collect()
    }

    pub fn namespace(&self, name: &str) -> Option<NamespaceMeta> {
        self.state.lock().unwrap().namespaces.get(name).cloned()
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.state.lock().unwrap().namespaces.contains_key(name)
    }

    fn wait(&self, call: String, subject: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(subject) {
            return Err(Error::Timeout {
                what: subject.to_string(),
                timeout: Duration::from_secs(1),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterOps for StubCluster {
    async fn wait_for_pod_by_selector(
        &self,
        namespace: &str,
        selector: &str,
        _timeout: Duration,
    ) -> Result<()> {
        self.wait(format!("wait-pod:{namespace}:{selector}"), selector)
    }

    async fn wait_until_service_has_load_balancer(
        &self,
        namespace: &str,
        name: &str,
        _timeout: Duration,
    ) -> Result<()> {
        self.wait(format!("wait-loadbalancer:{namespace}:{name}"), name)
    }

    async fn wait_for_crd(&self, name: &str, _timeout: Duration) -> Result<()> {
        self.wait(format!("wait-crd:{name}"), name)
    }

    async fn wait_for_job_completed(
        &self,
        namespace: &str,
        name: &str,
        _timeout: Duration,
    ) -> Result<()> {
        self.wait(format!("wait-job:{namespace}:{name}"), name)
    }

    async fn create_namespace(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
        annotations: BTreeMap<String, String>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create-namespace:{name}"));
        if state.namespaces.contains_key(name) {
            return Err(Error::AlreadyExists {
                kind: "namespace",
                name: name.to_string(),
            });
        }
        state.namespaces.insert(
            name.to_string(),
            NamespaceMeta {
                labels,
                annotations,
            },
        );
        Ok(())
    }

    async fn get_namespace(&self, name: &str) -> Result<NamespaceMeta> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get-namespace:{name}"));
        state
            .namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "namespace",
                name: name.to_string(),
            })
    }

    async fn update_namespace(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
        annotations: BTreeMap<String, String>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("update-namespace:{name}"));
        state.namespaces.insert(
            name.to_string(),
            NamespaceMeta {
                labels,
                annotations,
            },
        );
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete-namespace:{name}"));
        if state.namespaces.remove(name).is_none() {
            return Err(Error::NotFound {
                kind: "namespace",
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// A namespace-kind component with no checks.
pub fn component(id: &str, needs: Option<&str>) -> Component {
    Component {
        id: id.into(),
        kind: ComponentKind::Namespace,
        namespace: id.to_string(),
        needs: needs.map(Into::into),
        source: None,
        values: Vec::new(),
        pre_deploy: Vec::new(),
        pre_delete: Vec::new(),
        pre_upgrade: Vec::new(),
        wait_complete: Vec::new(),
    }
}

pub fn check(kind: CheckKind, selector: &str) -> Check {
    Check {
        kind,
        selector: selector.to_string(),
        namespace: None,
    }
}

pub fn label(name: &str, value: &str) -> Value {
    Value {
        name: name.to_string(),
        kind: ValueKind::Label,
        value: value.to_string(),
    }
}

pub fn annotation(name: &str, value: &str) -> Value {
    Value {
        name: name.to_string(),
        kind: ValueKind::Annotation,
        value: value.to_string(),
    }
}
