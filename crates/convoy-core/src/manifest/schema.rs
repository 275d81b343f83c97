//! Manifest schema: components, their dependency edges, and the
//! readiness checks gating each lifecycle phase.
//!
//! A manifest is loaded once per command invocation and is read-only from
//! then on; the walkers keep their own per-run bookkeeping.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Unique component identifier within a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// What kind of deployable unit a component is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// A bare namespace carrying labels/annotations from `values`.
    Namespace,
    /// A packaged chart release.
    Helm,
    /// A set of declarative resources applied from a file.
    Yaml,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComponentKind::Namespace => "namespace",
            ComponentKind::Helm => "helm",
            ComponentKind::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// Readiness condition type.
///
/// Unrecognized names are preserved in `Other` instead of failing the
/// parse; whether they are tolerated at run time is decided by the
/// check runner's policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckKind {
    Pod,
    Loadbalancer,
    Crd,
    Job,
    Other(String),
}

impl CheckKind {
    pub fn as_str(&self) -> &str {
        match self {
            CheckKind::Pod => "pod",
            CheckKind::Loadbalancer => "loadbalancer",
            CheckKind::Crd => "crd",
            CheckKind::Job => "job",
            CheckKind::Other(name) => name,
        }
    }
}

impl<'de> Deserialize<'de> for CheckKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "pod" => CheckKind::Pod,
            "loadbalancer" => CheckKind::Loadbalancer,
            "crd" => CheckKind::Crd,
            "job" => CheckKind::Job,
            _ => CheckKind::Other(name),
        })
    }
}

impl Serialize for CheckKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One readiness condition gating a phase transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    #[serde(rename = "type")]
    pub kind: CheckKind,

    /// Label selector or resource name, depending on `kind`.
    pub selector: String,

    /// Overrides the owning component's namespace when set.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Whether a manifest value becomes a label or an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Label,
    Annotation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Value {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub value: String,
}

/// Where a component's payload comes from: a chart reference for helm
/// components, a manifest file path for yaml components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSource {
    #[serde(default)]
    pub chart: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// One deployable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,

    #[serde(rename = "type")]
    pub kind: ComponentKind,

    pub namespace: String,

    /// Single declared predecessor; the relation forms a forest.
    #[serde(default)]
    pub needs: Option<ComponentId>,

    #[serde(default)]
    pub source: Option<ComponentSource>,

    #[serde(default)]
    pub values: Vec<Value>,

    #[serde(default)]
    pub pre_deploy: Vec<Check>,

    #[serde(default)]
    pub pre_delete: Vec<Check>,

    #[serde(default)]
    pub pre_upgrade: Vec<Check>,

    #[serde(default)]
    pub wait_complete: Vec<Check>,
}

/// Ordered component set, preserving author-declared order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Components(Vec<Component>);

impl Components {
    pub fn new(components: Vec<Component>) -> Self {
        Self(components)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.0.iter().find(|c| &c.id == id)
    }

    pub fn ids(&self) -> Vec<&ComponentId> {
        self.0.iter().map(|c| &c.id).collect()
    }
}

impl<'a> IntoIterator for &'a Components {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Root manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub components: Components,
}

impl Manifest {
    /// Validate structural invariants after parsing.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for c in &self.components {
            if !seen.insert(&c.id) {
                return Err(Error::ManifestInvalid(format!(
                    "duplicate component id '{}'",
                    c.id
                )));
            }
        }

        for c in &self.components {
            if let Some(needs) = &c.needs {
                if needs == &c.id {
                    return Err(Error::ManifestInvalid(format!(
                        "component '{}' needs itself",
                        c.id
                    )));
                }
                if self.components.get(needs).is_none() {
                    return Err(Error::ManifestInvalid(format!(
                        "component '{}' needs unknown component '{}'",
                        c.id, needs
                    )));
                }
            }

            match c.kind {
                ComponentKind::Helm => {
                    if c.source.as_ref().and_then(|s| s.chart.as_ref()).is_none() {
                        return Err(Error::ManifestInvalid(format!(
                            "helm component '{}' has no source.chart",
                            c.id
                        )));
                    }
                }
                ComponentKind::Yaml => {
                    if c.source.as_ref().and_then(|s| s.path.as_ref()).is_none() {
                        return Err(Error::ManifestInvalid(format!(
                            "yaml component '{}' has no source.path",
                            c.id
                        )));
                    }
                }
                ComponentKind::Namespace => {}
            }
        }

        Ok(())
    }
}
