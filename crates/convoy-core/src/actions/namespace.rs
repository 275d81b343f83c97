//! Namespace create/merge/delete primitives shared by the actions.

use std::collections::BTreeMap;

use crate::cluster::ClusterOps;
use crate::error::{Error, Result};
use crate::manifest::{Component, ValueKind};

/// Create the component's namespace, or merge its labels and
/// annotations into the existing one. New keys win; unrelated existing
/// keys are preserved.
pub async fn upsert(cluster: &dyn ClusterOps, component: &Component) -> Result<()> {
    let mut labels = BTreeMap::new();
    let mut annotations = BTreeMap::new();
    for value in &component.values {
        match value.kind {
            ValueKind::Label => labels.insert(value.name.clone(), value.value.clone()),
            ValueKind::Annotation => annotations.insert(value.name.clone(), value.value.clone()),
        };
    }

    match cluster
        .create_namespace(&component.namespace, labels.clone(), annotations.clone())
        .await
    {
        Ok(()) => Ok(()),
        Err(Error::AlreadyExists { .. }) => {
            let current = cluster.get_namespace(&component.namespace).await?;

            let mut merged_labels = current.labels;
            merged_labels.extend(labels);
            let mut merged_annotations = current.annotations;
            merged_annotations.extend(annotations);

            cluster
                .update_namespace(&component.namespace, merged_labels, merged_annotations)
                .await
        }
        Err(err) => Err(err),
    }
}

/// Delete the component's namespace. An absent namespace is not an
/// error.
pub async fn delete(cluster: &dyn ClusterOps, component: &Component) -> Result<()> {
    match cluster.delete_namespace(&component.namespace).await {
        Err(Error::NotFound { .. }) => Ok(()),
        other => other,
    }
}
