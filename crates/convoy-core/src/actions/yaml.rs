//! Declarative resource sets applied and deleted through kubectl.

use std::path::Path;

use crate::error::{Error, Result};
use crate::exec;
use crate::manifest::Component;

fn path(component: &Component) -> Result<&Path> {
    component
        .source
        .as_ref()
        .and_then(|s| s.path.as_deref())
        .ok_or_else(|| {
            Error::ManifestInvalid(format!(
                "yaml component '{}' has no source.path",
                component.id
            ))
        })
}

/// Apply the component's manifest file. Re-applying an unchanged set is
/// a no-op on the cluster side.
pub async fn apply(component: &Component) -> Result<()> {
    let path = path(component)?;

    let args = vec![
        "apply".to_string(),
        "--namespace".to_string(),
        component.namespace.clone(),
        "--filename".to_string(),
        path.display().to_string(),
    ];

    exec::run("kubectl", &args).await?;
    Ok(())
}

/// Delete the resources in the component's manifest file, tolerating
/// ones already gone.
pub async fn delete(component: &Component) -> Result<()> {
    let path = path(component)?;

    let args = vec![
        "delete".to_string(),
        "--ignore-not-found".to_string(),
        "--namespace".to_string(),
        component.namespace.clone(),
        "--filename".to_string(),
        path.display().to_string(),
    ];

    exec::run("kubectl", &args).await?;
    Ok(())
}
