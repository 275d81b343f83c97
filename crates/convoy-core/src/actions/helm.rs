//! Helm release management for helm-typed components.
//!
//! The release name is the component id; the chart reference and
//! optional version come from the component's source.

use crate::error::{Error, Result};
use crate::exec;
use crate::manifest::Component;

fn chart(component: &Component) -> Result<&str> {
    component
        .source
        .as_ref()
        .and_then(|s| s.chart.as_deref())
        .ok_or_else(|| {
            Error::ManifestInvalid(format!(
                "helm component '{}' has no source.chart",
                component.id
            ))
        })
}

/// Install the release. `upgrade --install` keeps a re-run of a partly
/// finished installation from failing on releases that already exist.
pub async fn install(component: &Component) -> Result<()> {
    let chart = chart(component)?;

    let mut args = vec![
        "upgrade".to_string(),
        "--install".to_string(),
        "--wait".to_string(),
        component.id.to_string(),
        chart.to_string(),
        "--namespace".to_string(),
        component.namespace.clone(),
    ];
    push_version(&mut args, component);

    exec::run("helm", &args).await?;
    Ok(())
}

/// Upgrade the existing release in place.
pub async fn upgrade(component: &Component) -> Result<()> {
    let chart = chart(component)?;

    let mut args = vec![
        "upgrade".to_string(),
        "--wait".to_string(),
        component.id.to_string(),
        chart.to_string(),
        "--namespace".to_string(),
        component.namespace.clone(),
    ];
    push_version(&mut args, component);

    exec::run("helm", &args).await?;
    Ok(())
}

/// Remove the release.
pub async fn uninstall(component: &Component) -> Result<()> {
    let args = vec![
        "uninstall".to_string(),
        component.id.to_string(),
        "--namespace".to_string(),
        component.namespace.clone(),
    ];

    exec::run("helm", &args).await?;
    Ok(())
}

fn push_version(args: &mut Vec<String>, component: &Component) {
    if let Some(version) = component.source.as_ref().and_then(|s| s.version.as_ref()) {
        args.push("--version".to_string());
        args.push(version.clone());
    }
}
