//! Error types shared across the core crate.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::manifest::ComponentId;

pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle phase a component was in when its apply failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreDeploy,
    PreDelete,
    PreUpgrade,
    WaitComplete,
    Deploy,
    Upgrade,
    Delete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::PreDeploy => "pre-deploy checks",
            Phase::PreDelete => "pre-delete checks",
            Phase::PreUpgrade => "pre-upgrade checks",
            Phase::WaitComplete => "wait-complete checks",
            Phase::Deploy => "deploy",
            Phase::Upgrade => "upgrade",
            Phase::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read manifest {path}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid manifest: {0}")]
    ManifestInvalid(String),

    /// The `needs` relation could not be ordered. Reported once, before
    /// any walk starts.
    #[error("dependency cycle involving components: {}", format_ids(.ids))]
    Cycle { ids: Vec<ComponentId> },

    /// One component's apply failed, with the phase it failed in.
    #[error("component '{component}' failed during {phase}")]
    Action {
        component: ComponentId,
        phase: Phase,
        #[source]
        source: Box<Error>,
    },

    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("unknown check type '{0}'")]
    UnknownCheck(String),

    #[error("failed to run '{program}'")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {output}")]
    CommandFailed {
        program: String,
        status: String,
        output: String,
    },

    #[error(transparent)]
    Kube(#[from] kube::Error),
}

impl Error {
    /// Wrap a failure with the component and phase it occurred in.
    pub fn action(component: &ComponentId, phase: Phase, source: Error) -> Self {
        Error::Action {
            component: component.clone(),
            phase,
            source: Box::new(source),
        }
    }

    /// Root component failure wrapped by [`Error::action`], if any.
    pub fn failing_component(&self) -> Option<&ComponentId> {
        match self {
            Error::Action { component, .. } => Some(component),
            _ => None,
        }
    }
}

fn format_ids(ids: &[ComponentId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
