//! Walks the component dependency forest, applying an action per node.
//!
//! Three execution policies share one [`Action`] capability: a serial
//! walk over a prebuilt plan, a concurrent forward walk honoring `needs`
//! edges, and a concurrent reverse walk for teardown where a node only
//! runs once everything that needs it is gone.
//!
//! The concurrent walkers use a dependency-counter scheduler: every node
//! holds the count of edges still blocking it, a completed node
//! decrements its neighbors, and a count reaching zero dispatches the
//! node into the in-flight set. The first error stops new dispatches and
//! is returned once in-flight work has drained.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::error::{Error, Result};
use crate::manifest::{Component, ComponentId, Components};
use crate::plan::Plan;

/// A named effect applied to one component.
#[async_trait]
pub trait Action: Send + Sync {
    async fn apply(&self, component: &Component) -> Result<()>;
}

/// Apply the action to each component in plan order, one at a time.
/// The first error aborts immediately.
pub async fn walk_serially(plan: &Plan, action: &dyn Action) -> Result<()> {
    for c in plan {
        if let Err(err) = action.apply(c).await {
            tracing::error!(component = %c.id, error = %err, "apply failed");
            return Err(err);
        }
    }
    Ok(())
}

async fn dispatch<'a>(
    action: &'a dyn Action,
    component: &'a Component,
) -> (&'a ComponentId, Result<()>) {
    (&component.id, action.apply(component).await)
}

/// Apply the action to all components concurrently, honoring `needs`:
/// a component runs only strictly after its declared predecessor has
/// completed, and is dispatched at most once. Components without a
/// relative ordering run concurrently.
///
/// After the first failure no new component is dispatched; components
/// already in flight run to completion, and the first error is returned.
pub async fn walk(components: &Components, action: &dyn Action) -> Result<()> {
    // count of unmet predecessors per node, dependents per node,
    // both in declaration order
    let mut blocked: HashMap<&ComponentId, usize> = HashMap::new();
    let mut dependents: HashMap<&ComponentId, Vec<&Component>> = HashMap::new();

    for c in components {
        blocked.insert(&c.id, 0);
    }
    for c in components {
        if let Some(needs) = &c.needs {
            if !blocked.contains_key(needs) {
                return Err(Error::ManifestInvalid(format!(
                    "component '{}' needs unknown component '{}'",
                    c.id, needs
                )));
            }
            blocked.insert(&c.id, 1);
            dependents.entry(needs).or_default().push(c);
        }
    }

    let mut in_flight = FuturesUnordered::new();
    for c in components {
        if blocked[&c.id] == 0 {
            in_flight.push(dispatch(action, c));
        }
    }

    let mut first_err: Option<Error> = None;
    while let Some((id, result)) = in_flight.next().await {
        match result {
            Ok(()) => {
                for dep in dependents.remove(id).unwrap_or_default() {
                    if let Some(count) = blocked.get_mut(&dep.id) {
                        *count -= 1;
                        if *count == 0 && first_err.is_none() {
                            in_flight.push(dispatch(action, dep));
                        }
                    }
                }
            }
            Err(err) => {
                tracing::error!(component = %id, error = %err, "apply failed");
                first_err.get_or_insert(err);
            }
        }
    }

    match first_err {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Apply the action to all components concurrently in dependency-inverted
/// order: a component runs only once every component naming it as `needs`
/// has completed. Components with no dependents run immediately.
///
/// Error handling matches [`walk`]: no new dispatches after the first
/// failure, in-flight work drains, the first error is returned.
pub async fn reverse_walk(components: &Components, action: &dyn Action) -> Result<()> {
    // count of dependents still standing per node
    let mut blocked: HashMap<&ComponentId, usize> = HashMap::new();
    let mut by_id: HashMap<&ComponentId, &Component> = HashMap::new();

    for c in components {
        blocked.insert(&c.id, 0);
        by_id.insert(&c.id, c);
    }
    for c in components {
        if let Some(needs) = &c.needs {
            match blocked.get_mut(needs) {
                Some(count) => *count += 1,
                None => {
                    return Err(Error::ManifestInvalid(format!(
                        "component '{}' needs unknown component '{}'",
                        c.id, needs
                    )));
                }
            }
        }
    }

    let mut in_flight = FuturesUnordered::new();
    for c in components {
        if blocked[&c.id] == 0 {
            in_flight.push(dispatch(action, c));
        }
    }

    let mut first_err: Option<Error> = None;
    while let Some((id, result)) = in_flight.next().await {
        match result {
            Ok(()) => {
                let needs = by_id.get(id).and_then(|c| c.needs.as_ref());
                if let Some(needs) = needs {
                    if let Some(count) = blocked.get_mut(needs) {
                        *count -= 1;
                        if *count == 0 && first_err.is_none() {
                            if let Some(&predecessor) = by_id.get(needs) {
                                in_flight.push(dispatch(action, predecessor));
                            }
                        }
                    }
                }
            }
            Err(err) => {
                tracing::error!(component = %id, error = %err, "apply failed");
                first_err.get_or_insert(err);
            }
        }
    }

    match first_err {
        None => Ok(()),
        Some(err) => Err(err),
    }
}
