//! In-memory manifest model: components, dependency edges, checks.

mod parser;
mod schema;

pub use parser::{load, parse};
pub use schema::{
    Check, CheckKind, Component, ComponentId, ComponentKind, ComponentSource, Components,
    Manifest, Value, ValueKind,
};
