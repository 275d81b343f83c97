//! Lifecycle actions applied to one component at a time.

mod helm;
mod install;
mod namespace;
mod uninstall;
mod upgrade;
mod yaml;

pub use install::Install;
pub use uninstall::Uninstall;
pub use upgrade::Upgrade;
