//! Lifecycle planning
//!
//! Pure decision functions: given the identity field, the desired
//! configuration and the current observed state, pick the action a
//! lifecycle call has to perform. No I/O happens here.

use crate::record::Record;

/// Action selected for a single lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Create the remote resource, then describe it
    Create,
    /// Resource is believed to exist; remember the configuration only
    Keep,
    /// Re-read the remote attributes
    Refresh,
    /// Delete the remote resource and clear the state
    Delete,
    /// Nothing to do (configuration incomplete or no resource tracked)
    Skip,
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleAction::Create => write!(f, "create"),
            LifecycleAction::Keep => write!(f, "keep"),
            LifecycleAction::Refresh => write!(f, "refresh"),
            LifecycleAction::Delete => write!(f, "delete"),
            LifecycleAction::Skip => write!(f, "skip"),
        }
    }
}

/// Decide what `deploy` does.
///
/// Desired configuration without an identity is incomplete and skipped.
/// Once the state carries an identity the resource is kept as is; drift
/// between desired and remote configuration is not reconciled.
pub fn plan_deploy(identity_field: &str, desired: &Record, current: &Record) -> LifecycleAction {
    if !desired.has_identity(identity_field) {
        LifecycleAction::Skip
    } else if current.has_identity(identity_field) {
        LifecycleAction::Keep
    } else {
        LifecycleAction::Create
    }
}

/// Decide what `remove` does.
pub fn plan_remove(identity_field: &str, current: &Record) -> LifecycleAction {
    if current.has_identity(identity_field) {
        LifecycleAction::Delete
    } else {
        LifecycleAction::Skip
    }
}

/// Decide what `info` does.
pub fn plan_info(identity_field: &str, current: &Record) -> LifecycleAction {
    if current.has_identity(identity_field) {
        LifecycleAction::Refresh
    } else {
        LifecycleAction::Skip
    }
}
