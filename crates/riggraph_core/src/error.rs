// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application-level error taxonomy for the handle layer.

use crate::host::HostError;

/// Convenience result alias for handle-layer operations.
pub type Result<T> = std::result::Result<T, RigError>;

/// Errors raised by the handle layer.
///
/// Lookup misses are not errors; they surface as null plugs or empty
/// selections and callers test for them. Everything here is either a
/// named, recoverable condition or an opaque host rejection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RigError {
    /// Non-forced connect into a destination that already has a source.
    /// The existing connection is left intact.
    #[error("plug {dest} is already connected")]
    AlreadyConnected {
        /// Display name of the occupied destination plug
        dest: String,
    },

    /// Container operation on a node that is not one of its members.
    #[error("{node} is not a member of container {container}")]
    NotAMember {
        /// Display name of the offending node
        node: String,
        /// Display name of the container
        container: String,
    },

    /// Hierarchy operation on a handle with no structural capability,
    /// in strict (non-safe) mode.
    #[error("{what} has no hierarchy capability")]
    NotHierarchical {
        /// Display name of the offending handle
        what: String,
    },

    /// Dereference of the null plug sentinel.
    #[error("operation on a null plug")]
    NullPlug,

    /// The host engine refused the request; fatal to the operation.
    #[error(transparent)]
    Host(#[from] HostError),
}
