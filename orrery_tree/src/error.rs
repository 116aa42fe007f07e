// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for tree operations that callers may reasonably trigger at runtime.

use core::fmt;

use crate::types::{NodeId, NodeKind};

/// Failure of a structural or kind-specific operation.
///
/// Operations on disposed nodes are not reported here; they panic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// Attaching `node` under `parent` would make `node` its own ancestor.
    WouldCreateCycle {
        /// The node being moved.
        node: NodeId,
        /// The requested parent, which is `node` or one of its descendants.
        parent: NodeId,
    },
    /// The node's kind does not support the requested operation.
    Unsupported {
        /// The node the operation targeted.
        node: NodeId,
        /// Its kind.
        kind: NodeKind,
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WouldCreateCycle { node, parent } => write!(
                f,
                "cannot attach {node:?} under {parent:?}: the parent is inside its subtree"
            ),
            Self::Unsupported {
                node,
                kind,
                operation,
            } => write!(f, "{operation} is not supported by {kind:?} node {node:?}"),
        }
    }
}

impl core::error::Error for SceneError {}
