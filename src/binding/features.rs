//! Feature flags consulted during analysis

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Binder feature flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Features {
    /// Impure nodes may be delegated
    #[serde(default)]
    pub allow_impure_node_delegation: bool,
    /// Async call, first-name and dotted-name nodes may be delegated
    #[serde(default)]
    pub allow_async_delegation: bool,
}

impl Features {
    pub const NONE: Self = Self {
        allow_impure_node_delegation: false,
        allow_async_delegation: false,
    };

    pub const ALLOW_IMPURE_NODE_DELEGATION: Self = Self {
        allow_impure_node_delegation: true,
        allow_async_delegation: false,
    };

    pub const ALLOW_ASYNC_DELEGATION: Self = Self {
        allow_impure_node_delegation: false,
        allow_async_delegation: true,
    };

    /// True if every flag set in `other` is set here
    pub fn has_flag(&self, other: Self) -> bool {
        (!other.allow_impure_node_delegation || self.allow_impure_node_delegation)
            && (!other.allow_async_delegation || self.allow_async_delegation)
    }
}

impl BitOr for Features {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            allow_impure_node_delegation: self.allow_impure_node_delegation
                || rhs.allow_impure_node_delegation,
            allow_async_delegation: self.allow_async_delegation || rhs.allow_async_delegation,
        }
    }
}
