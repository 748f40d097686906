//! # Delegable Function Description
//!
//! Every callable function carries the capability it requires from the data
//! source and may replace the generic call-node rule with its own.

use std::fmt;
use std::sync::Arc;

use crate::capability::{CapabilityMetadata, DelegationCapability};
use crate::delegation::{ValidationPass, Verdict};
use crate::syntax::CallNode;

/// A function as seen by delegation analysis
pub trait DelegableFunction: Send + Sync {
    /// Invariant name, e.g. `Filter`
    fn name(&self) -> &str;

    /// Capability the function requires from the source table
    fn delegation_capability(&self) -> DelegationCapability {
        DelegationCapability::NONE
    }

    /// Whether this specific row-scoped call can be evaluated by the server.
    fn is_row_scoped_server_delegatable(
        &self,
        _call: &CallNode,
        _cx: &ValidationPass<'_>,
        _metadata: &CapabilityMetadata,
    ) -> bool {
        false
    }

    /// Delegation rule for calls to this function.
    ///
    /// The default is the generic call rule. Overriding replaces it entirely.
    fn validate_call_node(
        &self,
        cx: &ValidationPass<'_>,
        call: &CallNode,
        metadata: &CapabilityMetadata,
    ) -> Verdict {
        cx.generic_call_verdict(call, metadata, false)
    }
}

impl fmt::Debug for dyn DelegableFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegableFunction")
            .field("name", &self.name())
            .field("capability", &self.delegation_capability())
            .finish()
    }
}

/// Function resolved by the binder for a call node
#[derive(Debug, Clone)]
pub struct CallInfo {
    pub function: Arc<dyn DelegableFunction>,
}

impl CallInfo {
    pub fn new(function: Arc<dyn DelegableFunction>) -> Self {
        Self { function }
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }
}
