//! Governance-liveness oracle boundary
//!
//! The surrounding governance system exposes a single boolean: `false`
//! means it has permanently halted, which opens the contract's
//! permissionless emergency paths. The custody core re-reads the oracle at
//! every gated call and never caches the value.

/// Read-only view of the external governance liveness flag.
pub trait LivenessOracle {
    /// `true` while the surrounding governance system is operating.
    fn is_live(&self) -> bool;
}

/// Reference oracle backed by a plain flag.
///
/// Starts live; `shut_down` flips it permanently, matching the one-way
/// semantics of the external signal.
#[derive(Debug, Clone)]
pub struct GovernanceFlag {
    live: bool,
}

impl GovernanceFlag {
    /// Create a live flag.
    pub fn new() -> Self {
        Self { live: true }
    }

    /// Signal permanent governance shutdown.
    pub fn shut_down(&mut self) {
        self.live = false;
    }
}

impl Default for GovernanceFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessOracle for GovernanceFlag {
    fn is_live(&self) -> bool {
        self.live
    }
}
