//! Role membership registry
//!
//! Two independent authorization sets: owners (move funds, initiate
//! recipient changes) and custodians (ratify or veto sensitive changes).
//! Each set is administered only by its own members; there is no
//! cross-role administration and no enforced minimum membership — a role
//! can be emptied by its last member, which is accepted behavior.
//!
//! The registry itself performs no caller checks. Authorization lives in
//! the contract entry points (`custody` module), which map missing roles
//! to `CustodyError::Unauthorized`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::types::Address;

/// The two privilege roles of the custody contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Moves funds out and initiates recipient changes
    Owner,
    /// Ratifies recipient changes, vetoes or accelerates withdrawals
    Custodian,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Custodian => write!(f, "custodian"),
        }
    }
}

/// Membership registry for both roles.
///
/// Grant and revoke are idempotent: re-granting a member or revoking an
/// absent address succeeds with no effective change.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    owners: HashSet<Address>,
    custodians: HashSet<Address>,
}

impl RoleRegistry {
    /// Create a registry seeded with one member per role.
    pub fn new(initial_owner: Address, initial_custodian: Address) -> Self {
        let mut owners = HashSet::new();
        owners.insert(initial_owner);
        let mut custodians = HashSet::new();
        custodians.insert(initial_custodian);
        Self { owners, custodians }
    }

    fn set(&self, role: Role) -> &HashSet<Address> {
        match role {
            Role::Owner => &self.owners,
            Role::Custodian => &self.custodians,
        }
    }

    fn set_mut(&mut self, role: Role) -> &mut HashSet<Address> {
        match role {
            Role::Owner => &mut self.owners,
            Role::Custodian => &mut self.custodians,
        }
    }

    /// Check membership.
    pub fn contains(&self, role: Role, addr: &Address) -> bool {
        self.set(role).contains(addr)
    }

    /// Add a member. Returns `true` if the address was newly added.
    pub fn grant(&mut self, role: Role, addr: Address) -> bool {
        self.set_mut(role).insert(addr)
    }

    /// Remove a member. Returns `true` if the address was present.
    pub fn revoke(&mut self, role: Role, addr: &Address) -> bool {
        self.set_mut(role).remove(addr)
    }

    /// Current member count for a role.
    pub fn count(&self, role: Role) -> usize {
        self.set(role).len()
    }
}
