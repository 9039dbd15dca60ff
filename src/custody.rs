//! Custody core — role admin, recipient change protocol, deposit, direct withdraw
//!
//! The contract holds no balances itself: value lives on the external
//! ledger under the custody account address, and every funds movement is a
//! single atomic transfer through the `TokenLedger` collaborator. What the
//! contract owns is the authorization state: the role registry, the payout
//! recipient and its pending proposal, and the append-only event log.
//!
//! All state-changing operations check, in order:
//! 1. Caller role (or the governance-shutdown override where one exists)
//! 2. Operation preconditions (values, protocol state)
//! 3. External transfer, where applicable; a failed transfer aborts the
//!    operation with zero net state mutation

use rust_decimal::Decimal;

use crate::errors::CustodyError;
use crate::events::{
    CustodyEvent, Deposited, RecipientApproved, RecipientProposed, RoleGranted, RoleRevoked,
    Withdrawn,
};
use crate::governance::LivenessOracle;
use crate::roles::{Role, RoleRegistry};
use crate::token::TokenLedger;
use crate::types::Address;

/// State of the two-phase recipient change protocol.
///
/// Tagged rather than a nullable field, so "no pending proposal" is a
/// type-level fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRecipient {
    /// No proposal outstanding
    Idle,
    /// Proposal awaiting custodian ratification
    Proposed(Address),
}

/// Dual-control custody contract state.
#[derive(Debug, Clone)]
pub struct Custody {
    /// The contract's own address on the external ledger
    account: Address,
    /// Current payout destination. Never empty after construction.
    recipient: Address,
    /// Two-phase recipient change state
    pending: PendingRecipient,
    /// Owner/custodian membership
    roles: RoleRegistry,
    /// Reject revoking a role's final member (off by default)
    guard_last_member: bool,
    /// Emitted events (append-only)
    events: Vec<CustodyEvent>,
}

impl Custody {
    /// Create a custody contract seeded with one owner, one custodian, and
    /// the initial payout recipient.
    ///
    /// Fails with `InvalidRecipient` if the initial recipient is empty.
    pub fn new(
        account: Address,
        initial_owner: Address,
        initial_custodian: Address,
        initial_recipient: Address,
    ) -> Result<Self, CustodyError> {
        if initial_recipient.is_empty() {
            return Err(CustodyError::InvalidRecipient);
        }
        Ok(Self {
            account,
            recipient: initial_recipient,
            pending: PendingRecipient::Idle,
            roles: RoleRegistry::new(initial_owner, initial_custodian),
            guard_last_member: false,
            events: Vec::new(),
        })
    }

    /// Like `new`, but revoking the last member of a role is rejected with
    /// `LastRoleMember`. Diverges from the default accepted-risk behavior.
    pub fn with_last_member_guard(
        account: Address,
        initial_owner: Address,
        initial_custodian: Address,
        initial_recipient: Address,
    ) -> Result<Self, CustodyError> {
        let mut custody = Self::new(account, initial_owner, initial_custodian, initial_recipient)?;
        custody.guard_last_member = true;
        Ok(custody)
    }

    // ───────────────────────── Role Admin ─────────────────────────

    /// Add an owner. Caller must already be an owner. Idempotent.
    pub fn grant_owner(&mut self, caller: &Address, addr: Address) -> Result<(), CustodyError> {
        self.grant_role(Role::Owner, caller, addr)
    }

    /// Remove an owner. Caller must be an owner. Idempotent.
    pub fn revoke_owner(&mut self, caller: &Address, addr: &Address) -> Result<(), CustodyError> {
        self.revoke_role(Role::Owner, caller, addr)
    }

    /// Add a custodian. Caller must already be a custodian. Idempotent.
    pub fn grant_custodian(&mut self, caller: &Address, addr: Address) -> Result<(), CustodyError> {
        self.grant_role(Role::Custodian, caller, addr)
    }

    /// Remove a custodian. Caller must be a custodian. Idempotent.
    pub fn revoke_custodian(
        &mut self,
        caller: &Address,
        addr: &Address,
    ) -> Result<(), CustodyError> {
        self.revoke_role(Role::Custodian, caller, addr)
    }

    /// Check owner membership.
    pub fn is_owner(&self, addr: &Address) -> bool {
        self.roles.contains(Role::Owner, addr)
    }

    /// Check custodian membership.
    pub fn is_custodian(&self, addr: &Address) -> bool {
        self.roles.contains(Role::Custodian, addr)
    }

    fn grant_role(
        &mut self,
        role: Role,
        caller: &Address,
        addr: Address,
    ) -> Result<(), CustodyError> {
        self.require_role(role, caller)?;
        self.roles.grant(role, addr.clone());
        self.events.push(CustodyEvent::RoleGranted(RoleGranted {
            role,
            address: addr,
            granted_by: caller.clone(),
        }));
        Ok(())
    }

    fn revoke_role(
        &mut self,
        role: Role,
        caller: &Address,
        addr: &Address,
    ) -> Result<(), CustodyError> {
        self.require_role(role, caller)?;
        // Roles may be emptied unless the optional guard is enabled.
        if self.guard_last_member
            && self.roles.contains(role, addr)
            && self.roles.count(role) == 1
        {
            return Err(CustodyError::LastRoleMember { role });
        }
        self.roles.revoke(role, addr);
        self.events.push(CustodyEvent::RoleRevoked(RoleRevoked {
            role,
            address: addr.clone(),
            revoked_by: caller.clone(),
        }));
        Ok(())
    }

    fn require_role(&self, role: Role, caller: &Address) -> Result<(), CustodyError> {
        if !self.roles.contains(role, caller) {
            return Err(CustodyError::Unauthorized { role });
        }
        Ok(())
    }

    // ───────────────────────── Recipient Change ─────────────────────────

    /// Propose a new payout recipient. Caller must be an owner and
    /// governance must still be live.
    ///
    /// Re-proposing while a proposal is outstanding replaces it: last
    /// proposal wins, and any approval committed to the old value fails.
    pub fn propose_recipient(
        &mut self,
        oracle: &dyn LivenessOracle,
        caller: &Address,
        new_recipient: Address,
    ) -> Result<(), CustodyError> {
        self.require_role(Role::Owner, caller)?;
        if new_recipient.is_empty() {
            return Err(CustodyError::InvalidRecipient);
        }
        if !oracle.is_live() {
            return Err(CustodyError::GovernanceNotLive);
        }

        self.pending = PendingRecipient::Proposed(new_recipient.clone());
        self.events
            .push(CustodyEvent::RecipientProposed(RecipientProposed {
                proposed: new_recipient,
                proposed_by: caller.clone(),
            }));
        Ok(())
    }

    /// Ratify the pending recipient. Caller must be a custodian and
    /// `confirmed` must equal the pending value exactly: the approval
    /// commits to a specific value, so a proposal swapped in between
    /// read and approval fails instead of being silently ratified.
    pub fn approve_recipient(
        &mut self,
        caller: &Address,
        confirmed: &Address,
    ) -> Result<(), CustodyError> {
        self.require_role(Role::Custodian, caller)?;

        let pending = match &self.pending {
            PendingRecipient::Proposed(addr) => addr.clone(),
            PendingRecipient::Idle => return Err(CustodyError::NoPendingProposal),
        };
        if pending != *confirmed {
            return Err(CustodyError::RecipientMismatch {
                pending: pending.to_string(),
                given: confirmed.to_string(),
            });
        }

        self.recipient = pending.clone();
        self.pending = PendingRecipient::Idle;
        self.events
            .push(CustodyEvent::RecipientApproved(RecipientApproved {
                recipient: pending,
                approved_by: caller.clone(),
            }));
        Ok(())
    }

    // ───────────────────────── Funds Movement ─────────────────────────

    /// Pull `amount` from `from` into custody. Permissionless.
    pub fn deposit(
        &mut self,
        ledger: &mut dyn TokenLedger,
        from: &Address,
        amount: Decimal,
    ) -> Result<CustodyEvent, CustodyError> {
        if amount <= Decimal::ZERO {
            return Err(CustodyError::InvalidAmount);
        }
        ledger.transfer(from, &self.account, amount)?;

        let event = CustodyEvent::Deposited(Deposited {
            from: from.clone(),
            amount,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Immediately transfer `amount` from custody to the recipient.
    ///
    /// This is the non-timelocked withdrawal variant. Caller must be an
    /// owner, except once governance is no longer live: then the call is
    /// permissionless so residual funds can always be swept to the
    /// recipient.
    pub fn withdraw(
        &mut self,
        ledger: &mut dyn TokenLedger,
        oracle: &dyn LivenessOracle,
        caller: &Address,
        amount: Decimal,
    ) -> Result<CustodyEvent, CustodyError> {
        if oracle.is_live() {
            self.require_role(Role::Owner, caller)?;
        }
        if amount <= Decimal::ZERO {
            return Err(CustodyError::InvalidAmount);
        }
        ledger.transfer(&self.account, &self.recipient, amount)?;

        let event = CustodyEvent::Withdrawn(Withdrawn {
            amount,
            recipient: self.recipient.clone(),
            withdrawn_by: caller.clone(),
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// The contract's own ledger address.
    pub fn account(&self) -> &Address {
        &self.account
    }

    /// Current payout recipient.
    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    /// Pending recipient proposal, if any.
    pub fn pending_recipient(&self) -> Option<&Address> {
        match &self.pending {
            PendingRecipient::Proposed(addr) => Some(addr),
            PendingRecipient::Idle => None,
        }
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[CustodyEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<CustodyEvent> {
        std::mem::take(&mut self.events)
    }
}
