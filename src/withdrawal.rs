//! Time-locked withdrawal request protocol
//!
//! A single in-flight request slot with competing resolution paths:
//! - `cancel` by an owner while governance is live
//! - `deny` by a custodian inside the lock window while governance is live
//! - `execute` by a custodian at any time, by anyone once the lock window
//!   has passed, or by anyone immediately once governance is no longer live
//!
//! Timelock tie-break, uniform across every comparison: the boundary
//! instant `requested_at + timelock` itself still counts as locked
//! (custodian-exclusive); only strictly later instants are open to anyone.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::custody::Custody;
use crate::errors::CustodyError;
use crate::events::{
    CustodyEvent, WithdrawalCancelled, WithdrawalDenied, WithdrawalExecuted, WithdrawalRequested,
};
use crate::governance::LivenessOracle;
use crate::roles::Role;
use crate::token::TokenLedger;
use crate::types::Address;

/// Default lock duration: 24 hours.
pub const DEFAULT_WITHDRAWAL_TIMELOCK_SECS: i64 = 86_400;

/// An outstanding withdrawal request.
///
/// Amount and timestamp live in one record inside an `Option`, so the
/// both-or-neither invariant of the slot holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub request_id: Uuid,
    pub amount: Decimal,
    pub requested_at: i64,
}

/// Single-slot withdrawal request state machine.
///
/// Operates on a [`Custody`] core passed per call, the way the host
/// environment dispatches each contract invocation.
#[derive(Debug, Clone)]
pub struct WithdrawalSlot {
    request: Option<WithdrawalRequest>,
    /// Lock duration in seconds
    timelock_secs: i64,
    /// Emitted events (append-only)
    events: Vec<CustodyEvent>,
}

impl WithdrawalSlot {
    /// Create an empty slot with the given lock duration.
    pub fn new(timelock_secs: i64) -> Self {
        Self {
            request: None,
            timelock_secs,
            events: Vec::new(),
        }
    }

    /// Create an empty slot with the default 24-hour lock.
    pub fn with_default_timelock() -> Self {
        Self::new(DEFAULT_WITHDRAWAL_TIMELOCK_SECS)
    }

    /// Open a withdrawal request for `amount`.
    ///
    /// Caller must be an owner; once governance is no longer live the call
    /// is permissionless (emergency path). Exactly one request may be in
    /// flight: a second request fails with `PendingWithdrawalExists`.
    pub fn request_withdrawal(
        &mut self,
        custody: &Custody,
        oracle: &dyn LivenessOracle,
        caller: &Address,
        amount: Decimal,
        current_time: i64,
    ) -> Result<CustodyEvent, CustodyError> {
        if oracle.is_live() && !custody.is_owner(caller) {
            return Err(CustodyError::Unauthorized { role: Role::Owner });
        }
        if amount <= Decimal::ZERO {
            return Err(CustodyError::InvalidAmount);
        }
        if self.request.is_some() {
            return Err(CustodyError::PendingWithdrawalExists);
        }

        let request = WithdrawalRequest {
            request_id: Uuid::now_v7(),
            amount,
            requested_at: current_time,
        };
        let event = CustodyEvent::WithdrawalRequested(WithdrawalRequested {
            request_id: request.request_id,
            amount,
            requested_by: caller.clone(),
            requested_at: current_time,
        });
        self.request = Some(request);
        self.events.push(event.clone());
        Ok(event)
    }

    /// Cancel the pending request. Owner-only, and only while governance
    /// is live: after shutdown the request is irrevocable by the owner so
    /// the recipient's path to the funds survives.
    pub fn cancel_withdrawal(
        &mut self,
        custody: &Custody,
        oracle: &dyn LivenessOracle,
        caller: &Address,
    ) -> Result<CustodyEvent, CustodyError> {
        if !custody.is_owner(caller) {
            return Err(CustodyError::Unauthorized { role: Role::Owner });
        }
        let request = match &self.request {
            Some(req) => req,
            None => return Err(CustodyError::NoPendingWithdrawal),
        };
        if !oracle.is_live() {
            return Err(CustodyError::GovernanceNotLive);
        }

        let event = CustodyEvent::WithdrawalCancelled(WithdrawalCancelled {
            request_id: request.request_id,
            cancelled_by: caller.clone(),
        });
        self.request = None;
        self.events.push(event.clone());
        Ok(event)
    }

    /// Veto the pending request. Custodian-only, only while governance is
    /// live, and only inside the lock window: at the boundary instant the
    /// veto still succeeds, one second later it fails `TimelockExpired`.
    pub fn deny_withdrawal(
        &mut self,
        custody: &Custody,
        oracle: &dyn LivenessOracle,
        caller: &Address,
        current_time: i64,
    ) -> Result<CustodyEvent, CustodyError> {
        if !custody.is_custodian(caller) {
            return Err(CustodyError::Unauthorized {
                role: Role::Custodian,
            });
        }
        let request = match &self.request {
            Some(req) => req,
            None => return Err(CustodyError::NoPendingWithdrawal),
        };
        if !oracle.is_live() {
            return Err(CustodyError::GovernanceNotLive);
        }
        if current_time > request.requested_at + self.timelock_secs {
            return Err(CustodyError::TimelockExpired);
        }

        let event = CustodyEvent::WithdrawalDenied(WithdrawalDenied {
            request_id: request.request_id,
            denied_by: caller.clone(),
        });
        self.request = None;
        self.events.push(event.clone());
        Ok(event)
    }

    /// Execute the pending request: pay the recorded amount to the
    /// current recipient.
    ///
    /// Authorized for a custodian at any time, for anyone strictly after
    /// the lock window, and for anyone immediately once governance is no
    /// longer live.
    pub fn execute_withdrawal(
        &mut self,
        custody: &Custody,
        ledger: &mut dyn TokenLedger,
        oracle: &dyn LivenessOracle,
        caller: &Address,
        current_time: i64,
    ) -> Result<CustodyEvent, CustodyError> {
        let unlocks_at = match &self.request {
            Some(req) => req.requested_at + self.timelock_secs,
            None => return Err(CustodyError::NoPendingWithdrawal),
        };
        if !custody.is_custodian(caller) && oracle.is_live() && current_time <= unlocks_at {
            return Err(CustodyError::TimelockActive { unlocks_at });
        }

        // Clear the slot before the external call so the same request can
        // never pay out twice; restore it only if the transfer fails, so a
        // failed operation has zero net state mutation.
        let request = match self.request.take() {
            Some(req) => req,
            None => return Err(CustodyError::NoPendingWithdrawal),
        };
        if let Err(err) = ledger.transfer(custody.account(), custody.recipient(), request.amount) {
            self.request = Some(request);
            return Err(err.into());
        }

        let event = CustodyEvent::WithdrawalExecuted(WithdrawalExecuted {
            request_id: request.request_id,
            amount: request.amount,
            recipient: custody.recipient().clone(),
            executed_by: caller.clone(),
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// The outstanding request, if any.
    pub fn request(&self) -> Option<&WithdrawalRequest> {
        self.request.as_ref()
    }

    /// Lock duration in seconds.
    pub fn timelock_secs(&self) -> i64 {
        self.timelock_secs
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[CustodyEvent] {
        &self.events
    }

    /// Drain all events.
    pub fn drain_events(&mut self) -> Vec<CustodyEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::GovernanceFlag;
    use crate::token::InMemoryLedger;

    const TIMELOCK: i64 = 3600;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    fn setup() -> (Custody, WithdrawalSlot, InMemoryLedger, GovernanceFlag) {
        let custody =
            Custody::new(addr("custody"), addr("owner"), addr("cust"), addr("recipient")).unwrap();
        let slot = WithdrawalSlot::new(TIMELOCK);
        let mut ledger = InMemoryLedger::new();
        ledger.mint(addr("custody"), Decimal::from(1000)).unwrap();
        (custody, slot, ledger, GovernanceFlag::new())
    }

    // ─── Request ───

    #[test]
    fn test_request_by_owner() {
        let (custody, mut slot, _ledger, flag) = setup();
        let event = slot
            .request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(100), 1000)
            .unwrap();
        assert!(matches!(event, CustodyEvent::WithdrawalRequested(_)));

        let request = slot.request().unwrap();
        assert_eq!(request.amount, Decimal::from(100));
        assert_eq!(request.requested_at, 1000);
    }

    #[test]
    fn test_request_by_non_owner_while_live() {
        let (custody, mut slot, _ledger, flag) = setup();
        let result =
            slot.request_withdrawal(&custody, &flag, &addr("rando"), Decimal::from(1), 1000);
        assert_eq!(result, Err(CustodyError::Unauthorized { role: Role::Owner }));
    }

    #[test]
    fn test_request_permissionless_after_shutdown() {
        let (custody, mut slot, _ledger, mut flag) = setup();
        flag.shut_down();
        slot.request_withdrawal(&custody, &flag, &addr("rando"), Decimal::from(1), 1000)
            .unwrap();
        assert!(slot.request().is_some());
    }

    #[test]
    fn test_request_zero_amount() {
        let (custody, mut slot, _ledger, flag) = setup();
        let result = slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::ZERO, 1000);
        assert_eq!(result, Err(CustodyError::InvalidAmount));
    }

    #[test]
    fn test_single_slot_exclusion() {
        let (custody, mut slot, _ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        let result =
            slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(2), 1001);
        assert_eq!(result, Err(CustodyError::PendingWithdrawalExists));
        // The original request is untouched
        assert_eq!(slot.request().unwrap().amount, Decimal::from(1));
    }

    // ─── Cancel ───

    #[test]
    fn test_cancel_by_owner() {
        let (custody, mut slot, _ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        let event = slot.cancel_withdrawal(&custody, &flag, &addr("owner")).unwrap();
        assert!(matches!(event, CustodyEvent::WithdrawalCancelled(_)));
        assert!(slot.request().is_none());
    }

    #[test]
    fn test_cancel_requires_owner() {
        let (custody, mut slot, _ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        let result = slot.cancel_withdrawal(&custody, &flag, &addr("cust"));
        assert_eq!(result, Err(CustodyError::Unauthorized { role: Role::Owner }));
    }

    #[test]
    fn test_cancel_without_request() {
        let (custody, mut slot, _ledger, flag) = setup();
        let result = slot.cancel_withdrawal(&custody, &flag, &addr("owner"));
        assert_eq!(result, Err(CustodyError::NoPendingWithdrawal));
    }

    #[test]
    fn test_cancel_blocked_after_shutdown() {
        let (custody, mut slot, _ledger, mut flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        flag.shut_down();
        // The request becomes irrevocable by the owner
        let result = slot.cancel_withdrawal(&custody, &flag, &addr("owner"));
        assert_eq!(result, Err(CustodyError::GovernanceNotLive));
        assert!(slot.request().is_some());
    }

    // ─── Deny ───

    #[test]
    fn test_deny_within_window() {
        let (custody, mut slot, _ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(100), 1000)
            .unwrap();
        let event = slot
            .deny_withdrawal(&custody, &flag, &addr("cust"), 1000 + TIMELOCK / 2)
            .unwrap();
        assert!(matches!(event, CustodyEvent::WithdrawalDenied(_)));
        assert!(slot.request().is_none());
    }

    #[test]
    fn test_deny_at_exact_boundary_still_allowed() {
        let (custody, mut slot, _ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        slot.deny_withdrawal(&custody, &flag, &addr("cust"), 1000 + TIMELOCK)
            .unwrap();
        assert!(slot.request().is_none());
    }

    #[test]
    fn test_deny_after_window_expired() {
        let (custody, mut slot, _ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        let result = slot.deny_withdrawal(&custody, &flag, &addr("cust"), 1000 + TIMELOCK + 1);
        assert_eq!(result, Err(CustodyError::TimelockExpired));
        assert!(slot.request().is_some());
    }

    #[test]
    fn test_deny_requires_custodian() {
        let (custody, mut slot, _ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        let result = slot.deny_withdrawal(&custody, &flag, &addr("owner"), 1001);
        assert_eq!(
            result,
            Err(CustodyError::Unauthorized {
                role: Role::Custodian
            })
        );
    }

    #[test]
    fn test_deny_blocked_after_shutdown() {
        let (custody, mut slot, _ledger, mut flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        flag.shut_down();
        // The custodian cannot block withdrawals post-shutdown
        let result = slot.deny_withdrawal(&custody, &flag, &addr("cust"), 1001);
        assert_eq!(result, Err(CustodyError::GovernanceNotLive));
        assert!(slot.request().is_some());
    }

    // ─── Execute ───

    #[test]
    fn test_execute_by_custodian_inside_window() {
        let (custody, mut slot, mut ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(100), 1000)
            .unwrap();
        let event = slot
            .execute_withdrawal(&custody, &mut ledger, &flag, &addr("cust"), 1001)
            .unwrap();
        assert!(matches!(event, CustodyEvent::WithdrawalExecuted(_)));
        assert!(slot.request().is_none());
        assert_eq!(ledger.balance_of(&addr("recipient")), Decimal::from(100));
        assert_eq!(ledger.balance_of(&addr("custody")), Decimal::from(900));
    }

    #[test]
    fn test_execute_by_anyone_locked_at_boundary() {
        let (custody, mut slot, mut ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        let result = slot.execute_withdrawal(
            &custody,
            &mut ledger,
            &flag,
            &addr("rando"),
            1000 + TIMELOCK,
        );
        assert_eq!(
            result,
            Err(CustodyError::TimelockActive {
                unlocks_at: 1000 + TIMELOCK
            })
        );
        assert!(slot.request().is_some());
    }

    #[test]
    fn test_execute_by_anyone_open_after_boundary() {
        let (custody, mut slot, mut ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        slot.execute_withdrawal(
            &custody,
            &mut ledger,
            &flag,
            &addr("rando"),
            1000 + TIMELOCK + 1,
        )
        .unwrap();
        assert_eq!(ledger.balance_of(&addr("recipient")), Decimal::from(1));
    }

    #[test]
    fn test_execute_permissionless_after_shutdown_bypasses_timelock() {
        let (custody, mut slot, mut ledger, mut flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(50), 1000)
            .unwrap();
        flag.shut_down();
        slot.execute_withdrawal(&custody, &mut ledger, &flag, &addr("rando"), 1001)
            .unwrap();
        assert_eq!(ledger.balance_of(&addr("recipient")), Decimal::from(50));
    }

    #[test]
    fn test_execute_without_request() {
        let (custody, mut slot, mut ledger, flag) = setup();
        let result = slot.execute_withdrawal(&custody, &mut ledger, &flag, &addr("cust"), 1000);
        assert_eq!(result, Err(CustodyError::NoPendingWithdrawal));
    }

    #[test]
    fn test_execute_cannot_pay_twice() {
        let (custody, mut slot, mut ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(100), 1000)
            .unwrap();
        slot.execute_withdrawal(&custody, &mut ledger, &flag, &addr("cust"), 1001)
            .unwrap();

        let result = slot.execute_withdrawal(&custody, &mut ledger, &flag, &addr("cust"), 1002);
        assert_eq!(result, Err(CustodyError::NoPendingWithdrawal));
        assert_eq!(ledger.balance_of(&addr("recipient")), Decimal::from(100));
    }

    #[test]
    fn test_execute_transfer_failure_restores_request() {
        let (custody, mut slot, _ledger, flag) = setup();
        // Fresh empty ledger: the custody account has nothing to pay with
        let mut empty_ledger = InMemoryLedger::new();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(100), 1000)
            .unwrap();

        let result =
            slot.execute_withdrawal(&custody, &mut empty_ledger, &flag, &addr("cust"), 1001);
        assert!(matches!(result, Err(CustodyError::ExternalTransfer(_))));
        // Request restored, no execution event emitted
        assert_eq!(slot.request().unwrap().amount, Decimal::from(100));
        assert_eq!(slot.events().len(), 1); // only the request event
    }

    #[test]
    fn test_execute_pays_current_recipient() {
        let (mut custody, mut slot, mut ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(10), 1000)
            .unwrap();

        // Recipient rotates while the request is pending
        custody
            .propose_recipient(&flag, &addr("owner"), addr("new_recipient"))
            .unwrap();
        custody
            .approve_recipient(&addr("cust"), &addr("new_recipient"))
            .unwrap();

        slot.execute_withdrawal(&custody, &mut ledger, &flag, &addr("cust"), 1001)
            .unwrap();
        assert_eq!(ledger.balance_of(&addr("new_recipient")), Decimal::from(10));
        assert_eq!(ledger.balance_of(&addr("recipient")), Decimal::ZERO);
    }

    #[test]
    fn test_slot_reusable_after_resolution() {
        let (custody, mut slot, mut ledger, flag) = setup();
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(1), 1000)
            .unwrap();
        slot.cancel_withdrawal(&custody, &flag, &addr("owner")).unwrap();

        // A new request can be opened once the previous one is resolved
        slot.request_withdrawal(&custody, &flag, &addr("owner"), Decimal::from(2), 2000)
            .unwrap();
        slot.execute_withdrawal(&custody, &mut ledger, &flag, &addr("cust"), 2001)
            .unwrap();
        assert_eq!(ledger.balance_of(&addr("recipient")), Decimal::from(2));
    }

    #[test]
    fn test_default_timelock() {
        let slot = WithdrawalSlot::with_default_timelock();
        assert_eq!(slot.timelock_secs(), DEFAULT_WITHDRAWAL_TIMELOCK_SECS);
    }
}
