//! Contract events
//!
//! Every mutating operation appends one of these records to the component
//! event log. The log is the auditability surface: external observers
//! reconstruct history from it, so each record carries the operation kind,
//! the acting address, and the amount where applicable. Events are
//! immutable once emitted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;
use crate::types::Address;

/// Role membership granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGranted {
    pub role: Role,
    pub address: Address,
    pub granted_by: Address,
}

/// Role membership revoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRevoked {
    pub role: Role,
    pub address: Address,
    pub revoked_by: Address,
}

/// New payout recipient proposed by an owner, awaiting ratification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientProposed {
    pub proposed: Address,
    pub proposed_by: Address,
}

/// Pending recipient ratified by a custodian and installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientApproved {
    pub recipient: Address,
    pub approved_by: Address,
}

/// Value pulled from a depositor into custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub from: Address,
    pub amount: Decimal,
}

/// Immediate withdrawal to the recipient (non-timelocked variant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub amount: Decimal,
    pub recipient: Address,
    pub withdrawn_by: Address,
}

/// Time-locked withdrawal requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequested {
    pub request_id: Uuid,
    pub amount: Decimal,
    pub requested_by: Address,
    pub requested_at: i64,
}

/// Pending withdrawal cancelled by an owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalCancelled {
    pub request_id: Uuid,
    pub cancelled_by: Address,
}

/// Pending withdrawal vetoed by a custodian inside the lock window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalDenied {
    pub request_id: Uuid,
    pub denied_by: Address,
}

/// Pending withdrawal executed and paid out to the recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalExecuted {
    pub request_id: Uuid,
    pub amount: Decimal,
    pub recipient: Address,
    pub executed_by: Address,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustodyEvent {
    RoleGranted(RoleGranted),
    RoleRevoked(RoleRevoked),
    RecipientProposed(RecipientProposed),
    RecipientApproved(RecipientApproved),
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    WithdrawalRequested(WithdrawalRequested),
    WithdrawalCancelled(WithdrawalCancelled),
    WithdrawalDenied(WithdrawalDenied),
    WithdrawalExecuted(WithdrawalExecuted),
}
