//! Contract-specific error types
//!
//! Every failure surfaces its specific taxonomy reason so external tooling
//! can distinguish wrong role from wrong timing from bad value. All errors
//! abort the triggering operation with zero state mutation; retries are a
//! caller concern.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::roles::Role;

/// Errors reported by the external token ledger collaborator.
///
/// Any error return is treated as transfer failure by the custody core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    #[error("arithmetic overflow in balance calculation")]
    Overflow,
}

/// Custody contract errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CustodyError {
    #[error("unauthorized: caller is not {role}")]
    Unauthorized { role: Role },

    #[error("invalid recipient: empty address")]
    InvalidRecipient,

    #[error("recipient mismatch: pending {pending}, confirmation given for {given}")]
    RecipientMismatch { pending: String, given: String },

    #[error("no pending recipient proposal")]
    NoPendingProposal,

    #[error("no pending withdrawal request")]
    NoPendingWithdrawal,

    #[error("a withdrawal request is already pending")]
    PendingWithdrawalExists,

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("withdrawal timelock active: open to anyone after {unlocks_at}")]
    TimelockActive { unlocks_at: i64 },

    #[error("withdrawal timelock expired: deny window closed")]
    TimelockExpired,

    #[error("governance is no longer live")]
    GovernanceNotLive,

    #[error("governance is still live")]
    GovernanceStillLive,

    #[error("cannot revoke the last {role} member")]
    LastRoleMember { role: Role },

    #[error("external transfer failed: {0}")]
    ExternalTransfer(#[from] TokenError),
}
