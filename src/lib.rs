//! Smart Contract Logic for Dual-Control Asset Custody
//!
//! This crate implements a custody contract gating movement of a fungible
//! asset between a deposit path and a single designated recipient, under
//! split control of an owner role and a custodian role.
//!
//! # Modules
//! - `types`: Address identifier type
//! - `errors`: Contract-specific error types
//! - `events`: Structured notification records emitted by every mutating operation
//! - `roles`: Self-administered owner/custodian membership registry
//! - `token`: Asset-transfer collaborator (external ledger boundary)
//! - `governance`: Governance-liveness oracle boundary
//! - `custody`: Custody core — role admin, recipient change protocol, deposit, direct withdraw
//! - `withdrawal`: Time-locked withdrawal request protocol
//!
//! # Version
//! v0.1.0 — initial implementation

pub mod custody;
pub mod errors;
pub mod events;
pub mod governance;
pub mod roles;
pub mod token;
pub mod types;
pub mod withdrawal;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
