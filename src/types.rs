//! Identifier types for custody participants
//!
//! Addresses identify every external actor the contract interacts with:
//! role members, depositors, the payout recipient, and the custody account
//! itself on the external ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An external ledger address.
///
/// String-backed, opaque to the contract. The empty string is the ledger's
/// "unset" sentinel and is never stored; operations that accept an address
/// where a real destination is required reject empty input at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create a new address from a string.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Get the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty sentinel form.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}
