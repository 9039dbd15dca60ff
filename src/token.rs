//! Asset-transfer collaborator boundary
//!
//! The custody core treats the token as an opaque external ledger: a
//! transfer either moves the full amount from A to B or fails atomically.
//! Any error return is treated as transfer failure by the caller.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::errors::TokenError;
use crate::types::Address;

/// External fungible-asset ledger.
pub trait TokenLedger {
    /// Move `amount` from `from` to `to`. Succeeds or fails atomically.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Decimal)
        -> Result<(), TokenError>;

    /// Current balance of an address.
    fn balance_of(&self, addr: &Address) -> Decimal;
}

/// In-memory reference ledger with overflow-checked balance arithmetic.
///
/// Used by the test suites and by embedding hosts that simulate the
/// external ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<Address, Decimal>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit an address out of thin air (test/bootstrap helper).
    pub fn mint(&mut self, addr: Address, amount: Decimal) -> Result<(), TokenError> {
        let balance = self.balances.entry(addr).or_insert(Decimal::ZERO);
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }
}

impl TokenLedger for InMemoryLedger {
    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        // A self-transfer nets to zero; writing both legs would double-count.
        if from == to {
            return Ok(());
        }

        let debited = available.checked_sub(amount).ok_or(TokenError::Overflow)?;
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        // Both sides computed before either is written, so a failed
        // transfer leaves the ledger untouched.
        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }

    fn balance_of(&self, addr: &Address) -> Decimal {
        self.balances.get(addr).copied().unwrap_or(Decimal::ZERO)
    }
}
