//! The resource ledger: a non-negative quantity per resource.
//!
//! The [`ResourceLedger`] is a value type. Every change produces a new
//! ledger instead of mutating a shared one, so a caller can stage a whole
//! batch of debits on a working copy and throw it away if any of them
//! fails.
//!
//! # Design
//!
//! - **Non-negative**: quantities are `u32`; a debit below zero is an
//!   error, never a wrap.
//! - **Checked**: credits that would overflow are errors, never a panic.
//! - **Complete**: all four resources are always present, so snapshots
//!   list every key even when the count is zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use foobar_types::Resource;

use crate::LedgerError;

/// Quantities of every resource held by the factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    /// One entry per [`Resource`], in ledger order.
    balances: BTreeMap<Resource, u32>,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLedger {
    /// Create a ledger holding zero of every resource.
    pub fn new() -> Self {
        let balances = Resource::ALL.iter().map(|&r| (r, 0)).collect();
        Self { balances }
    }

    /// Create a ledger from explicit starting quantities.
    ///
    /// Resources missing from `initial` start at zero.
    pub fn with_balances<I>(initial: I) -> Self
    where
        I: IntoIterator<Item = (Resource, u32)>,
    {
        let mut ledger = Self::new();
        for (resource, quantity) in initial {
            ledger.balances.insert(resource, quantity);
        }
        ledger
    }

    /// Quantity of `resource` currently held.
    pub fn get(&self, resource: Resource) -> u32 {
        self.balances.get(&resource).copied().unwrap_or(0)
    }

    /// Whether at least `amount` of `resource` is held.
    pub fn has(&self, resource: Resource, amount: u32) -> bool {
        self.get(resource) >= amount
    }

    /// All balances, in ledger order.
    pub const fn balances(&self) -> &BTreeMap<Resource, u32> {
        &self.balances
    }

    /// Return a ledger with `amount` of `resource` added.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the new quantity would exceed
    /// `u32::MAX`.
    pub fn credit(mut self, resource: Resource, amount: u32) -> Result<Self, LedgerError> {
        let current = self.get(resource);
        let updated = current.checked_add(amount).ok_or(LedgerError::Overflow {
            resource,
            current,
            amount,
        })?;
        self.balances.insert(resource, updated);
        trace!(%resource, amount, balance = updated, "ledger credit");
        Ok(self)
    }

    /// Return a ledger with `amount` of `resource` removed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Insufficient`] if fewer than `amount` units
    /// are held.
    pub fn debit(mut self, resource: Resource, amount: u32) -> Result<Self, LedgerError> {
        let available = self.get(resource);
        let updated = available
            .checked_sub(amount)
            .ok_or(LedgerError::Insufficient {
                resource,
                requested: amount,
                available,
            })?;
        self.balances.insert(resource, updated);
        trace!(%resource, amount, balance = updated, "ledger debit");
        Ok(self)
    }
}
