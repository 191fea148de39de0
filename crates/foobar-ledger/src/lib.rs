//! Resource ledger for the Foobar Factory simulation.
//!
//! Every resource unit in the factory is tracked through the
//! [`ResourceLedger`]. Quantities never go negative and arithmetic never
//! wraps: a shortfall or an overflow comes back as a [`LedgerError`].
//!
//! The ledger has no notion of *why* resources move. Tasks decide that:
//! a task's reservation debits the ledger before it starts and its
//! delivery credits the ledger after it completes. The allocator composes
//! those calls and is the only owner of the live ledger.
//!
//! # Usage
//!
//! ```
//! use foobar_ledger::ResourceLedger;
//! use foobar_types::Resource;
//!
//! let ledger = ResourceLedger::with_balances([(Resource::Foo, 6), (Resource::Money, 3)]);
//!
//! // Stage a debit on a copy; the original is untouched.
//! let staged = ledger.clone().debit(Resource::Foo, 6).ok();
//! assert_eq!(ledger.get(Resource::Foo), 6);
//! assert_eq!(staged.map(|l| l.get(Resource::Foo)), Some(0));
//! ```

pub mod ledger;

pub use ledger::ResourceLedger;

use foobar_types::Resource;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when changing ledger balances.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A debit asked for more than the ledger holds.
    #[error("insufficient {resource}: wanted {requested} but only have {available}")]
    Insufficient {
        /// The resource being debited.
        resource: Resource,
        /// The quantity requested.
        requested: u32,
        /// The quantity actually held.
        available: u32,
    },

    /// A credit would overflow the quantity type.
    #[error("{resource} balance overflow: {current} + {amount}")]
    Overflow {
        /// The resource being credited.
        resource: Resource,
        /// The balance before the credit.
        current: u32,
        /// The quantity being credited.
        amount: u32,
    },
}
