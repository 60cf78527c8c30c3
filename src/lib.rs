//! # UTXO ledger core
//!
//! Transaction-validation and ledger-state-transition core for a minimal
//! single-node ledger: a spendable-output set plus an engine that decides
//! which proposed transactions are valid and applies a consistent subset.
//!
//! ## Modules
//!
//! * `transaction` - transaction, input/output and identifier types
//! * `utxo_set` - the spendable-output set
//! * `engine` - validity predicate and epoch batch acceptance
//! * `errors` - validation and output-set error types
//! * `wallet` - key management, transaction construction and signing

pub mod engine;
pub mod errors;
pub mod transaction;
pub mod utxo_set;
pub mod wallet;

pub use engine::LedgerEngine;
pub use errors::{UtxoError, ValidationError};
pub use transaction::{OutputRef, Transaction, TxId, TxInput, TxOutput};
pub use utxo_set::UtxoSet;
pub use wallet::Wallet;
