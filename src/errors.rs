//! Error types.
//!
//! A failed validity check is a normal, expected outcome and is reported as
//! a `ValidationError`, never as a panic. `UtxoError` covers misuse of the
//! spendable-output set itself, which indicates a caller bug.

use thiserror::Error;

use crate::transaction::OutputRef;

/// Why a candidate transaction failed the validity predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An input claims an output that is not in the current spendable set.
    #[error("claimed output not in the spendable set: {0:?}")]
    MissingInput(OutputRef),

    /// The signature on an input does not verify against the owner recorded
    /// in the claimed output.
    #[error("signature on input {input_index} does not verify against the recorded owner")]
    BadSignature { input_index: u32 },

    /// The same output is claimed by more than one input of this transaction.
    #[error("output claimed more than once in the same transaction: {0:?}")]
    DuplicateClaim(OutputRef),

    /// An input or output value sum does not fit in u64.
    #[error("value sum overflows u64")]
    ValueOverflow,

    /// Produced value exceeds claimed value.
    #[error("outputs ({output_sum}) exceed claimed inputs ({input_sum})")]
    Unconserved { input_sum: u64, output_sum: u64 },
}

/// Error during spendable-output-set operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UtxoError {
    /// Removal of an output that is not in the set. Normal validation never
    /// takes this path; hitting it means the caller skipped a `contains`
    /// check.
    #[error("output not found: {0:?}")]
    NotFound(OutputRef),
}

/// Result type for spendable-output-set operations.
pub type UtxoResult<T> = Result<T, UtxoError>;
