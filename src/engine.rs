//! The ledger engine: per-transaction validity predicate and epoch batch
//! acceptance.
//!
//! The engine owns its spendable-output set outright (deep-copied at
//! construction) and is the only writer. `validate`/`is_valid` never mutate
//! state; `apply_epoch` takes `&mut self`, so the borrow checker enforces
//! the single-writer discipline: no validation can observe a half-applied
//! epoch on the same engine.

use std::collections::HashSet;

use log::{debug, trace};
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, VerifyOnly};

use crate::errors::ValidationError;
use crate::transaction::{OutputRef, Transaction};
use crate::utxo_set::UtxoSet;

/// Validates transactions against, and applies them to, a spendable-output
/// set.
pub struct LedgerEngine {
    utxo_set: UtxoSet,
    secp: Secp256k1<VerifyOnly>,
}

impl LedgerEngine {
    /// Create an engine over a deep copy of `initial`; the caller's set is
    /// unaffected by later epochs.
    pub fn new(initial: &UtxoSet) -> Self {
        LedgerEngine {
            utxo_set: initial.clone(),
            secp: Secp256k1::verification_only(),
        }
    }

    /// Read-only view of the current spendable-output set.
    pub fn utxo_set(&self) -> &UtxoSet {
        &self.utxo_set
    }

    /// True iff `tx` is valid against the current spendable-output set.
    /// Pure: repeated calls against an unchanged set return the same answer.
    pub fn is_valid(&self, tx: &Transaction) -> bool {
        self.validate(tx).is_ok()
    }

    /// Rule-by-rule validity check, reporting the first failing rule.
    ///
    /// A transaction is valid iff all of:
    /// 1. every claimed output exists in the current set;
    /// 2. every input's signature verifies against the claimed output's
    ///    owner, over the signable message for that input position;
    /// 3. no output is claimed twice within the transaction;
    /// 4. every produced value is non-negative (guaranteed by `u64`; the
    ///    sums below still use checked arithmetic);
    /// 5. claimed value covers produced value, the surplus being an
    ///    implicit fee.
    ///
    /// Existence is checked before the signature so no cryptographic work is
    /// spent on dead references.
    pub fn validate(&self, tx: &Transaction) -> Result<(), ValidationError> {
        let mut claimed: HashSet<OutputRef> = HashSet::with_capacity(tx.inputs().len());
        let mut input_sum: u64 = 0;

        for (index, input) in tx.inputs().iter().enumerate() {
            let output = self
                .utxo_set
                .get(&input.claimed)
                .ok_or(ValidationError::MissingInput(input.claimed))?;

            let message = tx.signable_message(index as u32);
            if !self.signature_verifies(&message, &input.signature, &output.owner) {
                return Err(ValidationError::BadSignature {
                    input_index: index as u32,
                });
            }

            if !claimed.insert(input.claimed) {
                return Err(ValidationError::DuplicateClaim(input.claimed));
            }

            input_sum = input_sum
                .checked_add(output.value)
                .ok_or(ValidationError::ValueOverflow)?;
        }

        let mut output_sum: u64 = 0;
        for output in tx.outputs() {
            output_sum = output_sum
                .checked_add(output.value)
                .ok_or(ValidationError::ValueOverflow)?;
        }

        if input_sum < output_sum {
            return Err(ValidationError::Unconserved {
                input_sum,
                output_sum,
            });
        }

        Ok(())
    }

    /// Process one epoch: validate and apply a consistent subset of
    /// `candidates`, mutating the spendable-output set in place, and return
    /// the accepted transactions in acceptance order.
    ///
    /// Greedy iterative fixed point: passes repeat over the candidates in
    /// their given order until a full pass accepts nothing. The repetition
    /// exists solely to admit transactions whose inputs are produced by
    /// other candidates accepted earlier in the same epoch; it makes no
    /// attempt to maximize the accepted set. Ties between transactions
    /// claiming the same output go to whichever is evaluated first.
    ///
    /// Deterministic for a fixed candidate order and initial set.
    pub fn apply_epoch(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        let mut accepted: Vec<Transaction> = Vec::new();
        let mut done = vec![false; candidates.len()];

        loop {
            let mut added = 0usize;

            for (slot, tx) in candidates.iter().enumerate() {
                if done[slot] {
                    continue;
                }
                if let Err(reason) = self.validate(tx) {
                    trace!("rejected {:?} this pass: {}", tx.id(), reason);
                    continue;
                }

                // All-or-nothing application. The removals cannot fail:
                // validation just confirmed every claimed output exists and
                // nothing else holds a writer.
                for input in tx.inputs() {
                    self.utxo_set
                        .remove(&input.claimed)
                        .expect("validated input vanished from the spendable set");
                }
                for (index, output) in tx.outputs().iter().enumerate() {
                    self.utxo_set
                        .insert(OutputRef::new(tx.id(), index as u32), output.clone());
                }

                debug!(
                    "accepted {:?} ({} inputs, {} outputs)",
                    tx.id(),
                    tx.inputs().len(),
                    tx.outputs().len()
                );
                accepted.push(tx.clone());
                done[slot] = true;
                added += 1;
            }

            if added == 0 {
                break;
            }
        }

        debug!(
            "epoch complete: accepted {} of {} candidates, {} outputs spendable",
            accepted.len(),
            candidates.len(),
            self.utxo_set.len()
        );
        accepted
    }

    fn signature_verifies(
        &self,
        digest: &[u8; 32],
        signature_hex: &str,
        owner: &PublicKey,
    ) -> bool {
        // Malformed signature material is a rejection, not a fault: an
        // adversarial candidate must never crash the engine.
        let bytes = match hex::decode(signature_hex) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let signature = match Signature::from_compact(&bytes) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        let message = Message::from_slice(digest).expect("digest is 32 bytes");
        self.secp.verify_ecdsa(&message, &signature, owner).is_ok()
    }
}
