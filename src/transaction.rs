//! Transaction types: identifiers, output references, inputs, outputs and
//! the transaction itself.
//!
//! A transaction's identity is the SHA-256 digest of its serialized content
//! and is fixed at construction. Signatures authorize individual inputs and
//! are computed over a signable message that excludes every signature field,
//! so a signature can never certify signatures.

use std::fmt;

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Transaction identifier: SHA-256 digest of the transaction content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", hex::encode(&self.0[..8]))
    }
}

impl From<[u8; 32]> for TxId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Reference to a specific output of a prior transaction. Key type of the
/// spendable-output set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    /// Transaction that produced the output.
    pub tx_id: TxId,
    /// Position of the output within that transaction.
    pub index: u32,
}

impl OutputRef {
    pub const fn new(tx_id: TxId, index: u32) -> Self {
        Self { tx_id, index }
    }
}

/// A spendable amount locked to a public key. Values are exact unsigned
/// integers in minor units; no floating point enters value arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: u64,
    pub owner: PublicKey,
}

/// A claim against one existing output, authorized by a signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInput {
    /// The output this input spends.
    pub claimed: OutputRef,
    /// Hex-encoded compact ECDSA signature; empty until signed.
    pub signature: String,
}

/// A signed transaction. Fields are read-only after construction so the
/// identifier stays consistent with the content it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TxId,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
}

impl Transaction {
    /// Build a transaction from signed inputs and outputs, deriving its
    /// identifier from the content.
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        let id = Self::content_hash(&inputs, &outputs);
        Transaction { id, inputs, outputs }
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    /// Digest that the owner of the output claimed at `input_index` must
    /// have signed.
    pub fn signable_message(&self, input_index: u32) -> [u8; 32] {
        let claimed: Vec<OutputRef> = self.inputs.iter().map(|input| input.claimed).collect();
        signable_message(input_index, &claimed, &self.outputs)
    }

    fn content_hash(inputs: &[TxInput], outputs: &[TxOutput]) -> TxId {
        let mut hasher = Sha256::new();
        let serialized = serde_json::to_string(&(inputs, outputs))
            .expect("transaction content serializes to JSON");
        hasher.update(serialized.as_bytes());
        TxId(hasher.finalize().into())
    }
}

/// Everything a signature covers: the position being signed, every claimed
/// output reference and every produced output. Signature fields never enter
/// the signed bytes.
#[derive(Serialize)]
struct SignablePayload<'a> {
    input_index: u32,
    claimed: &'a [OutputRef],
    outputs: &'a [TxOutput],
}

/// Canonical signable message for one input position. Free function so it is
/// usable both when signing (before the final `Transaction` exists) and when
/// verifying.
pub fn signable_message(input_index: u32, claimed: &[OutputRef], outputs: &[TxOutput]) -> [u8; 32] {
    let payload = SignablePayload {
        input_index,
        claimed,
        outputs,
    };
    let mut hasher = Sha256::new();
    let serialized =
        serde_json::to_string(&payload).expect("signable payload serializes to JSON");
    hasher.update(serialized.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_owner() -> PublicKey {
        let secp = secp256k1::Secp256k1::new();
        let (_, public_key) = secp.generate_keypair(&mut rand::thread_rng());
        public_key
    }

    #[test]
    fn id_is_deterministic_for_same_content() {
        let owner = some_owner();
        let input = TxInput {
            claimed: OutputRef::new(TxId::new([7u8; 32]), 0),
            signature: String::from("00"),
        };
        let output = TxOutput { value: 50, owner };

        let tx_a = Transaction::new(vec![input.clone()], vec![output.clone()]);
        let tx_b = Transaction::new(vec![input], vec![output]);

        assert_eq!(tx_a.id(), tx_b.id());
    }

    #[test]
    fn id_changes_with_content() {
        let owner = some_owner();
        let input = TxInput {
            claimed: OutputRef::new(TxId::new([7u8; 32]), 0),
            signature: String::from("00"),
        };
        let tx_a = Transaction::new(vec![input.clone()], vec![TxOutput { value: 50, owner }]);
        let tx_b = Transaction::new(vec![input], vec![TxOutput { value: 51, owner }]);

        assert_ne!(tx_a.id(), tx_b.id());
    }

    #[test]
    fn signable_message_excludes_signatures() {
        let owner = some_owner();
        let claimed = OutputRef::new(TxId::new([7u8; 32]), 0);
        let outputs = vec![TxOutput { value: 50, owner }];

        let tx_a = Transaction::new(
            vec![TxInput {
                claimed,
                signature: String::from("aa"),
            }],
            outputs.clone(),
        );
        let tx_b = Transaction::new(
            vec![TxInput {
                claimed,
                signature: String::from("bb"),
            }],
            outputs,
        );

        // Different signatures, same signed bytes, different identifiers.
        assert_eq!(tx_a.signable_message(0), tx_b.signable_message(0));
        assert_ne!(tx_a.id(), tx_b.id());
    }

    #[test]
    fn signable_message_identifies_the_position() {
        let owner = some_owner();
        let claimed = vec![
            OutputRef::new(TxId::new([1u8; 32]), 0),
            OutputRef::new(TxId::new([2u8; 32]), 1),
        ];
        let outputs = vec![TxOutput { value: 10, owner }];

        assert_ne!(
            signable_message(0, &claimed, &outputs),
            signable_message(1, &claimed, &outputs)
        );
    }

    #[test]
    fn output_ref_ordering_is_structural() {
        let a = OutputRef::new(TxId::new([1u8; 32]), 1);
        let b = OutputRef::new(TxId::new([1u8; 32]), 2);
        let c = OutputRef::new(TxId::new([2u8; 32]), 0);

        assert!(a < b);
        assert!(b < c);
        assert_eq!(a, OutputRef::new(TxId::new([1u8; 32]), 1));
    }
}
