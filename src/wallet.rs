//! Key management, transaction construction and signing.
//!
//! The wallet is the signing collaborator of the ledger core: it owns a
//! secp256k1 keypair, selects spendable outputs it controls and signs each
//! input over that input's signable message.

use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::transaction::{signable_message, OutputRef, Transaction, TxInput, TxOutput};
use crate::utxo_set::UtxoSet;

pub struct Wallet {
    secp: Secp256k1<All>,
    pub private_key: SecretKey,
    pub public_key: PublicKey,
    pub address: String,
}

impl Wallet {
    pub fn new() -> Self {
        let secp = Secp256k1::new();
        let mut rng = rand::thread_rng();
        let (secret_key, public_key) = secp.generate_keypair(&mut rng);
        let address = Self::public_key_to_address(&public_key);

        Wallet {
            secp,
            private_key: secret_key,
            public_key,
            address,
        }
    }

    /// Short display identity: hex of RIPEMD-160 over SHA-256 of the
    /// uncompressed public key. Ownership checks always use the raw key.
    fn public_key_to_address(public_key: &PublicKey) -> String {
        let mut hasher = Sha256::new();
        hasher.update(public_key.serialize_uncompressed());
        let digest = hasher.finalize();

        let mut ripemd = ripemd::Ripemd160::new();
        ripemd.update(digest);
        hex::encode(ripemd.finalize())
    }

    /// Build a fully signed transaction paying `amount` to `to`, spending
    /// outputs this wallet owns in `utxo_set` and returning change to self.
    /// `None` when the wallet does not control enough value, or when the
    /// selected total does not fit in u64.
    pub fn create_transaction(
        &self,
        to: &PublicKey,
        amount: u64,
        utxo_set: &UtxoSet,
    ) -> Option<Transaction> {
        let mut spendable: Vec<(OutputRef, u64)> = utxo_set
            .iter()
            .filter(|(_, output)| output.owner == self.public_key)
            .map(|(reference, output)| (*reference, output.value))
            .collect();
        // Map iteration order is arbitrary; sort so coin selection is
        // reproducible for a given set.
        spendable.sort_by_key(|(reference, _)| *reference);

        let mut claimed = Vec::new();
        let mut total_input = 0u64;
        for (reference, value) in spendable {
            if total_input >= amount {
                break;
            }
            claimed.push(reference);
            total_input = total_input.checked_add(value)?;
        }

        if total_input < amount {
            return None;
        }

        let mut outputs = vec![TxOutput {
            value: amount,
            owner: *to,
        }];
        if total_input > amount {
            outputs.push(TxOutput {
                value: total_input - amount,
                owner: self.public_key,
            });
        }

        let inputs = claimed
            .iter()
            .enumerate()
            .map(|(index, reference)| TxInput {
                claimed: *reference,
                signature: self.sign_input(index as u32, &claimed, &outputs),
            })
            .collect();

        Some(Transaction::new(inputs, outputs))
    }

    /// Hex-encoded compact ECDSA signature over the signable message for the
    /// input at `input_index`.
    pub fn sign_input(
        &self,
        input_index: u32,
        claimed: &[OutputRef],
        outputs: &[TxOutput],
    ) -> String {
        let digest = signable_message(input_index, claimed, outputs);
        let message = Message::from_slice(&digest).expect("digest is 32 bytes");
        let signature = self.secp.sign_ecdsa(&message, &self.private_key);
        hex::encode(signature.serialize_compact())
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}
