//! Canonical hashing and proof-of-work primitives.
//!
//! Hashing a block goes through a canonical JSON projection rather than the
//! struct's derived `Serialize`: only the fields the network agrees on are
//! included, and object keys come out sorted (this crate does not enable
//! `serde_json`'s `preserve_order` feature, so `serde_json::Map` is
//! backed by a `BTreeMap` and serializes keys in sorted order for free).
//!
//! Proof-of-work hashes a Python-`repr`-style rendering of the candidate
//! transaction list instead of JSON, matching the reference node this
//! protocol was designed to interoperate with. Each transaction renders as
//! an `OrderedDict` repr (`OrderedDict([('sender', ...), ...])`), not a
//! plain dict literal, because the reference node builds its per-transaction
//! dict with `collections.OrderedDict` before hashing it.

use sha2::{Digest, Sha256};

use crate::types::{Block, Transaction};

/// Hex-encodes the SHA-256 digest of `data`.
pub fn hash_string(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(digest)
}

/// Canonical hash of a block: SHA-256 over the block's fields rendered as
/// JSON with alphabetically sorted keys.
pub fn hash_block(block: &Block) -> String {
    // Transactions are projected to sender/recipient/amount explicitly
    // (dropping `signature`) and built as `json!` objects rather than
    // relying on `Transaction`'s derived `Serialize`, whose field order
    // would otherwise leak through untouched: `serde_json::Map` sorts its
    // keys, a derived struct serializer does not.
    let transactions: Vec<serde_json::Value> = block
        .transactions
        .iter()
        .map(|tx| {
            serde_json::json!({
                "sender": tx.sender,
                "recipient": tx.recipient,
                "amount": tx.amount,
            })
        })
        .collect();
    let value = serde_json::json!({
        "index": block.index,
        "previous_hash": block.previous_hash,
        "timestamp": block.timestamp,
        "transactions": transactions,
        "proof": block.proof,
    });
    let encoded = serde_json::to_string(&value).expect("block JSON projection always serializes");
    hash_string(encoded.as_bytes())
}

/// Renders an amount the same way on every node so that signing and
/// proof-of-work hashing agree regardless of where the number came from.
///
/// Whole numbers always carry one decimal digit (`10` -> `"10.0"`) so that a
/// reward amount and a user-supplied amount of the same magnitude hash
/// identically.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.is_finite() {
        format!("{amount:.1}")
    } else {
        format!("{amount}")
    }
}

fn transaction_repr(tx: &Transaction) -> String {
    format!(
        "OrderedDict([('sender', '{}'), ('recipient', '{}'), ('amount', {})])",
        tx.sender,
        tx.recipient,
        format_amount(tx.amount)
    )
}

fn transaction_list_repr(transactions: &[Transaction]) -> String {
    let parts: Vec<String> = transactions.iter().map(transaction_repr).collect();
    format!("[{}]", parts.join(", "))
}

/// Checks whether `proof` is a valid proof-of-work for `transactions` mined
/// on top of `last_hash`, i.e. whether the guess hash starts with
/// `difficulty` zero characters.
pub fn valid_proof(transactions: &[Transaction], last_hash: &str, proof: u64, difficulty: usize) -> bool {
    let guess = format!("{}{}{}", transaction_list_repr(transactions), last_hash, proof);
    let guess_hash = hash_string(guess.as_bytes());
    guess_hash.starts_with(&"0".repeat(difficulty))
}

/// Searches for the smallest `proof` satisfying [`valid_proof`].
pub fn proof_of_work(transactions: &[Transaction], last_hash: &str, difficulty: usize) -> u64 {
    let mut proof = 0u64;
    while !valid_proof(transactions, last_hash, proof, difficulty) {
        proof += 1;
    }
    proof
}

/// Builds the canonical signing/verification message for a transfer:
/// `sender || recipient || amount`, with `amount` rendered via
/// [`format_amount`].
pub fn signing_message(sender: &str, recipient: &str, amount: f64) -> String {
    format!("{sender}{recipient}{}", format_amount(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transaction;

    #[test]
    fn format_amount_adds_decimal_to_whole_numbers() {
        assert_eq!(format_amount(10.0), "10.0");
        assert_eq!(format_amount(7.5), "7.5");
    }

    #[test]
    fn hash_block_is_deterministic() {
        let block = Block::genesis();
        assert_eq!(hash_block(&block), hash_block(&block));
    }

    #[test]
    fn hash_block_changes_with_content() {
        let mut block = Block::genesis();
        let other = {
            block.proof = 101;
            block.clone()
        };
        block.proof = 100;
        assert_ne!(hash_block(&block), hash_block(&other));
    }

    #[test]
    fn valid_proof_respects_difficulty() {
        let txs = vec![Transaction {
            sender: "alice".to_string(),
            recipient: "bob".to_string(),
            amount: 1.0,
            signature: "sig".to_string(),
        }];
        let proof = proof_of_work(&txs, "genesis", 2);
        assert!(valid_proof(&txs, "genesis", proof, 2));
    }

    #[test]
    fn transaction_list_repr_matches_python_style() {
        let txs = vec![Transaction {
            sender: "alice".to_string(),
            recipient: "bob".to_string(),
            amount: 7.0,
            signature: "sig".to_string(),
        }];
        assert_eq!(
            transaction_list_repr(&txs),
            "[OrderedDict([('sender', 'alice'), ('recipient', 'bob'), ('amount', 7.0)])]"
        );
    }
}
