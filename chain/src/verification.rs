//! Pure validity predicates over chains, blocks and transactions.
//!
//! None of these functions touch storage or the network; they are given
//! everything they need as arguments so they stay trivially testable.

use crate::hashing::{hash_block, valid_proof};
use crate::types::Block;
use crate::wallet::verify_transaction_signature;
use crate::types::Transaction;

/// Checks a transaction against the sender's current balance and
/// signature. Reward transactions (sender `MINING`) always pass.
///
/// When `check_funds` is `false` only the signature is checked; this is
/// used when re-validating a pool that has already been admitted once.
pub fn verify_transaction(tx: &Transaction, sender_balance: f64, check_funds: bool) -> bool {
    if tx.is_reward() {
        return true;
    }
    if check_funds && sender_balance < tx.amount {
        return false;
    }
    verify_transaction_signature(tx)
}

/// Checks every pool entry's signature, ignoring funds. Used just before
/// mining to make sure nothing forged slipped into the open-transaction
/// pool.
pub fn verify_transactions(pool: &[Transaction]) -> bool {
    pool.iter().all(verify_transaction_signature)
}

/// Walks the full chain checking, for every block after genesis, that its
/// `previous_hash` matches the canonical hash of its predecessor and that
/// its proof-of-work is valid against the transactions it carries (minus
/// the trailing mining reward, which is never proved against).
pub fn verify_chain(chain: &[Block], difficulty: usize) -> bool {
    for i in 1..chain.len() {
        let previous = &chain[i - 1];
        let block = &chain[i];

        if block.previous_hash != hash_block(previous) {
            return false;
        }
        if !valid_proof(
            block.transactions_without_reward(),
            &block.previous_hash,
            block.proof,
            difficulty,
        ) {
            return false;
        }
    }
    true
}
