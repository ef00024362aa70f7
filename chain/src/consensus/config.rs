/// Consensus tuning parameters: mining reward and proof-of-work difficulty.
#[derive(Clone, Debug)]
pub struct ConsensusConfig {
    /// Amount credited to the miner's own reward transaction.
    pub mining_reward: f64,
    /// Number of leading zero characters a proof-of-work hash must have.
    pub pow_difficulty: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            mining_reward: 10.0,
            pow_difficulty: 2,
        }
    }
}
