use log::{debug, info};
use std::sync::atomic::AtomicBool;

use super::{Block, Digest, ProofOfWork};
use crate::error::{Error, Result};
use crate::transaction::Transaction;

/// In-memory ledger: the accepted chain plus the pending transaction pool.
///
/// The chain always holds at least the genesis block. Callers that share a
/// `Ledger` across threads must serialize mutation themselves.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    address: String,
    pow: ProofOfWork,
}

impl Ledger {
    /// New ledger with a fresh genesis block.
    pub fn new(address: impl Into<String>, pow: ProofOfWork) -> Self {
        Self::from_genesis(address, pow, Block::genesis())
    }

    /// New ledger seeded with an existing genesis block, so replicas agree
    /// on block 0.
    pub fn from_genesis(address: impl Into<String>, pow: ProofOfWork, genesis: Block) -> Self {
        Self {
            chain: vec![genesis],
            pending: Vec::new(),
            address: address.into(),
            pow,
        }
    }

    /// Seal the whole pending pool into a new block and append it.
    pub fn create_block(&mut self, proof: i64, previous_digest: Digest) -> &Block {
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(self.chain.len() as u64, proof, previous_digest, transactions);
        info!(
            "sealed block #{} (proof={}, txs={})",
            block.index,
            block.proof,
            block.transactions.len()
        );
        self.chain.push(block);
        self.chain
            .last()
            .expect("chain cannot be empty right after a push")
    }

    pub fn latest_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(Error::EmptyChain)
    }

    /// Search for the proof that extends a block carrying `previous_proof`.
    /// Returns `Cancelled` once `stop` is raised.
    pub fn solve_puzzle(&self, previous_proof: i64, stop: &AtomicBool) -> Result<i64> {
        self.pow.solve_until(previous_proof, stop)
    }

    /// Check linkage and proofs of `chain` under this ledger's puzzle.
    pub fn validate(&self, chain: &[Block]) -> Result<bool> {
        validate_chain(chain, &self.pow)
    }

    /// Validate the ledger's own chain.
    pub fn is_valid(&self) -> Result<bool> {
        self.validate(&self.chain)
    }

    /// Queue `tx` and return the index of the block expected to carry it.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<u64> {
        tx.check()?;
        debug!(
            "pending += {} -> {} ({})",
            tx.sender, tx.receiver, tx.amount
        );
        self.pending.push(tx);
        Ok(self.chain.len() as u64)
    }

    /// Adopt `candidate` wholesale if it is strictly longer than the local
    /// chain. The pending pool is kept.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() <= self.chain.len() {
            return false;
        }
        info!(
            "chain replaced: {} -> {} blocks",
            self.chain.len(),
            candidate.len()
        );
        self.chain = candidate;
        true
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn pow(&self) -> ProofOfWork {
        self.pow
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }
}

/// Walk adjacent pairs `(p, b)` and require `b.previous_digest == digest(p)`
/// and that `b.proof` solves the puzzle for `p.proof`.
pub fn validate_chain(chain: &[Block], pow: &ProofOfWork) -> Result<bool> {
    if chain.is_empty() {
        return Err(Error::EmptyChain);
    }
    for pair in chain.windows(2) {
        let (previous, block) = (&pair[0], &pair[1]);
        if block.previous_digest != previous.digest()? {
            debug!("block #{} does not link to its predecessor", block.index);
            return Ok(false);
        }
        if !pow.verify(block.proof, previous.proof) {
            debug!("block #{} carries an invalid proof", block.index);
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
impl Ledger {
    /// Solve against the current tip and seal a block on it in one step.
    pub(crate) fn mine(&mut self) -> Result<&Block> {
        let previous = self.latest_block()?;
        let proof = self.solve_puzzle(previous.proof, &AtomicBool::new(false))?;
        let previous_digest = previous.digest()?;
        Ok(self.create_block(proof, previous_digest))
    }
}
