use log::{info, warn};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::blockchain::{Block, Digest, Ledger, ProofOfWork};
use crate::config::{Config, Reward};
use crate::error::Result;
use crate::network::{ChainFetcher, GetChainResponse, LedgerSnapshot, Node, PeerDirectory};
use crate::transaction::Transaction;

/// Shared node state: one ledger and one peer set behind locks.
///
/// This is the only surface the REST layer talks to. Block sealing and
/// chain replacement both take the ledger write lock and re-check the tip
/// or length there, so a reconciliation can never drop a freshly sealed block.
pub struct AppState {
    ledger: RwLock<Ledger>,
    peers: RwLock<PeerDirectory>,
    fetcher: Box<dyn ChainFetcher + Send + Sync>,
    reward: Option<Reward>,
    stop: AtomicBool,
}

impl AppState {
    pub fn new(
        ledger: Ledger,
        peers: PeerDirectory,
        reward: Option<Reward>,
        fetcher: Box<dyn ChainFetcher + Send + Sync>,
    ) -> Self {
        Self {
            ledger: RwLock::new(ledger),
            peers: RwLock::new(peers),
            fetcher,
            reward,
            stop: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &Config, fetcher: Box<dyn ChainFetcher + Send + Sync>) -> Self {
        let ledger = Ledger::new(
            config.node_address.clone(),
            ProofOfWork::new(config.difficulty),
        );
        Self::new(
            ledger,
            PeerDirectory::new(config.adoption),
            config.reward.clone(),
            fetcher,
        )
    }

    pub fn submit_transaction(
        &self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: i64,
    ) -> Result<u64> {
        let tx = Transaction::new(sender, receiver, amount);
        let mut ledger = self.ledger.write().expect("ledger lock poisoned");
        ledger.submit_transaction(tx)
    }

    /// Solve the puzzle for the current tip, then seal the pending pool on
    /// it. If the tip moved in between (the chain was replaced), solve again
    /// against the new tip.
    pub fn create_block_via_puzzle(&self) -> Result<Block> {
        loop {
            let (proof, previous_digest) = self.solve_for_tip()?;
            if let Some(block) = self.seal(proof, previous_digest)? {
                return Ok(block);
            }
            warn!("tip moved while solving, retrying");
        }
    }

    /// Runs the search under the read lock: readers proceed, writers wait.
    fn solve_for_tip(&self) -> Result<(i64, Digest)> {
        let ledger = self.ledger.read().expect("ledger lock poisoned");
        let tip = ledger.latest_block()?;
        let proof = ledger.solve_puzzle(tip.proof, &self.stop)?;
        Ok((proof, tip.digest()?))
    }

    /// Seal on top of `previous_digest`, or `None` if that is no longer the tip.
    fn seal(&self, proof: i64, previous_digest: Digest) -> Result<Option<Block>> {
        let mut ledger = self.ledger.write().expect("ledger lock poisoned");
        if ledger.latest_block()?.digest()? != previous_digest {
            return Ok(None);
        }
        if let Some(reward) = &self.reward {
            let tx = Transaction::new(ledger.address(), reward.owner.clone(), reward.amount);
            ledger.submit_transaction(tx)?;
        }
        Ok(Some(ledger.create_block(proof, previous_digest).clone()))
    }

    pub fn get_chain(&self) -> Vec<Block> {
        let ledger = self.ledger.read().expect("ledger lock poisoned");
        ledger.chain().to_vec()
    }

    /// Snapshot of everything `/get_chain` exposes.
    pub fn chain_response(&self) -> GetChainResponse {
        let nodes = self.peers();
        let ledger = self.ledger.read().expect("ledger lock poisoned");
        GetChainResponse {
            length: ledger.len(),
            ledger: LedgerSnapshot {
                chain: ledger.chain().to_vec(),
                transactions: ledger.pending().to_vec(),
                nodes,
                address: ledger.address().to_string(),
            },
        }
    }

    pub fn validate_current_chain(&self) -> Result<bool> {
        let ledger = self.ledger.read().expect("ledger lock poisoned");
        ledger.is_valid()
    }

    /// Returns false if the peer was already known.
    pub fn add_peer(&self, host: impl Into<String>, port: u16) -> bool {
        let mut peers = self.peers.write().expect("peer lock poisoned");
        peers.add(Node::new(host, port))
    }

    pub fn peers(&self) -> Vec<Node> {
        let peers = self.peers.read().expect("peer lock poisoned");
        peers.peers().to_vec()
    }

    /// Poll peers with no lock held, then swap under the ledger write lock.
    /// The swap re-checks length, so a block sealed during the poll wins
    /// over an offer that is no longer longer.
    pub fn reconcile(&self) -> bool {
        let peers = self.peers.read().expect("peer lock poisoned").clone();
        let (local_len, pow) = {
            let ledger = self.ledger.read().expect("ledger lock poisoned");
            (ledger.len(), ledger.pow())
        };

        let Some(offer) = peers.best_offer(local_len, &pow, self.fetcher.as_ref()) else {
            return false;
        };

        let mut ledger = self.ledger.write().expect("ledger lock poisoned");
        let replaced = ledger.replace_chain(offer.chain);
        if replaced {
            info!("adopted {} blocks from {}", offer.length, offer.peer);
        }
        replaced
    }

    /// Abort any running and future puzzle searches.
    pub fn stop_mining(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock, Weak};

    use super::*;
    use crate::error::Error;
    use crate::network::fetcher::stub::StubFetcher;
    use crate::network::{AdoptionPolicy, RemoteChain};

    /// Seals a block on the local node each time it is polled, then serves
    /// a fixed chain.
    struct SealingFetcher {
        local: Arc<OnceLock<Weak<AppState>>>,
        chain: Vec<Block>,
    }

    impl ChainFetcher for SealingFetcher {
        fn fetch(&self, _peer: &Node) -> Result<RemoteChain> {
            if let Some(state) = self.local.get().and_then(Weak::upgrade) {
                state.create_block_via_puzzle()?;
            }
            Ok(RemoteChain {
                length: self.chain.len(),
                chain: self.chain.clone(),
            })
        }
    }

    fn state_with(ledger: Ledger, fetcher: StubFetcher) -> AppState {
        AppState::new(ledger, PeerDirectory::default(), None, Box::new(fetcher))
    }

    fn state() -> AppState {
        state_with(
            Ledger::new("test-node", ProofOfWork::new(1)),
            StubFetcher::default(),
        )
    }

    #[test]
    fn submit_then_mine_with_default_rule() {
        let state = state_with(
            Ledger::new("test-node", ProofOfWork::default()),
            StubFetcher::default(),
        );
        assert_eq!(state.submit_transaction("alice", "bob", 10).unwrap(), 1);
        let block = state.create_block_via_puzzle().unwrap();

        let chain = state.get_chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(block, chain[1]);
        assert_eq!(
            chain[1].transactions,
            vec![Transaction::new("alice", "bob", 10)]
        );
        assert!(ProofOfWork::puzzle_digest(chain[1].proof, chain[0].proof)
            .to_hex()
            .starts_with("0000"));
        assert!(state.validate_current_chain().unwrap());
    }

    #[test]
    fn reward_is_sealed_after_submitted_transactions() {
        let ledger = Ledger::new("miner-node", ProofOfWork::new(1));
        let reward = Reward {
            owner: "alice".into(),
            amount: 1,
        };
        let state = AppState::new(
            ledger,
            PeerDirectory::default(),
            Some(reward),
            Box::new(StubFetcher::default()),
        );
        state.submit_transaction("carol", "dave", 7).unwrap();
        let block = state.create_block_via_puzzle().unwrap();
        assert_eq!(
            block.transactions,
            vec![
                Transaction::new("carol", "dave", 7),
                Transaction::new("miner-node", "alice", 1),
            ]
        );
    }

    #[test]
    fn stopped_state_refuses_to_mine() {
        let state = state();
        state.stop_mining();
        assert!(matches!(
            state.create_block_via_puzzle(),
            Err(Error::Cancelled)
        ));
        assert_eq!(state.get_chain().len(), 1);
    }

    #[test]
    fn add_peer_deduplicates() {
        let state = state();
        assert!(state.add_peer("localhost", 5001));
        assert!(!state.add_peer("localhost", 5001));
        assert_eq!(state.peers(), vec![Node::new("localhost", 5001)]);
    }

    #[test]
    fn reconcile_adopts_longer_peer_chain() {
        let mut x = Ledger::new("x", ProofOfWork::new(1));
        x.mine().unwrap();
        let y = Ledger::from_genesis("y", ProofOfWork::new(1), x.chain()[0].clone());

        let peer = Node::new("x", 5000);
        let state = state_with(y, StubFetcher::default().serve(peer, x.chain().to_vec()));
        assert!(!state.reconcile());

        state.add_peer("x", 5000);
        let before = state.get_chain().len();
        assert!(state.reconcile());
        assert!(state.get_chain().len() >= before);
        assert_eq!(state.get_chain(), x.chain());
        assert!(!state.reconcile());
    }

    #[test]
    fn mining_after_reconcile_extends_adopted_chain() {
        let mut x = Ledger::new("x", ProofOfWork::new(1));
        x.mine().unwrap();
        x.mine().unwrap();
        let y = Ledger::from_genesis("y", ProofOfWork::new(1), x.chain()[0].clone());

        let state = state_with(
            y,
            StubFetcher::default().serve(Node::new("x", 1), x.chain().to_vec()),
        );
        state.add_peer("x", 1);
        assert!(state.reconcile());

        let block = state.create_block_via_puzzle().unwrap();
        assert_eq!(block.index, 3);
        assert_eq!(block.previous_digest, x.chain()[2].digest().unwrap());
        assert!(state.validate_current_chain().unwrap());
    }

    #[test]
    fn chain_response_reports_pending_and_peers() {
        let state = AppState::from_config(
            &Config {
                node_address: "me".into(),
                difficulty: 1,
                adoption: AdoptionPolicy::Trusting,
                ..Config::default()
            },
            Box::new(StubFetcher::default()),
        );
        state.submit_transaction("a", "b", 2).unwrap();
        state.add_peer("peer", 9000);

        let response = state.chain_response();
        assert_eq!(response.length, 1);
        assert_eq!(response.ledger.address, "me");
        assert_eq!(response.ledger.transactions.len(), 1);
        assert_eq!(response.ledger.nodes, vec![Node::new("peer", 9000)]);
    }

    #[test]
    fn block_sealed_during_poll_survives_reconcile() {
        let mut x = Ledger::new("x", ProofOfWork::new(1));
        x.mine().unwrap();
        let y = Ledger::from_genesis("y", ProofOfWork::new(1), x.chain()[0].clone());

        let local = Arc::new(OnceLock::new());
        let fetcher = SealingFetcher {
            local: local.clone(),
            chain: x.chain().to_vec(),
        };
        let state = Arc::new(AppState::new(
            y,
            PeerDirectory::default(),
            None,
            Box::new(fetcher),
        ));
        local.set(Arc::downgrade(&state)).unwrap();

        state.submit_transaction("alice", "bob", 10).unwrap();
        state.add_peer("x", 5000);
        assert!(!state.reconcile());

        let chain = state.get_chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain[1].transactions,
            vec![Transaction::new("alice", "bob", 10)]
        );
        assert!(state.validate_current_chain().unwrap());
    }

    #[test]
    fn stale_solution_is_not_sealed_after_replacement() {
        let mut x = Ledger::new("x", ProofOfWork::new(1));
        x.mine().unwrap();
        x.mine().unwrap();
        let y = Ledger::from_genesis("y", ProofOfWork::new(1), x.chain()[0].clone());
        let state = state_with(
            y,
            StubFetcher::default().serve(Node::new("x", 1), x.chain().to_vec()),
        );
        state.submit_transaction("alice", "bob", 10).unwrap();

        let (proof, genesis_digest) = state.solve_for_tip().unwrap();
        state.add_peer("x", 1);
        assert!(state.reconcile());

        assert!(state.seal(proof, genesis_digest).unwrap().is_none());
        assert_eq!(state.get_chain(), x.chain());

        let block = state.create_block_via_puzzle().unwrap();
        assert_eq!(block.index, 3);
        assert_eq!(block.previous_digest, x.chain()[2].digest().unwrap());
        assert_eq!(block.transactions, vec![Transaction::new("alice", "bob", 10)]);
        assert!(state.validate_current_chain().unwrap());
    }
}
