use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ChainFetcher, RemoteChain};
use crate::blockchain::{Block, ProofOfWork, validate_chain};
use crate::error::{Error, Result};

/// Address of a remote ledger holder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    pub host: String,
    pub port: u16,
}

impl Node {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// How much a peer's chain is trusted before it replaces ours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdoptionPolicy {
    /// Adopt the longest advertised chain as delivered.
    Trusting,
    /// Require the delivered chain to match its advertised length and to
    /// pass full validation.
    #[default]
    Verified,
}

/// The winning candidate of a reconciliation pass.
#[derive(Debug, Clone)]
pub struct Offer {
    pub peer: Node,
    pub length: usize,
    pub chain: Vec<Block>,
}

/// Known peers, in the order they were added, plus the adoption policy.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    peers: Vec<Node>,
    policy: AdoptionPolicy,
}

impl PeerDirectory {
    pub fn new(policy: AdoptionPolicy) -> Self {
        Self {
            peers: Vec::new(),
            policy,
        }
    }

    /// Returns false if the peer was already known.
    pub fn add(&mut self, node: Node) -> bool {
        if self.peers.contains(&node) {
            return false;
        }
        debug!("peer added: {node}");
        self.peers.push(node);
        true
    }

    pub fn peers(&self) -> &[Node] {
        &self.peers
    }

    /// Poll every peer and return the chain with the greatest advertised
    /// length strictly above `local_len`. Failing peers are skipped; ties
    /// go to the peer polled first.
    pub fn best_offer<F>(&self, local_len: usize, pow: &ProofOfWork, fetcher: &F) -> Option<Offer>
    where
        F: ChainFetcher + ?Sized,
    {
        let mut best: Option<Offer> = None;
        let mut max_len = local_len;

        for peer in &self.peers {
            let remote = match fetcher.fetch(peer) {
                Ok(remote) => remote,
                Err(e) => {
                    warn!("reconcile: skipping {peer}: {e}");
                    continue;
                }
            };
            if remote.length <= max_len {
                debug!(
                    "reconcile: {peer} has {} blocks, best so far {max_len}",
                    remote.length
                );
                continue;
            }
            if let Err(e) = self.vet(peer, &remote, pow) {
                warn!("reconcile: rejecting offer from {peer}: {e}");
                continue;
            }
            max_len = remote.length;
            best = Some(Offer {
                peer: peer.clone(),
                length: remote.length,
                chain: remote.chain,
            });
        }
        best
    }

    fn vet(&self, peer: &Node, remote: &RemoteChain, pow: &ProofOfWork) -> Result<()> {
        if self.policy == AdoptionPolicy::Trusting {
            return Ok(());
        }
        if remote.chain.len() != remote.length {
            return Err(Error::PeerProtocol {
                peer: peer.to_string(),
                reason: format!(
                    "advertised {} blocks but sent {}",
                    remote.length,
                    remote.chain.len()
                ),
            });
        }
        match validate_chain(&remote.chain, pow) {
            Ok(true) => Ok(()),
            Ok(false) | Err(Error::EmptyChain) => Err(Error::InvalidChain {
                peer: peer.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}
