use log::debug;
use std::time::Duration;

use super::{GetChainResponse, Node};
use crate::blockchain::Block;
use crate::error::{Error, Result};

/// A peer's chain as it advertised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteChain {
    pub length: usize,
    pub chain: Vec<Block>,
}

impl From<GetChainResponse> for RemoteChain {
    fn from(response: GetChainResponse) -> Self {
        Self {
            length: response.length,
            chain: response.ledger.chain,
        }
    }
}

/// Source of remote chains, one peer at a time. Calls may block.
pub trait ChainFetcher {
    fn fetch(&self, peer: &Node) -> Result<RemoteChain>;
}

/// Fetches `GET http://<host>:<port>/get_chain`.
///
/// Uses a blocking client; call it from a thread where blocking is allowed.
pub struct HttpChainFetcher {
    client: reqwest::blocking::Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        // Peers are addressed directly, never through a proxy.
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }
}

impl ChainFetcher for HttpChainFetcher {
    fn fetch(&self, peer: &Node) -> Result<RemoteChain> {
        let url = format!("{}/get_chain", peer.http_url());
        debug!("fetching chain from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::PeerUnreachable {
                peer: peer.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::PeerProtocol {
                peer: peer.to_string(),
                reason: format!("unexpected status {status}"),
            });
        }

        let body: GetChainResponse = response.json().map_err(|e| Error::PeerProtocol {
            peer: peer.to_string(),
            reason: format!("failed to decode response: {e}"),
        })?;
        Ok(body.into())
    }
}
