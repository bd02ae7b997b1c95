pub mod fetcher;
pub mod message;
pub mod peers;

pub use fetcher::{ChainFetcher, HttpChainFetcher, RemoteChain};
pub use message::{GetChainResponse, LedgerSnapshot};
pub use peers::{AdoptionPolicy, Node, PeerDirectory};
