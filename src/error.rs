use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("chain is empty")]
    EmptyChain,
    #[error("malformed digest: {0}")]
    MalformedDigest(String),
    #[error("peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },
    #[error("peer {peer} protocol error: {reason}")]
    PeerProtocol { peer: String, reason: String },
    #[error("peer {peer} offered an invalid chain")]
    InvalidChain { peer: String },
    #[error("invalid transaction: {0}")]
    InvalidTransaction(&'static str),
    #[error("failed to encode block: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("puzzle search cancelled")]
    Cancelled,
}
