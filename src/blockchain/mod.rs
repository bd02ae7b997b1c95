pub mod block;
pub mod digest;
pub mod model;
pub mod pow;

pub use block::Block;
pub use digest::Digest;
pub use model::{Ledger, validate_chain};
pub use pow::ProofOfWork;

/// Leading zero hex characters required by the puzzle unless configured otherwise.
pub const DEFAULT_DIFFICULTY: usize = 4;
