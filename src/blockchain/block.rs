use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use std::io;

use super::Digest;
use crate::error::Result;
use crate::transaction::Transaction;

/// A sealed block. Field order and names define the canonical encoding
/// that every node hashes, so they must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // nanoseconds since the Unix epoch (UTC)
    pub proof: i64,
    #[serde(rename = "PrevHash")]
    pub previous_digest: Digest,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// First block of every chain: index 0, proof 0, zero predecessor, no transactions.
    pub fn genesis() -> Self {
        Self::new(0, 0, Digest::zero(), Vec::new())
    }

    /// Build a block stamped with the current time.
    pub fn new(
        index: u64,
        proof: i64,
        previous_digest: Digest,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self::new_with_timestamp(index, proof, previous_digest, transactions, now_nanos())
    }

    pub fn new_with_timestamp(
        index: u64,
        proof: i64,
        previous_digest: Digest,
        transactions: Vec<Transaction>,
        timestamp: i64,
    ) -> Self {
        Self {
            index,
            timestamp,
            proof,
            previous_digest,
            transactions,
        }
    }

    /// Compact JSON with fixed field order and HTML-sensitive characters
    /// escaped as `\u00XX`, byte-identical to what existing nodes produce.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(160 + 64 * self.transactions.len());
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }

    /// SHA-256 over [`Block::canonical_bytes`].
    pub fn digest(&self) -> Result<Digest> {
        Ok(Digest::sha256(&self.canonical_bytes()?))
    }
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Compact formatter that additionally escapes `<`, `>`, `&`, U+2028 and U+2029.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let escaped: &[u8] = match ch {
                '<' => b"\\u003c",
                '>' => b"\\u003e",
                '&' => b"\\u0026",
                '\u{2028}' => b"\\u2028",
                '\u{2029}' => b"\\u2029",
                _ => continue,
            };
            writer.write_all(&bytes[start..i])?;
            writer.write_all(escaped)?;
            start = i + ch.len_utf8();
        }
        writer.write_all(&bytes[start..])
    }
}
