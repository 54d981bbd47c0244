//! Hash-linked block storage

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::*;

/// Sentinel previous-hash carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Payload label of the genesis block
pub const GENESIS_PAYLOAD: &str = "Genesis Block";

/// Compute a block's content hash: SHA-256 over (timestamp, payload,
/// previous hash, record), returned as lowercase hex.
pub fn compute_block_hash(
    timestamp: NaiveDateTime,
    payload: &str,
    previous_hash: &str,
    record: Option<&BlockRecord>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.and_utc().timestamp_micros().to_le_bytes());
    hasher.update(payload.as_bytes());
    hasher.update(previous_hash.as_bytes());
    if let Some(record) = record {
        match record {
            BlockRecord::Transfer(transfer) => {
                hasher.update(b"transfer");
                hash_transfer(&mut hasher, transfer);
            }
            BlockRecord::ContractTransfer { contract, transfer } => {
                hasher.update(b"contract-transfer");
                hasher.update(contract.as_bytes());
                hash_transfer(&mut hasher, transfer);
            }
            BlockRecord::ContractSigned {
                contract,
                signer,
                signed_at,
            } => {
                hasher.update(b"contract-signed");
                hasher.update(contract.as_bytes());
                hasher.update(signer.as_bytes());
                hasher.update(signed_at.and_utc().timestamp_micros().to_le_bytes());
            }
        }
    }
    hex::encode(hasher.finalize())
}

fn hash_transfer(hasher: &mut Sha256, transfer: &TransferRecord) {
    hasher.update(transfer.sender.as_bytes());
    hasher.update(transfer.receiver.as_bytes());
    hasher.update(transfer.amount.to_string().as_bytes());
    hasher.update(transfer.memo.as_bytes());
    hasher.update(transfer.timestamp.and_utc().timestamp_micros().to_le_bytes());
}

/// Append-only sequence of hash-linked blocks. Created with a genesis
/// block; blocks are never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockLedger {
    blocks: Vec<Block>,
}

impl BlockLedger {
    /// Create a ledger holding only the genesis block
    pub fn new() -> Self {
        let timestamp = chrono::Utc::now().naive_utc();
        let hash = compute_block_hash(timestamp, GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH, None);
        let genesis = Block {
            index: 0,
            timestamp,
            payload: GENESIS_PAYLOAD.to_string(),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            record: None,
            hash,
        };
        Self {
            blocks: vec![genesis],
        }
    }

    /// Append a new block recording the given event, linked to the tail
    /// block's hash
    pub fn append(&mut self, payload: String, record: Option<BlockRecord>) -> &Block {
        let timestamp = chrono::Utc::now().naive_utc();
        let previous_hash = self.tip().hash.clone();
        let hash = compute_block_hash(timestamp, &payload, &previous_hash, record.as_ref());
        let block = Block {
            index: self.blocks.len() as u64,
            timestamp,
            payload,
            previous_hash,
            record,
            hash,
        };
        self.blocks.push(block);
        self.tip()
    }

    /// Read-only ordered snapshot of all blocks
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The most recently appended block
    pub fn tip(&self) -> &Block {
        // A ledger always holds at least the genesis block
        &self.blocks[self.blocks.len() - 1]
    }

    /// Number of blocks, genesis included
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// A ledger is never empty, the genesis block is always present
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Recompute every content hash and check every previous-hash link,
    /// collecting human-readable issues
    pub fn verify(&self) -> LedgerIntegrityReport {
        let mut issues = Vec::new();

        for (position, block) in self.blocks.iter().enumerate() {
            let recomputed = compute_block_hash(
                block.timestamp,
                &block.payload,
                &block.previous_hash,
                block.record.as_ref(),
            );
            if recomputed != block.hash {
                issues.push(format!(
                    "block {} content hash mismatch: stored {}, recomputed {}",
                    block.index, block.hash, recomputed
                ));
            }

            if position == 0 {
                if block.previous_hash != GENESIS_PREVIOUS_HASH {
                    issues.push(format!(
                        "genesis block carries previous hash {} instead of the sentinel",
                        block.previous_hash
                    ));
                }
            } else if block.previous_hash != self.blocks[position - 1].hash {
                issues.push(format!(
                    "block {} is not linked to the hash of block {}",
                    block.index,
                    position - 1
                ));
            }
        }

        LedgerIntegrityReport {
            is_valid: issues.is_empty(),
            block_count: self.blocks.len(),
            issues,
        }
    }
}

impl Default for BlockLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Report on ledger hash-link integrity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerIntegrityReport {
    pub is_valid: bool,
    pub block_count: usize,
    pub issues: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn sample_transfer() -> TransferRecord {
        TransferRecord::new(
            "aaaaaaaaaa".to_string(),
            "bbbbbbbbbb".to_string(),
            BigDecimal::from(30),
            "x".to_string(),
        )
    }

    #[test]
    fn starts_with_genesis_sentinel() {
        let ledger = BlockLedger::new();
        assert_eq!(ledger.len(), 1);
        let genesis = ledger.tip();
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.record.is_none());
    }

    #[test]
    fn appended_blocks_link_to_predecessor() {
        let mut ledger = BlockLedger::new();
        ledger.append(
            "Block 1".to_string(),
            Some(BlockRecord::Transfer(sample_transfer())),
        );
        ledger.append(
            "Block 2".to_string(),
            Some(BlockRecord::Transfer(sample_transfer())),
        );

        let blocks = ledger.blocks();
        for i in 1..blocks.len() {
            assert_eq!(blocks[i].previous_hash, blocks[i - 1].hash);
        }
        assert!(ledger.verify().is_valid);
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        let transfer = sample_transfer();
        let record = BlockRecord::Transfer(transfer.clone());
        let timestamp = chrono::Utc::now().naive_utc();

        let first = compute_block_hash(timestamp, "Block 1", "0", Some(&record));
        let second = compute_block_hash(timestamp, "Block 1", "0", Some(&record));
        assert_eq!(first, second);

        let mut altered = transfer;
        altered.memo = "y".to_string();
        let third = compute_block_hash(
            timestamp,
            "Block 1",
            "0",
            Some(&BlockRecord::Transfer(altered)),
        );
        assert_ne!(first, third);
    }
}
