//! Read-only derived views computed from the ledger
//!
//! Query operations never raise for absence: an unknown wallet simply
//! yields an empty result set.

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ledger::core::Chain;
use crate::types::*;

/// One historical transfer touching a wallet, with the balance the wallet
/// held immediately after it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletHistoryEntry {
    pub block_index: u64,
    pub block_hash: String,
    pub timestamp: NaiveDateTime,
    pub sender: String,
    pub receiver: String,
    pub direction: TransferDirection,
    pub amount: BigDecimal,
    pub balance_after: BigDecimal,
    pub memo: String,
}

/// One entry of the global transaction feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFeedEntry {
    pub block_index: u64,
    pub block_hash: String,
    pub timestamp: NaiveDateTime,
    pub sender: String,
    pub receiver: String,
    pub amount: BigDecimal,
    pub memo: String,
}

/// Summary line of the wallets overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub address: String,
    pub balance: BigDecimal,
    pub transfer_count: usize,
    pub created_at: NaiveDateTime,
}

impl Chain {
    /// History of user transfers touching a wallet, newest first.
    ///
    /// The balance-after-transfer of each entry is reconstructed by starting
    /// from the wallet's current balance and undoing each newer qualifying
    /// transfer while walking the chain backward.
    pub fn wallet_history(&self, address: &str) -> Vec<WalletHistoryEntry> {
        let Some(wallet) = self.wallets.lookup(address) else {
            return Vec::new();
        };

        let mut running = wallet.balance.clone();
        let mut entries = Vec::new();

        for block in self.blocks().iter().rev() {
            let Some(transfer) = block.record.as_ref().and_then(BlockRecord::user_transfer)
            else {
                continue;
            };
            let direction = if transfer.sender == address {
                TransferDirection::Outgoing
            } else if transfer.receiver == address {
                TransferDirection::Incoming
            } else {
                continue;
            };

            entries.push(WalletHistoryEntry {
                block_index: block.index,
                block_hash: block.hash.clone(),
                timestamp: transfer.timestamp,
                sender: transfer.sender.clone(),
                receiver: transfer.receiver.clone(),
                direction,
                amount: transfer.amount.clone(),
                balance_after: running.clone(),
                memo: transfer.memo.clone(),
            });

            // Undo this transfer to obtain the balance after the previous one
            match direction {
                TransferDirection::Outgoing => running += &transfer.amount,
                TransferDirection::Incoming => running -= &transfer.amount,
            }
        }

        entries
    }

    /// Every user transfer on the ledger, sorted newest first (timestamp,
    /// then block index, descending)
    pub fn all_transactions(&self) -> Vec<TransactionFeedEntry> {
        let mut entries: Vec<TransactionFeedEntry> = self
            .blocks()
            .iter()
            .filter_map(|block| {
                let transfer = block.record.as_ref().and_then(BlockRecord::user_transfer)?;
                Some(TransactionFeedEntry {
                    block_index: block.index,
                    block_hash: block.hash.clone(),
                    timestamp: transfer.timestamp,
                    sender: transfer.sender.clone(),
                    receiver: transfer.receiver.clone(),
                    amount: transfer.amount.clone(),
                    memo: transfer.memo.clone(),
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            (b.timestamp, b.block_index).cmp(&(a.timestamp, a.block_index))
        });
        entries
    }

    /// One summary line per wallet, ordered by creation date
    pub fn wallets_overview(&self) -> Vec<WalletSummary> {
        let mut summaries: Vec<WalletSummary> = self
            .wallets
            .iter()
            .map(|wallet| WalletSummary {
                address: wallet.address.clone(),
                balance: wallet.balance.clone(),
                transfer_count: self.count_transfers(&wallet.address),
                created_at: wallet.created_at,
            })
            .collect();

        summaries.sort_by(|a, b| (a.created_at, &a.address).cmp(&(b.created_at, &b.address)));
        summaries
    }

    fn count_transfers(&self, address: &str) -> usize {
        self.blocks()
            .iter()
            .filter_map(|block| block.record.as_ref().and_then(BlockRecord::user_transfer))
            .filter(|transfer| transfer.sender == address || transfer.receiver == address)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_wallet_yields_empty_history() {
        let chain = Chain::new();
        assert!(chain.wallet_history("ffffffffff").is_empty());
        assert!(chain.all_transactions().is_empty());
    }

    #[test]
    fn history_is_newest_first_with_directions() {
        let mut chain = Chain::new();
        let a = chain.create_wallet().unwrap();
        let b = chain.create_wallet().unwrap();

        chain.transfer(&a, &b, BigDecimal::from(10), "first").unwrap();
        chain.transfer(&b, &a, BigDecimal::from(4), "second").unwrap();

        let history = chain.wallet_history(&a);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].memo, "second");
        assert_eq!(history[0].direction, TransferDirection::Incoming);
        assert_eq!(history[0].balance_after, BigDecimal::from(94));
        assert_eq!(history[1].memo, "first");
        assert_eq!(history[1].direction, TransferDirection::Outgoing);
        assert_eq!(history[1].balance_after, BigDecimal::from(90));
    }

    #[test]
    fn overview_counts_transfers_per_wallet() {
        let mut chain = Chain::new();
        let a = chain.create_wallet().unwrap();
        let b = chain.create_wallet().unwrap();
        let c = chain.create_wallet().unwrap();

        chain.transfer(&a, &b, BigDecimal::from(5), "x").unwrap();
        chain.transfer(&a, &c, BigDecimal::from(5), "y").unwrap();

        let overview = chain.wallets_overview();
        assert_eq!(overview.len(), 3);
        let of = |addr: &str| {
            overview
                .iter()
                .find(|summary| summary.address == addr)
                .map(|summary| summary.transfer_count)
        };
        assert_eq!(of(&a), Some(2));
        assert_eq!(of(&b), Some(1));
        assert_eq!(of(&c), Some(1));
    }
}
