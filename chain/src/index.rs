//! In-memory chain index
//!
//! Holds connected blocks plus the two lookup tables the accumulator
//! subsystem walks constantly: pubcoin hash to mint location, and serial
//! hash to spend location. The index lives behind a shared read/write lock;
//! long readers take it through [`read_retry`], which bounds the wait and
//! honors shutdown instead of blocking forever.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;
use tracing::{debug, warn};
use umbra_zerocoin::{Checkpoint, Denomination};

use crate::block::{Block, BlockHeader};
use crate::errors::{ChainError, ChainResult};
use crate::shutdown::ShutdownSignal;

/// Where a mint landed on-chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintLocation {
    pub txid: [u8; 32],
    pub height: u64,
    pub denomination: Denomination,
}

/// Where a serial was spent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpendLocation {
    pub txid: [u8; 32],
    pub height: u64,
    pub denomination: Denomination,
}

/// Connected chain with mint and spend lookup tables
#[derive(Debug, Default)]
pub struct ChainIndex {
    blocks: Vec<Block>,
    mint_index: HashMap<[u8; 32], MintLocation>,
    serial_index: HashMap<[u8; 32], SpendLocation>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect the next block. Heights must be contiguous from zero and the
    /// header must link to the current tip.
    pub fn connect_block(&mut self, block: Block) -> ChainResult<()> {
        let expected_height = self.blocks.len() as u64;
        if block.height() != expected_height {
            return Err(ChainError::InvalidBlock(format!(
                "height {} does not extend tip (expected {})",
                block.height(),
                expected_height
            )));
        }
        if let Some(tip) = self.blocks.last() {
            if block.header.prev_hash != tip.hash() {
                return Err(ChainError::InvalidBlock(format!(
                    "prev_hash mismatch at height {}",
                    block.height()
                )));
            }
        }
        if !block.verify() {
            return Err(ChainError::InvalidBlock(format!(
                "tx root mismatch at height {}",
                block.height()
            )));
        }

        for (txid, coin) in block.mints_with_txid() {
            self.mint_index.insert(
                coin.hash(),
                MintLocation {
                    txid,
                    height: block.height(),
                    denomination: coin.denomination(),
                },
            );
        }
        for tx in &block.transactions {
            let txid = tx.txid();
            for (serial_hash, denomination) in tx.spend_serials() {
                self.serial_index.insert(
                    serial_hash,
                    SpendLocation {
                        txid,
                        height: block.height(),
                        denomination,
                    },
                );
            }
        }

        debug!(height = block.height(), "connected block");
        self.blocks.push(block);
        Ok(())
    }

    /// Height of the best block, `None` on an empty chain
    pub fn tip_height(&self) -> Option<u64> {
        self.blocks.last().map(Block::height)
    }

    pub fn block_at(&self, height: u64) -> ChainResult<&Block> {
        self.blocks
            .get(height as usize)
            .ok_or(ChainError::UnknownHeight(height))
    }

    pub fn header_at(&self, height: u64) -> ChainResult<&BlockHeader> {
        self.block_at(height).map(|b| &b.header)
    }

    /// Checkpoint embedded at a height. Height zero and below the chain
    /// start read as the zero checkpoint so boundary comparisons at the
    /// activation edge stay total.
    pub fn checkpoint_at(&self, height: u64) -> ChainResult<Checkpoint> {
        if height == 0 && self.blocks.is_empty() {
            return Ok(Checkpoint::zero());
        }
        self.header_at(height).map(|h| h.accumulator_checkpoint)
    }

    pub fn find_mint(&self, pubcoin_hash: &[u8; 32]) -> Option<MintLocation> {
        self.mint_index.get(pubcoin_hash).copied()
    }

    pub fn find_spend(&self, serial_hash: &[u8; 32]) -> Option<SpendLocation> {
        self.serial_index.get(serial_hash).copied()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Shared handle to the chain index
pub type SharedChain = Arc<RwLock<ChainIndex>>;

pub fn shared(index: ChainIndex) -> SharedChain {
    Arc::new(RwLock::new(index))
}

/// Take the chain read lock with a bounded retry loop.
///
/// Each attempt waits at most `wait`; between attempts the shutdown signal
/// is polled so a stuck writer cannot pin a shutting-down worker.
pub fn read_retry<'a>(
    chain: &'a SharedChain,
    attempts: u32,
    wait: Duration,
    shutdown: &ShutdownSignal,
) -> ChainResult<RwLockReadGuard<'a, ChainIndex>> {
    for attempt in 0..attempts {
        if shutdown.requested() {
            return Err(ChainError::Interrupted);
        }
        if let Some(guard) = chain.try_read_for(wait) {
            return Ok(guard);
        }
        if attempt % 10 == 9 {
            warn!(attempt, "chain read lock still contended");
        }
    }
    Err(ChainError::LockTimeout { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Transaction, TxOut};
    use num_bigint::BigUint;
    use umbra_zerocoin::PublicCoin;

    fn next_block(index: &ChainIndex, transactions: Vec<Transaction>) -> Block {
        let height = index.tip_height().map(|h| h + 1).unwrap_or(0);
        let prev_hash = index
            .blocks
            .last()
            .map(Block::hash)
            .unwrap_or([0u8; 32]);
        let mut block = Block::new(
            BlockHeader {
                height,
                prev_hash,
                timestamp: 1000 + height,
                tx_root: [0u8; 32],
                accumulator_checkpoint: Checkpoint::zero(),
            },
            transactions,
        );
        block.header.tx_root = block.compute_tx_root();
        block
    }

    #[test]
    fn test_connect_enforces_continuity() {
        let mut index = ChainIndex::new();
        let genesis = next_block(&index, vec![]);
        index.connect_block(genesis).unwrap();

        let mut gap = next_block(&index, vec![]);
        gap.header.height = 5;
        assert!(matches!(
            index.connect_block(gap),
            Err(ChainError::InvalidBlock(_))
        ));

        let mut bad_link = next_block(&index, vec![]);
        bad_link.header.prev_hash = [9u8; 32];
        assert!(index.connect_block(bad_link).is_err());
    }

    #[test]
    fn test_mint_and_spend_lookup() {
        let mut index = ChainIndex::new();
        index.connect_block(next_block(&index, vec![])).unwrap();

        let coin = PublicCoin::new(BigUint::from(104_729u32), Denomination::Ten);
        let mint = Transaction::new(vec![TxOut::ZerocoinMint { coin: coin.clone() }], 0);
        let mint_txid = mint.txid();
        index.connect_block(next_block(&index, vec![mint])).unwrap();

        let loc = index.find_mint(&coin.hash()).unwrap();
        assert_eq!(loc.height, 1);
        assert_eq!(loc.txid, mint_txid);
        assert_eq!(loc.denomination, Denomination::Ten);

        let spend = Transaction::new(
            vec![TxOut::ZerocoinSpend {
                serial_hash: [7u8; 32],
                denomination: Denomination::Ten,
            }],
            1,
        );
        index.connect_block(next_block(&index, vec![spend])).unwrap();
        assert_eq!(index.find_spend(&[7u8; 32]).unwrap().height, 2);
        assert!(index.find_spend(&[8u8; 32]).is_none());
    }

    #[test]
    fn test_read_retry_interrupted_by_shutdown() {
        let chain = shared(ChainIndex::new());
        let shutdown = ShutdownSignal::new();
        shutdown.request();
        assert!(matches!(
            read_retry(&chain, 3, Duration::from_millis(1), &shutdown),
            Err(ChainError::Interrupted)
        ));
    }

    #[test]
    fn test_read_retry_times_out_under_writer() {
        let chain = shared(ChainIndex::new());
        let shutdown = ShutdownSignal::new();
        let _writer = chain.write();
        assert!(matches!(
            read_retry(&chain, 2, Duration::from_millis(1), &shutdown),
            Err(ChainError::LockTimeout { attempts: 2 })
        ));
    }
}
