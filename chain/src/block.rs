//! Block and transaction types
//!
//! Only the pieces the accumulator subsystem reads are modeled: transparent
//! value transfer, zerocoin mints (a commitment entering the chain), and
//! zerocoin spends (a serial hash leaving the shielded pool). The header
//! carries the packed accumulator checkpoint alongside the usual linkage
//! fields.

use serde::{Deserialize, Serialize};
use umbra_zerocoin::{Checkpoint, Denomination, PublicCoin};

/// One transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOut {
    /// Plain value transfer
    Transparent { amount: u64 },
    /// A coin commitment entering the shielded pool
    ZerocoinMint { coin: PublicCoin },
    /// A serial leaving the shielded pool; the commitment stays hidden
    ZerocoinSpend {
        serial_hash: [u8; 32],
        denomination: Denomination,
    },
}

/// Transaction: a bag of outputs plus a nonce for txid uniqueness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub outputs: Vec<TxOut>,
    pub nonce: u64,
}

impl Transaction {
    pub fn new(outputs: Vec<TxOut>, nonce: u64) -> Self {
        Self { outputs, nonce }
    }

    /// Transaction id: hash of the serialized transaction
    pub fn txid(&self) -> [u8; 32] {
        let data = bincode::serialize(self).unwrap_or_default();
        blake3::hash(&data).into()
    }

    /// All mint commitments in this transaction
    pub fn mint_coins(&self) -> impl Iterator<Item = &PublicCoin> {
        self.outputs.iter().filter_map(|out| match out {
            TxOut::ZerocoinMint { coin } => Some(coin),
            _ => None,
        })
    }

    /// All spent serial hashes in this transaction
    pub fn spend_serials(&self) -> impl Iterator<Item = ([u8; 32], Denomination)> + '_ {
        self.outputs.iter().filter_map(|out| match out {
            TxOut::ZerocoinSpend {
                serial_hash,
                denomination,
            } => Some((*serial_hash, *denomination)),
            _ => None,
        })
    }

    pub fn has_zerocoin(&self) -> bool {
        self.outputs
            .iter()
            .any(|out| !matches!(out, TxOut::Transparent { .. }))
    }
}

/// Block header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block height (number)
    pub height: u64,
    /// Previous block hash
    pub prev_hash: [u8; 32],
    /// Block timestamp (Unix seconds)
    pub timestamp: u64,
    /// Transaction Merkle root
    pub tx_root: [u8; 32],
    /// Packed per-denomination accumulator checkpoint
    pub accumulator_checkpoint: Checkpoint,
}

impl BlockHeader {
    /// Compute header hash
    pub fn hash(&self) -> [u8; 32] {
        let data = bincode::serialize(self).unwrap_or_default();
        blake3::hash(&data).into()
    }
}

/// Complete block with header and transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a new block
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn hash(&self) -> [u8; 32] {
        self.header.hash()
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    /// Verify block integrity (tx root matches the transactions)
    pub fn verify(&self) -> bool {
        self.compute_tx_root() == self.header.tx_root
    }

    /// Compute transaction Merkle root
    pub fn compute_tx_root(&self) -> [u8; 32] {
        if self.transactions.is_empty() {
            return [0u8; 32];
        }

        let mut leaves: Vec<[u8; 32]> =
            self.transactions.iter().map(|tx| tx.txid()).collect();

        while leaves.len() > 1 {
            let mut next_level = Vec::new();
            for chunk in leaves.chunks(2) {
                let mut combined = Vec::new();
                combined.extend_from_slice(&chunk[0]);
                if chunk.len() > 1 {
                    combined.extend_from_slice(&chunk[1]);
                } else {
                    combined.extend_from_slice(&chunk[0]);
                }
                next_level.push(blake3::hash(&combined).into());
            }
            leaves = next_level;
        }

        leaves[0]
    }

    /// Mint commitments of one denomination, in transaction order
    pub fn mints_of(&self, denomination: Denomination) -> Vec<&PublicCoin> {
        self.transactions
            .iter()
            .flat_map(|tx| tx.mint_coins())
            .filter(|coin| coin.denomination() == denomination)
            .collect()
    }

    /// All mint commitments in this block, with their txid
    pub fn mints_with_txid(&self) -> Vec<([u8; 32], &PublicCoin)> {
        self.transactions
            .iter()
            .flat_map(|tx| {
                let txid = tx.txid();
                tx.mint_coins().map(move |coin| (txid, coin))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn mint_tx(value: u32, denom: Denomination, nonce: u64) -> Transaction {
        Transaction::new(
            vec![TxOut::ZerocoinMint {
                coin: PublicCoin::new(BigUint::from(value), denom),
            }],
            nonce,
        )
    }

    fn block_with(transactions: Vec<Transaction>, height: u64) -> Block {
        let mut block = Block::new(
            BlockHeader {
                height,
                prev_hash: [0u8; 32],
                timestamp: 12345,
                tx_root: [0u8; 32],
                accumulator_checkpoint: Checkpoint::zero(),
            },
            transactions,
        );
        block.header.tx_root = block.compute_tx_root();
        block
    }

    #[test]
    fn test_txid_differs_by_nonce() {
        let a = mint_tx(104_729, Denomination::Ten, 0);
        let b = mint_tx(104_729, Denomination::Ten, 1);
        assert_ne!(a.txid(), b.txid());
    }

    #[test]
    fn test_verify_detects_tx_root_mismatch() {
        let mut block = block_with(vec![mint_tx(104_729, Denomination::Ten, 0)], 5);
        assert!(block.verify());
        block.header.tx_root = [0xAA; 32];
        assert!(!block.verify());
    }

    #[test]
    fn test_mints_of_filters_by_denomination() {
        let block = block_with(
            vec![
                mint_tx(104_729, Denomination::Ten, 0),
                mint_tx(7919, Denomination::Fifty, 1),
                mint_tx(99_991, Denomination::Ten, 2),
            ],
            7,
        );
        assert_eq!(block.mints_of(Denomination::Ten).len(), 2);
        assert_eq!(block.mints_of(Denomination::Fifty).len(), 1);
        assert!(block.mints_of(Denomination::One).is_empty());
    }

    #[test]
    fn test_spend_serials() {
        let tx = Transaction::new(
            vec![
                TxOut::Transparent { amount: 50 },
                TxOut::ZerocoinSpend {
                    serial_hash: [3u8; 32],
                    denomination: Denomination::TwentyFive,
                },
            ],
            0,
        );
        let spends: Vec<_> = tx.spend_serials().collect();
        assert_eq!(spends, vec![([3u8; 32], Denomination::TwentyFive)]);
        assert!(tx.has_zerocoin());
    }
}
