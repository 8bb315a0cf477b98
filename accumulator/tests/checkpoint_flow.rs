//! End-to-end checkpoint and witness flow
//!
//! Drives a small in-memory chain with a tempfile-backed checksum store:
//! checkpoints recomputed by the engine land in headers, witnesses are built
//! against them, and pruning respects live checkpoints.

use std::sync::Arc;

use num_bigint::BigUint;
use tempfile::tempdir;
use umbra_accumulator::{
    AccumulatorError, BootstrapTable, CheckpointEngine, CheckpointParams, ChecksumStore, Network,
    WitnessBuilder, SECURITY_LEVEL_MAX,
};
use umbra_chain::{
    Block, BlockHeader, ChainError, ChainIndex, SharedChain, ShutdownSignal, Transaction, TxOut,
};
use umbra_storage::Storage;
use umbra_zerocoin::{Denomination, PublicCoin, ZerocoinParams};

struct Harness {
    _dir: tempfile::TempDir,
    engine: CheckpointEngine,
    builder: WitnessBuilder,
    chain: SharedChain,
    shutdown: ShutdownSignal,
}

fn harness(required_accumulation: usize) -> Harness {
    let dir = tempdir().unwrap();
    let storage = Arc::new(Storage::open(dir.path().join("test.db")).unwrap());
    let store = Arc::new(ChecksumStore::new(storage, 0));
    let config = CheckpointParams {
        required_accumulation,
        ..Default::default()
    };
    let shutdown = ShutdownSignal::new();
    let engine = CheckpointEngine::new(
        ZerocoinParams::testing(),
        config.clone(),
        store.clone(),
        BootstrapTable::for_network(Network::Regtest).unwrap(),
        shutdown.clone(),
    );
    let builder = WitnessBuilder::new(ZerocoinParams::testing(), config, store, shutdown.clone());
    Harness {
        _dir: dir,
        engine,
        builder,
        chain: umbra_chain::shared(ChainIndex::new()),
        shutdown,
    }
}

fn coin(value: u32) -> PublicCoin {
    PublicCoin::new(BigUint::from(value), Denomination::Ten)
}

fn mint_tx(coin: PublicCoin, nonce: u64) -> Transaction {
    Transaction::new(vec![TxOut::ZerocoinMint { coin }], nonce)
}

impl Harness {
    fn push_block(&self, txs: Vec<Transaction>) {
        let mut index = self.chain.write();
        let height = index.tip_height().map(|h| h + 1).unwrap_or(0);
        let prev_hash = if height == 0 {
            [0u8; 32]
        } else {
            index.block_at(height - 1).unwrap().hash()
        };
        let checkpoint = self.engine.compute_checkpoint(&index, height).unwrap();
        let mut block = Block::new(
            BlockHeader {
                height,
                prev_hash,
                timestamp: 1000 + height,
                tx_root: [0u8; 32],
                accumulator_checkpoint: checkpoint,
            },
            txs,
        );
        block.header.tx_root = block.compute_tx_root();
        index.connect_block(block).unwrap();
    }

    fn push_empty_until(&self, height: u64) {
        while self.chain.read().tip_height().map_or(true, |h| h < height) {
            self.push_block(vec![]);
        }
    }

    /// Target minted at 21 with decoys at 22 and 23; first live checkpoint
    /// at boundary 40.
    fn seed_standard_scenario(&self) -> PublicCoin {
        let target = coin(104_729);
        self.push_empty_until(20);
        self.push_block(vec![mint_tx(target.clone(), 0)]);
        self.push_block(vec![mint_tx(coin(7919), 1)]);
        self.push_block(vec![mint_tx(coin(99_991), 2)]);
        target
    }
}

mod checkpoint_tests {
    use super::*;

    #[test]
    fn test_headers_validate_end_to_end() {
        let h = harness(1);
        h.seed_standard_scenario();
        h.push_empty_until(69);

        let index = h.chain.read();
        for height in 1..=69 {
            let header = index.header_at(height).unwrap();
            h.engine.validate(&index, header, true).unwrap();
        }
    }

    #[test]
    fn test_recompute_reseeds_from_bootstrap_when_digests_lost() {
        let h = harness(1);
        h.seed_standard_scenario();
        h.push_empty_until(49);

        let index = h.chain.read();
        let ck40 = index.checkpoint_at(40).unwrap();
        let slice = ck40.slice(Denomination::Ten).unwrap();
        h.engine.store().erase(slice).unwrap();

        // the boundary-50 window is quiet, so the recompute seeded from the
        // bootstrap table must still land on the parent checkpoint
        let ck50 = h.engine.compute_checkpoint(&index, 50).unwrap();
        assert_eq!(ck50, ck40);
    }

    #[test]
    fn test_boundary_coverage_and_idempotence() {
        let h = harness(1);
        h.seed_standard_scenario();
        h.push_empty_until(69);

        let index = h.chain.read();
        // mints at 21-23 are first covered by the boundary at 40
        assert!(index.checkpoint_at(30).unwrap().is_zero());
        let ck40 = index.checkpoint_at(40).unwrap();
        assert!(!ck40.is_zero());
        assert_eq!(index.checkpoint_at(50).unwrap(), ck40);
        assert_eq!(index.checkpoint_at(60).unwrap(), ck40);
        // off-boundary heights inherit
        assert_eq!(index.checkpoint_at(47).unwrap(), ck40);
    }
}

mod witness_tests {
    use super::*;

    #[test]
    fn test_build_and_verify_witness() {
        let h = harness(1);
        let target = h.seed_standard_scenario();
        // tip 69 pins the safety floor to boundary 40 = the minimum stop,
        // so the walk is deterministic regardless of jitter
        h.push_empty_until(69);

        let job = h.builder.build_witness(&h.chain, &target, 0, None).unwrap();
        assert_eq!(job.mints_added, 2);
        assert!(job.witness.verify(&job.accumulator, &target));

        let index = h.chain.read();
        let slice = index
            .checkpoint_at(40)
            .unwrap()
            .slice(Denomination::Ten)
            .unwrap();
        let stored = h.engine.store().get(slice, false).unwrap().unwrap();
        assert_eq!(job.accumulator.value(), &stored);
    }

    #[test]
    fn test_sentinel_walks_to_safety_floor() {
        let h = harness(1);
        let target = h.seed_standard_scenario();
        // a later mint at 41 moves the checkpoint again at boundary 60
        h.push_empty_until(40);
        h.push_block(vec![mint_tx(coin(65_537), 3)]);
        h.push_empty_until(89);

        let job = h
            .builder
            .build_witness(&h.chain, &target, SECURITY_LEVEL_MAX, None)
            .unwrap();
        // floor boundary is 60: all three decoys are in the window
        assert_eq!(job.mints_added, 3);
        assert!(job.witness.verify(&job.accumulator, &target));
    }

    #[test]
    fn test_explicit_target_height() {
        let h = harness(1);
        let target = h.seed_standard_scenario();
        h.push_empty_until(40);
        h.push_block(vec![mint_tx(coin(65_537), 3)]);
        h.push_empty_until(89);

        let job = h
            .builder
            .build_witness(&h.chain, &target, 0, Some(60))
            .unwrap();
        assert_eq!(job.mints_added, 3);

        // a target boundary that cannot cover the mint is rejected
        assert!(matches!(
            h.builder.build_witness(&h.chain, &target, 0, Some(30)),
            Err(AccumulatorError::ImmatureMint)
        ));
    }

    #[test]
    fn test_decoy_floor_is_enforced() {
        let h = harness(3);
        let target = h.seed_standard_scenario();
        h.push_empty_until(69);

        assert!(matches!(
            h.builder.build_witness(&h.chain, &target, 0, None),
            Err(AccumulatorError::InsufficientAccumulation {
                required: 3,
                added: 2
            })
        ));
    }

    #[test]
    fn test_immature_mint_rejected() {
        let h = harness(1);
        let target = h.seed_standard_scenario();
        // tip 45: safety floor boundary 20 is before the mint's coverage
        h.push_empty_until(45);

        assert!(matches!(
            h.builder.build_witness(&h.chain, &target, 0, None),
            Err(AccumulatorError::ImmatureMint)
        ));
    }

    #[test]
    fn test_unknown_mint_rejected() {
        let h = harness(1);
        h.seed_standard_scenario();
        h.push_empty_until(69);

        assert!(matches!(
            h.builder.build_witness(&h.chain, &coin(65_537), 0, None),
            Err(AccumulatorError::UnknownMint)
        ));
    }

    #[test]
    fn test_shutdown_interrupts_spend_path() {
        let h = harness(1);
        let target = h.seed_standard_scenario();
        h.push_empty_until(69);

        h.shutdown.request();
        assert!(matches!(
            h.builder.build_witness(&h.chain, &target, 0, None),
            Err(AccumulatorError::Chain(ChainError::Interrupted))
        ));
    }
}

mod prune_tests {
    use super::*;

    #[test]
    fn test_prune_keeps_live_checkpoint_digests() {
        let h = harness(1);
        h.seed_standard_scenario();
        h.push_empty_until(40);
        h.push_block(vec![mint_tx(coin(65_537), 3)]);
        h.push_empty_until(80);

        let index = h.chain.read();
        let ck40 = index.checkpoint_at(40).unwrap();
        let ck60 = index.checkpoint_at(60).unwrap();
        assert_ne!(ck40, ck60);

        let store = h.engine.store();
        store.prune_range(0, 60, 10, &index).unwrap();

        // everything the checkpoint at 60 references survives
        for denom in umbra_zerocoin::DENOMINATIONS {
            let slice = ck60.slice(denom).unwrap();
            assert!(store.get(slice, false).unwrap().is_some());
        }
        // the superseded denomination-10 digest from the older era is gone
        let old_slice = ck40.slice(Denomination::Ten).unwrap();
        assert_ne!(old_slice, ck60.slice(Denomination::Ten).unwrap());
        assert!(store.get(old_slice, false).unwrap().is_none());
    }
}
