//! Deterministic mint derivation and chain recovery
//!
//! Every coin the wallet mints is reproducible from `(master seed, count)`:
//! the counter is hashed into a 64-byte wide seed whose halves drive the
//! keypair/serial derivation and the commitment randomness. The commitment
//! search walks a deterministic candidate sequence, where each attempt
//! perturbs only the randomness with a hashed delta (one `h^delta` modmul
//! on the commitment), and takes the first candidate that is in range and
//! prime. Same seed and count always reproduce the same coin, which is
//! what makes seed-only recovery from chain data possible.

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, info};
use umbra_chain::ChainIndex;
use umbra_storage::Storage;
use umbra_zerocoin::coin::{
    commit, is_valid_coin_value, serial_hash, stake_hash, CoinKeypair, PrivateCoin, PublicCoin,
    COIN_VERSION,
};
use umbra_zerocoin::{Denomination, DeterministicMint, MintPoolEntry, ZerocoinParams};
use zeroize::Zeroizing;

use crate::errors::{WalletError, WalletResult};
use crate::pool::MintPool;

/// Pool entries generated ahead of the last used counter per sync pass
pub const DEFAULT_POOL_BATCH: u32 = 20;

/// Retry budget for keypair and serial scalar derivation
const MAX_SCALAR_ATTEMPTS: u32 = 1_000;

/// Retry budget for the commitment validity search. Prime density makes the
/// expected attempt count a few hundred even at full parameter size.
const MAX_COMMITMENT_ATTEMPTS: usize = 100_000;

/// Derive the 64-byte wide seed for one counter
fn wide_seed(master: &[u8; 32], count: u32) -> Zeroizing<[u8; 64]> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"umbra.wallet.seed");
    hasher.update(master);
    hasher.update(&count.to_le_bytes());
    let mut wide = Zeroizing::new([0u8; 64]);
    hasher.finalize_xof().fill(wide.as_mut());
    wide
}

fn seed_halves(wide: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut key_half = [0u8; 32];
    let mut randomness_half = [0u8; 32];
    key_half.copy_from_slice(&wide[..32]);
    randomness_half.copy_from_slice(&wide[32..]);
    (key_half, randomness_half)
}

fn derive_keypair(params: &ZerocoinParams, key_half: &[u8; 32]) -> WalletResult<CoinKeypair> {
    let order = &params.coin_commitment_group.order;
    let mut candidate = *key_half;
    for _ in 0..MAX_SCALAR_ATTEMPTS {
        // reduce into the group order first; the order can be far narrower
        // than the 256-bit hash output
        let scalar = BigUint::from_bytes_be(&candidate) % order;
        if !scalar.is_zero() {
            let bytes = scalar.to_bytes_be();
            let mut secret = [0u8; 32];
            secret[32 - bytes.len()..].copy_from_slice(&bytes);
            if let Some(keypair) = CoinKeypair::from_secret(params, secret) {
                return Ok(keypair);
            }
        }
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"umbra.wallet.keypair");
        hasher.update(&candidate);
        candidate = *hasher.finalize().as_bytes();
    }
    Err(WalletError::DerivationExhausted(MAX_SCALAR_ATTEMPTS))
}

fn derive_serial(params: &ZerocoinParams, key_half: &[u8; 32]) -> WalletResult<BigUint> {
    let order = &params.coin_commitment_group.order;
    for attempt in 0u32..MAX_SCALAR_ATTEMPTS {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"umbra.wallet.serial");
        hasher.update(key_half);
        hasher.update(&attempt.to_le_bytes());
        let serial = BigUint::from_bytes_be(hasher.finalize().as_bytes()) % order;
        if !serial.is_zero() {
            return Ok(serial);
        }
    }
    Err(WalletError::DerivationExhausted(MAX_SCALAR_ATTEMPTS))
}

/// Deterministic `(randomness, commitment)` candidate sequence for a fixed
/// serial. Attempt `n+1` differs from attempt `n` by a hashed delta on the
/// randomness only, so the commitment update is one modmul instead of a
/// fresh double exponentiation.
pub struct CommitmentCandidates<'a> {
    params: &'a ZerocoinParams,
    randomness_seed: [u8; 32],
    randomness: BigUint,
    commitment: BigUint,
    attempt: u64,
}

impl<'a> CommitmentCandidates<'a> {
    pub fn new(params: &'a ZerocoinParams, serial: &BigUint, randomness_seed: [u8; 32]) -> Self {
        let order = &params.coin_commitment_group.order;
        let randomness = BigUint::from_bytes_be(&randomness_seed) % order;
        let commitment = commit(params, serial, &randomness);
        Self {
            params,
            randomness_seed,
            randomness,
            commitment,
            attempt: 0,
        }
    }
}

impl Iterator for CommitmentCandidates<'_> {
    type Item = (BigUint, BigUint);

    fn next(&mut self) -> Option<Self::Item> {
        if self.attempt > 0 {
            let group = &self.params.coin_commitment_group;
            let mut hasher = blake3::Hasher::new();
            hasher.update(b"umbra.wallet.randomness");
            hasher.update(&self.randomness_seed);
            hasher.update(&self.attempt.to_le_bytes());
            let delta = BigUint::from_bytes_be(hasher.finalize().as_bytes()) % &group.order;

            self.randomness = (&self.randomness + &delta) % &group.order;
            let h_delta = group.h.modpow(&delta, &group.modulus);
            self.commitment = (&self.commitment * h_delta) % &group.modulus;
        }
        self.attempt += 1;
        Some((self.randomness.clone(), self.commitment.clone()))
    }
}

/// Derive the full private coin for one wide seed
pub fn seed_to_coin(
    params: &Arc<ZerocoinParams>,
    wide: &[u8; 64],
    denomination: Denomination,
) -> WalletResult<PrivateCoin> {
    let (key_half, randomness_half) = seed_halves(wide);
    let keypair = derive_keypair(params, &key_half)?;
    let serial = derive_serial(params, &key_half)?;

    let (randomness, commitment) = CommitmentCandidates::new(params, &serial, randomness_half)
        .take(MAX_COMMITMENT_ATTEMPTS)
        .find(|(_, candidate)| is_valid_coin_value(params, candidate))
        .ok_or(WalletError::DerivationExhausted(
            MAX_COMMITMENT_ATTEMPTS as u32,
        ))?;

    Ok(PrivateCoin::new(
        PublicCoin::new(commitment, denomination),
        serial,
        randomness,
        keypair,
    ))
}

/// Deterministic mint generator over a master seed
pub struct ZerocoinWallet {
    params: Arc<ZerocoinParams>,
    storage: Arc<Storage>,
    master_seed: Option<Zeroizing<[u8; 32]>>,
    pool: MintPool,
    count_last_used: u32,
}

impl ZerocoinWallet {
    /// Open a wallet over existing storage; starts locked
    pub fn open(params: Arc<ZerocoinParams>, storage: Arc<Storage>) -> WalletResult<Self> {
        let count_last_used = storage.wallet.get_count_last_used()?.unwrap_or(0);
        let mut pool = MintPool::new();
        for entry in storage.wallet.load_pool()? {
            pool.add(entry);
        }
        debug!(count_last_used, pool = pool.len(), "opened zerocoin wallet");
        Ok(Self {
            params,
            storage,
            master_seed: None,
            pool,
            count_last_used,
        })
    }

    /// Load the master seed. Fails if storage already holds records for a
    /// different seed.
    pub fn set_master_seed(&mut self, seed: [u8; 32]) -> WalletResult<()> {
        let seed_hash = hash_seed(&seed);
        match self.storage.wallet.get_seed_hash()? {
            Some(existing) if existing != seed_hash => return Err(WalletError::SeedMismatch),
            Some(_) => {}
            None => self.storage.wallet.set_seed_hash(&seed_hash)?,
        }
        self.master_seed = Some(Zeroizing::new(seed));
        Ok(())
    }

    /// Drop the master seed; the backing memory is wiped
    pub fn lock(&mut self) {
        self.master_seed = None;
    }

    pub fn is_locked(&self) -> bool {
        self.master_seed.is_none()
    }

    pub fn count_last_used(&self) -> u32 {
        self.count_last_used
    }

    /// The counter the next fresh mint should use
    pub fn next_count(&self) -> u32 {
        self.count_last_used + 1
    }

    pub fn pool(&self) -> &MintPool {
        &self.pool
    }

    pub fn seed_hash(&self) -> WalletResult<[u8; 32]> {
        Ok(hash_seed(self.master()?))
    }

    fn master(&self) -> WalletResult<&[u8; 32]> {
        self.master_seed.as_deref().ok_or(WalletError::Locked)
    }

    /// Re-derive the full coin for a counter
    pub fn derive_coin(&self, count: u32, denomination: Denomination) -> WalletResult<PrivateCoin> {
        let wide = wide_seed(self.master()?, count);
        seed_to_coin(&self.params, &wide, denomination)
    }

    /// Extend the lookahead pool by `batch` counters past the furthest
    /// counter already covered. Entries are persisted as they are derived.
    pub fn generate_mint_pool(&mut self, batch: u32) -> WalletResult<usize> {
        let master = Zeroizing::new(*self.master()?);
        let seed_hash = hash_seed(&master);
        let start = self
            .pool
            .max_count()
            .map(|c| c + 1)
            .unwrap_or(self.count_last_used + 1)
            .max(self.count_last_used + 1);

        let mut added = 0usize;
        for count in start..start + batch {
            let wide = wide_seed(&master, count);
            let coin = seed_to_coin(&self.params, &wide, Denomination::One)?;
            let entry = MintPoolEntry {
                seed_hash,
                pubcoin_hash: coin.public_coin().hash(),
                count,
            };
            self.storage.wallet.save_pool_entry(&entry)?;
            self.pool.add(entry);
            added += 1;
        }
        debug!(start, added, "extended mint pool");
        Ok(added)
    }

    /// Recover wallet state from the chain: extend the pool, match pool
    /// entries against the mint index, materialize full records for hits
    /// (marking already-spent serials used), advance the counter, and repeat
    /// until a full pass finds nothing new. Returns the number of mints
    /// recovered.
    pub fn sync_with_chain(&mut self, chain: &ChainIndex) -> WalletResult<usize> {
        let mut recovered = 0usize;
        loop {
            self.generate_mint_pool(DEFAULT_POOL_BATCH)?;

            let mut found = false;
            for entry in self.pool.snapshot() {
                let Some(location) = chain.find_mint(&entry.pubcoin_hash) else {
                    continue;
                };
                let coin = self.derive_coin(entry.count, location.denomination)?;
                if coin.public_coin().hash() != entry.pubcoin_hash {
                    return Err(WalletError::RecordMismatch("pubcoin hash"));
                }

                let serial_digest = serial_hash(coin.serial());
                let mut record = DeterministicMint::new(
                    COIN_VERSION,
                    entry.count,
                    entry.seed_hash,
                    serial_digest,
                    entry.pubcoin_hash,
                    stake_hash(coin.serial()),
                    location.denomination,
                );
                record.mark_seen(location.height, location.txid);
                if chain.find_spend(&serial_digest).is_some() {
                    record.mark_used(true);
                }
                self.storage.wallet.save_mint(&record)?;

                if entry.count > self.count_last_used {
                    self.count_last_used = entry.count;
                    self.storage.wallet.set_count_last_used(self.count_last_used)?;
                }
                self.storage.wallet.remove_pool_entry(&entry.pubcoin_hash)?;
                self.pool.remove(&entry.pubcoin_hash);

                info!(
                    count = entry.count,
                    height = location.height,
                    used = record.used,
                    "recovered deterministic mint from chain"
                );
                recovered += 1;
                found = true;
            }

            if !found {
                break;
            }
        }
        Ok(recovered)
    }

    /// Record the on-chain location of a stored mint
    pub fn set_mint_seen(
        &mut self,
        pubcoin_hash: &[u8; 32],
        height: u64,
        txid: [u8; 32],
    ) -> WalletResult<()> {
        let mut record = self
            .storage
            .wallet
            .get_mint(pubcoin_hash)?
            .ok_or_else(|| WalletError::UnknownMintRecord(hex::encode(pubcoin_hash)))?;
        record.mark_seen(height, txid);
        self.storage.wallet.save_mint(&record)?;
        Ok(())
    }

    /// Flip a stored mint's used flag
    pub fn set_mint_used(&mut self, pubcoin_hash: &[u8; 32], used: bool) -> WalletResult<()> {
        let mut record = self
            .storage
            .wallet
            .get_mint(pubcoin_hash)?
            .ok_or_else(|| WalletError::UnknownMintRecord(hex::encode(pubcoin_hash)))?;
        record.mark_used(used);
        self.storage.wallet.save_mint(&record)?;
        Ok(())
    }

    /// Re-derive the private coin behind a stored record, cross-checking
    /// the seed, pubcoin, and serial hashes before handing it out.
    pub fn regenerate_mint(&self, record: &DeterministicMint) -> WalletResult<PrivateCoin> {
        if record.seed_hash != self.seed_hash()? {
            return Err(WalletError::SeedMismatch);
        }
        let coin = self.derive_coin(record.count, record.denomination)?;
        if coin.public_coin().hash() != record.pubcoin_hash {
            return Err(WalletError::RecordMismatch("pubcoin hash"));
        }
        if serial_hash(coin.serial()) != record.serial_hash {
            return Err(WalletError::RecordMismatch("serial hash"));
        }
        Ok(coin)
    }
}

fn hash_seed(seed: &[u8; 32]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"umbra.wallet.seedhash");
    hasher.update(seed);
    *hasher.finalize().as_bytes()
}
