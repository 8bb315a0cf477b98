//! Embedded bootstrap checkpoint tables
//!
//! Near the protocol's parameter-transition height the checksum store has no
//! history to seed a recompute from, so known-good accumulator values are
//! shipped with the binary as per-network JSON tables. Values are hex
//! big-endian, one per spendable denomination.

use std::collections::HashMap;

use num_bigint::BigUint;
use serde::Deserialize;
use umbra_zerocoin::{Denomination, CHECKPOINT_SLOTS, DENOMINATIONS};

use crate::errors::{AccumulatorError, AccumulatorResult};

const MAIN_CHECKPOINTS: &str = r#"[
  {
    "height": 0,
    "values": { "1": "3c1", "10": "3c1", "25": "3c1", "50": "3c1", "100": "3c1" }
  },
  {
    "height": 182700,
    "values": { "1": "3c1", "10": "3c1", "25": "3c1", "50": "3c1", "100": "3c1" }
  }
]"#;

const TEST_CHECKPOINTS: &str = r#"[
  {
    "height": 0,
    "values": { "1": "3c1", "10": "3c1", "25": "3c1", "50": "3c1", "100": "3c1" }
  }
]"#;

const REGTEST_CHECKPOINTS: &str = r#"[
  {
    "height": 0,
    "values": { "1": "3c1", "10": "3c1", "25": "3c1", "50": "3c1", "100": "3c1" }
  }
]"#;

/// Which embedded table to load
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Main,
    Test,
    Regtest,
}

#[derive(Deserialize)]
struct RawEntry {
    height: u64,
    values: HashMap<String, String>,
}

/// One table entry: accumulator values in canonical denomination order
#[derive(Clone, Debug)]
pub struct BootstrapCheckpoint {
    pub height: u64,
    pub values: [BigUint; CHECKPOINT_SLOTS],
}

/// Parsed per-network table, sorted by height
pub struct BootstrapTable {
    entries: Vec<BootstrapCheckpoint>,
}

impl BootstrapTable {
    /// Parse the embedded table for a network
    pub fn for_network(network: Network) -> AccumulatorResult<Self> {
        let raw = match network {
            Network::Main => MAIN_CHECKPOINTS,
            Network::Test => TEST_CHECKPOINTS,
            Network::Regtest => REGTEST_CHECKPOINTS,
        };
        Self::parse(raw)
    }

    fn parse(raw: &str) -> AccumulatorResult<Self> {
        let raw_entries: Vec<RawEntry> = serde_json::from_str(raw)
            .map_err(|e| AccumulatorError::Bootstrap(e.to_string()))?;

        let mut entries = Vec::with_capacity(raw_entries.len());
        for raw_entry in raw_entries {
            entries.push(parse_entry(raw_entry)?);
        }
        entries.sort_by_key(|entry| entry.height);

        Ok(Self { entries })
    }

    /// Entry at exactly this height, if the table has one
    pub fn exact(&self, height: u64) -> Option<&BootstrapCheckpoint> {
        self.entries.iter().find(|entry| entry.height == height)
    }

    /// Nearest entry at or below the requested height
    pub fn closest_below(&self, height: u64) -> Option<&BootstrapCheckpoint> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.height <= height)
    }
}

fn parse_entry(raw: RawEntry) -> AccumulatorResult<BootstrapCheckpoint> {
    let mut values: Vec<BigUint> = Vec::with_capacity(CHECKPOINT_SLOTS);
    for denom in DENOMINATIONS {
        let key = denom.value().to_string();
        let hex_value = raw.values.get(&key).ok_or_else(|| {
            AccumulatorError::Bootstrap(format!(
                "entry at height {} missing denomination {}",
                raw.height, denom
            ))
        })?;
        let value = BigUint::parse_bytes(hex_value.as_bytes(), 16).ok_or_else(|| {
            AccumulatorError::Bootstrap(format!(
                "entry at height {} has invalid hex for denomination {}",
                raw.height, denom
            ))
        })?;
        values.push(value);
    }
    for key in raw.values.keys() {
        let face: u64 = key
            .parse()
            .map_err(|_| AccumulatorError::Bootstrap(format!("unknown denomination key {key}")))?;
        if Denomination::from_value(face).map_or(true, |d| !d.is_spendable()) {
            return Err(AccumulatorError::Bootstrap(format!(
                "unknown denomination key {key}"
            )));
        }
    }

    let values: [BigUint; CHECKPOINT_SLOTS] = values
        .try_into()
        .map_err(|_| AccumulatorError::Bootstrap("wrong slot count".to_string()))?;
    Ok(BootstrapCheckpoint {
        height: raw.height,
        values,
    })
}
