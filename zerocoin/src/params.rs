//! Zerocoin parameter sets
//!
//! A parameter set fixes the coin commitment group (a safe-prime group with
//! two independent generators) and the accumulator group (an RSA-style
//! modulus of unknown factorization plus a starting base). The constants are
//! consensus-critical: every node must use the same set or checkpoints and
//! witnesses diverge.
//!
//! `default_params()` is the full-size production set; `testing()` is a
//! deliberately small set so the commitment-retry loop and primality checks
//! run in microseconds under test.

use std::sync::Arc;

use num_bigint::BigUint;
use once_cell::sync::Lazy;

/// A multiplicative group mod a safe prime with two generators of the
/// prime-order subgroup
#[derive(Clone, Debug)]
pub struct IntegerGroup {
    /// Safe-prime modulus p = 2q + 1
    pub modulus: BigUint,
    /// Order q of the generated subgroup
    pub order: BigUint,
    /// First generator
    pub g: BigUint,
    /// Second generator, independent of `g`
    pub h: BigUint,
}

/// Complete zerocoin parameter set
#[derive(Clone, Debug)]
pub struct ZerocoinParams {
    /// Group the Pedersen coin commitments live in
    pub coin_commitment_group: IntegerGroup,
    /// RSA-style accumulator modulus N
    pub accumulator_modulus: BigUint,
    /// Accumulator starting value (the group identity for this scheme)
    pub accumulator_base: BigUint,
    /// Lower bound on a valid coin commitment
    pub min_coin_value: BigUint,
    /// Upper bound on a valid coin commitment
    pub max_coin_value: BigUint,
}

impl ZerocoinParams {
    /// Full-size parameter set
    pub fn default_params() -> Arc<Self> {
        DEFAULT_PARAMS.clone()
    }

    /// Small parameter set for tests
    pub fn testing() -> Arc<Self> {
        TESTING_PARAMS.clone()
    }
}

/// Parse a hex constant. Only used on the embedded parameter strings below.
fn bn(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16).expect("parameter constants are valid hex")
}

// 1024-bit safe-prime commitment group, 2048-bit accumulator modulus.
static DEFAULT_PARAMS: Lazy<Arc<ZerocoinParams>> = Lazy::new(|| {
    let modulus = bn(
        "bc86c5e164f0d74fd78af3f4315c2120a400e5d9f7e8b2cc90c1eccead98cacb\
         d8a2bafa3f10092c7cc66fcdfcfde5f958864d423ebdbfdd9fb86d5c29e1347d\
         eec3c3664159dacbb05072946cc877261f9501f7f027abd7588871bad9bb8fe8\
         a6800ffacec6fb27c407f609acec68324d60cd10b7e7842d90a3b2e77b3d127b",
    );
    let order = bn(
        "5e4362f0b2786ba7ebc579fa18ae1090520072ecfbf459664860f66756cc6565\
         ec515d7d1f8804963e6337e6fe7ef2fcac4326a11f5edfeecfdc36ae14f09a3e\
         f761e1b320aced65d828394a36643b930fca80fbf813d5ebac4438dd6cddc7f4\
         534007fd67637d93e203fb04d676341926b066885bf3c216c851d973bd9e893d",
    );
    let g = bn(
        "1d6bb1ff33d57fc9ff136bdc017335e2f4dea77ac4ea383df73a0f2a3867246a\
         be56905d3dfa956ade7f8e54b758bdda6271edecfda2d79f1b148a8d92ff4d1f\
         4a5754f2510854c5fe8cb2e4edf08528a54d37e3e6c00a29af04c1afd6cdda3e\
         674a74662969154cef4770d9b3e18d787835d0128621a0a2b1530f9632f862c1",
    );
    let h = bn(
        "1c4ba1f0360446d79a98a8324a86207b52882cfbdeca4745415e672bc95ef1ad\
         293f5ed27d131f41a562fc87f8ff59305bba2a5bbfc820ada2b18e5bf4b4cd97\
         c7571b986303ea4082f83f2a7d30bb8c424cfdf17768a0ec768f2d014e7dfd46\
         8d37549266008b7772daddc68d5a37db55c2cdc133c8dc27eb9481001f50b034",
    );
    let accumulator_modulus = bn(
        "5eabd097bc164d15b9566b2e8997853e3f09250755526cbfe37a060513a04c61\
         7e9c06cb5a4d44c1919c0f407b3e8d2a0ccce1f778c294f28009a4144028b2ff\
         26b9d038ed41b6c02facf1fcb987e08ea0482ce3e2f3c60cc5a1d053a579f096\
         959888a748e15b5cd1fcd394416840f68d3b7a1013a31872e2e6f1f25a5dcd7a\
         dd18d2bd8e97add7b7bea95d04fdddea57362e17697dd8bbfdde33c481895a58\
         92350d8bbc09fde708b430e79e6ed20e38520c4642d52b2133939c2dd343536e\
         2fa0314f605cae89beffb49c2dd89cc1285d8df2e5137d5540f5e87a529024d4\
         27ab0c22c3f9d1ae093f1c3f4307e5d87d5d5c8af71c36e72027dfd34ca78417",
    );
    let max_coin_value = &modulus - BigUint::from(1u8);
    Arc::new(ZerocoinParams {
        coin_commitment_group: IntegerGroup { modulus, order, g, h },
        accumulator_modulus,
        accumulator_base: BigUint::from(961u32),
        min_coin_value: BigUint::from(2u8),
        max_coin_value,
    })
});

// 128-bit safe-prime commitment group, 192-bit accumulator modulus.
static TESTING_PARAMS: Lazy<Arc<ZerocoinParams>> = Lazy::new(|| {
    let modulus = bn("a0c37769a5be701417bcf273997391af");
    let order = bn("5061bbb4d2df380a0bde7939ccb9c8d7");
    let g = bn("3b24d28e7534070bb5412d8c2775fc5f");
    let h = bn("190f56cbad44de0f30f556a571603786");
    let accumulator_modulus = bn("adc0ed80a432de62040ff45d081c3e970b6b8cfeb4c91001");
    let max_coin_value = &modulus - BigUint::from(1u8);
    Arc::new(ZerocoinParams {
        coin_commitment_group: IntegerGroup { modulus, order, g, h },
        accumulator_modulus,
        accumulator_base: BigUint::from(961u32),
        min_coin_value: BigUint::from(2u8),
        max_coin_value,
    })
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::is_prime;
    use num_traits::One;

    #[test]
    fn test_testing_group_is_sound() {
        let params = ZerocoinParams::testing();
        let group = &params.coin_commitment_group;
        assert!(is_prime(&group.modulus));
        assert!(is_prime(&group.order));
        // safe prime: p = 2q + 1
        let two_q_plus_one = &group.order * BigUint::from(2u8) + BigUint::from(1u8);
        assert_eq!(two_q_plus_one, group.modulus);
        // generators have order q
        assert!(group.g.modpow(&group.order, &group.modulus).is_one());
        assert!(group.h.modpow(&group.order, &group.modulus).is_one());
    }

    #[test]
    fn test_default_group_is_safe_prime() {
        let params = ZerocoinParams::default_params();
        let group = &params.coin_commitment_group;
        let two_q_plus_one = &group.order * BigUint::from(2u8) + BigUint::from(1u8);
        assert_eq!(two_q_plus_one, group.modulus);
        assert!(group.g.modpow(&group.order, &group.modulus).is_one());
        assert!(group.h.modpow(&group.order, &group.modulus).is_one());
    }

    #[test]
    fn test_base_below_moduli() {
        for params in [ZerocoinParams::testing(), ZerocoinParams::default_params()] {
            assert!(params.accumulator_base < params.accumulator_modulus);
            assert!(params.min_coin_value < params.max_coin_value);
        }
    }
}
