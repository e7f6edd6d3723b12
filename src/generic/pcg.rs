/*!
A small seedable pseudorandom number generator.

The engine's tie-breaking --- the per-layer action permutations and the literal
order used by reason minimization --- must be reproducible from configuration
(see [Config::random_seed](crate::config::Config)), so randomness comes from
this generator rather than any process-wide source.

The generator is PCG32 with a fixed increment, following the minimal C
implementation from <https://www.pcg-random.org/>, exposed through the
[rand_core] traits so that [rand]'s shuffle and range helpers apply.
*/

use rand::SeedableRng;
use rand_core::{impls, Error, RngCore};

/// PCG32 state.
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

const INCREMENT: u64 = 0xda3e_39cb_94b9_5bdb;

impl RngCore for Pcg32 {
    fn next_u32(&mut self) -> u32 {
        let old_state = self.state;

        self.state = old_state
            .wrapping_mul(6364136223846793005_u64)
            .wrapping_add(self.inc);

        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Pcg32 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut rng = Pcg32 {
            state: u64::from_le_bytes(seed).wrapping_add(INCREMENT),
            inc: INCREMENT,
        };
        // One step so the seed influences the first output.
        rng.next_u32();
        rng
    }
}

#[cfg(test)]
mod pcg_tests {
    use super::*;

    #[test]
    fn deterministic_for_a_seed() {
        let mut a = Pcg32::from_seed(7_u64.to_le_bytes());
        let mut b = Pcg32::from_seed(7_u64.to_le_bytes());
        for _ in 0..64 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn seeds_diverge() {
        let mut a = Pcg32::from_seed(1_u64.to_le_bytes());
        let mut b = Pcg32::from_seed(2_u64.to_le_bytes());
        let diverged = (0..8).any(|_| a.next_u32() != b.next_u32());
        assert!(diverged);
    }
}
