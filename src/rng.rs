use rand::{Error, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Replacement state for a zero seed, which xorshift would never leave.
const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

/// Deterministic xorshift32 generator. Shuffles and interrupt rolls are
/// reproducible from the stored session seed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// Seeds from the low 32 bits of `seed`.
    pub fn new(seed: u64) -> Self {
        let state = seed as u32;
        Self {
            state: if state == 0 {
                ZERO_SEED_REPLACEMENT
            } else {
                state
            },
        }
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in `[0, 1]` (both ends inclusive).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / f64::from(u32::MAX)
    }

    /// Index in `0..len`. Returns 0 for an empty range.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let scaled = (self.next_f64() * len as f64).floor() as usize;
        scaled.min(len - 1)
    }
}

impl RngCore for Xorshift32 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.step());
        let low = u64::from(self.step());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xorshift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from(u32::from_le_bytes(seed)))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}
