//! The random module holds the small xorshift128 generator used to pick between
//! competing stochastic productions. It is deliberately tiny and reproducible:
//! hand it a fixed [`Seed`] and you get the same drawing every time.

use rand::{Error, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

/// A source of uniform samples in `[0, 1]`. This is the only thing the
/// rewriting engine needs from randomness, so tests can script it.
pub trait UnitSource {
    fn next_unit(&mut self) -> f64;
}

impl<T: UnitSource + ?Sized> UnitSource for &mut T {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// How to seed a [`XorShift128`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Seed {
    /// Seed from the clock. Different every run.
    #[default]
    Entropy,
    /// Reproducible runs.
    Fixed(u32),
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Seed::Fixed(value)
    }
}

impl From<Option<u32>> for Seed {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(seed) => Seed::Fixed(seed),
            None => Seed::Entropy,
        }
    }
}

/// Negative and out of range values mean "use the clock".
impl From<i64> for Seed {
    fn from(value: i64) -> Self {
        match u32::try_from(value) {
            Ok(seed) => Seed::Fixed(seed),
            Err(_) => Seed::Entropy,
        }
    }
}

/// # XorShift128
///
/// Four words of state, one 32 bit output per step.
///
/// # Example
///
/// ```rust
/// use aoer_lsystem::random::{Seed, XorShift128};
///
/// let mut a = XorShift128::new(Seed::Fixed(42));
/// let mut b = XorShift128::new(Seed::Fixed(42));
/// assert_eq!(a.next_u32(), b.next_u32());
/// let f = a.next_f01();
/// assert!((0.0..=1.0).contains(&f));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorShift128 {
    state: [u32; 4],
}

fn splitmix64(x: &mut u64) -> u64 {
    *x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x2545_F491_4F6C_DD1D)
}

impl XorShift128 {
    pub fn new(seed: impl Into<Seed>) -> XorShift128 {
        let mut rng = XorShift128 { state: [0; 4] };
        rng.seed(seed);
        rng
    }

    /// Build directly from raw state words. An all-zero state would get stuck
    /// at zero forever, so it is nudged to a fixed non-zero word.
    pub fn from_state(state: [u32; 4]) -> XorShift128 {
        let mut rng = XorShift128 { state };
        if rng.state == [0; 4] {
            rng.state[0] = 0x9E37_79B9;
        }
        rng
    }

    /// Reseed in place. [`Seed::Entropy`] reads the high resolution clock.
    pub fn seed(&mut self, seed: impl Into<Seed>) {
        let mut mix = match seed.into() {
            Seed::Fixed(value) => value as u64,
            Seed::Entropy => clock_seed(),
        };
        trace!(seed = mix, "seeding xorshift128");
        let lo = splitmix64(&mut mix);
        let hi = splitmix64(&mut mix);
        *self = XorShift128::from_state([lo as u32, (lo >> 32) as u32, hi as u32, (hi >> 32) as u32]);
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut s = self.state[3];
        s ^= s << 11;
        s ^= s >> 8;
        self.state[3] = self.state[2];
        self.state[2] = self.state[1];
        self.state[1] = self.state[0];
        s ^= self.state[0];
        s ^= self.state[0] >> 19;
        self.state[0] = s;
        s
    }

    /// Uniform-ish integer in `[lo, hi]` (modulo bias and all). Swapped bounds
    /// are accepted.
    pub fn next_in_range(&mut self, lo: u32, hi: u32) -> u32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        match (hi - lo).checked_add(1) {
            Some(span) => self.next_u32() % span + lo,
            None => self.next_u32(),
        }
    }

    /// Float in `[0, 1]`, the raw output divided by `2^32 - 1`.
    pub fn next_f01(&mut self) -> f64 {
        self.next_u32() as f64 / u32::MAX as f64
    }
}

impl Default for XorShift128 {
    fn default() -> Self {
        XorShift128::new(Seed::Entropy)
    }
}

impl UnitSource for XorShift128 {
    fn next_unit(&mut self) -> f64 {
        self.next_f01()
    }
}

impl RngCore for XorShift128 {
    fn next_u32(&mut self) -> u32 {
        XorShift128::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = XorShift128::next_u32(self) as u64;
        let hi = XorShift128::next_u32(self) as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = XorShift128::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift128 {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut state = [0u32; 4];
        for (word, bytes) in state.iter_mut().zip(seed.chunks_exact(4)) {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        XorShift128::from_state(state)
    }
}
