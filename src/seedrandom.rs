//! String-seeded pseudo-random generation.
//!
//! [`Arc4Random`] is the ARC4 construction popularised by the `seedrandom`
//! browser library: the seed string is smeared into a key of at most 256
//! bytes, the key drives an RC4 key schedule, the first 256 output bytes are
//! dropped, and each double is assembled from 52 significant bits. Pages that
//! picked colors with that library get the same palette indices here.

const WIDTH: u64 = 256;
const CHUNKS: usize = 6;
const START_DENOM: f64 = 281_474_976_710_656.0; // 256^6
const SIGNIFICANCE: u64 = 1 << 52;
const OVERFLOW: u64 = SIGNIFICANCE * 2;
const MASK: usize = 255;

/// A reproducible mapping from a seed string to a value in `[0, 1)`.
///
/// Implemented for any `Fn(&str) -> f64`, so tests can substitute a fixed
/// or recording generator.
pub trait SeedRandom {
    fn unit(&self, seed: &str) -> f64;
}

impl<F> SeedRandom for F
where
    F: Fn(&str) -> f64,
{
    fn unit(&self, seed: &str) -> f64 {
        self(seed)
    }
}

/// First value of an [`Arc4Stream`] seeded with the given string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arc4Random;

impl SeedRandom for Arc4Random {
    fn unit(&self, seed: &str) -> f64 {
        Arc4Stream::from_seed(seed).next_f64()
    }
}

#[derive(Debug, Clone)]
pub struct Arc4Stream {
    i: u8,
    j: u8,
    s: [u8; 256],
}

impl Arc4Stream {
    pub fn from_seed(seed: &str) -> Self {
        Self::from_key(&mix_key(seed))
    }

    fn from_key(key: &[u8]) -> Self {
        let key: &[u8] = if key.is_empty() { &[0] } else { key };

        let mut s = [0u8; 256];
        for (idx, slot) in s.iter_mut().enumerate() {
            *slot = idx as u8;
        }

        let mut j = 0u8;
        for i in 0..256 {
            let t = s[i];
            j = j.wrapping_add(key[i % key.len()]).wrapping_add(t);
            s[i] = s[j as usize];
            s[j as usize] = t;
        }

        let mut stream = Self { i: 0, j: 0, s };
        // RC4-drop[256]
        for _ in 0..256 {
            stream.next_byte();
        }
        stream
    }

    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        let t = self.s[self.i as usize];
        self.j = self.j.wrapping_add(t);
        self.s[self.i as usize] = self.s[self.j as usize];
        self.s[self.j as usize] = t;
        let idx = self.s[self.i as usize].wrapping_add(t);
        self.s[idx as usize]
    }

    fn next_bytes(&mut self, count: usize) -> u64 {
        (0..count).fold(0u64, |acc, _| acc * WIDTH + u64::from(self.next_byte()))
    }

    /// Next double in `[0, 1)` with 52 bits of randomness.
    pub fn next_f64(&mut self) -> f64 {
        let mut n = self.next_bytes(CHUNKS);
        let mut d = START_DENOM;
        let mut x = 0u64;
        while n < SIGNIFICANCE {
            n = (n + x) * WIDTH;
            d *= WIDTH as f64;
            x = u64::from(self.next_byte());
        }
        // n is a multiple of 256 here, so halving stays exact.
        while n >= OVERFLOW {
            n /= 2;
            d /= 2.0;
            x >>= 1;
        }
        (n + x) as f64 / d
    }
}

/// Smears the seed's UTF-16 code units into a key of at most 256 bytes.
fn mix_key(seed: &str) -> Vec<u8> {
    let mut key: Vec<u8> = Vec::new();
    let mut smear: u32 = 0;
    for (j, unit) in seed.encode_utf16().enumerate() {
        let slot = j & MASK;
        if slot == key.len() {
            key.push(0);
        }
        smear ^= u32::from(key[slot]) * 19;
        key[slot] = (smear.wrapping_add(u32::from(unit)) & MASK as u32) as u8;
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_sequence() {
        let mut stream = Arc4Stream::from_seed("hello.");
        assert_eq!(stream.next_f64(), 0.9282578795792454);
        assert_eq!(stream.next_f64(), 0.3752569768646784);
    }

    #[test]
    fn same_seed_same_value() {
        assert_eq!(Arc4Random.unit("abcHello"), Arc4Random.unit("abcHello"));
    }

    #[test]
    fn empty_seed_is_valid() {
        let value = Arc4Random.unit("");
        assert!((0.0..1.0).contains(&value));
        assert_eq!(value, Arc4Random.unit(""));
    }

    #[test]
    fn long_and_non_ascii_seeds_stay_in_range() {
        let long = "ж🎨".repeat(400);
        for seed in [long.as_str(), "日本語", "\u{0}"] {
            let value = Arc4Random.unit(seed);
            assert!((0.0..1.0).contains(&value), "{seed:?} gave {value}");
        }
    }

    #[test]
    fn mix_key_wraps_after_256_code_units() {
        assert_eq!(mix_key("").len(), 0);
        assert_eq!(mix_key("abc").len(), 3);
        assert_eq!(mix_key(&"a".repeat(300)).len(), 256);
    }

    #[test]
    fn closures_are_generators() {
        let fixed = |_: &str| 0.25;
        assert_eq!(fixed.unit("anything"), 0.25);
    }
}
