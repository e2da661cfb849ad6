//! Default shape names, drawn from a small seedable xorshift generator.

use std::sync::Mutex;

use super::sync::lock;

/// xorshift64. Deterministic for a given seed; a zero seed is bumped to one.
#[derive(Debug, Clone)]
pub struct Rng(u64);

impl Rng {
    pub const fn new(seed: u64) -> Self {
        Rng(if seed == 0 { 1 } else { seed })
    }

    /// Uniform-ish index below `len`; `None` when `len` is zero.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        Some((x % len as u64) as usize)
    }
}

const NAMES: [&str; 12] = [
    "Ada", "Basil", "Cleo", "Dax", "Edda", "Finn", "Gus", "Hana", "Ivo", "Juno", "Kit", "Lior",
];

static NAME_RNG: Mutex<Rng> = Mutex::new(Rng::new(0x9E37_79B9_7F4A_7C15));

/// Reseed the generator used for default shape names.
pub fn seed_names(seed: u64) {
    *lock(&NAME_RNG) = Rng::new(seed);
}

pub(crate) fn random_name() -> String {
    let picked = lock(&NAME_RNG).index(NAMES.len());
    picked.map_or("shape", |i| NAMES[i]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        let xs: Vec<_> = (0..16).map(|_| a.index(1000)).collect();
        let ys: Vec<_> = (0..16).map(|_| b.index(1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn zero_seed_still_moves() {
        let mut rng = Rng::new(0);
        let first = rng.index(usize::MAX);
        assert_ne!(first, rng.index(usize::MAX));
    }

    #[test]
    fn empty_range_has_no_index() {
        assert_eq!(Rng::new(7).index(0), None);
        assert!(Rng::new(7).index(3).is_some_and(|i| i < 3));
    }

    #[test]
    fn default_names_come_from_the_list() {
        for _ in 0..20 {
            let name = random_name();
            assert!(NAMES.contains(&name.as_str()), "unexpected name {name}");
        }
    }
}
