//! Seeded dice for damage, drop and effect rolls

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform integer in `[min, max]`, both ends included. Reversed bounds are swapped.
    pub fn roll_int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform float in `[0, 1]`
    pub fn roll_unit(&mut self) -> f32 {
        self.rng.gen_range(0.0..=1.0)
    }

    /// Uniform float in `[-extent, extent]`
    pub fn roll_offset(&mut self, extent: f32) -> f32 {
        let extent = extent.abs();
        if extent == 0.0 || !extent.is_finite() {
            return 0.0;
        }
        self.rng.gen_range(-extent..=extent)
    }

    /// `true` with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        p > 0.0 && self.rng.gen::<f32>() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_int_inclusive_bounds() {
        let mut dice = Dice::new(1);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..500 {
            let v = dice.roll_int(5, 10);
            assert!((5..=10).contains(&v));
            seen_min |= v == 5;
            seen_max |= v == 10;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn roll_int_degenerate_and_reversed() {
        let mut dice = Dice::new(2);
        assert_eq!(dice.roll_int(3, 3), 3);
        let v = dice.roll_int(9, 4);
        assert!((4..=9).contains(&v));
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Dice::new(42);
        let mut b = Dice::new(42);
        for _ in 0..20 {
            assert_eq!(a.roll_unit(), b.roll_unit());
        }
    }

    #[test]
    fn chance_extremes() {
        let mut dice = Dice::new(3);
        assert!((0..100).all(|_| !dice.chance(0.0)));
        assert!((0..100).all(|_| dice.chance(1.0)));
    }

    #[test]
    fn offset_stays_in_range() {
        let mut dice = Dice::new(4);
        for _ in 0..200 {
            assert!(dice.roll_offset(64.0).abs() <= 64.0);
        }
        assert_eq!(dice.roll_offset(0.0), 0.0);
        assert_eq!(dice.roll_offset(f32::NAN), 0.0);
        assert_eq!(dice.roll_offset(f32::INFINITY), 0.0);
    }
}
