use rand::Rng;

/// One row of the rank-to-probability table. A user rank at or below
/// `max_ratio * cutoff` draws uniformly from `[base, base + spread)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub max_ratio: f64,
    pub base: f64,
    pub spread: f64,
}

impl Band {
    pub fn floor(&self) -> f64 {
        self.base
    }

    pub fn ceiling(&self) -> f64 {
        self.base + self.spread
    }
}

pub const BANDS: [Band; 5] = [
    Band { max_ratio: 0.7, base: 0.90, spread: 0.09 },
    Band { max_ratio: 0.9, base: 0.70, spread: 0.20 },
    Band { max_ratio: 1.0, base: 0.50, spread: 0.20 },
    Band { max_ratio: 1.2, base: 0.20, spread: 0.30 },
    Band { max_ratio: f64::INFINITY, base: 0.05, spread: 0.15 },
];

/// Band for a rank against a cutoff. Lower ranks are stronger.
pub fn band_for(user_rank: f64, cutoff: f64) -> &'static Band {
    BANDS
        .iter()
        .find(|band| user_rank <= cutoff * band.max_ratio)
        .unwrap_or(&BANDS[BANDS.len() - 1])
}

/// Admission probability for `user_rank` against an institution's cutoff,
/// clamped to 1.0 and rounded to two decimals.
pub fn score<R: Rng + ?Sized>(user_rank: f64, cutoff: f64, rng: &mut R) -> f64 {
    let band = band_for(user_rank, cutoff);
    let probability = band.base + rng.random::<f64>() * band.spread;
    round_probability(probability)
}

pub fn round_probability(probability: f64) -> f64 {
    let clamped = probability.clamp(0.0, 1.0);
    (clamped * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_two_decimals(value: f64) {
        let scaled = value * 100.0;
        assert!(
            (scaled - scaled.round()).abs() < 1e-9,
            "{} has more than two decimals",
            value
        );
    }

    #[test]
    fn bands_for_cutoff_of_one_hundred() {
        let mut rng = StdRng::seed_from_u64(7);
        let cases = [
            (50.0, 0.90, 0.99),
            (85.0, 0.70, 0.90),
            (95.0, 0.50, 0.70),
            (100.0, 0.50, 0.70),
            (115.0, 0.20, 0.50),
            (150.0, 0.05, 0.20),
        ];
        for (rank, low, high) in cases {
            for _ in 0..200 {
                let p = score(rank, 100.0, &mut rng);
                assert!(p >= low && p <= high, "rank {} scored {}", rank, p);
            }
        }
    }

    #[test]
    fn band_boundaries_are_inclusive() {
        assert_eq!(band_for(70.0, 100.0).base, 0.90);
        assert_eq!(band_for(70.01, 100.0).base, 0.70);
        assert_eq!(band_for(90.0, 100.0).base, 0.70);
        assert_eq!(band_for(120.0, 100.0).base, 0.20);
        assert_eq!(band_for(120.01, 100.0).base, 0.05);
    }

    #[test]
    fn better_rank_never_lands_in_a_worse_band() {
        let cutoff = 250.0;
        let mut previous_floor = f64::INFINITY;
        for step in 1..=1250 {
            let band = band_for(step as f64, cutoff);
            assert!(band.floor() <= previous_floor);
            previous_floor = band.floor();
        }
    }

    #[test]
    fn probability_stays_in_unit_interval_with_two_decimals() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..1000 {
            let cutoff = rng.random_range(1.0..10_000.0);
            let ratio = rng.random_range(0.01..=5.0);
            let p = score(cutoff * ratio, cutoff, &mut rng);
            assert!((0.0..=1.0).contains(&p));
            assert_two_decimals(p);
        }
    }

    #[test]
    fn same_seed_gives_same_scores() {
        let mut first = StdRng::seed_from_u64(99);
        let mut second = StdRng::seed_from_u64(99);
        let a: Vec<f64> = (0..20).map(|i| score(40.0 + i as f64 * 7.0, 120.0, &mut first)).collect();
        let b: Vec<f64> = (0..20).map(|i| score(40.0 + i as f64 * 7.0, 120.0, &mut second)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn rounding_clamps_out_of_range_values() {
        assert_eq!(round_probability(1.3), 1.0);
        assert_eq!(round_probability(-0.2), 0.0);
        assert_eq!(round_probability(0.456), 0.46);
    }
}
