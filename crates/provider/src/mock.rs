use rand::Rng;

use crate::types::Pollutants;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Plausible random pollutant readings, used when no live breakdown exists.
pub fn simulated_pollutants<R: Rng + ?Sized>(rng: &mut R) -> Pollutants {
    [
        ("pm2_5", rng.gen_range(10.0..=60.0), 1),
        ("pm10", rng.gen_range(20.0..=100.0), 1),
        ("o3", rng.gen_range(10.0..=50.0), 1),
        ("no2", rng.gen_range(5.0..=40.0), 1),
        ("so2", rng.gen_range(1.0..=20.0), 1),
        ("co", rng.gen_range(0.2..=1.5), 2),
    ]
    .into_iter()
    .map(|(name, value, decimals)| (name.to_owned(), round_to(value, decimals)))
    .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = simulated_pollutants(&mut rng);
            assert_eq!(p.len(), 6);
            assert!((10.0..=60.0).contains(&p["pm2_5"]));
            assert!((20.0..=100.0).contains(&p["pm10"]));
            assert!((10.0..=50.0).contains(&p["o3"]));
            assert!((5.0..=40.0).contains(&p["no2"]));
            assert!((1.0..=20.0).contains(&p["so2"]));
            assert!((0.2..=1.5).contains(&p["co"]));
        }
    }

    #[test]
    fn rounding_precision() {
        assert!((round_to(12.345, 1) - 12.3).abs() < 1e-9);
        assert!((round_to(0.876, 2) - 0.88).abs() < 1e-9);
    }
}
