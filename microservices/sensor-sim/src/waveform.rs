//! Waveform generation for the simulated fleet
//!
//! Each generator is a pure function of wall-clock time and the sensor's
//! static band; noise comes from an injected `Rng`. The noise-free baseline
//! functions are public so tests can pin a fixed `now` and assert exact
//! values.

use chrono::{DateTime, Timelike, Utc};
use rand::Rng;
use sensorgrid_core::SensorType;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Position within the 24-hour cycle, in `[0, 1)`
fn day_phase(now: DateTime<Utc>) -> f64 {
    now.timestamp().rem_euclid(86400) as f64 / 86400.0
}

/// Day/night sinusoid baseline for temperature, offset from `min`.
///
/// The amplitude term is `1 + max - min` (not `max - min`) and the result is
/// never clamped, so readings can exceed the nominal band.
pub fn temperature_baseline(min: f64, max: f64, now: DateTime<Utc>) -> f64 {
    let swing = 0.5 * (1.0 + max - min) * (0.5 + 0.5 * (TAU * day_phase(now) - FRAC_PI_2).sin());
    min + swing
}

/// Inverse-phase sinusoid baseline for humidity: peaks when temperature
/// troughs.
pub fn humidity_baseline(min: f64, max: f64, now: DateTime<Utc>) -> f64 {
    let swing = 0.5 * (max - min) * (0.5 - 0.5 * (TAU * day_phase(now) - FRAC_PI_2).sin());
    min + swing
}

/// Usage factor for one hour of the day: morning and evening peaks, low
/// overnight draw.
pub fn usage_factor(hour: u32) -> f64 {
    match hour {
        7..=8 => 0.7,
        17..=21 => 0.9,
        22..=23 | 0..=5 => 0.3,
        _ => 0.5,
    }
}

/// Hour-of-day stepped baseline for electricity usage
pub fn electricity_baseline(min: f64, max: f64, now: DateTime<Utc>) -> f64 {
    min + usage_factor(now.hour()) * (max - min)
}

/// Generate one reading value for a sensor category
pub fn generate<R: Rng>(
    sensor_type: SensorType,
    min: f64,
    max: f64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> f64 {
    match sensor_type {
        SensorType::Temperature => {
            let value = temperature_baseline(min, max, now) + rng.gen_range(-0.5..=0.5);
            round_to(value, 2)
        }
        SensorType::Humidity => {
            let value = humidity_baseline(min, max, now) + rng.gen_range(-2.0..=2.0);
            round_to(value.clamp(min, max), 2)
        }
        SensorType::Electricity => {
            let base = electricity_baseline(min, max, now);
            let value = base + rng.gen_range(-0.1 * base..=0.1 * base);
            round_to(value.clamp(min, max), 3)
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, hour, 30, 0).unwrap()
    }

    #[test]
    fn baselines_are_deterministic_for_fixed_now() {
        let now = at_hour(14);
        assert_eq!(
            temperature_baseline(18.0, 26.0, now),
            temperature_baseline(18.0, 26.0, now)
        );
        assert_eq!(
            humidity_baseline(40.0, 60.0, now),
            humidity_baseline(40.0, 60.0, now)
        );
        assert_eq!(
            electricity_baseline(0.5, 8.0, now),
            electricity_baseline(0.5, 8.0, now)
        );
    }

    #[test]
    fn humidity_stays_in_band_after_noise() {
        let mut rng = StdRng::seed_from_u64(7);
        for hour in 0..24 {
            for _ in 0..50 {
                let v = generate(SensorType::Humidity, 40.0, 60.0, at_hour(hour), &mut rng);
                assert!((40.0..=60.0).contains(&v), "humidity {} out of band", v);
            }
        }
    }

    #[test]
    fn electricity_stays_in_band_after_noise() {
        let mut rng = StdRng::seed_from_u64(11);
        for hour in 0..24 {
            for _ in 0..50 {
                let v = generate(SensorType::Electricity, 0.5, 8.0, at_hour(hour), &mut rng);
                assert!((0.5..=8.0).contains(&v), "electricity {} out of band", v);
            }
        }
    }

    #[test]
    fn temperature_is_deliberately_unclamped() {
        // The amplitude term is 1 + max - min, so a narrow band overshoots
        // its nominal maximum at the midday peak even before noise.
        let noon_peak = temperature_baseline(20.0, 20.5, at_hour(12));
        assert!(noon_peak > 20.5);
    }

    #[test]
    fn temperature_noise_band_is_half_degree() {
        let mut rng = StdRng::seed_from_u64(3);
        let now = at_hour(9);
        let baseline = temperature_baseline(18.0, 26.0, now);
        for _ in 0..200 {
            let v = generate(SensorType::Temperature, 18.0, 26.0, now, &mut rng);
            assert!((v - baseline).abs() <= 0.5 + 0.005, "noise {} too large", v - baseline);
        }
    }

    #[test]
    fn usage_factor_boundaries() {
        assert_eq!(usage_factor(6), 0.5);
        assert_eq!(usage_factor(7), 0.7);
        assert_eq!(usage_factor(9), 0.5);
        assert_eq!(usage_factor(10), 0.5);
        assert_eq!(usage_factor(16), 0.5);
        assert_eq!(usage_factor(17), 0.9);
        assert_eq!(usage_factor(21), 0.9);
        assert_eq!(usage_factor(22), 0.3);
        assert_eq!(usage_factor(23), 0.3);
        assert_eq!(usage_factor(0), 0.3);
    }

    #[test]
    fn electricity_calls_agree_within_noise_band() {
        let now = at_hour(18);
        let base = electricity_baseline(0.5, 8.0, now);
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);
        let a = generate(SensorType::Electricity, 0.5, 8.0, now, &mut rng_a);
        let b = generate(SensorType::Electricity, 0.5, 8.0, now, &mut rng_b);
        assert!((a - b).abs() <= 2.0 * 0.1 * base + 0.001);
    }

    #[test]
    fn rounding_precision_matches_category() {
        let mut rng = StdRng::seed_from_u64(5);
        let t = generate(SensorType::Temperature, 18.0, 26.0, at_hour(8), &mut rng);
        assert_eq!(t, round_to(t, 2));
        let e = generate(SensorType::Electricity, 0.5, 8.0, at_hour(8), &mut rng);
        assert_eq!(e, round_to(e, 3));
    }
}
