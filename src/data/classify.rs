use crate::config::{Thresholds, TierCuts};

use super::model::{BoxCategory, Tier};

/// Map a raw score onto a tier. `NaN` compares false everywhere and lands in `Low`.
pub fn tier(value: f64, cuts: &TierCuts) -> Tier {
    if value >= cuts.high {
        Tier::High
    } else if value >= cuts.moderate {
        Tier::Moderate
    } else {
        Tier::Low
    }
}

/// Classify a (potential, performance rating) pair into its 9-box cell.
pub fn bucket(potential: f64, performance_rating: f64, thresholds: &Thresholds) -> BoxCategory {
    BoxCategory::new(
        tier(potential, &thresholds.potential),
        tier(performance_rating, &thresholds.performance),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_points_are_inclusive_lower_bounds() {
        let t = Thresholds::default();
        assert_eq!(bucket(0.66, 4.0, &t), BoxCategory::new(Tier::High, Tier::High));
        assert_eq!(bucket(0.33, 3.0, &t), BoxCategory::new(Tier::Moderate, Tier::Moderate));
        assert_eq!(bucket(0.3299, 2.99, &t), BoxCategory::new(Tier::Low, Tier::Low));
    }

    #[test]
    fn extremes_and_nan_are_total() {
        let t = Thresholds::default();
        assert_eq!(bucket(f64::INFINITY, 5.0, &t).potential, Tier::High);
        assert_eq!(bucket(f64::NEG_INFINITY, 1.0, &t).potential, Tier::Low);
        assert_eq!(bucket(f64::NAN, f64::NAN, &t), BoxCategory::new(Tier::Low, Tier::Low));
    }

    #[test]
    fn custom_cuts_shift_the_partition() {
        let t = Thresholds {
            potential: TierCuts {
                moderate: 0.5,
                high: 0.9,
            },
            ..Thresholds::default()
        };
        assert_eq!(bucket(0.7, 5.0, &t).potential, Tier::Moderate);
        assert_eq!(bucket(0.7, 5.0, &Thresholds::default()).potential, Tier::High);
    }

    #[test]
    fn equal_cuts_skip_the_moderate_tier() {
        let cuts = TierCuts {
            moderate: 3.0,
            high: 3.0,
        };
        assert_eq!(tier(2.9, &cuts), Tier::Low);
        assert_eq!(tier(3.0, &cuts), Tier::High);
    }
}
