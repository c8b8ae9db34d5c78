use crate::models::pricing::DistanceBand;

pub const HEADCOUNT_THRESHOLDS: [u32; 4] = [25, 50, 75, 100];
pub const FOOD_COST_THRESHOLDS: [f64; 4] = [300.0, 600.0, 900.0, 1200.0];

pub const PERCENTAGE_TIER: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct BandRates {
    pub flat_with_tip: [f64; 4],
    pub flat_without_tip: [f64; 4],
    pub percent_with_tip: f64,
    pub percent_without_tip: f64,
}

impl BandRates {
    /// Flat fee for tiers 0..=3. Callers clamp the tier first.
    pub fn flat_fee(&self, tier: usize, include_tip: bool) -> f64 {
        let tier = tier.min(PERCENTAGE_TIER - 1);
        if include_tip {
            self.flat_with_tip[tier]
        } else {
            self.flat_without_tip[tier]
        }
    }

    pub fn percentage(&self, include_tip: bool) -> f64 {
        if include_tip {
            self.percent_with_tip
        } else {
            self.percent_without_tip
        }
    }
}

const STANDARD: BandRates = BandRates {
    flat_with_tip: [35.00, 45.00, 55.00, 65.00],
    flat_without_tip: [42.50, 52.50, 62.50, 72.50],
    percent_with_tip: 0.09,
    percent_without_tip: 0.10,
};

const OVER_10_MILES: BandRates = BandRates {
    flat_with_tip: [71.59, 81.59, 91.59, 101.59],
    flat_without_tip: [79.09, 89.09, 99.09, 109.09],
    percent_with_tip: 0.10,
    percent_without_tip: 0.11,
};

const OVER_30_MILES: BandRates = BandRates {
    flat_with_tip: [110.00, 125.00, 140.00, 155.00],
    flat_without_tip: [117.50, 132.50, 147.50, 162.50],
    percent_with_tip: 0.11,
    percent_without_tip: 0.12,
};

pub fn rates_for(band: DistanceBand) -> &'static BandRates {
    match band {
        DistanceBand::Standard => &STANDARD,
        DistanceBand::Over10Miles => &OVER_10_MILES,
        DistanceBand::Over30Miles => &OVER_30_MILES,
    }
}

pub fn headcount_tier(head_count: u32) -> usize {
    HEADCOUNT_THRESHOLDS
        .iter()
        .take_while(|threshold| head_count >= **threshold)
        .count()
}

pub fn food_cost_tier(food_cost: f64) -> usize {
    FOOD_COST_THRESHOLDS
        .iter()
        .take_while(|threshold| food_cost >= **threshold)
        .count()
}

#[cfg(test)]
mod tests {
    use super::{food_cost_tier, headcount_tier, rates_for, PERCENTAGE_TIER};
    use crate::models::pricing::DistanceBand;

    #[test]
    fn headcount_brackets() {
        assert_eq!(headcount_tier(0), 0);
        assert_eq!(headcount_tier(24), 0);
        assert_eq!(headcount_tier(25), 1);
        assert_eq!(headcount_tier(49), 1);
        assert_eq!(headcount_tier(50), 2);
        assert_eq!(headcount_tier(75), 3);
        assert_eq!(headcount_tier(99), 3);
        assert_eq!(headcount_tier(100), PERCENTAGE_TIER);
        assert_eq!(headcount_tier(5000), PERCENTAGE_TIER);
    }

    #[test]
    fn food_cost_brackets() {
        assert_eq!(food_cost_tier(0.0), 0);
        assert_eq!(food_cost_tier(299.99), 0);
        assert_eq!(food_cost_tier(300.0), 1);
        assert_eq!(food_cost_tier(899.99), 2);
        assert_eq!(food_cost_tier(1199.99), 3);
        assert_eq!(food_cost_tier(1200.0), PERCENTAGE_TIER);
    }

    #[test]
    fn without_tip_never_cheaper() {
        for band in [
            DistanceBand::Standard,
            DistanceBand::Over10Miles,
            DistanceBand::Over30Miles,
        ] {
            let rates = rates_for(band);
            for tier in 0..PERCENTAGE_TIER {
                assert!(rates.flat_fee(tier, false) >= rates.flat_fee(tier, true));
            }
            assert!(rates.percentage(false) >= rates.percentage(true));
        }
    }

    #[test]
    fn farther_bands_cost_more_per_tier() {
        let standard = rates_for(DistanceBand::Standard);
        let over_10 = rates_for(DistanceBand::Over10Miles);
        let over_30 = rates_for(DistanceBand::Over30Miles);
        for tier in 0..PERCENTAGE_TIER {
            assert!(over_10.flat_fee(tier, true) > standard.flat_fee(tier, true));
            assert!(over_30.flat_fee(tier, true) > over_10.flat_fee(tier, true));
        }
    }
}
