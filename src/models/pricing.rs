use serde::{Deserialize, Serialize};

fn default_include_tip() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    pub pickup_address: String,
    pub dropoff_address: String,
    pub head_count: u32,
    pub food_cost: f64,
    #[serde(default = "default_include_tip")]
    pub include_tip: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DistanceBand {
    Standard,
    Over10Miles,
    Over30Miles,
}

impl DistanceBand {
    pub fn for_miles(miles: f64) -> Self {
        if miles > 30.0 {
            DistanceBand::Over30Miles
        } else if miles > 10.0 {
            DistanceBand::Over10Miles
        } else {
            DistanceBand::Standard
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DistanceBand::Standard => "Standard",
            DistanceBand::Over10Miles => "Over 10 Miles",
            DistanceBand::Over30Miles => "Over 30 Miles",
        }
    }

    pub fn metric_label(&self) -> &'static str {
        match self {
            DistanceBand::Standard => "standard",
            DistanceBand::Over10Miles => "over_10_miles",
            DistanceBand::Over30Miles => "over_30_miles",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub tip_included: bool,
    pub calculation: String,
    pub band: DistanceBand,
    pub distance_miles: f64,
    pub headcount_tier: u8,
    pub food_cost_tier: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub delivery_price: f64,
    pub tier: String,
    pub breakdown: PricingBreakdown,
}
