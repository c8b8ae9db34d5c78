use tracing::info;

use crate::geo::DistanceResolver;
use crate::models::pricing::{DistanceBand, PricingBreakdown, PricingRequest, PricingResult};
use crate::numeric::round_to;
use crate::observability::metrics::Metrics;
use crate::pricing::rates::{food_cost_tier, headcount_tier, rates_for, PERCENTAGE_TIER};

pub struct PricingEngine {
    resolver: DistanceResolver,
    metrics: Metrics,
}

impl PricingEngine {
    pub fn new(resolver: DistanceResolver, metrics: Metrics) -> Self {
        Self { resolver, metrics }
    }

    pub async fn calculate_delivery_price(&self, request: &PricingRequest) -> PricingResult {
        let resolution = self
            .resolver
            .resolve(&request.pickup_address, &request.dropoff_address)
            .await;

        let result = price_for_distance(request, resolution.miles);

        self.metrics
            .pricing_quotes_total
            .with_label_values(&[result.breakdown.band.metric_label()])
            .inc();

        info!(
            miles = resolution.miles,
            distance_source = resolution.strategy,
            tier = %result.tier,
            price = result.delivery_price,
            "delivery price calculated"
        );

        result
    }
}

pub fn price_for_distance(request: &PricingRequest, miles: f64) -> PricingResult {
    let food_cost = if request.food_cost.is_finite() {
        request.food_cost.max(0.0)
    } else {
        0.0
    };

    let band = DistanceBand::for_miles(miles);
    let rates = rates_for(band);

    let by_headcount = headcount_tier(request.head_count);
    let by_food_cost = food_cost_tier(food_cost);
    let tier = by_headcount.max(by_food_cost);

    let tip_text = if request.include_tip {
        "tip included"
    } else {
        "tip not included"
    };
    let basis = format!(
        "{} at {miles:.2} miles; tier {} by headcount {}, tier {} by food cost ${food_cost:.2}; {tip_text}",
        band.label(),
        by_headcount + 1,
        request.head_count,
        by_food_cost + 1,
    );

    let (price, calculation) = if tier >= PERCENTAGE_TIER {
        let percentage = rates.percentage(request.include_tip);
        let by_percentage = food_cost * percentage;
        let minimum = rates.flat_fee(PERCENTAGE_TIER - 1, request.include_tip);

        if by_percentage >= minimum {
            (
                by_percentage,
                format!(
                    "{:.0}% of food cost ${food_cost:.2} = ${by_percentage:.2} ({basis})",
                    percentage * 100.0
                ),
            )
        } else {
            (
                minimum,
                format!(
                    "{:.0}% of food cost ${food_cost:.2} = ${by_percentage:.2}, raised to minimum ${minimum:.2} ({basis})",
                    percentage * 100.0
                ),
            )
        }
    } else {
        let fee = rates.flat_fee(tier, request.include_tip);
        (fee, format!("Flat fee ${fee:.2} ({basis})"))
    };

    PricingResult {
        delivery_price: round_to(price, 2),
        tier: format!("{} - Tier {}", band.label(), tier + 1),
        breakdown: PricingBreakdown {
            tip_included: request.include_tip,
            calculation,
            band,
            distance_miles: miles,
            headcount_tier: (by_headcount + 1) as u8,
            food_cost_tier: (by_food_cost + 1) as u8,
        },
    }
}
