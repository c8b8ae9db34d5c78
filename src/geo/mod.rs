pub mod city;
pub mod fallback;
pub mod matrix;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::geo::fallback::{CityTableStrategy, DefaultDistance, DEFAULT_MILES};
use crate::geo::matrix::DistanceMatrixClient;
use crate::observability::metrics::Metrics;

/// One way of turning an address pair into miles. Returning `None`
/// declines and hands the pair to the next strategy.
#[async_trait]
pub trait DistanceStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, pickup_address: &str, delivery_address: &str) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub miles: f64,
    pub strategy: &'static str,
}

pub struct DistanceResolver {
    strategies: Vec<Arc<dyn DistanceStrategy>>,
    metrics: Metrics,
}

impl DistanceResolver {
    pub fn new(strategies: Vec<Arc<dyn DistanceStrategy>>, metrics: Metrics) -> Self {
        Self {
            strategies,
            metrics,
        }
    }

    pub fn from_config(config: &Config, metrics: Metrics) -> Self {
        let mut strategies: Vec<Arc<dyn DistanceStrategy>> = Vec::new();

        match &config.google_maps_api_key {
            Some(api_key) => match DistanceMatrixClient::new(
                api_key.clone(),
                config.distance_matrix_url.clone(),
                config.distance_timeout,
            ) {
                Ok(client) => strategies.push(Arc::new(client)),
                Err(err) => warn!(error = %err, "distance matrix disabled"),
            },
            None => debug!("no maps api key configured; using fallback distances only"),
        }

        strategies.push(Arc::new(CityTableStrategy));
        strategies.push(Arc::new(DefaultDistance));

        Self::new(strategies, metrics)
    }

    pub async fn resolve(&self, pickup_address: &str, delivery_address: &str) -> Resolution {
        for strategy in &self.strategies {
            let Some(miles) = strategy.resolve(pickup_address, delivery_address).await else {
                continue;
            };

            if !miles.is_finite() || miles < 0.0 {
                warn!(strategy = strategy.name(), miles, "discarding unusable distance");
                continue;
            }

            self.metrics
                .distance_resolutions_total
                .with_label_values(&[strategy.name()])
                .inc();

            debug!(strategy = strategy.name(), miles, "distance resolved");
            return Resolution {
                miles,
                strategy: strategy.name(),
            };
        }

        Resolution {
            miles: DEFAULT_MILES,
            strategy: "default",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{DistanceResolver, DistanceStrategy};
    use crate::geo::fallback::{CityTableStrategy, DefaultDistance, DEFAULT_MILES, SAME_CITY_MILES};
    use crate::geo::matrix::DistanceMatrixClient;
    use crate::observability::metrics::Metrics;

    struct Fixed(Option<f64>);

    #[async_trait]
    impl DistanceStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn resolve(&self, _pickup: &str, _delivery: &str) -> Option<f64> {
            self.0
        }
    }

    fn fallback_chain(primary: Arc<dyn DistanceStrategy>) -> DistanceResolver {
        DistanceResolver::new(
            vec![primary, Arc::new(CityTableStrategy), Arc::new(DefaultDistance)],
            Metrics::new(),
        )
    }

    #[tokio::test]
    async fn first_answer_wins() {
        let resolver = fallback_chain(Arc::new(Fixed(Some(3.2))));
        let resolution = resolver.resolve("SF", "SF").await;
        assert_eq!(resolution.miles, 3.2);
        assert_eq!(resolution.strategy, "fixed");
    }

    #[tokio::test]
    async fn negative_or_nan_answers_are_skipped() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let resolver = fallback_chain(Arc::new(Fixed(Some(bad))));
            let resolution = resolver.resolve("SF", "san fran").await;
            assert_eq!(resolution.miles, SAME_CITY_MILES);
        }
    }

    #[tokio::test]
    async fn empty_chain_uses_default() {
        let resolver = DistanceResolver::new(Vec::new(), Metrics::new());
        let resolution = resolver.resolve("a", "b").await;
        assert_eq!(resolution.miles, DEFAULT_MILES);
    }

    #[tokio::test]
    async fn unreachable_api_falls_back_to_city_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = DistanceMatrixClient::new(
            "key".to_string(),
            server.uri(),
            Duration::from_secs(1),
        )
        .unwrap();
        let metrics = Metrics::new();
        let resolver = DistanceResolver::new(
            vec![
                Arc::new(client),
                Arc::new(CityTableStrategy),
                Arc::new(DefaultDistance),
            ],
            metrics.clone(),
        );

        let same_city = resolver
            .resolve("1 Market St, San Francisco, CA", "SF")
            .await;
        assert_eq!(same_city.miles, SAME_CITY_MILES);
        assert_eq!(same_city.strategy, "city_table");

        let cross_city = resolver
            .resolve("1 Market St, San Francisco, CA", "1 Broadway, Oakland, CA")
            .await;
        assert_eq!(cross_city.miles, DEFAULT_MILES);
        assert_eq!(cross_city.strategy, "default");

        assert_eq!(
            metrics
                .distance_resolutions_total
                .with_label_values(&["city_table"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn closed_port_never_throws() {
        let client = DistanceMatrixClient::new(
            "key".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_millis(300),
        )
        .unwrap();
        let resolver = fallback_chain(Arc::new(client));

        let resolution = resolver.resolve("anywhere", "elsewhere").await;
        assert!(resolution.miles >= 0.0);
        assert_eq!(resolution.miles, DEFAULT_MILES);
    }
}
