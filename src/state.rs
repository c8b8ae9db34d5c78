use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::geo::DistanceResolver;
use crate::observability::metrics::Metrics;
use crate::pricing::engine::PricingEngine;
use crate::stats::aggregator::DriverStatsAggregator;
use crate::store::memory::{MemoryCurrentDeliveries, MemoryLegacyDispatches, MemoryStore};
use crate::store::postgres::{PgCurrentDeliveries, PgLegacyDispatches, PgStore};

pub struct AppState {
    pub pricing: PricingEngine,
    pub stats: DriverStatsAggregator,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(pricing: PricingEngine, stats: DriverStatsAggregator, metrics: Metrics) -> Self {
        Self {
            pricing,
            stats,
            metrics,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let metrics = Metrics::new();
        let pricing = PricingEngine::new(
            DistanceResolver::from_config(config, metrics.clone()),
            metrics.clone(),
        );

        let stats = match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url, config.database_max_connections)
                    .await
                    .map_err(|err| AppError::Internal(format!("database connect failed: {err}")))?;
                info!("driver stats backed by postgres");
                DriverStatsAggregator::new(
                    vec![
                        Arc::new(PgCurrentDeliveries::new(&store)),
                        Arc::new(PgLegacyDispatches::new(&store)),
                    ],
                    Arc::new(store.clone()),
                    Arc::new(store),
                    metrics.clone(),
                )
            }
            None => {
                info!("DATABASE_URL not set; driver stats backed by in-memory store");
                Self::memory_aggregator(Arc::new(MemoryStore::new()), metrics.clone())
            }
        }
        .with_summary_concurrency(config.fleet_summary_concurrency);

        Ok(Self::new(pricing, stats, metrics))
    }

    pub fn memory_aggregator(store: Arc<MemoryStore>, metrics: Metrics) -> DriverStatsAggregator {
        DriverStatsAggregator::new(
            vec![
                Arc::new(MemoryCurrentDeliveries(store.clone())),
                Arc::new(MemoryLegacyDispatches(store.clone())),
            ],
            store.clone(),
            store,
            metrics,
        )
    }
}
