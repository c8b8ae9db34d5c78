use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::geo::DistanceStrategy;
use crate::numeric::round_to;

const METERS_PER_MILE: f64 = 1609.34;

#[derive(Debug, Clone, Error)]
pub enum DistanceError {
    #[error("missing api key")]
    MissingApiKey,
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}")]
    Http { status: u16 },
    #[error("json error: {0}")]
    Decode(String),
    #[error("distance matrix status {0}")]
    Status(String),
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: f64,
}

#[derive(Debug, Clone)]
pub struct DistanceMatrixClient {
    http: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl DistanceMatrixClient {
    pub fn new(
        api_key: String,
        endpoint: String,
        timeout: Duration,
    ) -> Result<Self, DistanceError> {
        if api_key.trim().is_empty() {
            return Err(DistanceError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("delivery-ops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DistanceError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            endpoint,
            timeout,
        })
    }

    pub async fn fetch_miles(&self, origin: &str, destination: &str) -> Result<f64, DistanceError> {
        tokio::time::timeout(self.timeout, self.send_request(origin, destination))
            .await
            .map_err(|_| DistanceError::Timeout)?
    }

    async fn send_request(&self, origin: &str, destination: &str) -> Result<f64, DistanceError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("units", "imperial"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        if !status.is_success() {
            return Err(DistanceError::Http {
                status: status.as_u16(),
            });
        }

        let body = res
            .json::<MatrixResponse>()
            .await
            .map_err(|e| DistanceError::Decode(e.to_string()))?;

        miles_from_response(&body)
    }
}

fn miles_from_response(body: &MatrixResponse) -> Result<f64, DistanceError> {
    if body.status != "OK" {
        return Err(DistanceError::Status(body.status.clone()));
    }

    let element = body
        .rows
        .first()
        .and_then(|row| row.elements.first())
        .ok_or_else(|| DistanceError::Decode("response has no elements".to_string()))?;

    if element.status != "OK" {
        return Err(DistanceError::Status(element.status.clone()));
    }

    let meters = element
        .distance
        .as_ref()
        .ok_or_else(|| DistanceError::Decode("element has no distance".to_string()))?
        .value;

    if !meters.is_finite() || meters < 0.0 {
        return Err(DistanceError::Decode(format!("unusable distance {meters}")));
    }

    Ok(round_to(meters / METERS_PER_MILE, 2))
}

fn map_reqwest_error(e: reqwest::Error) -> DistanceError {
    if e.is_timeout() {
        DistanceError::Timeout
    } else {
        DistanceError::Transport(e.to_string())
    }
}

#[async_trait]
impl DistanceStrategy for DistanceMatrixClient {
    fn name(&self) -> &'static str {
        "distance_matrix"
    }

    async fn resolve(&self, pickup_address: &str, delivery_address: &str) -> Option<f64> {
        match self.fetch_miles(pickup_address, delivery_address).await {
            Ok(miles) => Some(miles),
            Err(err) => {
                warn!(error = %err, "distance matrix lookup failed; falling back");
                None
            }
        }
    }
}
