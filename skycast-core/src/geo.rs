//! IP-based geolocation, the widget's stand-in for a platform location
//! service. One JSON GET against ip-api.com; no token required.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;
use tracing::debug;

const GEO_URL: &str = "http://ip-api.com/json";

/// A resolved position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Error)]
pub enum GeoError {
    /// The service refused to answer (rate limit, forbidden). The widget
    /// falls back to the default city when it sees this.
    #[error("Location access denied.")]
    Denied,

    /// The service answered but could not place this address.
    #[error("Unable to retrieve your location. Please try searching for a city.")]
    Lookup(String),

    /// The service could not be reached at all.
    #[error("Unable to retrieve your location. Please try searching for a city.")]
    Unavailable(#[from] reqwest::Error),
}

/// Resolves the current position. Abstracted so the interaction controller
/// can be exercised with scripted positions and failures.
#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Position, GeoError>;
}

#[derive(Debug, Clone, Default)]
pub struct IpLocator {
    http: Client,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<Position, GeoError> {
        let res = self.http.get(GEO_URL).send().await?;

        let status = res.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            debug!(%status, "geolocation service refused the lookup");
            return Err(GeoError::Denied);
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .map_err(|e| GeoError::Lookup(e.to_string()))?;

        parse_position(parsed)
    }
}

fn parse_position(parsed: IpApiResponse) -> Result<Position, GeoError> {
    if parsed.status != "success" {
        let message = parsed.message.unwrap_or_else(|| "lookup failed".to_string());
        debug!(%message, "geolocation lookup failed");
        return Err(GeoError::Lookup(message));
    }

    match (parsed.lat, parsed.lon) {
        (Some(lat), Some(lon)) => {
            debug!(lat, lon, "geolocation resolved");
            Ok(Position { lat, lon })
        }
        _ => Err(GeoError::Lookup("response carried no coordinates".to_string())),
    }
}
