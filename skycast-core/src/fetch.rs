use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;
use tracing::debug;

use crate::model::{LocationQuery, Reading};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Failure modes of one weather lookup. Every variant is terminal for the
/// current request; the message is what the widget shows the user.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("City not found. Please check the spelling and try again.")]
    NotFound,

    #[error("Invalid API key. Please check your OpenWeatherMap API key.")]
    Unauthorized,

    #[error("Unable to fetch weather data. Please try again.")]
    Upstream(StatusCode),

    #[error("Unable to fetch weather data. Please try again.")]
    Transport(#[from] reqwest::Error),

    #[error("Received an unreadable response from the weather service.")]
    Parse(String),
}

/// Map a non-success HTTP status to its error variant.
pub fn classify_status(status: StatusCode) -> FetchError {
    match status.as_u16() {
        404 => FetchError::NotFound,
        401 => FetchError::Unauthorized,
        _ => FetchError::Upstream(status),
    }
}

/// A source of current-weather readings. Abstracted so the interaction
/// controller can be driven by a canned source in tests.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &LocationQuery) -> Result<Reading, FetchError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeather {
    api_key: String,
    http: Client,
}

impl OpenWeather {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, query: &LocationQuery) -> Result<Reading, FetchError> {
        let mut params: Vec<(&str, String)> = match query {
            LocationQuery::City(name) => vec![("q", name.clone())],
            LocationQuery::Coords { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        debug!(%query, "requesting current weather");

        let res = self.http.get(BASE_URL).query(&params).send().await?;

        let status = res.status();
        if !status.is_success() {
            debug!(%status, "weather request rejected");
            return Err(classify_status(status));
        }

        let body = res.text().await?;
        parse_current(&body)
    }
}

#[async_trait]
impl WeatherSource for OpenWeather {
    async fn current(&self, query: &LocationQuery) -> Result<Reading, FetchError> {
        self.fetch_current(query).await
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

/// Parse a successful response body into a normalized reading.
///
/// A 200 body that is missing expected fields (including an empty `weather`
/// array) is a `Parse` failure rather than a generic network error.
pub fn parse_current(body: &str) -> Result<Reading, FetchError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let entry = parsed
        .weather
        .first()
        .ok_or_else(|| FetchError::Parse("response contained no weather entries".to_string()))?;

    Ok(Reading {
        city: parsed.name,
        country: parsed.sys.country,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        description: entry.description.clone(),
        condition: entry.main.to_lowercase(),
    })
}
