/// Where to look up weather.
///
/// The controller also stores the last issued query as its retry descriptor,
/// so `Retry` re-runs exactly what was attempted rather than guessing from
/// whatever happens to sit in the input field.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coords { lat: f64, lon: f64 },
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coords { lat, lon } => write!(f, "{lat:.4}, {lon:.4}"),
        }
    }
}

/// One normalized snapshot of current weather, produced per request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub description: String,
    /// Lower-cased primary category, e.g. "clear", "rain".
    pub condition: String,
}

impl Reading {
    /// "City, CC" label shown in the card header.
    pub fn place_label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }

    pub fn temperature_display(&self) -> i64 {
        self.temperature_c.round() as i64
    }

    pub fn feels_like_display(&self) -> i64 {
        self.feels_like_c.round() as i64
    }

    /// Wind speed converted from m/s to km/h and rounded for display.
    pub fn wind_kmh_display(&self) -> i64 {
        (self.wind_speed_mps * 3.6).round() as i64
    }
}
