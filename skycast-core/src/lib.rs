//! Core library for the `skycast` weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap fetcher and its error taxonomy
//! - IP-based geolocation
//! - Condition-to-theme classification and the gradient registry
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod fetch;
pub mod geo;
pub mod model;
pub mod theme;

pub use config::Config;
pub use fetch::{FetchError, OpenWeather, WeatherSource};
pub use geo::{GeoError, IpLocator, Locator, Position};
pub use model::{LocationQuery, Reading};
pub use theme::{Gradient, Icon, ThemeKey};
