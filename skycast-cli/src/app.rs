//! Interaction controller: a small state machine between the prompt loop,
//! the fetcher, and the display.
//!
//! `Controller::handle` is a pure transition function from one event to a
//! list of effects; the async loop in [`run_widget`] executes the effects
//! and feeds completions back in as events. Fetches carry a sequence
//! number so a stale completion can never overwrite a later request.

use anyhow::Result;
use chrono::Local;
use inquire::{InquireError, Select, Text};
use tracing::debug;

use skycast_core::fetch::FetchError;
use skycast_core::geo::{GeoError, Position};
use skycast_core::{Config, IpLocator, Locator, LocationQuery, OpenWeather, Reading, WeatherSource};

use crate::display::Display;

/// Widget mode. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    Loading,
    Error(String),
}

/// Everything that can happen to the widget.
#[derive(Debug)]
pub enum Event {
    Ready,
    SearchSubmitted(String),
    LocatePressed,
    RetryPressed,
    PositionResolved(Position),
    PositionFailed(GeoError),
    FetchCompleted {
        seq: u64,
        result: Result<Reading, FetchError>,
    },
}

/// Side effects the driver loop must carry out.
#[derive(Debug, PartialEq)]
pub enum Effect {
    Locate,
    Fetch { seq: u64, query: LocationQuery },
    Render(Reading),
    ClearInput,
}

pub struct Controller {
    mode: Mode,
    geolocation_available: bool,
    default_city: String,
    /// Descriptor of the last issued request, read back by retry.
    last_request: Option<LocationQuery>,
    /// Sequence number of the most recently issued fetch.
    issued_seq: u64,
}

impl Controller {
    pub fn new(geolocation_available: bool, default_city: String) -> Self {
        Self {
            mode: Mode::Idle,
            geolocation_available,
            default_city,
            last_request: None,
            issued_seq: 0,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Ready | Event::LocatePressed => self.start_locate(),

            Event::SearchSubmitted(text) => {
                let city = text.trim();
                if city.is_empty() {
                    self.mode = Mode::Error("Please enter a city name.".to_string());
                    return Vec::new();
                }

                self.mode = Mode::Loading;
                vec![self.issue(LocationQuery::City(city.to_string()))]
            }

            Event::RetryPressed => match self.last_request.clone() {
                Some(query) => {
                    self.mode = Mode::Loading;
                    vec![self.issue(query)]
                }
                None => self.start_locate(),
            },

            Event::PositionResolved(pos) => {
                self.mode = Mode::Loading;
                vec![self.issue(LocationQuery::Coords {
                    lat: pos.lat,
                    lon: pos.lon,
                })]
            }

            Event::PositionFailed(GeoError::Denied) => {
                // Keep the informational message on screen while the
                // fallback lookup runs; its completion replaces it.
                let city = self.default_city.clone();
                self.mode = Mode::Error(format!(
                    "Location access denied. Showing weather for {city} instead."
                ));
                vec![self.issue(LocationQuery::City(city))]
            }

            Event::PositionFailed(err) => {
                self.mode = Mode::Error(err.to_string());
                Vec::new()
            }

            Event::FetchCompleted { seq, result } => {
                if seq != self.issued_seq {
                    debug!(seq, latest = self.issued_seq, "discarding stale completion");
                    return Vec::new();
                }

                match result {
                    Ok(reading) => {
                        self.mode = Mode::Idle;
                        let mut effects = vec![Effect::Render(reading)];
                        if matches!(self.last_request, Some(LocationQuery::City(_))) {
                            effects.push(Effect::ClearInput);
                        }
                        effects
                    }
                    Err(err) => {
                        self.mode = Mode::Error(err.to_string());
                        Vec::new()
                    }
                }
            }
        }
    }

    fn start_locate(&mut self) -> Vec<Effect> {
        if !self.geolocation_available {
            self.mode = Mode::Error("Geolocation is not available on this system.".to_string());
            return Vec::new();
        }

        self.mode = Mode::Loading;
        vec![Effect::Locate]
    }

    fn issue(&mut self, query: LocationQuery) -> Effect {
        self.issued_seq += 1;
        self.last_request = Some(query.clone());
        debug!(seq = self.issued_seq, %query, "issuing weather request");
        Effect::Fetch {
            seq: self.issued_seq,
            query,
        }
    }
}

/// One-shot lookup: resolve a query, fetch, render, exit.
pub async fn run_once(city: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let source = OpenWeather::new(config.api_key().to_string());
    let mut display = Display::stdout();

    let query = match city {
        Some(name) => LocationQuery::City(name),
        None => match IpLocator::new().locate().await {
            Ok(pos) => LocationQuery::Coords {
                lat: pos.lat,
                lon: pos.lon,
            },
            Err(GeoError::Denied) => {
                eprintln!(
                    "Location access denied. Showing weather for {} instead.",
                    config.default_city()
                );
                LocationQuery::City(config.default_city().to_string())
            }
            Err(err) => return Err(err.into()),
        },
    };

    let reading = source.current(&query).await?;
    display.render(&reading, Local::now()).await?;

    Ok(())
}

/// The interactive widget loop.
pub async fn run_widget() -> Result<()> {
    let config = Config::load()?;
    let source = OpenWeather::new(config.api_key().to_string());
    let locator = IpLocator::new();
    let mut display = Display::stdout();
    let mut controller = Controller::new(true, config.default_city().to_string());
    let mut input = String::new();

    // Auto-lookup on startup, like the widget's page-ready behavior.
    let mut pending = controller.handle(Event::Ready);

    loop {
        while !pending.is_empty() {
            let mut next = Vec::new();
            for effect in pending.drain(..) {
                match effect {
                    Effect::Locate => {
                        println!("Locating…");
                        let event = match locator.locate().await {
                            Ok(pos) => Event::PositionResolved(pos),
                            Err(err) => Event::PositionFailed(err),
                        };
                        next.extend(controller.handle(event));
                    }
                    Effect::Fetch { seq, query } => {
                        println!("Loading weather data…");
                        let result = source.current(&query).await;
                        next.extend(controller.handle(Event::FetchCompleted { seq, result }));
                    }
                    Effect::Render(reading) => {
                        display.render(&reading, Local::now()).await?;
                    }
                    Effect::ClearInput => input.clear(),
                }
            }
            pending = next;
        }

        let Some(event) = prompt(controller.mode(), &input)? else {
            return Ok(());
        };

        if let Event::SearchSubmitted(text) = &event {
            input = text.clone();
        }
        pending = controller.handle(event);
    }
}

const CHOICE_SEARCH: &str = "Search city";
const CHOICE_LOCATE: &str = "Use my location";
const CHOICE_RETRY: &str = "Retry";
const CHOICE_QUIT: &str = "Quit";

/// Ask the user for the next action. `None` means quit.
fn prompt(mode: &Mode, input: &str) -> Result<Option<Event>> {
    let choices = match mode {
        Mode::Error(message) => {
            eprintln!("⚠ {message}");
            vec![CHOICE_RETRY, CHOICE_SEARCH, CHOICE_LOCATE, CHOICE_QUIT]
        }
        _ => vec![CHOICE_SEARCH, CHOICE_LOCATE, CHOICE_QUIT],
    };

    let choice = match Select::new("What next?", choices).prompt() {
        Ok(choice) => choice,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let event = match choice {
        CHOICE_SEARCH => {
            let text = match Text::new("City name:").with_initial_value(input).prompt() {
                Ok(text) => text,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            };
            Event::SearchSubmitted(text)
        }
        CHOICE_LOCATE => Event::LocatePressed,
        CHOICE_RETRY => Event::RetryPressed,
        _ => return Ok(None),
    };

    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> Reading {
        Reading {
            city: "London".to_string(),
            country: "GB".to_string(),
            temperature_c: 18.4,
            feels_like_c: 17.2,
            humidity_pct: 65,
            wind_speed_mps: 4.5,
            description: "partly cloudy".to_string(),
            condition: "clouds".to_string(),
        }
    }

    fn controller() -> Controller {
        Controller::new(true, "London".to_string())
    }

    fn fetch_seq(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::Fetch { seq, .. }] => *seq,
            other => panic!("expected a single fetch effect, got {other:?}"),
        }
    }

    #[test]
    fn ready_starts_a_geolocation_lookup() {
        let mut c = controller();
        let effects = c.handle(Event::Ready);

        assert_eq!(effects, vec![Effect::Locate]);
        assert_eq!(*c.mode(), Mode::Loading);
    }

    #[test]
    fn missing_geolocation_support_is_an_error() {
        let mut c = Controller::new(false, "London".to_string());
        let effects = c.handle(Event::Ready);

        assert!(effects.is_empty());
        assert!(matches!(c.mode(), Mode::Error(msg) if msg.contains("not available")));
    }

    #[test]
    fn empty_search_never_fetches() {
        let mut c = controller();
        for text in ["", "   ", "\t\n"] {
            let effects = c.handle(Event::SearchSubmitted(text.to_string()));
            assert!(effects.is_empty(), "input {text:?}");
            assert!(matches!(c.mode(), Mode::Error(msg) if msg.contains("enter a city")));
        }
    }

    #[test]
    fn search_issues_a_trimmed_city_fetch() {
        let mut c = controller();
        let effects = c.handle(Event::SearchSubmitted("  Kyiv  ".to_string()));

        assert_eq!(*c.mode(), Mode::Loading);
        assert!(matches!(
            &effects[..],
            [Effect::Fetch { query: LocationQuery::City(name), .. }] if name == "Kyiv"
        ));
    }

    #[test]
    fn resolved_position_issues_a_coords_fetch() {
        let mut c = controller();
        c.handle(Event::Ready);
        let effects = c.handle(Event::PositionResolved(Position { lat: 50.45, lon: 30.52 }));

        assert!(matches!(
            &effects[..],
            [Effect::Fetch { query: LocationQuery::Coords { .. }, .. }]
        ));
        assert_eq!(*c.mode(), Mode::Loading);
    }

    #[test]
    fn denied_geolocation_falls_back_to_the_default_city() {
        let mut c = controller();
        c.handle(Event::Ready);
        let effects = c.handle(Event::PositionFailed(GeoError::Denied));

        assert!(matches!(
            &effects[..],
            [Effect::Fetch { query: LocationQuery::City(name), .. }] if name == "London"
        ));
        assert!(matches!(c.mode(), Mode::Error(msg) if msg.contains("London instead")));
    }

    #[test]
    fn other_geolocation_failures_suggest_searching() {
        let mut c = controller();
        c.handle(Event::Ready);
        let effects = c.handle(Event::PositionFailed(GeoError::Lookup(
            "reserved range".to_string(),
        )));

        assert!(effects.is_empty());
        assert!(matches!(c.mode(), Mode::Error(msg) if msg.contains("searching for a city")));
    }

    #[test]
    fn city_fetch_success_renders_and_clears_the_input() {
        let mut c = controller();
        let seq = fetch_seq(&c.handle(Event::SearchSubmitted("London".to_string())));

        let effects = c.handle(Event::FetchCompleted {
            seq,
            result: Ok(london()),
        });

        assert_eq!(*c.mode(), Mode::Idle);
        assert!(matches!(&effects[..], [Effect::Render(_), Effect::ClearInput]));
    }

    #[test]
    fn coords_fetch_success_renders_without_touching_the_input() {
        let mut c = controller();
        c.handle(Event::Ready);
        let seq = fetch_seq(&c.handle(Event::PositionResolved(Position {
            lat: 50.45,
            lon: 30.52,
        })));

        let effects = c.handle(Event::FetchCompleted {
            seq,
            result: Ok(london()),
        });

        assert_eq!(*c.mode(), Mode::Idle);
        assert!(matches!(&effects[..], [Effect::Render(_)]));
    }

    #[test]
    fn fetch_failure_surfaces_its_message() {
        let mut c = controller();
        let seq = fetch_seq(&c.handle(Event::SearchSubmitted("Atlantis".to_string())));

        let effects = c.handle(Event::FetchCompleted {
            seq,
            result: Err(FetchError::NotFound),
        });

        assert!(effects.is_empty());
        assert!(matches!(c.mode(), Mode::Error(msg) if msg.contains("not found")));
    }

    #[test]
    fn stale_completions_are_discarded() {
        let mut c = controller();
        let first = fetch_seq(&c.handle(Event::SearchSubmitted("London".to_string())));
        let second = fetch_seq(&c.handle(Event::SearchSubmitted("Kyiv".to_string())));
        assert!(second > first);

        // The older request resolves after the newer one was issued.
        let stale = c.handle(Event::FetchCompleted {
            seq: first,
            result: Ok(london()),
        });
        assert!(stale.is_empty());
        assert_eq!(*c.mode(), Mode::Loading);

        let fresh = c.handle(Event::FetchCompleted {
            seq: second,
            result: Ok(london()),
        });
        assert!(matches!(&fresh[..], [Effect::Render(_), Effect::ClearInput]));
        assert_eq!(*c.mode(), Mode::Idle);
    }

    #[test]
    fn retry_reissues_the_last_city_request() {
        let mut c = controller();
        let seq = fetch_seq(&c.handle(Event::SearchSubmitted("Kyiv".to_string())));
        c.handle(Event::FetchCompleted {
            seq,
            result: Err(FetchError::Parse("truncated body".to_string())),
        });

        let effects = c.handle(Event::RetryPressed);
        assert!(matches!(
            &effects[..],
            [Effect::Fetch { query: LocationQuery::City(name), .. }] if name == "Kyiv"
        ));
        assert_eq!(*c.mode(), Mode::Loading);
    }

    #[test]
    fn retry_reissues_the_last_coords_request() {
        let mut c = controller();
        c.handle(Event::Ready);
        let seq = fetch_seq(&c.handle(Event::PositionResolved(Position {
            lat: 50.45,
            lon: 30.52,
        })));
        c.handle(Event::FetchCompleted {
            seq,
            result: Err(FetchError::Parse("truncated body".to_string())),
        });

        let effects = c.handle(Event::RetryPressed);
        assert!(matches!(
            &effects[..],
            [Effect::Fetch { query: LocationQuery::Coords { .. }, .. }]
        ));
    }

    #[test]
    fn retry_without_a_prior_request_takes_the_location_path() {
        let mut c = controller();
        let effects = c.handle(Event::RetryPressed);
        assert_eq!(effects, vec![Effect::Locate]);
    }
}
