//! Display updater: renders one weather card to the terminal.
//!
//! The card owns its output handle, so all terminal writes flow through one
//! place instead of ambient globals. The temperature line counts up from
//! zero to the measured value over one second on a fixed frame tick.

use chrono::{DateTime, Local, Timelike};
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor},
};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tokio::time::{Instant, interval};

use skycast_core::theme::{self, Gradient};
use skycast_core::Reading;

const CARD_WIDTH: usize = 44;
const ANIMATION_DURATION: Duration = Duration::from_millis(1000);
const FRAME: Duration = Duration::from_millis(16);

pub struct Display<W: Write> {
    out: W,
    width: usize,
    animation: Option<Duration>,
}

impl Display<io::Stdout> {
    /// Card writing to stdout; the count-up animation only makes sense on a
    /// terminal, so piped output gets final values immediately.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let animate = out.is_terminal();
        let display = Self::new(out);
        if animate {
            display
        } else {
            display.without_animation()
        }
    }
}

impl<W: Write> Display<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: CARD_WIDTH,
            animation: Some(ANIMATION_DURATION),
        }
    }

    /// Print final values immediately; used by tests and piped output.
    pub fn without_animation(mut self) -> Self {
        self.animation = None;
        self
    }

    /// Render every field of the reading and the theme selected from its
    /// condition and the current local hour.
    pub async fn render(&mut self, reading: &Reading, now: DateTime<Local>) -> io::Result<()> {
        let (theme, icon) = theme::theme_for(&reading.condition, now.hour());
        let gradient = theme::gradient(theme);

        self.banner(&gradient)?;
        writeln!(self.out, "  {}  {}", icon.glyph(), reading.place_label())?;
        writeln!(self.out, "  {}", reading.description)?;

        let target = reading.temperature_display();
        match self.animation {
            Some(duration) => animate_temperature(&mut self.out, target, duration).await?,
            None => writeln!(self.out, "  {target} °C")?,
        }

        writeln!(self.out, "  Feels like: {} °C", reading.feels_like_display())?;
        writeln!(self.out, "  Humidity: {} %", reading.humidity_pct)?;
        writeln!(self.out, "  Wind: {} km/h", reading.wind_kmh_display())?;
        writeln!(self.out, "  Last updated: {}", now.format("%H:%M"))?;
        self.banner(&gradient)?;
        self.out.flush()
    }

    /// A horizontal band of the theme gradient, one cell per sample.
    fn banner(&mut self, gradient: &Gradient) -> io::Result<()> {
        for x in 0..self.width {
            let t = x as f64 / (self.width - 1) as f64;
            let (r, g, b) = theme::sample(gradient, t);
            queue!(self.out, SetBackgroundColor(Color::Rgb { r, g, b }), Print(" "))?;
        }
        queue!(self.out, ResetColor, Print("\n"))?;
        Ok(())
    }
}

/// Interpolated temperature at `progress` (0..=1): floors the intermediate
/// value and lands exactly on the target at the end of the window.
fn value_at(target: i64, progress: f64) -> i64 {
    let p = progress.clamp(0.0, 1.0);
    (p * target as f64).floor() as i64
}

async fn animate_temperature<W: Write>(
    out: &mut W,
    target: i64,
    duration: Duration,
) -> io::Result<()> {
    let start = Instant::now();
    let mut frames = interval(FRAME);

    loop {
        frames.tick().await;
        let progress = if duration.is_zero() {
            1.0
        } else {
            start.elapsed().as_secs_f64() / duration.as_secs_f64()
        };

        write!(out, "\r  {} °C", value_at(target, progress))?;
        out.flush()?;

        if progress >= 1.0 {
            break;
        }
    }

    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

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

    #[tokio::test]
    async fn card_shows_every_field_with_display_rounding() {
        let mut display = Display::new(Vec::new()).without_animation();
        let now = Local.with_ymd_and_hms(2026, 8, 29, 14, 5, 0).unwrap();

        display.render(&london(), now).await.expect("render");

        let text = String::from_utf8_lossy(&display.out).to_string();
        assert!(text.contains("London, GB"));
        assert!(text.contains("partly cloudy"));
        assert!(text.contains("  18 °C"));
        assert!(text.contains("Feels like: 17 °C"));
        assert!(text.contains("Humidity: 65 %"));
        assert!(text.contains("Wind: 16 km/h"));
        assert!(text.contains("Last updated: 14:05"));
        assert!(text.contains("☁"));
    }

    #[tokio::test]
    async fn animated_card_still_lands_on_the_target_value() {
        let mut display = Display::new(Vec::new());
        display.animation = Some(Duration::ZERO);
        let now = Local.with_ymd_and_hms(2026, 8, 29, 14, 5, 0).unwrap();

        display.render(&london(), now).await.expect("render");

        let text = String::from_utf8_lossy(&display.out).to_string();
        assert!(text.contains("  18 °C"));
    }

    #[test]
    fn interpolation_is_monotonic_and_exact_at_the_ends() {
        let mut last = value_at(18, 0.0);
        assert_eq!(last, 0);

        for step in 1..=100 {
            let value = value_at(18, f64::from(step) / 100.0);
            assert!(value >= last, "step {step}");
            last = value;
        }
        assert_eq!(last, 18);
    }

    #[test]
    fn interpolation_clamps_out_of_range_progress() {
        assert_eq!(value_at(18, -0.5), 0);
        assert_eq!(value_at(18, 1.5), 18);
    }

    #[test]
    fn interpolation_walks_down_to_negative_targets() {
        assert_eq!(value_at(-5, 0.0), 0);
        assert_eq!(value_at(-5, 1.0), -5);
        assert!(value_at(-5, 0.5) <= 0);
    }
}
