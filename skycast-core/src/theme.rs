//! Condition-to-presentation mapping: classifier, night override, gradients.
//!
//! Everything here is a pure function of the condition key and the local
//! hour; nothing is cached between renders.

/// Background theme selected from the weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKey {
    Clear,
    Sunny,
    Cloudy,
    Rainy,
    Snow,
    Night,
}

impl ThemeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKey::Clear => "clear",
            ThemeKey::Sunny => "sunny",
            ThemeKey::Cloudy => "cloudy",
            ThemeKey::Rainy => "rainy",
            ThemeKey::Snow => "snow",
            ThemeKey::Night => "night",
        }
    }
}

/// Icon shown next to the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Sun,
    Cloud,
    CloudRain,
    Bolt,
    Snowflake,
    Smog,
    Mountain,
    Wind,
}

impl Icon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Sun => "☀",
            Icon::Cloud => "☁",
            Icon::CloudRain => "🌧",
            Icon::Bolt => "⚡",
            Icon::Snowflake => "❄",
            Icon::Smog => "🌫",
            Icon::Mountain => "🌋",
            Icon::Wind => "🌬",
        }
    }
}

/// RGB stops behind a theme key, rendered as a horizontal banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub stops: &'static [(u8, u8, u8)],
}

/// Map a condition key to its theme and icon.
///
/// Total by construction: any key outside the table falls back to the
/// default clear theme with a generic cloud icon.
pub fn classify(condition: &str) -> (ThemeKey, Icon) {
    match condition {
        "clear" => (ThemeKey::Clear, Icon::Sun),
        "sunny" => (ThemeKey::Sunny, Icon::Sun),
        "clouds" => (ThemeKey::Cloudy, Icon::Cloud),
        "rain" => (ThemeKey::Rainy, Icon::CloudRain),
        "drizzle" => (ThemeKey::Rainy, Icon::CloudRain),
        "thunderstorm" => (ThemeKey::Rainy, Icon::Bolt),
        "snow" => (ThemeKey::Snow, Icon::Snowflake),
        "mist" => (ThemeKey::Cloudy, Icon::Smog),
        "smoke" => (ThemeKey::Cloudy, Icon::Smog),
        "haze" => (ThemeKey::Cloudy, Icon::Smog),
        "dust" => (ThemeKey::Cloudy, Icon::Smog),
        "fog" => (ThemeKey::Cloudy, Icon::Smog),
        "sand" => (ThemeKey::Sunny, Icon::Sun),
        "ash" => (ThemeKey::Cloudy, Icon::Mountain),
        "squall" => (ThemeKey::Rainy, Icon::Wind),
        "tornado" => (ThemeKey::Rainy, Icon::Wind),
        _ => (ThemeKey::Clear, Icon::Cloud),
    }
}

/// Select the theme and icon for a condition at the given local hour.
///
/// Clear and sunny skies switch to the night theme outside 06:00–18:00;
/// no other theme is affected by the hour.
pub fn theme_for(condition: &str, hour: u32) -> (ThemeKey, Icon) {
    let (theme, icon) = classify(condition);
    let is_night = hour < 6 || hour > 18;

    if is_night && matches!(theme, ThemeKey::Clear | ThemeKey::Sunny) {
        (ThemeKey::Night, icon)
    } else {
        (theme, icon)
    }
}

/// Fixed registry of background gradients, one per theme key.
pub fn gradient(theme: ThemeKey) -> Gradient {
    let stops: &'static [(u8, u8, u8)] = match theme {
        ThemeKey::Sunny => &[(0xff, 0x9a, 0x9e), (0xfa, 0xd0, 0xc4)],
        ThemeKey::Cloudy => &[(0xa1, 0xc4, 0xfd), (0xc2, 0xe9, 0xfb)],
        ThemeKey::Rainy => &[(0x66, 0x7e, 0xea), (0x76, 0x4b, 0xa2)],
        ThemeKey::Snow => &[(0x89, 0xf7, 0xfe), (0x66, 0xa6, 0xff)],
        ThemeKey::Night => &[(0x0f, 0x0c, 0x29), (0x30, 0x2b, 0x63), (0x24, 0x24, 0x3e)],
        ThemeKey::Clear => &[(0xff, 0xec, 0xd2), (0xfc, 0xb6, 0x9f)],
    };

    Gradient { stops }
}

/// Linear interpolation along the gradient's stops, `t` in 0..=1.
pub fn sample(gradient: &Gradient, t: f64) -> (u8, u8, u8) {
    let stops = gradient.stops;
    if stops.len() == 1 {
        return stops[0];
    }

    let t = t.clamp(0.0, 1.0);
    let span = (stops.len() - 1) as f64;
    let pos = t * span;
    let idx = (pos.floor() as usize).min(stops.len() - 2);
    let frac = pos - idx as f64;

    let (r0, g0, b0) = stops[idx];
    let (r1, g1, b1) = stops[idx + 1];
    let mix = |a: u8, b: u8| -> u8 { (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8 };

    (mix(r0, r1), mix(g0, g1), mix(b0, b1))
}
