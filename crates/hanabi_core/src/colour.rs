//! Colours, and turning the strings people use to describe them into RGBA.

use palette::FromColor as _;
use palette::Mix as _;

use crate::errors::ConfigError;

/// An RGBA colour. Each channel is `0.0..=1.0`.
pub type Colour = (f32, f32, f32, f32);

/// A default pure white.
pub const WHITE: Colour = (1.0, 1.0, 1.0, 1.0);

/// A default pure black.
pub const BLACK: Colour = (0.0, 0.0, 0.0, 1.0);

/// A default pure red.
pub const RED: Colour = (1.0, 0.0, 0.0, 1.0);

/// Black, but completely see-through.
pub const TRANSPARENT: Colour = (0.0, 0.0, 0.0, 0.0);

/// Parse a colour string.
///
/// Supports the hex forms `#rrggbb` and `#rgb` and the functional `hsl(h, s%, l%)` form, which
/// is what random hues are usually generated as.
pub fn parse(input: &str) -> Result<Colour, ConfigError> {
    let trimmed = input.trim();
    if let Some(arguments) = trimmed
        .strip_prefix("hsl(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_hsl(arguments).ok_or_else(|| ConfigError::Colour {
            input: input.to_owned(),
        });
    }

    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let rgb: palette::Srgb<u8> = hex.parse().map_err(|_error| ConfigError::Colour {
        input: input.to_owned(),
    })?;
    let rgb = rgb.into_format::<f32>();
    Ok((rgb.red, rgb.green, rgb.blue, 1.0))
}

/// Parse the inside of `hsl(...)`. Saturation and lightness may or may not have a `%` suffix.
fn parse_hsl(arguments: &str) -> Option<Colour> {
    let mut parts = arguments.split(',').map(str::trim);
    let hue: f32 = parts.next()?.trim_end_matches("deg").parse().ok()?;
    let saturation: f32 = parts.next()?.trim_end_matches('%').parse().ok()?;
    let lightness: f32 = parts.next()?.trim_end_matches('%').parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let hsl = palette::Hsl::new(hue, saturation / 100.0, lightness / 100.0);
    let rgb = palette::Srgb::from_color(hsl);
    Some((
        rgb.red.clamp(0.0, 1.0),
        rgb.green.clamp(0.0, 1.0),
        rgb.blue.clamp(0.0, 1.0),
        1.0,
    ))
}

/// Format a hue as an `hsl()` string with full saturation and half lightness.
#[must_use]
pub fn hue_to_string(hue: f32) -> String {
    format!("hsl({hue:.1}, 100%, 50%)")
}

/// Linearly interpolate between 2 colours, `amount` of `0.0` being all `from`.
#[must_use]
pub fn mix(from: Colour, to: Colour, amount: f32) -> Colour {
    let from = palette::Srgba::new(from.0, from.1, from.2, from.3);
    let to = palette::Srgba::new(to.0, to.1, to.2, to.3);
    let mixed = from.mix(to, amount.clamp(0.0, 1.0));
    (mixed.red, mixed.green, mixed.blue, mixed.alpha)
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::float_cmp,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;

    #[test]
    fn hex_colours() {
        assert_eq!(parse("#ff0000").unwrap(), RED);
        assert_eq!(parse("ffffff").unwrap(), WHITE);
        assert_eq!(parse("#000").unwrap(), BLACK);
    }

    #[test]
    fn hsl_colours() {
        let red = parse("hsl(0, 100%, 50%)").unwrap();
        assert!((red.0 - 1.0).abs() < 0.001);
        assert!(red.1.abs() < 0.001);
        assert!(red.2.abs() < 0.001);

        let blue = parse(&hue_to_string(240.0)).unwrap();
        assert!(blue.0.abs() < 0.001);
        assert!((blue.2 - 1.0).abs() < 0.001);
    }

    #[test]
    fn bad_colours() {
        assert!(parse("tomato-ish").is_err());
        assert!(parse("hsl(1, 2)").is_err());
        assert!(parse("hsl(1, 2, 3, 4)").is_err());
        assert!(parse("#12345").is_err());
    }

    #[test]
    fn mixing() {
        let grey = mix(BLACK, WHITE, 0.5);
        assert_eq!(grey, (0.5, 0.5, 0.5, 1.0));
        assert_eq!(mix(RED, TRANSPARENT, 1.0), TRANSPARENT);
    }
}
