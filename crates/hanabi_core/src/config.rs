//! All the variables that can be configured for a single firework.

use std::time::Duration;

use snafu::{ensure, ResultExt as _};

use crate::colour::Colour;
use crate::errors::{
    ConfigError, HanabiError, InvalidDurationSnafu, NotFiniteSnafu, NotNormalisedSnafu,
    NotPositiveSnafu,
};

/// The shape that the particles make when a firework explodes.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Pattern {
    /// A uniformly filled disk of particles.
    #[default]
    Chrysanthemum,
    /// A slow, drooping burst.
    Willow,
    /// A large, slightly irregular round burst.
    Peony,
    /// Five clustered points.
    Star,
    /// A burst that fans upwards.
    Palm,
}

impl Pattern {
    /// Every pattern, useful for picking one at random.
    pub const ALL: [Self; 5] = [
        Self::Chrysanthemum,
        Self::Willow,
        Self::Peony,
        Self::Star,
        Self::Palm,
    ];
}

/// The config for a single firework. Immutable once the firework has been created.
///
/// Build it with [`FireworkConfig::builder()`], any field not set takes its documented default.
#[derive(bon::Builder, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct FireworkConfig {
    /// How long the explosion lasts before it starts fading, measured from the end of `delay`.
    #[builder(default = Duration::from_millis(2000))]
    pub duration: Duration,
    /// How long after the scene starts before this firework does anything.
    #[builder(default = Duration::ZERO)]
    pub delay: Duration,
    /// Radius of each particle's sprite, in pixels.
    #[builder(default = 5.0)]
    pub radius: f32,
    /// The number of particles in the explosion.
    #[builder(default = 100)]
    pub amount: usize,
    /// Scales the initial velocity of the explosion's particles.
    #[builder(default = 12.0)]
    pub speed: f32,
    /// Added to the vertical velocity of everything, every frame.
    #[builder(default = 0.08)]
    pub gravity: f32,
    /// Velocity multiplier applied every frame.
    #[builder(default = 0.96)]
    pub friction: f32,
    /// Carried for completeness, the motion model only uses `friction`.
    #[builder(default = 0.98)]
    pub air_resistance: f32,
    /// The particles' diameter is multiplied by this every time they're drawn.
    #[builder(default = 0.98)]
    pub reduction: f32,
    /// Launch position as a fraction of the surface's width.
    #[builder(default = 0.5)]
    pub x: f32,
    /// Intended explosion height as a fraction of the surface's height.
    #[builder(default = 0.3)]
    pub y: f32,
    /// Launch height as a fraction of the surface's height. `1.0` is the bottom edge.
    #[builder(default = 1.0)]
    pub start_y: f32,
    /// Thrust added to the ember's vertical velocity every frame. Negative is upwards.
    #[builder(default = -1.0)]
    pub launch_speed: f32,
    /// How long the ember rises for before exploding.
    #[builder(default = Duration::from_millis(500))]
    pub launch_duration: Duration,
    /// The colour of the particles.
    #[builder(default = crate::colour::RED)]
    pub colour: Colour,
    /// The shape of the explosion.
    #[builder(default)]
    pub pattern: Pattern,
}

impl Default for FireworkConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FireworkConfig {
    /// Check that the config won't produce a degenerate firework.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("radius", self.radius),
            ("speed", self.speed),
            ("gravity", self.gravity),
            ("friction", self.friction),
            ("air_resistance", self.air_resistance),
            ("reduction", self.reduction),
            ("launch_speed", self.launch_speed),
        ] {
            ensure!(value.is_finite(), NotFiniteSnafu { field, value });
        }

        ensure!(
            self.radius > 0.0,
            NotPositiveSnafu {
                field: "radius",
                value: self.radius,
            }
        );

        #[expect(
            clippy::as_conversions,
            clippy::cast_precision_loss,
            reason = "It's only for the error message"
        )]
        let amount = self.amount as f32;
        ensure!(
            self.amount > 0,
            NotPositiveSnafu {
                field: "amount",
                value: amount,
            }
        );
        ensure!(
            self.speed > 0.0,
            NotPositiveSnafu {
                field: "speed",
                value: self.speed,
            }
        );
        ensure!(
            self.reduction > 0.0,
            NotPositiveSnafu {
                field: "reduction",
                value: self.reduction,
            }
        );

        for (field, value) in [("x", self.x), ("y", self.y), ("start_y", self.start_y)] {
            ensure!(
                (0.0..=1.0).contains(&value),
                NotNormalisedSnafu { field, value }
            );
        }

        Ok(())
    }

    /// The moment, since the scene started, at which the ember explodes.
    #[must_use]
    pub fn explodes_at(&self) -> Duration {
        self.delay.saturating_add(self.launch_duration)
    }

    /// The moment, since the scene started, at which the explosion starts to fade.
    #[must_use]
    pub fn expires_at(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }
}

/// Partial firework config, as found in config files. Every field is optional, those that aren't
/// set fall back to the defaults of [`FireworkConfig`].
///
/// Times are in milliseconds and colours are strings, see [`crate::colour::parse`].
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct FireworkOverrides {
    /// See [`FireworkConfig::duration`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    /// See [`FireworkConfig::delay`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f32>,
    /// See [`FireworkConfig::radius`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    /// See [`FireworkConfig::amount`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<usize>,
    /// See [`FireworkConfig::speed`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// See [`FireworkConfig::gravity`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f32>,
    /// See [`FireworkConfig::friction`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friction: Option<f32>,
    /// See [`FireworkConfig::air_resistance`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_resistance: Option<f32>,
    /// See [`FireworkConfig::reduction`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction: Option<f32>,
    /// See [`FireworkConfig::x`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// See [`FireworkConfig::y`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// See [`FireworkConfig::start_y`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_y: Option<f32>,
    /// See [`FireworkConfig::launch_speed`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_speed: Option<f32>,
    /// See [`FireworkConfig::launch_duration`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_duration: Option<f32>,
    /// See [`FireworkConfig::colour`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    /// See [`FireworkConfig::pattern`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
}

impl FireworkOverrides {
    /// Layer `other` on top of `self`. Any field set in `other` wins.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            duration: other.duration.or(self.duration),
            delay: other.delay.or(self.delay),
            radius: other.radius.or(self.radius),
            amount: other.amount.or(self.amount),
            speed: other.speed.or(self.speed),
            gravity: other.gravity.or(self.gravity),
            friction: other.friction.or(self.friction),
            air_resistance: other.air_resistance.or(self.air_resistance),
            reduction: other.reduction.or(self.reduction),
            x: other.x.or(self.x),
            y: other.y.or(self.y),
            start_y: other.start_y.or(self.start_y),
            launch_speed: other.launch_speed.or(self.launch_speed),
            launch_duration: other.launch_duration.or(self.launch_duration),
            colour: other.colour.clone().or_else(|| self.colour.clone()),
            pattern: other.pattern.or(self.pattern),
        }
    }

    /// Fill in the defaults and produce a validated, strongly typed config.
    pub fn to_config(&self) -> Result<FireworkConfig, HanabiError> {
        let colour = self
            .colour
            .as_deref()
            .map(crate::colour::parse)
            .transpose()?;

        let config = FireworkConfig::builder()
            .maybe_duration(milliseconds("duration", self.duration)?)
            .maybe_delay(milliseconds("delay", self.delay)?)
            .maybe_radius(self.radius)
            .maybe_amount(self.amount)
            .maybe_speed(self.speed)
            .maybe_gravity(self.gravity)
            .maybe_friction(self.friction)
            .maybe_air_resistance(self.air_resistance)
            .maybe_reduction(self.reduction)
            .maybe_x(self.x)
            .maybe_y(self.y)
            .maybe_start_y(self.start_y)
            .maybe_launch_speed(self.launch_speed)
            .maybe_launch_duration(milliseconds("launch_duration", self.launch_duration)?)
            .maybe_colour(colour)
            .maybe_pattern(self.pattern)
            .build();

        config.validate().context(crate::errors::ConfigSnafu)?;
        Ok(config)
    }
}

/// Convert an optional millisecond value into a `Duration`.
fn milliseconds(field: &'static str, value: Option<f32>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|millis| {
            Duration::try_from_secs_f32(millis / 1000.0).map_err(|_error| {
                InvalidDurationSnafu {
                    field,
                    value: millis,
                }
                .build()
            })
        })
        .transpose()
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::default_numeric_fallback,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = FireworkConfig::default();
        assert_eq!(config.duration, Duration::from_millis(2000));
        assert_eq!(config.delay, Duration::ZERO);
        assert_eq!(config.radius, 5.0);
        assert_eq!(config.amount, 100);
        assert_eq!(config.speed, 12.0);
        assert_eq!(config.x, 0.5);
        assert_eq!(config.y, 0.3);
        assert_eq!(config.start_y, 1.0);
        assert_eq!(config.launch_duration, Duration::from_millis(500));
        assert_eq!(config.colour, crate::colour::RED);
        assert_eq!(config.pattern, Pattern::Chrysanthemum);
        config.validate().unwrap();
    }

    #[test]
    fn overrides_only_replace_what_is_set() {
        let overrides = FireworkOverrides {
            amount: Some(10),
            delay: Some(250.0),
            colour: Some("#00ff00".to_owned()),
            pattern: Some(Pattern::Star),
            ..FireworkOverrides::default()
        };
        let config = overrides.to_config().unwrap();
        assert_eq!(config.amount, 10);
        assert_eq!(config.delay, Duration::from_millis(250));
        assert_eq!(config.colour, (0.0, 1.0, 0.0, 1.0));
        assert_eq!(config.pattern, Pattern::Star);
        assert_eq!(config.speed, 12.0);
        assert_eq!(config.duration, Duration::from_millis(2000));
    }

    #[test]
    fn merging_overrides() {
        let base = FireworkOverrides {
            amount: Some(10),
            speed: Some(3.0),
            ..FireworkOverrides::default()
        };
        let top = FireworkOverrides {
            amount: Some(20),
            ..FireworkOverrides::default()
        };
        let merged = base.merge(&top);
        assert_eq!(merged.amount, Some(20));
        assert_eq!(merged.speed, Some(3.0));
        assert_eq!(merged.radius, None);
    }

    #[test]
    fn rejects_degenerate_fireworks() {
        let error = FireworkConfig::builder().radius(0.0).build().validate();
        assert_eq!(
            error.unwrap_err().to_string(),
            "`radius` must be greater than 0, got: 0"
        );

        let error = FireworkConfig::builder().amount(0).build().validate();
        assert!(matches!(
            error,
            Err(ConfigError::NotPositive {
                field: "amount",
                ..
            })
        ));

        let error = FireworkConfig::builder().speed(-1.0).build().validate();
        assert!(error.is_err());

        let error = FireworkConfig::builder().x(1.5).build().validate();
        assert!(matches!(
            error,
            Err(ConfigError::NotNormalised { field: "x", .. })
        ));
    }

    #[test]
    fn rejects_infinite_and_nan_values() {
        let error = FireworkConfig::builder()
            .speed(f32::INFINITY)
            .build()
            .validate();
        assert!(matches!(
            error,
            Err(ConfigError::NotFinite { field: "speed", .. })
        ));

        let error = FireworkConfig::builder()
            .radius(f32::INFINITY)
            .build()
            .validate();
        assert_eq!(
            error.unwrap_err().to_string(),
            "`radius` must be a finite number, got: inf"
        );

        let error = FireworkConfig::builder().gravity(f32::NAN).build().validate();
        assert!(matches!(
            error,
            Err(ConfigError::NotFinite {
                field: "gravity",
                ..
            })
        ));

        let error = FireworkConfig::builder()
            .launch_speed(f32::NEG_INFINITY)
            .build()
            .validate();
        assert!(error.is_err());

        let overrides: FireworkOverrides =
            serde_json::from_str(r#"{"friction": 1e39}"#).unwrap();
        assert!(matches!(
            overrides.to_config(),
            Err(HanabiError::Config {
                source: ConfigError::NotFinite { .. }
            })
        ));
    }

    #[test]
    fn rejects_bad_overrides() {
        let negative_delay = FireworkOverrides {
            delay: Some(-1.0),
            ..FireworkOverrides::default()
        };
        assert!(negative_delay.to_config().is_err());

        let bad_colour = FireworkOverrides {
            colour: Some("nope".to_owned()),
            ..FireworkOverrides::default()
        };
        assert!(matches!(
            bad_colour.to_config(),
            Err(HanabiError::Config {
                source: ConfigError::Colour { .. }
            })
        ));
    }

    #[test]
    fn overrides_from_json() {
        let overrides: FireworkOverrides =
            serde_json::from_str(r#"{"amount": 5, "pattern": "palm"}"#).unwrap();
        assert_eq!(overrides.amount, Some(5));
        assert_eq!(overrides.pattern, Some(Pattern::Palm));
        assert_eq!(
            serde_json::to_string(&overrides).unwrap(),
            r#"{"amount":5,"pattern":"palm"}"#
        );
    }
}
