//! Plan a whole show: when every firework goes up, where, in what colour and in what shape.
//!
//! The physical defaults were tuned for a canvas about 800 pixels tall. A terminal is far
//! smaller, so everything that's measured in pixels gets scaled down to the terminal's height.

use color_eyre::eyre::Result;
use rand::seq::SliceRandom as _;
use rand::Rng;

use hanabi_core::{FireworkOverrides, Pattern};

/// Settings for generating a show.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ShowConfig {
    /// The number of fireworks.
    pub count: usize,
    /// Milliseconds between each firework's launch.
    pub spacing: f32,
    /// Milliseconds from launch until each firework starts fading.
    pub duration: f32,
    /// Particles per explosion.
    pub amount: usize,
    /// Particle radius, in reference pixels.
    pub radius: f32,
    /// The smallest radius, in terminal pixels, that still shows the particle's colour.
    pub minimum_radius: f32,
    /// Shrink factor applied every frame.
    pub reduction: f32,
    /// Velocity multiplier applied every frame.
    pub friction: f32,
    /// Downward acceleration, in reference pixels.
    pub gravity: f32,
    /// Explosion speed, in reference pixels.
    pub speed: f32,
    /// Upward thrust, in reference pixels.
    pub launch_speed: f32,
    /// Shortest launch, in milliseconds.
    pub launch_duration_min: f32,
    /// Longest launch, in milliseconds.
    pub launch_duration_max: f32,
    /// Leftmost launch position, as a fraction of the width.
    pub x_min: f32,
    /// Rightmost launch position, as a fraction of the width.
    pub x_max: f32,
    /// Intended explosion height, as a fraction of the height.
    pub y: f32,
    /// Random variation either side of `y`.
    pub y_jitter: f32,
    /// The canvas height that the pixel measurements were tuned for.
    pub reference_height: f32,
    /// Force every firework to use this pattern. Random when not set.
    pub pattern: Option<Pattern>,
    /// Applied on top of every generated firework, so anything here always wins.
    pub firework: FireworkOverrides,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            count: 30,
            spacing: 1500.0,
            duration: 5000.0,
            amount: 150,
            radius: 4.0,
            minimum_radius: 1.5,
            reduction: 0.992,
            friction: 0.95,
            gravity: 0.08,
            speed: 25.0,
            launch_speed: -0.5,
            launch_duration_min: 400.0,
            launch_duration_max: 500.0,
            x_min: 0.1,
            x_max: 0.9,
            y: 0.25,
            y_jitter: 0.05,
            reference_height: 800.0,
            pattern: None,
            firework: FireworkOverrides::default(),
        }
    }
}

impl ShowConfig {
    /// How much to scale pixel measurements by for a surface of the given height.
    #[must_use]
    pub fn scale_for(&self, pixel_height: f32) -> f32 {
        if self.reference_height <= 0.0 || pixel_height <= 0.0 {
            return 1.0;
        }
        pixel_height / self.reference_height
    }
}

/// Randomly generate the overrides for every firework in the show.
pub fn plan<R: Rng + ?Sized>(
    config: &ShowConfig,
    pixel_height: f32,
    rng: &mut R,
) -> Vec<FireworkOverrides> {
    let scale = config.scale_for(pixel_height);
    tracing::debug!(
        "Planning {} fireworks for a {pixel_height}px high surface (scale: {scale})",
        config.count
    );

    (0..config.count)
        .map(|index| {
            let mut firework = FireworkOverrides::default();

            #[expect(
                clippy::as_conversions,
                clippy::cast_precision_loss,
                reason = "Shows don't have millions of fireworks"
            )]
            let delay = config.spacing * index as f32;
            firework.delay = Some(delay);
            firework.duration = Some(config.duration);
            firework.amount = Some(config.amount);
            firework.radius = Some((config.radius * scale).max(config.minimum_radius));
            firework.reduction = Some(config.reduction);
            firework.friction = Some(config.friction);
            firework.gravity = Some(config.gravity * scale);
            firework.speed = Some(config.speed * scale);
            firework.launch_speed = Some(config.launch_speed * scale);
            firework.launch_duration = Some(between(
                rng,
                config.launch_duration_min,
                config.launch_duration_max,
            ));
            firework.x = Some(between(rng, config.x_min, config.x_max).clamp(0.0, 1.0));
            firework.y = Some(
                between(rng, config.y - config.y_jitter, config.y + config.y_jitter)
                    .clamp(0.0, 1.0),
            );
            firework.start_y = Some(1.0);
            firework.colour = Some(hanabi_core::colour::hue_to_string(rng.gen::<f32>() * 360.0));
            firework.pattern = Some(
                config
                    .pattern
                    .or_else(|| Pattern::ALL.choose(rng).copied())
                    .unwrap_or_default(),
            );

            firework.merge(&config.firework)
        })
        .collect()
}

/// Turn a plan into real fireworks, validating each one.
pub fn build(plan: &[FireworkOverrides]) -> Result<Vec<hanabi_core::Firework>> {
    plan.iter()
        .map(|overrides| Ok(hanabi_core::Firework::new(overrides.to_config()?)?))
        .collect()
}

/// A uniformly random value between `low` and `high`. Doesn't panic if they're the wrong way
/// round.
fn between<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    low + rng.gen::<f32>() * (high - low)
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    reason = "Tests aren't so strict"
)]
mod test {
    use rand::SeedableRng as _;

    use super::*;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(1)
    }

    #[test]
    fn fireworks_are_evenly_spaced() {
        let config = ShowConfig {
            count: 4,
            spacing: 100.0,
            ..ShowConfig::default()
        };
        let plan = plan(&config, 800.0, &mut rng());
        assert_eq!(plan.len(), 4);
        let delays: Vec<f32> = plan.iter().map(|firework| firework.delay.unwrap()).collect();
        assert_eq!(delays, vec![0.0, 100.0, 200.0, 300.0]);
    }

    #[test]
    fn random_values_stay_in_range() {
        let config = ShowConfig {
            count: 200,
            ..ShowConfig::default()
        };
        for firework in plan(&config, 800.0, &mut rng()) {
            let x = firework.x.unwrap();
            let y = firework.y.unwrap();
            let launch = firework.launch_duration.unwrap();
            assert!((0.1..=0.9).contains(&x), "{x}");
            assert!((0.2..=0.3).contains(&y), "{y}");
            assert!((400.0..=500.0).contains(&launch), "{launch}");
            assert!(firework.colour.unwrap().starts_with("hsl("));
        }
    }

    #[test]
    fn scales_to_the_surface() {
        let config = ShowConfig {
            count: 1,
            ..ShowConfig::default()
        };
        let plan = plan(&config, 80.0, &mut rng());
        assert_eq!(plan[0].speed, Some(2.5));
        assert_eq!(plan[0].launch_speed, Some(-0.05));
        assert_eq!(plan[0].radius, Some(1.5));
        assert_eq!(plan[0].amount, Some(150));
    }

    #[test]
    fn forced_pattern_and_overrides_win() {
        let mut overrides = FireworkOverrides::default();
        overrides.amount = Some(3);
        let config = ShowConfig {
            count: 10,
            pattern: Some(Pattern::Star),
            firework: overrides,
            ..ShowConfig::default()
        };
        for firework in plan(&config, 800.0, &mut rng()) {
            assert_eq!(firework.pattern, Some(Pattern::Star));
            assert_eq!(firework.amount, Some(3));
        }
    }

    #[test]
    fn plans_build_into_fireworks() {
        let plan = plan(&ShowConfig::default(), 96.0, &mut rng());
        let fireworks = build(&plan).unwrap();
        assert_eq!(fireworks.len(), 30);
    }

    #[test]
    fn same_seed_same_show() {
        let config = ShowConfig::default();
        assert_eq!(plan(&config, 96.0, &mut rng()), plan(&config, 96.0, &mut rng()));
    }
}
