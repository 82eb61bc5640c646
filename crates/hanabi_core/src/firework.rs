//! A single firework. It waits out its delay, rises as a lone ember, explodes into a pattern of
//! particles, then fades away.
//!
//! Phase changes are driven entirely by the time elapsed since the scene started, so a firework
//! behaves the same no matter how many frames it gets to see.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use snafu::ResultExt as _;

use crate::config::FireworkConfig;
use crate::errors::{ConfigSnafu, HanabiError};
use crate::particle::{LaunchParticle, Particle};
use crate::sprite::Sprite;
use crate::surface::Surface;

/// How much the opacity drops on every fading frame.
pub const FADEOUT_OPACITY_STEP: f32 = 0.1;

/// The opacity of particles while they're still exploding.
pub const PARTICLE_RENDER_OPACITY: f32 = 1.0;

/// The opacity of the rising ember.
pub const LAUNCH_RENDER_OPACITY: f32 = 1.0;

/// The largest horizontal velocity an ember can start with.
pub const LAUNCH_HORIZONTAL_SPREAD: f32 = 1.25;

/// The largest random horizontal wobble added to an ember every frame.
const LAUNCH_WOBBLE: f32 = 0.3;

/// Damps the ember's horizontal velocity so that the wobble doesn't accumulate.
const LAUNCH_WOBBLE_DAMPING: f32 = 0.96;

/// Where a firework is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Phase {
    /// Either waiting for its delay or rising as an ember.
    Launching,
    /// Particles are flying.
    Exploding,
    /// Particles are being drawn with ever less opacity.
    Fading,
    /// Finished. Nothing will ever be drawn again.
    Inactive,
}

/// A single firework and all of its particles.
#[derive(Clone, Debug)]
pub struct Firework {
    /// The immutable config.
    config: FireworkConfig,
    /// Stamped at every particle's position.
    sprite: Sprite,
    /// The ember, only meaningful during [`Phase::Launching`].
    launch: LaunchParticle,
    /// Empty until the explosion.
    particles: Vec<Particle>,
    /// The current size that the sprite is drawn at.
    diameter: f32,
    /// Current phase.
    phase: Phase,
    /// The number of fading frames rendered so far.
    fadeout_ticks: u32,
}

impl Firework {
    /// Validate the config and pre-render the sprite.
    pub fn new(config: FireworkConfig) -> Result<Self, HanabiError> {
        config.validate().context(ConfigSnafu)?;
        let sprite = Sprite::radial_gradient(config.radius, config.colour);
        let diameter = config.radius * 2.0;

        Ok(Self {
            config,
            sprite,
            launch: LaunchParticle::default(),
            particles: Vec::new(),
            diameter,
            phase: Phase::Launching,
            fadeout_ticks: 0,
        })
    }

    /// Place the ember on a surface of the given size and give it an initial velocity.
    pub fn initialise_launch<R: Rng + ?Sized>(&mut self, dimensions: (f32, f32), rng: &mut R) {
        let (width, height) = dimensions;
        let position = Vec2::new(width * self.config.x, height * self.config.start_y);
        let velocity = Vec2::new(
            rng.gen_range(-LAUNCH_HORIZONTAL_SPREAD..=LAUNCH_HORIZONTAL_SPREAD),
            self.config.launch_speed,
        );
        self.launch = LaunchParticle::new(position, velocity);
    }

    /// Move the firework forward to `elapsed` time since the scene started, drawing whatever
    /// should be visible onto `surface`.
    pub fn advance<S, R>(&mut self, elapsed: Duration, surface: &mut S, rng: &mut R)
    where
        S: Surface + ?Sized,
        R: Rng + ?Sized,
    {
        if self.phase == Phase::Inactive || elapsed < self.config.delay {
            return;
        }

        if self.phase == Phase::Launching {
            if elapsed < self.config.explodes_at() {
                self.move_launch(rng);
                self.render_launch(surface);
                return;
            }
            self.explode(rng);
        }

        if elapsed >= self.config.expires_at() {
            self.fade(surface);
        } else {
            self.move_particles();
            self.render_particles(surface, PARTICLE_RENDER_OPACITY);
        }
    }

    /// Turn the ember into a burst of particles. Only ever happens once.
    fn explode<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.phase != Phase::Launching {
            return;
        }

        let origin = self.launch.position();
        self.particles =
            crate::patterns::generate(self.config.pattern, origin, &self.config, rng);
        self.phase = Phase::Exploding;
        tracing::debug!(
            "Firework exploded at {origin} into {} {:?} particles",
            self.particles.len(),
            self.config.pattern
        );
    }

    /// Wobble the ember sideways and push it upwards.
    fn move_launch<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let particle = &mut self.launch.0;
        particle.velocity.x += rng.gen_range(-LAUNCH_WOBBLE..=LAUNCH_WOBBLE);
        particle.velocity.x *= LAUNCH_WOBBLE_DAMPING;
        particle.velocity.y = particle.velocity.y * self.config.friction
            + self.config.gravity
            + self.config.launch_speed;
        particle.step();
    }

    /// Slow down, fall, and move every particle.
    fn move_particles(&mut self) {
        for particle in &mut self.particles {
            particle.velocity.x *= self.config.friction;
            particle.velocity.y = particle.velocity.y * self.config.friction + self.config.gravity;
            particle.step();
        }
    }

    /// One frame of fading. The particles keep flying while they become more transparent.
    fn fade<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.phase != Phase::Fading {
            tracing::trace!("Firework started fading");
            self.phase = Phase::Fading;
        }

        self.fadeout_ticks = self.fadeout_ticks.saturating_add(1);
        let opacity = self.fadeout_opacity();
        if opacity <= 0.0 {
            self.phase = Phase::Inactive;
            tracing::debug!("Firework finished after {} fading frames", self.fadeout_ticks);
            return;
        }

        self.move_particles();
        self.render_particles(surface, opacity);
    }

    /// Shrink the sprite and draw the ember.
    fn render_launch<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.shrink();
        surface.set_global_alpha(LAUNCH_RENDER_OPACITY);
        let position = self.launch.position();
        surface.draw_sprite(&self.sprite, position.x, position.y, self.diameter);
    }

    /// Shrink the sprite and draw every particle.
    fn render_particles<S: Surface + ?Sized>(&mut self, surface: &mut S, opacity: f32) {
        self.shrink();
        surface.set_global_alpha(opacity);
        for particle in &self.particles {
            surface.draw_sprite(
                &self.sprite,
                particle.position.x,
                particle.position.y,
                self.diameter,
            );
        }
    }

    /// Everything gets a little smaller every time it's drawn.
    fn shrink(&mut self) {
        self.diameter *= self.config.reduction;
    }

    /// The firework's config.
    #[must_use]
    pub const fn config(&self) -> &FireworkConfig {
        &self.config
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the firework still has anything to do.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Inactive
    }

    /// The explosion's particles, empty before the explosion.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The rising ember.
    #[must_use]
    pub const fn launch_particle(&self) -> &LaunchParticle {
        &self.launch
    }

    /// The size the sprite was last drawn at.
    #[must_use]
    pub const fn diameter(&self) -> f32 {
        self.diameter
    }

    /// The sprite stamped at every particle's position.
    #[must_use]
    pub const fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    /// The opacity used for the most recent fading frame, `1.0` before fading starts.
    #[must_use]
    pub fn fadeout_opacity(&self) -> f32 {
        #[expect(
            clippy::as_conversions,
            clippy::cast_precision_loss,
            reason = "Fading only lasts a handful of frames"
        )]
        let faded = FADEOUT_OPACITY_STEP * self.fadeout_ticks as f32;
        (1.0 - faded).max(0.0)
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::default_numeric_fallback,
    clippy::indexing_slicing,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;
    use crate::tests::helpers::{seeded_rng, DrawCall, RecordingSurface};

    fn millis(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn launched(config: FireworkConfig) -> (Firework, RecordingSurface, rand::rngs::StdRng) {
        let mut rng = seeded_rng();
        let surface = RecordingSurface::new(400.0, 300.0);
        let mut firework = Firework::new(config).unwrap();
        firework.initialise_launch(surface.dimensions(), &mut rng);
        (firework, surface, rng)
    }

    #[test]
    fn rejects_invalid_config() {
        let result = Firework::new(FireworkConfig::builder().amount(0).build());
        assert!(matches!(result, Err(HanabiError::Config { .. })));
    }

    #[test]
    fn initial_state() {
        let firework = Firework::new(FireworkConfig::builder().radius(3.0).build()).unwrap();
        assert_eq!(firework.phase(), Phase::Launching);
        assert!(firework.is_active());
        assert!(firework.particles().is_empty());
        assert_eq!(firework.diameter(), 6.0);
        assert_eq!(firework.fadeout_opacity(), 1.0);
        assert_eq!(firework.sprite().side(), 6);
    }

    #[test]
    fn launch_position_comes_from_the_surface() {
        let config = FireworkConfig::builder().x(0.25).start_y(0.5).build();
        let (firework, _, _) = launched(config);
        let ember = firework.launch_particle();
        assert_eq!(ember.position(), Vec2::new(100.0, 150.0));
        assert!(ember.velocity().x.abs() <= LAUNCH_HORIZONTAL_SPREAD);
        assert_eq!(ember.velocity().y, -1.0);
    }

    #[test]
    fn nothing_happens_before_the_delay() {
        let config = FireworkConfig::builder().delay(millis(1000)).build();
        let (mut firework, mut surface, mut rng) = launched(config);
        let before = *firework.launch_particle();

        firework.advance(millis(500), &mut surface, &mut rng);

        assert!(surface.calls.is_empty());
        assert_eq!(*firework.launch_particle(), before);
        assert_eq!(firework.diameter(), 10.0);
        assert_eq!(firework.phase(), Phase::Launching);
    }

    #[test]
    fn ember_rises_while_launching() {
        let config = FireworkConfig::builder()
            .launch_duration(millis(1000))
            .build();
        let (mut firework, mut surface, mut rng) = launched(config);
        let start = firework.launch_particle().position();

        for frame in 1..=10 {
            firework.advance(millis(frame * 16), &mut surface, &mut rng);
        }

        assert_eq!(firework.phase(), Phase::Launching);
        assert!(firework.launch_particle().position().y < start.y - 10.0);
        assert_eq!(surface.sprite_count(), 10);
        assert_eq!(surface.last_alpha(), Some(LAUNCH_RENDER_OPACITY));
    }

    #[test]
    fn explodes_then_fades_on_time() {
        let config = FireworkConfig::builder()
            .amount(10)
            .duration(millis(100))
            .launch_duration(Duration::ZERO)
            .build();
        let (mut firework, mut surface, mut rng) = launched(config);

        firework.advance(millis(1), &mut surface, &mut rng);
        assert_eq!(firework.phase(), Phase::Exploding);
        assert_eq!(firework.particles().len(), 10);
        assert_eq!(surface.sprite_count(), 10);
        assert_eq!(surface.last_alpha(), Some(PARTICLE_RENDER_OPACITY));

        surface.clear();
        firework.advance(millis(101), &mut surface, &mut rng);
        assert_eq!(firework.phase(), Phase::Fading);
        assert!((firework.fadeout_opacity() - 0.9).abs() < f32::EPSILON);
        assert!((surface.last_alpha().unwrap() - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn explosion_happens_exactly_once() {
        let config = FireworkConfig::builder()
            .amount(7)
            .launch_duration(Duration::ZERO)
            .build();
        let (mut firework, mut surface, mut rng) = launched(config);

        for frame in 1..20 {
            firework.advance(millis(frame), &mut surface, &mut rng);
            assert_eq!(firework.particles().len(), 7);
        }
    }

    #[test]
    fn explodes_where_the_ember_was() {
        let config = FireworkConfig::builder()
            .launch_duration(millis(50))
            .gravity(0.0)
            .friction(1.0)
            .build();
        let (mut firework, mut surface, mut rng) = launched(config);

        firework.advance(millis(10), &mut surface, &mut rng);
        let ember = firework.launch_particle().position();
        firework.advance(millis(60), &mut surface, &mut rng);

        let moved = firework.particles()[0];
        assert_eq!(moved.position, ember + moved.velocity);
    }

    #[test]
    fn fading_always_ends() {
        let config = FireworkConfig::builder()
            .duration(millis(10))
            .launch_duration(Duration::ZERO)
            .build();
        let (mut firework, mut surface, mut rng) = launched(config);

        let mut fading_frames = 0;
        for frame in 10..100 {
            firework.advance(millis(frame), &mut surface, &mut rng);
            if firework.phase() == Phase::Fading {
                fading_frames += 1;
            }
        }

        assert_eq!(fading_frames, 9);
        assert_eq!(firework.phase(), Phase::Inactive);
        assert!(!firework.is_active());
        assert_eq!(firework.fadeout_opacity(), 0.0);
    }

    #[test]
    fn particles_keep_moving_while_fading() {
        let config = FireworkConfig::builder()
            .duration(millis(10))
            .launch_duration(Duration::ZERO)
            .build();
        let (mut firework, mut surface, mut rng) = launched(config);

        firework.advance(millis(1), &mut surface, &mut rng);
        let exploding = firework.particles()[0].position;
        firework.advance(millis(20), &mut surface, &mut rng);
        assert_eq!(firework.phase(), Phase::Fading);
        let first_fade = firework.particles()[0].position;
        firework.advance(millis(30), &mut surface, &mut rng);
        let second_fade = firework.particles()[0].position;

        assert_ne!(exploding, first_fade);
        assert_ne!(first_fade, second_fade);
    }

    #[test]
    fn inactive_fireworks_draw_nothing() {
        let config = FireworkConfig::builder()
            .duration(millis(1))
            .launch_duration(Duration::ZERO)
            .build();
        let (mut firework, mut surface, mut rng) = launched(config);
        for _ in 0..20 {
            firework.advance(millis(5), &mut surface, &mut rng);
        }
        assert_eq!(firework.phase(), Phase::Inactive);

        surface.clear();
        let diameter = firework.diameter();
        firework.advance(millis(5000), &mut surface, &mut rng);
        assert!(surface.calls.is_empty());
        assert_eq!(firework.diameter(), diameter);
    }

    #[test]
    fn shrinks_once_per_rendered_frame() {
        let config = FireworkConfig::builder()
            .radius(10.0)
            .reduction(0.5)
            .launch_duration(millis(20))
            .build();
        let (mut firework, mut surface, mut rng) = launched(config);

        firework.advance(millis(10), &mut surface, &mut rng);
        assert_eq!(firework.diameter(), 10.0);
        firework.advance(millis(30), &mut surface, &mut rng);
        assert_eq!(firework.diameter(), 5.0);

        let DrawCall::Sprite { diameter, .. } = surface.calls.last().unwrap().clone() else {
            panic!("Expected a sprite to be drawn last");
        };
        assert_eq!(diameter, 5.0);
    }
}
