//! The initial velocities of an explosion's particles. Each pattern is a pure function of where
//! the explosion happens, the firework's config and a source of randomness.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use rand::Rng;

use crate::config::{FireworkConfig, Pattern};
use crate::particle::Particle;

/// The number of points on a star.
pub const STAR_POINTS: usize = 5;

/// Maximum deviation either side of a star point's angle, in radians.
const STAR_SPREAD: f32 = 0.2;

/// Maximum extra angle added to each peony particle, in radians.
const PEONY_JITTER: f32 = 0.5;

/// The largest random upward nudge given to willow particles, before gravity bends them over.
const WILLOW_LIFT: f32 = 2.0;

/// Create all the particles for an explosion at `origin`.
pub fn generate<R: Rng + ?Sized>(
    pattern: Pattern,
    origin: Vec2,
    config: &FireworkConfig,
    rng: &mut R,
) -> Vec<Particle> {
    let velocities = match pattern {
        Pattern::Chrysanthemum => chrysanthemum(config, rng),
        Pattern::Willow => willow(config, rng),
        Pattern::Peony => peony(config, rng),
        Pattern::Star => star(config, rng),
        Pattern::Palm => palm(config, rng),
    };

    velocities
        .into_iter()
        .map(|velocity| Particle::new(origin, velocity))
        .collect()
}

/// A uniformly filled disk, made by throwing away samples from the enclosing square that land
/// outside the circle. Every velocity's length is at most `speed / 2`.
pub fn chrysanthemum<R: Rng + ?Sized>(config: &FireworkConfig, rng: &mut R) -> Vec<Vec2> {
    let half = config.speed / 2.0;
    let max_speed_squared = half * half;
    let mut velocities = Vec::with_capacity(config.amount);

    while velocities.len() < config.amount {
        let velocity = Vec2::new(rng.gen_range(-half..half), rng.gen_range(-half..half));
        if velocity.length_squared() <= max_speed_squared {
            velocities.push(velocity);
        }
    }

    velocities
}

/// Evenly spaced, squashed vertically and nudged upwards, so that the particles arc over and
/// droop once gravity takes hold.
pub fn willow<R: Rng + ?Sized>(config: &FireworkConfig, rng: &mut R) -> Vec<Vec2> {
    (0..config.amount)
        .map(|index| {
            let angle = even_angle(index, config.amount);
            let speed = config.speed * rng.gen_range(0.3_f32..0.8);
            let lift = rng.gen::<f32>() * WILLOW_LIFT;
            Vec2::new(angle.cos() * speed, angle.sin() * speed * 0.3 - lift)
        })
        .collect()
}

/// Evenly spaced with a little angular jitter, and fast.
pub fn peony<R: Rng + ?Sized>(config: &FireworkConfig, rng: &mut R) -> Vec<Vec2> {
    (0..config.amount)
        .map(|index| {
            let angle = even_angle(index, config.amount) + rng.gen::<f32>() * PEONY_JITTER;
            let speed = config.speed * rng.gen_range(0.8_f32..1.2);
            Vec2::from_angle(angle) * speed
        })
        .collect()
}

/// Clusters of particles around each point of a star, the first point facing straight up.
///
/// Each point gets `amount / 5` particles, so up to 4 particles can be lost to the division.
pub fn star<R: Rng + ?Sized>(config: &FireworkConfig, rng: &mut R) -> Vec<Vec2> {
    let per_point = config.amount / STAR_POINTS;
    let mut velocities = Vec::with_capacity(per_point * STAR_POINTS);

    for point in 0..STAR_POINTS {
        let angle = even_angle(point, STAR_POINTS) - FRAC_PI_2;
        for _ in 0..per_point {
            let spread = rng.gen_range(-STAR_SPREAD..STAR_SPREAD);
            let speed = config.speed * rng.gen_range(0.6_f32..0.9);
            velocities.push(Vec2::from_angle(angle + spread) * speed);
        }
    }

    velocities
}

/// Evenly spaced, squashed vertically and thrown upwards so that it fans out like palm fronds.
pub fn palm<R: Rng + ?Sized>(config: &FireworkConfig, rng: &mut R) -> Vec<Vec2> {
    (0..config.amount)
        .map(|index| {
            let angle = even_angle(index, config.amount);
            let speed = config.speed * rng.gen_range(0.4_f32..0.8);
            Vec2::new(
                angle.cos() * speed,
                angle.sin() * speed * 0.5 - config.speed * 0.3,
            )
        })
        .collect()
}

/// The angle of the `index`th of `count` evenly spaced directions.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Particle counts are nowhere near f32's precision limit"
)]
fn even_angle(index: usize, count: usize) -> f32 {
    TAU * index as f32 / count as f32
}

#[cfg(test)]
#[expect(
    clippy::default_numeric_fallback,
    clippy::indexing_slicing,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;
    use crate::tests::helpers::seeded_rng;

    fn config(pattern: Pattern, amount: usize) -> FireworkConfig {
        FireworkConfig::builder()
            .pattern(pattern)
            .amount(amount)
            .speed(10.0)
            .build()
    }

    #[test]
    fn chrysanthemum_fills_a_disk() {
        let mut rng = seeded_rng();
        for amount in [1, 10, 333] {
            let config = config(Pattern::Chrysanthemum, amount);
            let velocities = chrysanthemum(&config, &mut rng);
            assert_eq!(velocities.len(), amount);
            for velocity in velocities {
                assert!(velocity.length_squared() <= 25.0);
            }
        }
    }

    #[test]
    fn evenly_spaced_patterns_make_exactly_amount() {
        let mut rng = seeded_rng();
        for pattern in [Pattern::Willow, Pattern::Peony, Pattern::Palm] {
            for amount in [1, 7, 100] {
                let particles = generate(pattern, Vec2::ZERO, &config(pattern, amount), &mut rng);
                assert_eq!(particles.len(), amount, "{pattern:?}");
            }
        }
    }

    #[test]
    fn star_loses_the_remainder() {
        let mut rng = seeded_rng();
        for (amount, expected) in [(4, 0), (5, 5), (12, 10), (100, 100)] {
            let velocities = star(&config(Pattern::Star, amount), &mut rng);
            assert_eq!(velocities.len(), expected);
        }
    }

    #[test]
    fn star_first_point_faces_up() {
        let mut rng = seeded_rng();
        let velocities = star(&config(Pattern::Star, 50), &mut rng);
        for velocity in &velocities[0..10] {
            assert!(velocity.y < 0.0);
            assert!(velocity.x.abs() < velocity.y.abs());
            let speed = velocity.length();
            assert!((5.99..=9.01).contains(&speed), "{speed}");
        }
    }

    #[test]
    fn peony_speeds() {
        let mut rng = seeded_rng();
        for velocity in peony(&config(Pattern::Peony, 200), &mut rng) {
            let speed = velocity.length();
            assert!((7.99..=12.01).contains(&speed), "{speed}");
        }
    }

    #[test]
    fn willow_is_flattened() {
        let mut rng = seeded_rng();
        let velocities = willow(&config(Pattern::Willow, 200), &mut rng);
        let widest = velocities.iter().map(|velocity| velocity.x.abs()).fold(0.0, f32::max);
        let tallest = velocities.iter().map(|velocity| velocity.y.abs()).fold(0.0, f32::max);
        assert!(widest > tallest);
        assert!(tallest <= 10.0 * 0.8 * 0.3 + WILLOW_LIFT);
    }

    #[test]
    fn palm_rises() {
        let mut rng = seeded_rng();
        let velocities = palm(&config(Pattern::Palm, 200), &mut rng);
        let mean = velocities.iter().map(|velocity| velocity.y).sum::<f32>() / 200.0;
        assert!(mean < -2.0);
    }

    #[test]
    fn particles_start_at_the_origin() {
        let mut rng = seeded_rng();
        let origin = Vec2::new(12.0, 34.0);
        for pattern in Pattern::ALL {
            for particle in generate(pattern, origin, &config(pattern, 20), &mut rng) {
                assert_eq!(particle.position, origin);
            }
        }
    }
}
