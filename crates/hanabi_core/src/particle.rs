//! The point masses that make up a firework.

use glam::Vec2;

/// A single burning fragment of an exploded firework.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position in surface pixels. `[0, 0]` is the top-left.
    pub position: Vec2,
    /// Pixels per frame. Positive `y` is downwards.
    pub velocity: Vec2,
}

impl Particle {
    /// Instantiate
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Move by one frame's worth of velocity.
    pub fn step(&mut self) {
        self.position += self.velocity;
    }
}

/// The single ember that rises from the ground before the firework explodes.
///
/// It has exactly the same shape as a [`Particle`], but it's integrated with a different
/// motion model, so it gets its own type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaunchParticle(pub Particle);

impl LaunchParticle {
    /// Instantiate
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2) -> Self {
        Self(Particle::new(position, velocity))
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.0.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.0.velocity
    }
}

impl Default for LaunchParticle {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO)
    }
}
