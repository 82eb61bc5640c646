//! Test helpers

use rand::SeedableRng as _;

use crate::colour::Colour;
use crate::sprite::Sprite;
use crate::surface::Surface;

/// The seed used by all tests that need randomness, so that failures are reproducible.
pub const TEST_SEED: u64 = 0x00C0_FFEE;

/// A deterministic source of randomness.
#[inline]
#[must_use]
pub fn seeded_rng() -> rand::rngs::StdRng {
    rand::rngs::StdRng::seed_from_u64(TEST_SEED)
}

/// Everything that can be done to a surface.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum DrawCall {
    /// `Surface::set_global_alpha()`
    GlobalAlpha(f32),
    /// `Surface::fill()`
    Fill(Colour),
    /// `Surface::draw_sprite()`
    Sprite {
        /// Left edge
        x: f32,
        /// Top edge
        y: f32,
        /// Drawn size
        diameter: f32,
    },
}

/// A surface that doesn't draw anything, it just remembers what it was asked to do.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
    /// Every call made, oldest first.
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    /// Instantiate
    #[inline]
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    /// The number of sprites drawn.
    #[inline]
    #[must_use]
    pub fn sprite_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Sprite { .. }))
            .count()
    }

    /// All the colours the surface has been filled with.
    #[inline]
    #[must_use]
    pub fn fills(&self) -> Vec<Colour> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Fill(colour) => Some(*colour),
                DrawCall::GlobalAlpha(_) | DrawCall::Sprite { .. } => None,
            })
            .collect()
    }

    /// The most recent global alpha.
    #[inline]
    #[must_use]
    pub fn last_alpha(&self) -> Option<f32> {
        self.calls.iter().rev().find_map(|call| match call {
            DrawCall::GlobalAlpha(alpha) => Some(*alpha),
            DrawCall::Fill(_) | DrawCall::Sprite { .. } => None,
        })
    }

    /// Forget all the recorded calls.
    #[inline]
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Surface for RecordingSurface {
    #[inline]
    fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    #[inline]
    fn set_global_alpha(&mut self, alpha: f32) {
        self.calls.push(DrawCall::GlobalAlpha(alpha));
    }

    #[inline]
    fn fill(&mut self, colour: Colour) {
        self.calls.push(DrawCall::Fill(colour));
    }

    #[inline]
    fn draw_sprite(&mut self, _sprite: &Sprite, x: f32, y: f32, diameter: f32) {
        self.calls.push(DrawCall::Sprite { x, y, diameter });
    }
}
