//! The pre-rendered image that gets stamped at every particle's position.

use crate::colour::{self, Colour, TRANSPARENT, WHITE};

/// Where along the gradient the white core ends.
const WHITE_CORE_STOP: f32 = 0.1;

/// Where along the gradient the firework's colour is at its purest.
const COLOUR_STOP: f32 = 0.3;

/// A square RGBA image of a glowing particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    /// Length of each side in pixels.
    side: usize,
    /// Row-major pixels.
    pixels: Vec<Colour>,
}

impl Sprite {
    /// Render a radial gradient: opaque white in the centre, through `colour`, to transparent.
    ///
    /// The image is `2 * radius` pixels square and clipped to a circle of `radius`. The gradient
    /// itself extends to twice the radius, so the clipped edge is still partly visible.
    #[must_use]
    pub fn radial_gradient(radius: f32, colour: Colour) -> Self {
        #[expect(
            clippy::as_conversions,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "The radius has already been validated as positive"
        )]
        let side = ((radius * 2.0).ceil() as usize).max(1);
        let centre = radius;
        let gradient_radius = radius * 2.0;

        let mut pixels = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                #[expect(
                    clippy::as_conversions,
                    clippy::cast_precision_loss,
                    reason = "Sprites are tiny"
                )]
                let (x_f32, y_f32) = (x as f32 + 0.5, y as f32 + 0.5);
                let distance = (x_f32 - centre).hypot(y_f32 - centre);
                let pixel = if distance > radius {
                    TRANSPARENT
                } else {
                    Self::gradient_at(distance / gradient_radius, colour)
                };
                pixels.push(pixel);
            }
        }

        tracing::trace!("Rendered {side}x{side} sprite for colour {colour:?}");
        Self { side, pixels }
    }

    /// The colour of the gradient at `offset`, where `0.0` is the centre and `1.0` the edge.
    fn gradient_at(offset: f32, colour: Colour) -> Colour {
        if offset <= WHITE_CORE_STOP {
            return WHITE;
        }
        if offset <= COLOUR_STOP {
            let amount = (offset - WHITE_CORE_STOP) / (COLOUR_STOP - WHITE_CORE_STOP);
            return colour::mix(WHITE, colour, amount);
        }
        let amount = (offset - COLOUR_STOP) / (1.0 - COLOUR_STOP);
        colour::mix(colour, TRANSPARENT, amount)
    }

    /// Length of each side in pixels.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Get the pixel at the given coordinate.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Colour> {
        if x >= self.side {
            return None;
        }
        self.pixels.get(y * self.side + x).copied()
    }

    /// Nearest-neighbour sample, `u` and `v` being `0.0..1.0` across the image.
    #[must_use]
    pub fn sample(&self, u: f32, v: f32) -> Colour {
        #[expect(
            clippy::as_conversions,
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "Values are clamped to the image"
        )]
        let to_index = |fraction: f32| -> usize {
            let max = self.side.saturating_sub(1);
            ((fraction * self.side as f32) as usize).min(max)
        };
        self.pixel(to_index(u.max(0.0)), to_index(v.max(0.0)))
            .unwrap_or(TRANSPARENT)
    }
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
    fn size_follows_radius() {
        assert_eq!(Sprite::radial_gradient(5.0, colour::RED).side(), 10);
        assert_eq!(Sprite::radial_gradient(0.2, colour::RED).side(), 1);
    }

    #[test]
    fn white_centre_transparent_corners() {
        let sprite = Sprite::radial_gradient(10.0, colour::RED);
        assert_eq!(sprite.pixel(9, 9).unwrap(), WHITE);
        assert_eq!(sprite.pixel(0, 0).unwrap(), TRANSPARENT);
        assert_eq!(sprite.pixel(20, 0), None);
    }

    #[test]
    fn colour_fades_towards_the_edge() {
        let sprite = Sprite::radial_gradient(10.0, colour::RED);
        let middle = sprite.pixel(15, 10).unwrap();
        let edge = sprite.pixel(19, 10).unwrap();
        assert!(middle.3 > edge.3);
        assert!(edge.3 > 0.0);
        assert!(middle.1 < 1.0);
    }

    #[test]
    fn sampling_is_clamped() {
        let sprite = Sprite::radial_gradient(3.0, colour::RED);
        assert_eq!(sprite.sample(0.5, 0.5), sprite.pixel(3, 3).unwrap());
        assert_eq!(sprite.sample(2.0, 2.0), sprite.pixel(5, 5).unwrap());
    }
}
