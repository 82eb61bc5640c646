//! The drawing target that a scene renders onto.
//!
//! The library doesn't care how pixels actually reach a screen, it just needs somewhere that can
//! stamp sprites and be washed over with a translucent colour.

use crate::colour::Colour;
use crate::sprite::Sprite;

/// A fixed-size 2D drawing target.
pub trait Surface {
    /// Width and height in pixels.
    fn dimensions(&self) -> (f32, f32);

    /// Set the transparency used by all subsequent draw calls.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Fill the entire surface with `colour`, respecting the current global alpha.
    fn fill(&mut self, colour: Colour);

    /// Draw `sprite` with its top-left corner at `(x, y)`, scaled to `diameter` pixels square.
    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32, diameter: f32);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn dimensions(&self) -> (f32, f32) {
        (**self).dimensions()
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        (**self).set_global_alpha(alpha);
    }

    fn fill(&mut self, colour: Colour) {
        (**self).fill(colour);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32, diameter: f32) {
        (**self).draw_sprite(sprite, x, y, diameter);
    }
}
