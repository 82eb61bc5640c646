//! An RGB pixel canvas that fireworks are drawn onto, and its conversion into terminal cells.
//!
//! Every terminal cell holds 2 "pixels" using the upper half block ("▀"): the upper pixel is the
//! cell's foreground colour and the lower pixel its background colour.

use color_eyre::eyre::{ContextCompat as _, Result};
use termwiz::surface::Change as TermwizChange;
use termwiz::surface::Position as TermwizPosition;

use hanabi_core::colour::Colour;
use hanabi_core::Sprite;

/// An opaque RGB colour.
type Pixel = (f32, f32, f32);

/// The upper half block, used to render 2 pixels in a single cell.
const UPPER_HALF_BLOCK: &str = "▀";

/// A canvas that supports translucent fills and alpha-blended sprites.
#[derive(Clone, Debug)]
pub struct Canvas {
    /// The width in pixels, which is also the number of terminal columns.
    width: usize,
    /// The height in pixels, which is twice the number of terminal rows.
    height: usize,
    /// Row-major pixels.
    pixels: Vec<Pixel>,
    /// The current global alpha, as set by the scene.
    global_alpha: f32,
}

impl Canvas {
    /// A black canvas big enough to cover a terminal of the given size.
    #[must_use]
    pub fn for_terminal(columns: usize, rows: usize) -> Self {
        Self::new(columns, rows * 2)
    }

    /// A black canvas.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![(0.0, 0.0, 0.0); width * height],
            global_alpha: 1.0,
        }
    }

    /// Change the size of the canvas. Everything currently drawn is lost.
    pub fn resize(&mut self, width: usize, height: usize) {
        tracing::debug!("Resizing canvas to {width}x{height}");
        *self = Self {
            global_alpha: self.global_alpha,
            ..Self::new(width, height)
        };
    }

    /// Get a pixel.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// "Source over" blending of a single pixel.
    fn blend(&mut self, x: usize, y: usize, colour: Colour) {
        let alpha = (colour.3 * self.global_alpha).clamp(0.0, 1.0);
        if alpha <= 0.0 || x >= self.width {
            return;
        }
        if let Some(pixel) = self.pixels.get_mut(y * self.width + x) {
            let keep = 1.0 - alpha;
            *pixel = (
                colour.0 * alpha + pixel.0 * keep,
                colour.1 * alpha + pixel.1 * keep,
                colour.2 * alpha + pixel.2 * keep,
            );
        }
    }

    /// Convert a floating point pixel range into the whole pixels it covers, clipped to `limit`.
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "Values are clamped to the canvas first"
    )]
    fn covered(start: f32, size: f32, limit: usize) -> std::ops::Range<usize> {
        let limit_f32 = limit as f32;
        let first = start.floor().clamp(0.0, limit_f32) as usize;
        let last = (start + size).ceil().clamp(0.0, limit_f32) as usize;
        first..last
    }

    /// Convert the canvas into a Termwiz surface, ready to be drawn to the user's terminal.
    pub fn to_termwiz_surface(&self) -> Result<termwiz::surface::Surface> {
        let rows = self.height.div_ceil(2);
        let mut surface = termwiz::surface::Surface::new(self.width, rows);
        for row in 0..rows {
            surface.add_change(TermwizChange::CursorPosition {
                x: TermwizPosition::Absolute(0),
                y: TermwizPosition::Absolute(row),
            });
            for col in 0..self.width {
                let upper = self
                    .pixel(col, row * 2)
                    .context(format!("No upper pixel at {col}x{row}"))?;
                let lower = self.pixel(col, row * 2 + 1).unwrap_or((0.0, 0.0, 0.0));
                surface.add_changes(vec![
                    Self::make_fg_colour(upper),
                    Self::make_bg_colour(lower),
                ]);
                surface.add_change(UPPER_HALF_BLOCK);
            }
        }

        Ok(surface)
    }

    /// Make a Termwiz colour attribute
    #[must_use]
    pub const fn make_colour_attribute(pixel: Pixel) -> termwiz::color::ColorAttribute {
        termwiz::color::ColorAttribute::TrueColorWithDefaultFallback(termwiz::color::SrgbaTuple(
            pixel.0, pixel.1, pixel.2, 1.0,
        ))
    }

    /// Make a Termwiz foreground colour
    #[must_use]
    pub const fn make_fg_colour(pixel: Pixel) -> TermwizChange {
        let colour_attribute = Self::make_colour_attribute(pixel);
        TermwizChange::Attribute(termwiz::cell::AttributeChange::Foreground(colour_attribute))
    }

    /// Make a Termwiz background colour
    #[must_use]
    pub const fn make_bg_colour(pixel: Pixel) -> TermwizChange {
        let colour_attribute = Self::make_colour_attribute(pixel);
        TermwizChange::Attribute(termwiz::cell::AttributeChange::Background(colour_attribute))
    }
}

impl hanabi_core::Surface for Canvas {
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Terminals are nowhere near f32's precision limit"
    )]
    fn dimensions(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha;
    }

    fn fill(&mut self, colour: Colour) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.blend(x, y, colour);
            }
        }
    }

    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32, diameter: f32) {
        if diameter <= 0.0 {
            return;
        }

        for pixel_y in Self::covered(y, diameter, self.height) {
            for pixel_x in Self::covered(x, diameter, self.width) {
                #[expect(
                    clippy::as_conversions,
                    clippy::cast_precision_loss,
                    reason = "Terminals are nowhere near f32's precision limit"
                )]
                let (u, v) = (
                    (pixel_x as f32 + 0.5 - x) / diameter,
                    (pixel_y as f32 + 0.5 - y) / diameter,
                );
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                self.blend(pixel_x, pixel_y, sprite.sample(u, v));
            }
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    reason = "Tests aren't so strict"
)]
mod test {
    use hanabi_core::colour::{BLACK, WHITE};
    use hanabi_core::Surface as _;

    use super::*;

    #[test]
    fn translucent_fills_blend() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill(WHITE);
        assert_eq!(canvas.pixel(1, 1).unwrap(), (1.0, 1.0, 1.0));

        canvas.set_global_alpha(0.5);
        canvas.fill(BLACK);
        assert_eq!(canvas.pixel(0, 0).unwrap(), (0.5, 0.5, 0.5));

        canvas.set_global_alpha(1.0);
        canvas.fill((0.0, 0.0, 0.0, 0.5));
        assert_eq!(canvas.pixel(0, 0).unwrap(), (0.25, 0.25, 0.25));
    }

    #[test]
    fn sprites_are_clipped_to_the_canvas() {
        let mut canvas = Canvas::new(4, 4);
        let sprite = Sprite::radial_gradient(2.0, hanabi_core::colour::RED);
        canvas.draw_sprite(&sprite, 2.0, 2.0, 4.0);
        canvas.draw_sprite(&sprite, -10.0, -10.0, 4.0);
        canvas.draw_sprite(&sprite, 100.0, 100.0, 4.0);

        let centre = canvas.pixel(3, 3).unwrap();
        assert_eq!(centre.0, 1.0);
        assert!(centre.1 < 1.0);
        assert_eq!(canvas.pixel(0, 0).unwrap(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn zero_sized_sprites_draw_nothing() {
        let mut canvas = Canvas::new(4, 4);
        let sprite = Sprite::radial_gradient(2.0, WHITE);
        canvas.draw_sprite(&sprite, 1.0, 1.0, 0.0);
        assert!(canvas.pixels.iter().all(|pixel| *pixel == (0.0, 0.0, 0.0)));
    }

    #[test]
    fn terminal_dimensions() {
        let canvas = Canvas::for_terminal(10, 5);
        assert_eq!(canvas.dimensions(), (10.0, 10.0));
    }

    #[test]
    fn converts_to_half_blocks() {
        let mut canvas = Canvas::new(1, 2);
        canvas.blend(0, 0, WHITE);
        let mut surface = canvas.to_termwiz_surface().unwrap();
        let cells = surface.screen_cells();
        let cell = &cells[0][0];
        assert_eq!(cell.str(), UPPER_HALF_BLOCK);
        assert_eq!(
            cell.attrs().foreground(),
            Canvas::make_colour_attribute((1.0, 1.0, 1.0))
        );
        assert_eq!(
            cell.attrs().background(),
            Canvas::make_colour_attribute((0.0, 0.0, 0.0))
        );
    }
}
