//! Persistent drawing surface and the per-frame composition that gets
//! written to the terminal.
//!
//! The canvas keeps floating point sub-pixels so the translucent fade can
//! leave long trails. Drawing calls take logical coordinates and are scaled
//! down to the `cols x rows*2` half-block grid.

use std::io::Write;

pub type Color = (u8, u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Normal alpha compositing
    SourceOver,
    /// Additive, saturating at white
    Lighter,
}

/// Logical extents of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Logical pixels per terminal sub-pixel
    pub scale: f32,
}

impl Viewport {
    pub fn from_terminal(cols: u16, rows: u16, scale: f32) -> Self {
        Self {
            width: cols as f32 * scale,
            height: rows as f32 * 2.0 * scale,
            scale,
        }
    }

    /// Logical x at the centre of a terminal column.
    pub fn column_to_x(&self, column: u16) -> f32 {
        (column as f32 + 0.5) * self.scale
    }
}

pub struct Canvas {
    width: usize,
    height: usize,
    scale: f32,
    background: [f32; 3],
    pixels: Vec<[f32; 3]>,
}

impl Canvas {
    /// `width` and `height` are in sub-pixels.
    pub fn new(width: usize, height: usize, scale: f32, background: Color) -> Self {
        let background = [background.0 as f32, background.1 as f32, background.2 as f32];
        Self {
            width,
            height,
            scale,
            background,
            pixels: vec![background; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(to_color(self.pixels[y * self.width + x]))
        } else {
            None
        }
    }

    /// Resizing wipes the surface, like assigning a new size to a browser
    /// canvas.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, self.background);
    }

    /// Paints the background colour over everything at `alpha`.
    pub fn fade(&mut self, alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        let bg = self.background;
        for px in &mut self.pixels {
            for c in 0..3 {
                px[c] = px[c] * (1.0 - a) + bg[c] * a;
            }
        }
    }

    /// Fills a logical rectangle. Any rectangle that touches the surface
    /// covers at least one sub-pixel.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, alpha: f32, blend: Blend) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(x, y, w, h) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color, a, blend);
            }
        }
    }

    /// Fills a logical rectangle with a radial gradient centred at
    /// `(cx, cy)` that is opaque in the middle and transparent at `radius`.
    pub fn fill_radial(&mut self, cx: f32, cy: f32, half_extent: f32, radius: f32, color: Color) {
        let side = half_extent * 2.0;
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(cx - half_extent, cy - half_extent, side, side) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                // Nearest point of the sub-pixel to the centre, so the pixel
                // holding the centre is fully opaque.
                let sx = cx.clamp(px as f32 * self.scale, (px + 1) as f32 * self.scale);
                let sy = cy.clamp(py as f32 * self.scale, (py + 1) as f32 * self.scale);
                let d = ((sx - cx).powi(2) + (sy - cy).powi(2)).sqrt();
                let a = (1.0 - d / radius.max(f32::EPSILON)).max(0.0);
                self.blend_pixel(px, py, color, a, Blend::SourceOver);
            }
        }
    }

    /// Snapshot of the surface ready for overlays.
    pub fn compose(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            scale: self.scale,
            pixels: self.pixels.iter().copied().map(to_color).collect(),
            text: vec![None; self.width * self.height.div_ceil(2)],
        }
    }

    fn pixel_bounds(&self, x: f32, y: f32, w: f32, h: f32) -> Option<(usize, usize, usize, usize)> {
        let fx0 = (x / self.scale).floor();
        let fy0 = (y / self.scale).floor();
        let fx1 = ((x + w) / self.scale).ceil().max(fx0 + 1.0);
        let fy1 = ((y + h) / self.scale).ceil().max(fy0 + 1.0);

        let x0 = fx0.max(0.0);
        let y0 = fy0.max(0.0);
        let x1 = fx1.min(self.width as f32);
        let y1 = fy1.min(self.height as f32);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    fn blend_pixel(&mut self, x: usize, y: usize, color: Color, alpha: f32, blend: Blend) {
        let px = &mut self.pixels[y * self.width + x];
        let src = [color.0 as f32, color.1 as f32, color.2 as f32];
        for c in 0..3 {
            px[c] = match blend {
                Blend::SourceOver => px[c] * (1.0 - alpha) + src[c] * alpha,
                Blend::Lighter => (px[c] + src[c] * alpha).min(255.0),
            };
        }
    }
}

fn to_color(px: [f32; 3]) -> Color {
    (
        px[0].round().clamp(0.0, 255.0) as u8,
        px[1].round().clamp(0.0, 255.0) as u8,
        px[2].round().clamp(0.0, 255.0) as u8,
    )
}

/// One composed frame: canvas pixels plus transient overlays.
pub struct Frame {
    width: usize,
    height: usize,
    scale: f32,
    pixels: Vec<Color>,
    /// One slot per terminal cell
    text: Vec<Option<(char, Color)>>,
}

impl Frame {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> usize {
        self.height.div_ceil(2)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn text_at(&self, col: usize, row: usize) -> Option<char> {
        if col < self.width && row < self.rows() {
            self.text[row * self.width + col].map(|(ch, _)| ch)
        } else {
            None
        }
    }

    /// Draws a sprite with its top-left corner at logical `(x, y)`. Each
    /// sprite row is a string; `.` is transparent and other characters are
    /// looked up in `palette`.
    pub fn blit_sprite(&mut self, x: f32, y: f32, rows: &[&str], palette: impl Fn(char) -> Option<Color>) {
        let left = (x / self.scale).floor() as i64;
        let top = (y / self.scale).floor() as i64;
        for (dy, row) in rows.iter().enumerate() {
            for (dx, ch) in row.chars().enumerate() {
                let Some(color) = palette(ch) else { continue };
                let px = left + dx as i64;
                let py = top + dy as i64;
                if px >= 0 && py >= 0 && (px as usize) < self.width && (py as usize) < self.height {
                    self.pixels[py as usize * self.width + px as usize] = color;
                }
            }
        }
    }

    /// Writes text centred on terminal row `row`. Characters that fall off
    /// either edge are dropped.
    pub fn draw_text(&mut self, row: usize, text: &str, color: Color) {
        if row >= self.rows() {
            return;
        }
        let len = text.chars().count() as i64;
        let start = (self.width as i64 - len) / 2;
        for (i, ch) in text.chars().enumerate() {
            let col = start + i as i64;
            if col >= 0 && (col as usize) < self.width {
                self.text[row * self.width + col as usize] = Some((ch, color));
            }
        }
    }

    /// Writes the frame as half-block rows, emitting colour codes only when
    /// they change.
    pub fn present<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(b"\x1b[H")?;

        for y in (0..self.height).step_by(2) {
            let row = y / 2;
            // nothing emitted yet after the reset that ends each row
            let mut prev_bg: Option<Color> = None;
            let mut prev_fg: Option<Color> = None;

            for x in 0..self.width {
                let top = self.pixels[y * self.width + x];
                let bot = if y + 1 < self.height {
                    self.pixels[(y + 1) * self.width + x]
                } else {
                    top
                };

                // text cells put the glyph in the foreground over the averaged pixels
                let text = self.text[row * self.width + x];
                let (bg, fg) = match text {
                    Some((_, fg)) => (average(top, bot), fg),
                    None => (top, bot),
                };

                if prev_bg != Some(bg) {
                    write!(out, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
                    prev_bg = Some(bg);
                }
                if prev_fg != Some(fg) {
                    write!(out, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
                    prev_fg = Some(fg);
                }

                match text {
                    Some((ch, _)) => write!(out, "{ch}")?,
                    None => out.write_all("▄".as_bytes())?,
                }
            }
            out.write_all(b"\x1b[0m")?;
            if y + 2 < self.height {
                out.write_all(b"\r\n")?;
            }
        }
        Ok(())
    }
}

fn average(a: Color, b: Color) -> Color {
    (
        ((a.0 as u16 + b.0 as u16) / 2) as u8,
        ((a.1 as u16 + b.1 as u16) / 2) as u8,
        ((a.2 as u16 + b.2 as u16) / 2) as u8,
    )
}
