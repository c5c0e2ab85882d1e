//! Triangle rasterization and the color buffer it writes into.

use std::fmt;
use std::path::Path;

use crate::error::Error;
use crate::types::{Color, Viewport};

/// Convert a color with `[0, 1]` channels to 8-bit RGBA.
///
/// Channels are clamped and rounded to the nearest level, as GL does for
/// normalized fixed-point buffers, so `0.5` becomes `128`.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize(color: Color) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// An 8-bit RGBA framebuffer.
///
/// Pixels are stored row by row from the top of the surface down, the order
/// image files use. Window coordinates count rows from the bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct ColorBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl ColorBuffer {
    /// A `width` × `height` buffer of transparent black.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, top row first.
    #[must_use]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Pixel in column `x` of `row`, counting rows from the top.
    #[must_use]
    pub fn pixel(&self, x: u32, row: u32) -> Option<[u8; 4]> {
        self.index(x, row).map(|i| self.pixels[i])
    }

    /// Pixel at window coordinates `(x, y)`, counting `y` from the bottom.
    #[must_use]
    pub fn pixel_at_window(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let row = self.height.checked_sub(y)?.checked_sub(1)?;
        self.pixel(x, row)
    }

    pub(crate) fn fill(&mut self, rgba: [u8; 4]) {
        self.pixels.fill(rgba);
    }

    pub(crate) fn put_window(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let Some(row) = self.height.checked_sub(y).and_then(|r| r.checked_sub(1)) else {
            return;
        };
        if let Some(i) = self.index(x, row) {
            self.pixels[i] = rgba;
        }
    }

    fn index(&self, x: u32, row: u32) -> Option<usize> {
        (x < self.width && row < self.height)
            .then(|| row as usize * self.width as usize + x as usize)
    }

    /// Copy the pixels into an [`image::RgbaImage`].
    #[must_use]
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, row| {
            image::Rgba(self.pixels[row as usize * self.width as usize + x as usize])
        })
    }

    /// Encode the buffer as a PNG file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the file cannot be written.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

impl fmt::Debug for ColorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// A pixel covered by a triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Fragment {
    /// Window column.
    pub x: u32,
    /// Window row, from the bottom.
    pub y: u32,
    /// Perspective-correct barycentric weights of the three vertices.
    pub weights: [f32; 3],
}

/// Signed doubled area of `(a, b, c)`; positive when counter-clockwise.
fn edge(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Top-left fill rule for a counter-clockwise triangle in y-up coordinates:
/// a top edge runs right to left horizontally, a left edge runs downwards.
#[allow(clippy::float_cmp)]
fn is_top_left(a: [f64; 2], b: [f64; 2]) -> bool {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    (dy == 0.0 && dx < 0.0) || dy < 0.0
}

/// Rasterize one triangle given in clip coordinates.
///
/// `shade` runs once per covered pixel inside both the viewport and the
/// `width` × `height` target. Pixels whose centers lie exactly on an edge
/// shared by two triangles go to exactly one of them. Triangles with a vertex
/// at or behind the eye (`w <= 0`) and degenerate triangles produce nothing.
/// Fragments outside the `[-1, 1]` depth range are dropped.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::float_cmp,
    clippy::similar_names
)]
pub(crate) fn rasterize_triangle<E>(
    viewport: Viewport,
    (width, height): (u32, u32),
    clip: [[f32; 4]; 3],
    mut shade: impl FnMut(&Fragment) -> Result<(), E>,
) -> Result<(), E> {
    if clip.iter().any(|v| !(v[3] > 0.0)) {
        log::trace!("skipping triangle with w <= 0: {clip:?}");
        return Ok(());
    }

    let mut window = [[0.0f64; 2]; 3];
    let mut depth = [0.0f64; 3];
    let mut inv_w = [0.0f64; 3];
    for (i, v) in clip.iter().enumerate() {
        let w = f64::from(v[3]);
        let [wx, wy] = viewport.ndc_to_window([v[0] / v[3], v[1] / v[3]]);
        window[i] = [f64::from(wx), f64::from(wy)];
        depth[i] = f64::from(v[2]) / w;
        inv_w[i] = 1.0 / w;
    }

    let area = edge(window[0], window[1], window[2]);
    if area == 0.0 || !area.is_finite() {
        return Ok(());
    }
    // Walk the vertices counter-clockwise so one fill rule covers both windings.
    let order = if area > 0.0 { [0, 1, 2] } else { [0, 2, 1] };
    let q = order.map(|i| window[i]);
    let area = area.abs();

    let left = f64::from(viewport.x).max(0.0);
    let bottom = f64::from(viewport.y).max(0.0);
    let right = (f64::from(viewport.x) + f64::from(viewport.width)).min(f64::from(width));
    let top = (f64::from(viewport.y) + f64::from(viewport.height)).min(f64::from(height));

    let min_x = q.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min).floor().max(left);
    let max_x = q.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max).ceil().min(right);
    let min_y = q.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min).floor().max(bottom);
    let max_y = q.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max).ceil().min(top);
    if min_x >= max_x || min_y >= max_y {
        return Ok(());
    }

    let edges = [(q[1], q[2]), (q[2], q[0]), (q[0], q[1])];
    let top_left = edges.map(|(a, b)| is_top_left(a, b));

    for py in (min_y as u32)..(max_y as u32) {
        for px in (min_x as u32)..(max_x as u32) {
            let center = [f64::from(px) + 0.5, f64::from(py) + 0.5];
            let mut b = [0.0f64; 3];
            let mut inside = true;
            for (k, &(a, c)) in edges.iter().enumerate() {
                let e = edge(a, c, center);
                if e < 0.0 || (e == 0.0 && !top_left[k]) {
                    inside = false;
                    break;
                }
                b[k] = e / area;
            }
            if !inside {
                continue;
            }

            // Back to the caller's vertex order.
            let mut screen = [0.0f64; 3];
            for (k, &i) in order.iter().enumerate() {
                screen[i] = b[k];
            }

            let z: f64 = (0..3).map(|i| screen[i] * depth[i]).sum();
            if !(-1.0..=1.0).contains(&z) {
                continue;
            }

            let one_over_w: f64 = (0..3).map(|i| screen[i] * inv_w[i]).sum();
            let weights = [0, 1, 2].map(|i| (screen[i] * inv_w[i] / one_over_w) as f32);

            shade(&Fragment {
                x: px,
                y: py,
                weights,
            })?;
        }
    }
    Ok(())
}
