//! Plain data shared by the pipeline stages and the context implementations.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// A clip-space vertex position, laid out exactly as it is uploaded.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// `x, y` in normalized device coordinates.
    pub position: [f32; 2],
}

impl Vertex {
    /// Build a vertex from its two coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { position: [x, y] }
    }
}

/// Pipeline stage a shader object is compiled for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Runs once per vertex and produces a clip-space position.
    Vertex,
    /// Runs once per covered pixel and produces a color.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// Describes how a vertex buffer's bytes feed one vertex shader input.
///
/// Mirrors the arguments of `vertexAttribPointer`; components are always
/// 32-bit floats.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttributeBinding {
    /// Attribute slot, as reported by the linked program.
    pub location: u32,
    /// Components per vertex, `1..=4`.
    pub size: u8,
    /// Passed through to the driver; has no effect on float data.
    pub normalize: bool,
    /// Bytes between consecutive vertices; `0` means tightly packed.
    pub stride: u32,
    /// Byte offset of the first component in the buffer.
    pub offset: u32,
}

impl AttributeBinding {
    /// Tightly packed `vec2` of floats starting at byte 0.
    #[must_use]
    pub const fn float2(location: u32) -> Self {
        Self {
            location,
            size: 2,
            normalize: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Distance in bytes between two consecutive vertices.
    #[must_use]
    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 {
            usize::from(self.size) * 4
        } else {
            self.stride as usize
        }
    }
}

/// The rectangle that normalized device coordinates are mapped onto.
///
/// Window coordinates have their origin in the bottom-left corner with `y`
/// pointing up, as in OpenGL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: i32,
    /// Bottom edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// A viewport covering a whole `width` × `height` surface.
    #[must_use]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Map a point in normalized device coordinates to window coordinates.
    ///
    /// `[-1, 1]` on each axis maps linearly onto `[x, x + width]` and
    /// `[y, y + height]`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn ndc_to_window(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        let half_w = self.width as f32 * 0.5;
        let half_h = self.height as f32 * 0.5;
        [
            (x + 1.0) * half_w + self.x as f32,
            (y + 1.0) * half_h + self.y as f32,
        ]
    }
}

/// An RGBA color with channels in `[0, 1]`.
pub type Color = [f32; 4];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(actual: [f32; 2], expected: [f32; 2]) {
        assert!(
            (actual[0] - expected[0]).abs() < 1e-4 && (actual[1] - expected[1]).abs() < 1e-4,
            "expected {expected:?}, got {actual:?}",
        );
    }

    #[test]
    fn ndc_origin_maps_to_center() {
        let viewport = Viewport::full(400, 300);
        assert_point_eq(viewport.ndc_to_window([0.0, 0.0]), [200.0, 150.0]);
    }

    #[test]
    fn ndc_up_maps_above_center() {
        let viewport = Viewport::full(400, 300);
        assert_point_eq(viewport.ndc_to_window([0.0, 0.5]), [200.0, 225.0]);
    }

    #[test]
    fn ndc_right_maps_right_of_center() {
        let viewport = Viewport::full(400, 300);
        assert_point_eq(viewport.ndc_to_window([0.7, 0.0]), [340.0, 150.0]);
    }

    #[test]
    fn ndc_corners_map_to_viewport_edges() {
        let viewport = Viewport {
            x: 10,
            y: 20,
            width: 100,
            height: 50,
        };
        assert_point_eq(viewport.ndc_to_window([-1.0, -1.0]), [10.0, 20.0]);
        assert_point_eq(viewport.ndc_to_window([1.0, 1.0]), [110.0, 70.0]);
    }

    #[test]
    fn zero_stride_means_tightly_packed() {
        assert_eq!(AttributeBinding::float2(0).effective_stride(), 8);
        let rgba = AttributeBinding {
            size: 4,
            ..AttributeBinding::float2(1)
        };
        assert_eq!(rgba.effective_stride(), 16);
        let strided = AttributeBinding {
            stride: 16,
            ..AttributeBinding::float2(0)
        };
        assert_eq!(strided.effective_stride(), 16);
    }

    #[test]
    fn vertex_is_two_packed_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), 8);
        let vertices = [Vertex::new(0.0, 1.0)];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(&bytes[4..], &1.0f32.to_ne_bytes());
    }
}
