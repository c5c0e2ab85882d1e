//! Uploading vertex positions into a buffer object.

use std::fmt;

use crate::context::GraphicsContext;
use crate::error::Error;
use crate::types::Vertex;

/// A buffer object filled once with tightly packed [`Vertex`] data.
pub struct VertexBuffer<C: GraphicsContext> {
    handle: C::Buffer,
    vertex_count: u32,
    byte_len: usize,
}

impl<C: GraphicsContext> VertexBuffer<C> {
    /// Driver handle of the buffer object.
    pub fn handle(&self) -> C::Buffer {
        self.handle
    }

    /// Number of vertices stored.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Size of the buffer's storage in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

impl<C: GraphicsContext> fmt::Debug for VertexBuffer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("handle", &self.handle)
            .field("vertex_count", &self.vertex_count)
            .field("byte_len", &self.byte_len)
            .finish()
    }
}

/// Copy `points` into a new buffer object with the static-draw usage hint.
///
/// The buffer is left bound to the array-buffer bind point.
///
/// # Errors
///
/// Returns [`Error::ResourceCreation`] if the driver cannot create a buffer
/// object or if there are more than `u32::MAX` points.
pub fn upload_positions<C: GraphicsContext>(
    ctx: &mut C,
    points: &[Vertex],
) -> Result<VertexBuffer<C>, Error> {
    let vertex_count = u32::try_from(points.len()).map_err(|_| Error::ResourceCreation {
        resource: "buffer",
        reason: format!("{} vertices do not fit a draw call", points.len()),
    })?;

    let buffer = ctx.create_buffer().map_err(|reason| Error::ResourceCreation {
        resource: "buffer",
        reason,
    })?;

    let bytes: &[u8] = bytemuck::cast_slice(points);
    ctx.bind_array_buffer(Some(buffer));
    ctx.array_buffer_data(bytes);

    log::debug!("uploaded {vertex_count} vertices ({} bytes) to {buffer:?}", bytes.len());
    Ok(VertexBuffer {
        handle: buffer,
        vertex_count,
        byte_len: bytes.len(),
    })
}
