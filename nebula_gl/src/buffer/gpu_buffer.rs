/// GpuBuffer - owned driver buffer objects (vertex and index data)
///
/// A GpuBuffer is created with its full contents and never re-uploaded:
/// the data goes in once with a static-draw usage hint. The buffer owns its
/// handle exclusively and releases it exactly once, either through
/// `destroy()` or on drop.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use bytemuck::Pod;

use crate::device::{BufferTarget, GpuContext, RawHandle, NULL_HANDLE};
use crate::error::{Error, Result};
use crate::gl_call;

// ===== BUFFER KINDS =====

/// Compile-time binding target of a GpuBuffer
pub trait BufferKind: 'static {
    const TARGET: BufferTarget;
}

/// Vertex attribute data (GL_ARRAY_BUFFER)
#[derive(Debug, Clone, Copy)]
pub struct VertexData;

/// Element indices (GL_ELEMENT_ARRAY_BUFFER)
#[derive(Debug, Clone, Copy)]
pub struct IndexData;

impl BufferKind for VertexData {
    const TARGET: BufferTarget = BufferTarget::Vertex;
}

impl BufferKind for IndexData {
    const TARGET: BufferTarget = BufferTarget::Index;
}

// ===== GPU BUFFER =====

/// Driver buffer object bound to the target selected by `K`
pub struct GpuBuffer<K: BufferKind> {
    context: Rc<GpuContext>,
    handle: RawHandle,
    size: usize,
    _kind: PhantomData<K>,
}

/// Vertex buffer
pub type VertexBuffer = GpuBuffer<VertexData>;

impl<K: BufferKind> GpuBuffer<K> {
    /// Create the buffer and upload `data` (may be empty)
    ///
    /// Leaves the new buffer bound to its target. If the bind or the upload
    /// fails the handle is deleted before the error is returned.
    pub fn new(context: Rc<GpuContext>, data: &[u8]) -> Result<Self> {
        let handle = gl_call!(context, |gl| gl.gen_buffer())?;
        if handle == NULL_HANDLE {
            crate::nebula_error!("nebula::Buffer", "Driver returned no name for a {} buffer", K::TARGET);
            return Err(Error::InvalidResource(format!("{} buffer: driver returned handle 0", K::TARGET)));
        }

        // From here on, Drop releases the handle on any early return
        let buffer = Self {
            context,
            handle,
            size: data.len(),
            _kind: PhantomData,
        };

        gl_call!(buffer.context, |gl| gl.bind_buffer(K::TARGET, handle))?;
        gl_call!(buffer.context, |gl| gl.buffer_data(K::TARGET, data))?;

        crate::nebula_debug!("nebula::Buffer",
            "Created {} buffer {} ({} bytes)", K::TARGET, handle, buffer.size);
        Ok(buffer)
    }

    /// Bind the buffer to its target (idempotent)
    pub fn bind(&self) -> Result<()> {
        let handle = self.handle;
        gl_call!(self.context, |gl| gl.bind_buffer(K::TARGET, handle))
    }

    /// Clear the target's binding; the allocation is untouched
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.context, |gl| gl.bind_buffer(K::TARGET, NULL_HANDLE))
    }

    /// Bind the buffer and read its whole contents back from the driver
    pub fn read_back(&self) -> Result<Vec<u8>> {
        self.bind()?;
        let mut bytes = vec![0u8; self.size];
        gl_call!(self.context, |gl| gl.get_buffer_sub_data(K::TARGET, 0, &mut bytes))?;
        Ok(bytes)
    }

    pub fn handle(&self) -> RawHandle {
        self.handle
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn target(&self) -> BufferTarget {
        K::TARGET
    }

    /// Release the driver allocation now, reporting driver errors
    pub fn destroy(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if self.handle == NULL_HANDLE {
            return Ok(());
        }
        let handle = std::mem::replace(&mut self.handle, NULL_HANDLE);
        gl_call!(self.context, |gl| gl.delete_buffer(handle))?;
        crate::nebula_debug!("nebula::Buffer", "Released {} buffer {}", K::TARGET, handle);
        Ok(())
    }
}

impl GpuBuffer<VertexData> {
    /// Upload a slice of plain vertex structs or scalars
    pub fn from_slice<T: Pod>(context: Rc<GpuContext>, vertices: &[T]) -> Result<Self> {
        Self::new(context, bytemuck::cast_slice(vertices))
    }
}

impl<K: BufferKind> Drop for GpuBuffer<K> {
    fn drop(&mut self) {
        let handle = self.handle;
        if let Err(error) = self.release() {
            crate::nebula_error!("nebula::Buffer",
                "Failed to release {} buffer {}: {}", K::TARGET, handle, error);
        }
    }
}

impl<K: BufferKind> fmt::Debug for GpuBuffer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("target", &K::TARGET)
            .field("handle", &self.handle)
            .field("size", &self.size)
            .finish()
    }
}

// ===== INDEX BUFFER =====

/// Element type stored in an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 16-bit indices (GL_UNSIGNED_SHORT)
    U16,
    /// 32-bit indices (GL_UNSIGNED_INT)
    U32,
}

impl IndexType {
    pub fn size_bytes(&self) -> usize {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Index buffer that remembers how many indices it holds for draw calls
#[derive(Debug)]
pub struct IndexBuffer {
    buffer: GpuBuffer<IndexData>,
    count: usize,
    index_type: IndexType,
}

impl IndexBuffer {
    /// Upload 32-bit indices
    pub fn new(context: Rc<GpuContext>, indices: &[u32]) -> Result<Self> {
        Ok(Self {
            buffer: GpuBuffer::new(context, bytemuck::cast_slice(indices))?,
            count: indices.len(),
            index_type: IndexType::U32,
        })
    }

    /// Upload 16-bit indices
    pub fn from_u16(context: Rc<GpuContext>, indices: &[u16]) -> Result<Self> {
        Ok(Self {
            buffer: GpuBuffer::new(context, bytemuck::cast_slice(indices))?,
            count: indices.len(),
            index_type: IndexType::U16,
        })
    }

    pub fn bind(&self) -> Result<()> {
        self.buffer.bind()
    }

    pub fn unbind(&self) -> Result<()> {
        self.buffer.unbind()
    }

    pub fn read_back(&self) -> Result<Vec<u8>> {
        self.buffer.read_back()
    }

    pub fn handle(&self) -> RawHandle {
        self.buffer.handle()
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.buffer.size()
    }

    /// Number of indices
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn destroy(self) -> Result<()> {
        self.buffer.destroy()
    }
}

#[cfg(test)]
#[path = "gpu_buffer_tests.rs"]
mod tests;
