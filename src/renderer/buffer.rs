use gfx_hal::{adapter::MemoryType, buffer, prelude::*, Backend, Limits};
use std::mem::{self, ManuallyDrop};
use std::ptr;
use std::slice;

use super::memory;
use super::vertex::Vertex;

/// A vertex buffer with its backing memory, released on drop.
pub struct VertexBuffer<'a, B: Backend> {
    device: &'a B::Device,
    pub buf: ManuallyDrop<B::Buffer>,
    memory: ManuallyDrop<B::Memory>,
    pub vertex_count: u32,
}

impl<'a, B: Backend> VertexBuffer<'a, B> {
    pub fn new(
        device: &'a B::Device,
        vertices: &[Vertex],
        limits: &Limits,
        memory_types: &[MemoryType],
    ) -> Self {
        let non_coherent_alignment = limits.non_coherent_atom_size as u64;

        let buffer_len = mem::size_of_val(vertices) as u64;
        assert_ne!(buffer_len, 0);
        let memory_size = ((buffer_len + non_coherent_alignment - 1) / non_coherent_alignment)
            * non_coherent_alignment;

        let mut buf = unsafe { device.create_buffer(memory_size, buffer::Usage::VERTEX) }
            .expect("Can't create vertex buffer");

        let bytes =
            unsafe { slice::from_raw_parts(vertices.as_ptr() as *const u8, buffer_len as usize) };
        let memory = memory::upload::<B>(device, &mut buf, bytes, memory_types);

        VertexBuffer {
            device,
            buf: ManuallyDrop::new(buf),
            memory: ManuallyDrop::new(memory),
            vertex_count: vertices.len() as u32,
        }
    }
}

impl<'a, B: Backend> Drop for VertexBuffer<'a, B> {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_buffer(ManuallyDrop::into_inner(ptr::read(&self.buf)));
            self.device
                .free_memory(ManuallyDrop::into_inner(ptr::read(&self.memory)));
        }
    }
}
