use gfx_hal::{adapter::MemoryType, memory as m, prelude::*, Backend, MemoryTypeId};
use std::iter;
use std::ptr;

/// Allocates host-visible memory for `buf`, binds it and copies `bytes` in.
pub fn upload<B: Backend>(
    device: &B::Device,
    buf: &mut B::Buffer,
    bytes: &[u8],
    memory_types: &[MemoryType],
) -> B::Memory {
    unsafe {
        let buffer_req = device.get_buffer_requirements(buf);
        let upload_type = upload_type(memory_types, &buffer_req);
        let memory = device
            .allocate_memory(upload_type, buffer_req.size)
            .expect("Can't allocate vertex memory");
        device
            .bind_buffer_memory(&memory, 0, buf)
            .expect("Can't bind vertex memory");
        let mapping = device
            .map_memory(&memory, m::Segment::ALL)
            .expect("Can't map vertex memory");
        ptr::copy_nonoverlapping(bytes.as_ptr(), mapping, bytes.len());
        device
            .flush_mapped_memory_ranges(iter::once((&memory, m::Segment::ALL)))
            .expect("Can't flush vertex memory");
        device.unmap_memory(&memory);
        memory
    }
}

fn upload_type(properties: &[MemoryType], buffer_req: &m::Requirements) -> MemoryTypeId {
    properties
        .iter()
        .enumerate()
        .position(|(id, mem_type)| {
            buffer_req.type_mask & (1 << id) != 0
                && mem_type.properties.contains(m::Properties::CPU_VISIBLE)
        })
        .expect("No CPU visible memory type for vertex buffer")
        .into()
}
