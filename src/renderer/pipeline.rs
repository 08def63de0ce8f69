use gfx_hal::{format as f, pass::Subpass, prelude::*, pso, Backend};
use std::io::Cursor;
use std::iter;
use std::mem::{self, ManuallyDrop};
use std::ptr;

const ENTRY_NAME: &str = "main";

const VERTEX_SPIRV: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/triangle.vert.spv"));
const FRAGMENT_SPIRV: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/triangle.frag.spv"));

/// Byte offset of `color` in the push-constant block, right after `mat4 model`.
pub const COLOR_OFFSET: u32 = 64;
pub const PUSH_CONSTANTS_SIZE: u32 = COLOR_OFFSET + 12;

pub struct Pipeline<'a, B: Backend> {
    device: &'a B::Device,
    pub pipeline: ManuallyDrop<B::GraphicsPipeline>,
    pub pipeline_layout: ManuallyDrop<B::PipelineLayout>,
}

impl<'a, B: Backend> Pipeline<'a, B> {
    pub fn new<T>(device: &'a B::Device, render_pass: &B::RenderPass) -> Self {
        let pipeline_layout = ManuallyDrop::new(
            unsafe {
                device.create_pipeline_layout(
                    iter::empty::<B::DescriptorSetLayout>(),
                    &[(pso::ShaderStageFlags::VERTEX, 0..PUSH_CONSTANTS_SIZE)],
                )
            }
            .expect("Can't create pipeline layout"),
        );

        let vs_module = Self::load_spirv(device, VERTEX_SPIRV);
        let fs_module = Self::load_spirv(device, FRAGMENT_SPIRV);

        let (vs_entry, fs_entry) = (
            pso::EntryPoint {
                entry: ENTRY_NAME,
                module: &vs_module,
                specialization: pso::Specialization::default(),
            },
            pso::EntryPoint {
                entry: ENTRY_NAME,
                module: &fs_module,
                specialization: pso::Specialization::default(),
            },
        );

        let shader_entries = pso::GraphicsShaderSet {
            vertex: vs_entry,
            hull: None,
            domain: None,
            geometry: None,
            fragment: Some(fs_entry),
        };

        let subpass = Subpass {
            index: 0,
            main_pass: render_pass,
        };

        let mut pipeline_desc = pso::GraphicsPipelineDesc::new(
            shader_entries,
            pso::Primitive::TriangleList,
            pso::Rasterizer::FILL,
            &*pipeline_layout,
            subpass,
        );
        // no blending: the last draw wins on overlap
        pipeline_desc.blender.targets.push(pso::ColorBlendDesc {
            mask: pso::ColorMask::ALL,
            blend: None,
        });

        pipeline_desc.vertex_buffers.push(pso::VertexBufferDesc {
            binding: 0,
            stride: mem::size_of::<T>() as u32,
            rate: pso::VertexInputRate::Vertex,
        });

        pipeline_desc.attributes.push(pso::AttributeDesc {
            location: 0,
            binding: 0,
            element: pso::Element {
                format: f::Format::Rg32Sfloat,
                offset: 0,
            },
        });

        let graphic_pipeline = unsafe { device.create_graphics_pipeline(&pipeline_desc, None) }
            .expect("Can't create graphics pipeline");

        unsafe {
            device.destroy_shader_module(vs_module);
            device.destroy_shader_module(fs_module);
        }

        Pipeline {
            device,
            pipeline: ManuallyDrop::new(graphic_pipeline),
            pipeline_layout,
        }
    }

    fn load_spirv(device: &B::Device, data: &[u8]) -> B::ShaderModule {
        let spirv = pso::read_spirv(Cursor::new(data)).expect("Invalid SPIR-V");
        unsafe { device.create_shader_module(&spirv) }.expect("Can't create shader module")
    }
}

impl<'a, B: Backend> Drop for Pipeline<'a, B> {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_graphics_pipeline(ManuallyDrop::into_inner(ptr::read(&self.pipeline)));
            self.device
                .destroy_pipeline_layout(ManuallyDrop::into_inner(ptr::read(
                    &self.pipeline_layout,
                )));
        }
    }
}
