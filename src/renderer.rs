use gfx_hal::{
    adapter, buffer as b, command, format as f, image as i, pass, pool,
    prelude::*,
    pso,
    queue::{family::QueueFamilyId, Submission},
    window, Backend,
};

use std::borrow::Borrow;
use std::iter;
use std::mem::ManuallyDrop;
use std::ptr;

mod buffer;
mod memory;
mod pipeline;
mod swapchain;
mod vertex;

use crate::scene::{DrawCall, Mesh, CLEAR_COLOR, STATIC_SHAPES, TEMPLATE_SHAPE};
use crate::transform::color_words;
use buffer::VertexBuffer;
use pipeline::{Pipeline, COLOR_OFFSET};
use swapchain::Swapchain;
use vertex::Vertex;

/// Vertex buffers uploaded once at startup.
struct Geometry<'a, B: Backend> {
    statics: Vec<VertexBuffer<'a, B>>,
    template: VertexBuffer<'a, B>,
}

impl<'a, B: Backend> Geometry<'a, B> {
    fn mesh(&self, mesh: Mesh) -> &VertexBuffer<'a, B> {
        match mesh {
            Mesh::Static(index) => &self.statics[index],
            Mesh::Template => &self.template,
        }
    }
}

pub struct Renderer<'a, B: Backend> {
    frame: usize,
    device: &'a B::Device,
    frames_in_flight: usize,
    command_pools: Vec<B::CommandPool>,
    command_buffers: Vec<B::CommandBuffer>,
    framebuffers: Vec<Option<B::Framebuffer>>,
    submission_complete_semaphores: Vec<B::Semaphore>,
    submission_complete_fences: Vec<B::Fence>,
    geometry: Geometry<'a, B>,
    swapchain: ManuallyDrop<Swapchain<'a, B>>,
    render_pass: ManuallyDrop<B::RenderPass>,
    pipeline: ManuallyDrop<Pipeline<'a, B>>,
}

impl<'a, B> Renderer<'a, B>
where
    B: Backend,
{
    pub fn new(
        surface: &'a mut B::Surface,
        adapter: &'a adapter::Adapter<B>,
        device: &'a B::Device,
        family: QueueFamilyId,
        init_dims: window::Extent2D,
    ) -> Self {
        let memory_types = adapter.physical_device.memory_properties().memory_types;
        let limits = adapter.physical_device.limits();

        let statics = STATIC_SHAPES
            .iter()
            .map(|shape| VertexBuffer::new(device, &Vertex::triangle(shape), &limits, &memory_types))
            .collect();
        let template = VertexBuffer::new(
            device,
            &Vertex::triangle(&TEMPLATE_SHAPE),
            &limits,
            &memory_types,
        );

        let swapchain = Swapchain::new(device, surface, adapter, init_dims);
        let render_pass = Self::create_render_pass(device, swapchain.format);
        let pipeline = Pipeline::new::<Vertex>(device, &*render_pass);

        let frames_in_flight: usize = 2;

        let mut command_pools = Self::create_command_pools(device, family, frames_in_flight);
        let command_buffers = command_pools
            .iter_mut()
            .map(|pool| unsafe { pool.allocate_one(command::Level::Primary) })
            .collect();
        let framebuffers = (0..frames_in_flight).map(|_| None).collect();
        let submission_complete_semaphores = Self::create_semaphores(device, frames_in_flight);
        let submission_complete_fences = Self::create_fences(device, frames_in_flight);

        Renderer {
            device,
            submission_complete_semaphores,
            submission_complete_fences,
            frames_in_flight,
            command_pools,
            command_buffers,
            framebuffers,
            geometry: Geometry { statics, template },
            swapchain: ManuallyDrop::new(swapchain),
            render_pass,
            pipeline: ManuallyDrop::new(pipeline),
            frame: 0,
        }
    }

    /// Records and presents one frame, issuing `draws` in order.
    pub fn render(&mut self, queue: &mut B::CommandQueue, draws: &[DrawCall]) {
        let surface_image = unsafe {
            match self.swapchain.surface.acquire_image(!0) {
                Ok((image, _)) => image,
                Err(err) => {
                    log::warn!("failed to acquire image: {:?}", err);
                    self.swapchain.recreate();
                    return;
                }
            }
        };

        let frame_idx = self.frame % self.frames_in_flight;

        unsafe {
            let fence = &self.submission_complete_fences[frame_idx];
            self.device
                .wait_for_fence(fence, !0)
                .expect("Can't wait for fence");
            self.device.reset_fence(fence).expect("Can't reset fence");
            if let Some(old) = self.framebuffers[frame_idx].take() {
                self.device.destroy_framebuffer(old);
            }
            self.command_pools[frame_idx].reset(false);
        }

        let frame_buffer = unsafe {
            self.device.create_framebuffer(
                &self.render_pass,
                iter::once(surface_image.borrow()),
                i::Extent {
                    width: self.swapchain.dims.width,
                    height: self.swapchain.dims.height,
                    depth: 1,
                },
            )
        }
        .expect("Could not create frame buffer");

        let layout = &*self.pipeline.pipeline_layout;
        let cmd_buffer = &mut self.command_buffers[frame_idx];
        unsafe {
            cmd_buffer.begin_primary(command::CommandBufferFlags::ONE_TIME_SUBMIT);
            cmd_buffer.set_viewports(0, &[self.swapchain.viewport.clone()]);
            cmd_buffer.set_scissors(0, &[self.swapchain.viewport.rect]);
            cmd_buffer.begin_render_pass(
                &self.render_pass,
                &frame_buffer,
                self.swapchain.viewport.rect,
                &[command::ClearValue {
                    color: command::ClearColor {
                        float32: CLEAR_COLOR,
                    },
                }],
                command::SubpassContents::Inline,
            );
            cmd_buffer.bind_graphics_pipeline(&self.pipeline.pipeline);

            for draw in draws {
                let mesh = self.geometry.mesh(draw.mesh);
                cmd_buffer.bind_vertex_buffers(0, iter::once((&*mesh.buf, b::SubRange::WHOLE)));
                cmd_buffer.push_graphics_constants(
                    layout,
                    pso::ShaderStageFlags::VERTEX,
                    COLOR_OFFSET,
                    &color_words(draw.color),
                );
                cmd_buffer.push_graphics_constants(
                    layout,
                    pso::ShaderStageFlags::VERTEX,
                    0,
                    &draw.model.to_words(),
                );
                cmd_buffer.draw(0..mesh.vertex_count, 0..1);
            }

            cmd_buffer.end_render_pass();
            cmd_buffer.finish();

            let submission = Submission {
                command_buffers: iter::once(&*cmd_buffer),
                wait_semaphores: None,
                signal_semaphores: iter::once(&self.submission_complete_semaphores[frame_idx]),
            };

            queue.submit(
                submission,
                Some(&self.submission_complete_fences[frame_idx]),
            );

            let result = queue.present_surface(
                &mut self.swapchain.surface,
                surface_image,
                Some(&self.submission_complete_semaphores[frame_idx]),
            );

            if let Err(err) = result {
                log::warn!("failed to present: {:?}", err);
                self.swapchain.recreate();
            }
        }

        self.framebuffers[frame_idx] = Some(frame_buffer);
        self.frame += 1;
    }

    fn create_render_pass(device: &B::Device, format: f::Format) -> ManuallyDrop<B::RenderPass> {
        let attachment = pass::Attachment {
            format: Some(format),
            samples: 1,
            ops: pass::AttachmentOps::new(
                pass::AttachmentLoadOp::Clear,
                pass::AttachmentStoreOp::Store,
            ),
            stencil_ops: pass::AttachmentOps::DONT_CARE,
            layouts: i::Layout::Undefined..i::Layout::Present,
        };

        let subpass = pass::SubpassDesc {
            colors: &[(0, i::Layout::ColorAttachmentOptimal)],
            depth_stencil: None,
            inputs: &[],
            resolves: &[],
            preserves: &[],
        };

        ManuallyDrop::new(
            unsafe { device.create_render_pass(&[attachment], &[subpass], &[]) }
                .expect("Can't create render pass"),
        )
    }

    fn create_command_pools(
        device: &B::Device,
        family: QueueFamilyId,
        frames_in_flight: usize,
    ) -> Vec<B::CommandPool> {
        (0..frames_in_flight)
            .map(|_| {
                unsafe {
                    device.create_command_pool(family, pool::CommandPoolCreateFlags::empty())
                }
                .expect("Can't create command pool")
            })
            .collect()
    }

    fn create_semaphores(device: &B::Device, frames_in_flight: usize) -> Vec<B::Semaphore> {
        (0..frames_in_flight)
            .map(|_| {
                device
                    .create_semaphore()
                    .expect("Could not create semaphore")
            })
            .collect()
    }

    fn create_fences(device: &B::Device, frames_in_flight: usize) -> Vec<B::Fence> {
        (0..frames_in_flight)
            .map(|_| device.create_fence(true).expect("Could not create fence"))
            .collect()
    }
}

impl<'a, B: Backend> Drop for Renderer<'a, B> {
    fn drop(&mut self) {
        let device = &self.device;
        if let Err(err) = device.wait_idle() {
            log::error!("device lost before shutdown: {:?}", err);
        }
        unsafe {
            for fb in self.framebuffers.drain(..).flatten() {
                device.destroy_framebuffer(fb);
            }
            for p in self.command_pools.drain(..) {
                device.destroy_command_pool(p);
            }
            for s in self.submission_complete_semaphores.drain(..) {
                device.destroy_semaphore(s);
            }
            for f in self.submission_complete_fences.drain(..) {
                device.destroy_fence(f);
            }

            device.destroy_render_pass(ManuallyDrop::into_inner(ptr::read(&self.render_pass)));
            ManuallyDrop::drop(&mut self.swapchain);
            ManuallyDrop::drop(&mut self.pipeline);
        }
    }
}
