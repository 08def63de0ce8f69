#[cfg(feature = "metal")]
use gfx_backend_metal as back;

#[cfg(feature = "vulkan")]
use gfx_backend_vulkan as back;

mod input;
mod renderer;
mod scene;
mod transform;

use input::{Input, MouseEvent};
use renderer::Renderer;
use scene::Scene;

use gfx_hal::{prelude::*, window, Features};
use winit::event::{Event, WindowEvent};
use winit::event_loop::ControlFlow;
use winit::platform::desktop::EventLoopExtDesktop;

const DIMS: window::Extent2D = window::Extent2D {
    width: 1920,
    height: 1080,
};

const TITLE: &str = "Exercicio OpenGL - Triangulos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    Terminated,
}

impl LoopState {
    fn on_window_event(self, event: &WindowEvent<'_>) -> Self {
        match event {
            WindowEvent::CloseRequested => LoopState::Terminated,
            _ => self,
        }
    }
}

fn main() {
    env_logger::init();
    let mut fps_counter = fps_counter::FPSCounter::new();
    let mut event_loop = winit::event_loop::EventLoop::new();
    let wb = winit::window::WindowBuilder::new()
        .with_title(TITLE)
        .with_inner_size(winit::dpi::Size::Physical(winit::dpi::PhysicalSize::new(
            DIMS.width,
            DIMS.height,
        )))
        .with_resizable(false);
    let window = wb.build(&event_loop).expect("failed to create window");

    let instance =
        back::Instance::create(TITLE, 1).expect("failed to create an instance of gfx");
    let mut adapters = instance.enumerate_adapters();
    let mut surface = unsafe {
        instance
            .create_surface(&window)
            .expect("failed to create a surface")
    };
    assert!(!adapters.is_empty(), "no graphics adapter available");
    let adapter = adapters.remove(0);
    log::info!("using adapter: {}", adapter.info.name);

    let family = adapter
        .queue_families
        .iter()
        .find(|family| {
            surface.supports_queue_family(family) && family.queue_type().supports_graphics()
        })
        .expect("no queue family supports graphics on this surface");
    let mut gpu = unsafe {
        adapter
            .physical_device
            .open(&[(family, &[1.0])], Features::empty())
            .expect("failed to open the logical device")
    };

    let mut queue_group = gpu.queue_groups.pop().expect("no queue group was opened");
    let queue = &mut queue_group.queues[0];
    let device = gpu.device;

    {
        let mut renderer = Renderer::new(
            &mut surface,
            &adapter,
            &device,
            queue_group.family,
            DIMS,
        );
        let mut scene = Scene::new(DIMS);
        let mut input = Input::new(rand::thread_rng());
        let mut state = LoopState::Running;

        event_loop.run_return(|event, _, control_flow| {
            *control_flow = ControlFlow::Poll;
            match event {
                Event::WindowEvent { event, .. } => {
                    state = state.on_window_event(&event);
                    if let Some(mouse) = MouseEvent::from_window_event(&event) {
                        input.handle(mouse, &mut scene);
                    }
                }
                Event::MainEventsCleared => match state {
                    LoopState::Running => {
                        renderer.render(queue, &scene.draw_calls());
                        log::trace!("fps: {}", fps_counter.tick());
                    }
                    LoopState::Terminated => {
                        log::info!(
                            "window closed with {} spawned triangles",
                            scene.triangles().len()
                        );
                        *control_flow = ControlFlow::Exit;
                    }
                },
                _ => {}
            }
        });
    }

    unsafe {
        instance.destroy_surface(surface);
    }
}
