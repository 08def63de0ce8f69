use gfx_hal::{adapter::Adapter, format as f, prelude::*, pso, window, Backend};

/// Picks a non-sRGB color format so shader output and the clear value reach
/// the screen as written, without gamma encoding.
pub fn pick_format(supported: Option<Vec<f::Format>>) -> f::Format {
    match supported {
        Some(formats) if !formats.is_empty() => formats
            .iter()
            .find(|format| format.base_format().1 == f::ChannelType::Unorm)
            .copied()
            .unwrap_or(formats[0]),
        _ => f::Format::Rgba8Unorm,
    }
}

fn full_viewport(dims: window::Extent2D) -> pso::Viewport {
    pso::Viewport {
        rect: pso::Rect {
            x: 0,
            y: 0,
            w: dims.width as _,
            h: dims.height as _,
        },
        depth: 0.0..1.0,
    }
}

/// Surface configuration at the fixed window size.
pub struct Swapchain<'a, B: Backend> {
    device: &'a B::Device,
    adapter: &'a Adapter<B>,
    pub surface: &'a mut B::Surface,
    pub format: f::Format,
    pub dims: window::Extent2D,
    pub viewport: pso::Viewport,
}

impl<'a, B: Backend> Swapchain<'a, B> {
    pub fn new(
        device: &'a B::Device,
        surface: &'a mut B::Surface,
        adapter: &'a Adapter<B>,
        dims: window::Extent2D,
    ) -> Self {
        let format = pick_format(surface.supported_formats(&adapter.physical_device));
        log::debug!("surface format: {:?}", format);

        let mut swapchain = Swapchain {
            device,
            adapter,
            surface,
            format,
            dims,
            viewport: full_viewport(dims),
        };
        swapchain.configure();
        swapchain
    }

    pub fn configure(&mut self) {
        let caps = self.surface.capabilities(&self.adapter.physical_device);
        let mut config = window::SwapchainConfig::from_caps(&caps, self.format, self.dims);
        config.present_mode = window::PresentMode::FIFO;
        self.viewport = full_viewport(config.extent);

        unsafe { self.surface.configure_swapchain(self.device, config) }
            .expect("Can't configure swapchain");
    }

    pub fn recreate(&mut self) {
        log::warn!("reconfiguring swapchain");
        self.configure();
    }
}

impl<'a, B: Backend> Drop for Swapchain<'a, B> {
    fn drop(&mut self) {
        unsafe { self.surface.unconfigure_swapchain(self.device) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unorm_is_preferred_over_srgb() {
        let formats = vec![f::Format::Bgra8Srgb, f::Format::Bgra8Unorm];
        assert_eq!(pick_format(Some(formats)), f::Format::Bgra8Unorm);
    }

    #[test]
    fn first_format_is_used_without_unorm() {
        let formats = vec![f::Format::Bgra8Srgb, f::Format::Rgba8Srgb];
        assert_eq!(pick_format(Some(formats)), f::Format::Bgra8Srgb);
    }

    #[test]
    fn any_format_falls_back_to_rgba8_unorm() {
        assert_eq!(pick_format(None), f::Format::Rgba8Unorm);
        assert_eq!(pick_format(Some(Vec::new())), f::Format::Rgba8Unorm);
    }

    #[test]
    fn viewport_covers_the_window() {
        let viewport = full_viewport(window::Extent2D {
            width: 1920,
            height: 1080,
        });
        assert_eq!((viewport.rect.w, viewport.rect.h), (1920, 1080));
        assert_eq!(viewport.depth, 0.0..1.0);
    }
}
