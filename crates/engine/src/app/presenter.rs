use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::render::{RasterSurface, Screen};

/// Owns the window's pixel buffer and the software screen scenes draw into.
/// Each present copies the raster image into the buffer unchanged.
pub(crate) struct Presenter {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    screen: Screen<RasterSurface>,
}

impl Presenter {
    pub(crate) fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            screen: Screen::new(RasterSurface::new(size.width, size.height)),
        })
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.screen.surface_mut().resize(width, height);
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn screen_mut(&mut self) -> &mut Screen<RasterSurface> {
        &mut self.screen
    }

    pub(crate) fn present(&mut self) -> Result<(), Error> {
        let frame = self.pixels.frame_mut();
        let source = self.screen.surface().as_rgba();
        if frame.len() == source.len() {
            frame.copy_from_slice(source);
        }
        self.pixels.render()
    }
}
