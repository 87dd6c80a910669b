//! Page surfaces - per-page raster targets in the viewport stack

use std::sync::Arc;

/// Layout extent reserved for a page whose dimensions are not known yet.
///
/// Keeps the scroll geometry stable while the first renders are in flight.
pub const PENDING_PAGE_EXTENT_PX: u32 = 800;

/// Raw RGB pixels for one rendered page.
#[derive(Clone)]
pub struct RasterImage {
    /// Raw RGB pixel data (3 bytes per pixel: R, G, B)
    pub pixels: Vec<u8>,
    /// Image width in pixels
    pub width_px: u32,
    /// Image height in pixels
    pub height_px: u32,
}

/// Complete rendered page payload produced by a render worker.
#[derive(Clone)]
pub struct RenderedPage {
    /// Rendered image data
    pub image: RasterImage,
    /// Page number (1-based)
    pub page: usize,
    /// Scale factor used for rendering
    pub scale: f64,
}

impl std::fmt::Debug for RenderedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedPage")
            .field("page", &self.page)
            .field("scale", &self.scale)
            .field("width_px", &self.image.width_px)
            .field("height_px", &self.image.height_px)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a page surface within one layout generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceState {
    /// Surface created, render requested, dimensions unknown
    Pending,
    /// Dimensions installed, pixels still being painted
    Sized,
    /// Pixels installed
    Ready,
    /// Render failed; the surface shows an error instead of staying blank
    Failed(String),
}

/// One page's raster target at one rendered scale.
///
/// Surfaces live exactly as long as the layout generation that created
/// them; a zoom change tears down the whole stack and rebuilds it.
#[derive(Debug)]
pub struct PageSurface {
    /// Page number (1-based)
    pub page: usize,
    /// Scale this surface was laid out for
    pub scale: f64,
    /// Surface width in pixels (0 until sized)
    pub width_px: u32,
    /// Surface height in pixels (0 until sized)
    pub height_px: u32,
    /// Lifecycle state
    pub state: SurfaceState,
    /// Rendered pixels, present once the surface is ready
    pub image: Option<Arc<RenderedPage>>,
}

impl PageSurface {
    #[must_use]
    pub fn new(page: usize, scale: f64) -> Self {
        Self {
            page,
            scale,
            width_px: 0,
            height_px: 0,
            state: SurfaceState::Pending,
            image: None,
        }
    }

    /// Install dimensions ahead of the pixel payload so layout code can
    /// reserve space while rasterization is still running.
    pub fn set_dimensions(&mut self, width_px: u32, height_px: u32) {
        self.width_px = width_px;
        self.height_px = height_px;
        if self.state == SurfaceState::Pending {
            self.state = SurfaceState::Sized;
        }
    }

    /// Install the rendered pixels. Dimensions follow the payload, which
    /// is authoritative over the earlier size estimate.
    pub fn install(&mut self, data: Arc<RenderedPage>) {
        self.width_px = data.image.width_px;
        self.height_px = data.image.height_px;
        self.image = Some(data);
        self.state = SurfaceState::Ready;
    }

    /// Mark the surface as failed with a human-readable reason.
    pub fn fail(&mut self, detail: String) {
        self.image = None;
        self.state = SurfaceState::Failed(detail);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == SurfaceState::Ready
    }

    /// Vertical space this surface occupies in the scroll layout.
    #[must_use]
    pub fn layout_extent(&self) -> u32 {
        if self.height_px == 0 {
            PENDING_PAGE_EXTENT_PX
        } else {
            self.height_px
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_are_reserved_before_pixels_arrive() {
        let mut surface = PageSurface::new(1, 1.0);
        assert_eq!(surface.state, SurfaceState::Pending);
        assert_eq!(surface.layout_extent(), PENDING_PAGE_EXTENT_PX);

        surface.set_dimensions(850, 1100);
        assert_eq!(surface.state, SurfaceState::Sized);
        assert_eq!(surface.layout_extent(), 1100);
        assert!(surface.image.is_none());

        surface.install(Arc::new(RenderedPage {
            image: RasterImage {
                pixels: vec![0; 850 * 1100 * 3],
                width_px: 850,
                height_px: 1100,
            },
            page: 1,
            scale: 1.0,
        }));
        assert!(surface.is_ready());
    }

    #[test]
    fn failure_replaces_the_blank_surface() {
        let mut surface = PageSurface::new(3, 1.0);
        surface.fail("page 3 out of range".to_string());

        assert_eq!(
            surface.state,
            SurfaceState::Failed("page 3 out of range".to_string())
        );
        assert!(surface.image.is_none());
    }
}
