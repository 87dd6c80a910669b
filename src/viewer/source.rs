//! Document source abstraction
//!
//! The viewer core never talks to a PDF engine directly. Each render
//! worker opens its own document handle through [`DocumentSource`], and
//! the session opens one transiently to read metadata. Keeping the seam
//! here lets the core run against an in-memory fake in tests.

use super::request::WorkerFault;
use super::surface::RasterImage;

/// Opens document handles. One handle is opened per render worker, plus
/// one short-lived handle on the session thread for metadata.
pub trait DocumentSource: Send + Sync {
    fn open(&self) -> Result<Box<dyn DocumentHandle>, WorkerFault>;
}

/// A loaded multi-page document.
pub trait DocumentHandle {
    /// Total page count
    fn page_count(&self) -> usize;

    /// Document title from metadata, if any
    fn title(&self) -> Option<String> {
        None
    }

    /// Access a page by 1-based number.
    ///
    /// Out-of-range numbers are an error, not a blank page.
    fn page(&self, page: usize) -> Result<Box<dyn PageHandle>, WorkerFault>;
}

/// A single page, ready to measure and rasterize.
pub trait PageHandle {
    /// Pixel dimensions of the page at the given scale.
    fn size_at(&self, scale: f64) -> (u32, u32);

    /// Rasterize the page at the given scale into an RGB buffer.
    fn rasterize(&self, scale: f64) -> Result<RasterImage, WorkerFault>;
}
