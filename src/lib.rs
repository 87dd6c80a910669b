//! Continuous-scroll PDF page viewer core.
//!
//! Renders a multi-page document into a stack of per-page raster
//! surfaces, tracks which page is in view while scrolling, and rebuilds
//! the stack when the zoom factor changes. Document decoding sits behind
//! the [`viewer::DocumentSource`] trait; the `pdf` feature provides a
//! MuPDF-backed implementation.

pub mod viewer;

pub use viewer::{
    DocumentHandle, DocumentSource, PageHandle, PageSurface, ScrollDirection, SessionState,
    SurfaceState, ViewerSession, ViewerStatus, ViewportObserver, ViewportTracker, Zoom,
};

#[cfg(feature = "pdf")]
pub use viewer::MupdfSource;
