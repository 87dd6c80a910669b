//! Viewer core: visibility tracking, zoom state, render orchestration

mod observer;
mod request;
mod session;
mod source;
mod surface;
mod viewport;
mod worker;
mod zoom;

#[cfg(feature = "pdf")]
mod mupdf_source;

pub use observer::ViewportObserver;
pub use request::{Generation, RenderRequest, RenderResponse, RequestId, WorkerFault};
pub use session::{LoadError, SessionState, ViewerSession, ViewerStatus};
pub use source::{DocumentHandle, DocumentSource, PageHandle};
pub use surface::{
    PENDING_PAGE_EXTENT_PX, PageSurface, RasterImage, RenderedPage, SurfaceState,
};
pub use viewport::{ScrollDirection, ViewportTracker, VisibilityEvent};
pub use zoom::Zoom;

#[cfg(feature = "pdf")]
pub use mupdf_source::MupdfSource;

/// Default number of render worker threads
pub const DEFAULT_WORKERS: usize = 2;

/// Vertical gap between page surfaces in pixels
pub const PAGE_SEPARATOR_PX: u32 = 16;
