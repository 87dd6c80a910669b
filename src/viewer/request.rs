//! Render request and response types

use std::sync::Arc;

use super::surface::RenderedPage;

/// Unique identifier for render requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Layout epoch.
///
/// Bumped on every full relayout; requests and responses carry the epoch
/// they were issued under so completions from a superseded layout can be
/// recognized and dropped instead of corrupting fresh surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Request sent to render workers
#[derive(Debug)]
pub enum RenderRequest {
    /// Render a page (1-based) at the given scale
    Page {
        id: RequestId,
        generation: Generation,
        page: usize,
        scale: f64,
    },

    /// Shutdown the worker
    Shutdown,
}

/// Errors from render workers
#[derive(Debug, thiserror::Error)]
pub enum WorkerFault {
    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("{detail}")]
    Generic { detail: String },
}

impl WorkerFault {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Response from render workers
#[derive(Debug)]
pub enum RenderResponse {
    /// Page dimensions, sent before rasterization starts so layout space
    /// can be reserved while pixels are still being painted
    PageSized {
        id: RequestId,
        generation: Generation,
        page: usize,
        width_px: u32,
        height_px: u32,
    },

    /// Rendered page pixels
    Page {
        id: RequestId,
        generation: Generation,
        page: usize,
        data: Arc<RenderedPage>,
    },

    /// Error during rendering
    Error {
        id: RequestId,
        generation: Generation,
        error: WorkerFault,
    },
}
