//! Viewer session - orchestrates document load, layout, zoom, and workers

use std::collections::HashMap;
use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{debug, info, warn};

use super::DEFAULT_WORKERS;
use super::observer::ViewportObserver;
use super::request::{Generation, RenderRequest, RenderResponse, RequestId, WorkerFault};
use super::source::DocumentSource;
use super::surface::PageSurface;
use super::viewport::{ScrollDirection, VisibilityEvent};
use super::worker::render_worker;
use super::zoom::Zoom;

/// Fatal document-load failure. The session moves to
/// [`SessionState::Failed`] and stays there; there is no automatic retry.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("document load failed: {0}")]
    Source(#[from] WorkerFault),
}

/// Session lifecycle. `Ready` is re-entered after every zoom change via a
/// full relayout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

/// Indicator snapshot for the presentation layer: page number, zoom
/// percentage, page count. One-way, read every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerStatus {
    pub active_page: Option<usize>,
    pub page_count: usize,
    pub zoom_percent: String,
    pub controls_enabled: bool,
    pub state: SessionState,
}

struct WorkerChannels {
    request_tx: Sender<RenderRequest>,
    response_rx: Receiver<RenderResponse>,
}

/// Owns all mutable viewer state: the surface stack, the visibility
/// observer, the zoom factor, the layout generation, and the worker
/// channels. One value per viewer instance; no module-level singletons.
pub struct ViewerSession {
    source: Arc<dyn DocumentSource>,
    state: SessionState,
    zoom: Zoom,
    observer: ViewportObserver,
    surfaces: Vec<PageSurface>,
    page_count: usize,
    doc_title: Option<String>,
    generation: Generation,
    next_request_id: u64,
    pending: HashMap<RequestId, usize>,
    channels: Option<WorkerChannels>,
    num_workers: usize,
}

impl ViewerSession {
    #[must_use]
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self::with_workers(source, DEFAULT_WORKERS)
    }

    #[must_use]
    pub fn with_workers(source: Arc<dyn DocumentSource>, num_workers: usize) -> Self {
        Self {
            source,
            state: SessionState::Uninitialized,
            zoom: Zoom::default(),
            observer: ViewportObserver::new(),
            surfaces: Vec::new(),
            page_count: 0,
            doc_title: None,
            generation: Generation::new(0),
            next_request_id: 1,
            pending: HashMap::new(),
            channels: None,
            num_workers: num_workers.max(1),
        }
    }

    /// Open the document, spawn the worker pool, and perform the initial
    /// full layout.
    ///
    /// Calling `load` again replaces the previous document and workers
    /// wholesale. Load failures are returned to the caller and leave the
    /// session in [`SessionState::Failed`].
    pub fn load(&mut self) -> Result<(), LoadError> {
        self.shutdown();
        self.state = SessionState::Loading;

        let doc = match self.source.open() {
            Ok(doc) => doc,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(LoadError::Source(e));
            }
        };
        self.page_count = doc.page_count();
        self.doc_title = doc.title();
        drop(doc);

        // flume for MPMC: every worker clones request_rx and pulls from
        // the one shared queue; std/tokio mpsc receivers cannot be cloned.
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        for _ in 0..self.num_workers {
            let source = Arc::clone(&self.source);
            let rx = request_rx.clone();
            let tx = response_tx.clone();
            std::thread::spawn(move || render_worker(source, rx, tx));
        }

        self.channels = Some(WorkerChannels {
            request_tx,
            response_rx,
        });
        self.state = SessionState::Ready;
        info!(
            "document loaded: {} pages, title: {:?}",
            self.page_count,
            self.doc_title.as_deref().unwrap_or("(none)")
        );

        self.full_layout();
        Ok(())
    }

    /// Tear down every surface and rebuild the stack at the current scale.
    ///
    /// Runs on initial `Ready` entry and on every zoom change. The clear
    /// happens synchronously before any new request goes out, so stale
    /// completions can only match a dead generation tag.
    pub fn full_layout(&mut self) {
        self.generation = self.generation.next();
        self.observer.reset();
        self.surfaces.clear();
        self.pending.clear();

        for page in 1..=self.page_count {
            self.surfaces.push(PageSurface::new(page, self.zoom.factor()));
            self.observer.observe(page);
            self.request_page(page);
        }
    }

    fn request_page(&mut self, page: usize) {
        if self.channels.is_none() {
            return;
        }
        let id = self.next_id();
        let generation = self.generation;
        let scale = self.zoom.factor();

        if let Some(channels) = &self.channels {
            let _ = channels.request_tx.send(RenderRequest::Page {
                id,
                generation,
                page,
                scale,
            });
            self.pending.insert(id, page);
        }
    }

    /// Zoom in one step and relayout. Returns true when a relayout ran so
    /// the shell can reset its scroll state.
    pub fn zoom_in(&mut self) -> bool {
        if self.zoom.step_in() {
            self.full_layout();
            true
        } else {
            false
        }
    }

    /// Zoom out one step and relayout. A request at the floor is a no-op
    /// and triggers no relayout.
    pub fn zoom_out(&mut self) -> bool {
        if self.zoom.step_out() {
            self.full_layout();
            true
        } else {
            false
        }
    }

    /// Ctrl-modified scroll wheel: wheel up zooms in, wheel down zooms
    /// out, the usual browser convention.
    pub fn handle_zoom_wheel(&mut self, direction: ScrollDirection) -> bool {
        match direction {
            ScrollDirection::Up => self.zoom_in(),
            ScrollDirection::Down => self.zoom_out(),
        }
    }

    /// Drain completed worker responses into the surface stack.
    ///
    /// Responses tagged with a superseded generation are dropped here;
    /// per-page faults mark only their own surface. Returns true when any
    /// surface changed.
    pub fn poll_responses(&mut self) -> bool {
        let mut batch = Vec::new();
        if let Some(channels) = &self.channels {
            while let Ok(response) = channels.response_rx.try_recv() {
                batch.push(response);
            }
        }

        let mut changed = false;
        for response in batch {
            changed |= self.apply_response(response);
        }
        changed
    }

    fn apply_response(&mut self, response: RenderResponse) -> bool {
        match response {
            RenderResponse::PageSized {
                generation,
                page,
                width_px,
                height_px,
                ..
            } => {
                if generation != self.generation {
                    debug!("discarding stale dimensions for page {page}");
                    return false;
                }
                if let Some(surface) = self.surface_mut(page) {
                    surface.set_dimensions(width_px, height_px);
                    return true;
                }
                false
            }

            RenderResponse::Page {
                id,
                generation,
                page,
                data,
            } => {
                if generation != self.generation {
                    debug!("discarding stale render of page {page}");
                    return false;
                }
                self.pending.remove(&id);
                if let Some(surface) = self.surface_mut(page) {
                    surface.install(data);
                    return true;
                }
                false
            }

            RenderResponse::Error {
                id,
                generation,
                error,
            } => {
                let page = self.pending.remove(&id);
                if generation != self.generation {
                    debug!("discarding stale fault: {error}");
                    return false;
                }
                warn!("page render failed: {error}");
                if let Some(surface) = page.and_then(|p| self.surface_mut(p)) {
                    surface.fail(error.to_string());
                    return true;
                }
                false
            }
        }
    }

    fn surface_mut(&mut self, page: usize) -> Option<&mut PageSurface> {
        page.checked_sub(1)
            .and_then(|idx| self.surfaces.get_mut(idx))
    }

    /// Forward one visibility transition to the observer.
    pub fn on_visibility_change(&mut self, page: usize, visible: bool) {
        self.observer.on_visibility_change(page, visible);
    }

    /// Forward a batch of visibility transitions to the observer.
    pub fn apply_visibility(&mut self, events: &[VisibilityEvent]) {
        for event in events {
            self.observer.on_visibility_change(event.page, event.visible);
        }
    }

    #[must_use]
    pub fn active_page(&self) -> Option<usize> {
        self.observer.active_page()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    #[must_use]
    pub fn doc_title(&self) -> Option<&str> {
        self.doc_title.as_deref()
    }

    #[must_use]
    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    #[must_use]
    pub fn surfaces(&self) -> &[PageSurface] {
        &self.surfaces
    }

    /// Vertical extents of the surface stack, for scroll geometry.
    #[must_use]
    pub fn layout_extents(&self) -> Vec<u32> {
        self.surfaces.iter().map(PageSurface::layout_extent).collect()
    }

    #[must_use]
    pub fn status(&self) -> ViewerStatus {
        ViewerStatus {
            active_page: self.observer.active_page(),
            page_count: self.page_count,
            zoom_percent: self.zoom.percent(),
            controls_enabled: self.page_count > 0,
            state: self.state,
        }
    }

    /// Shutdown all workers
    pub fn shutdown(&mut self) {
        if let Some(channels) = self.channels.take() {
            for _ in 0..self.num_workers {
                let _ = channels.request_tx.send(RenderRequest::Shutdown);
            }
        }
        self.pending.clear();
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
