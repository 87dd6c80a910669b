//! End-to-end viewer session tests over an in-memory document source.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pagestack::viewer::{
    DocumentHandle, DocumentSource, PAGE_SEPARATOR_PX, PageHandle, PageSurface, RasterImage,
    ScrollDirection, SessionState, ViewerSession, ViewportTracker, WorkerFault,
};

struct MemorySource {
    pages: usize,
    page_size: (u32, u32),
}

impl DocumentSource for MemorySource {
    fn open(&self) -> Result<Box<dyn DocumentHandle>, WorkerFault> {
        Ok(Box::new(MemoryDocument {
            pages: self.pages,
            page_size: self.page_size,
        }))
    }
}

struct MemoryDocument {
    pages: usize,
    page_size: (u32, u32),
}

impl DocumentHandle for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn page(&self, page: usize) -> Result<Box<dyn PageHandle>, WorkerFault> {
        if page == 0 || page > self.pages {
            return Err(WorkerFault::generic(format!(
                "page {page} out of range (document has {} pages)",
                self.pages
            )));
        }
        Ok(Box::new(MemoryPage {
            size: self.page_size,
        }))
    }
}

struct MemoryPage {
    size: (u32, u32),
}

impl PageHandle for MemoryPage {
    fn size_at(&self, scale: f64) -> (u32, u32) {
        (
            (f64::from(self.size.0) * scale).ceil() as u32,
            (f64::from(self.size.1) * scale).ceil() as u32,
        )
    }

    fn rasterize(&self, scale: f64) -> Result<RasterImage, WorkerFault> {
        let (width_px, height_px) = self.size_at(scale);
        Ok(RasterImage {
            pixels: vec![0xFF; (width_px * height_px * 3) as usize],
            width_px,
            height_px,
        })
    }
}

fn loaded_session(pages: usize) -> ViewerSession {
    let source = Arc::new(MemorySource {
        pages,
        page_size: (100, 200),
    });
    let mut session = ViewerSession::with_workers(source, 2);
    session.load().expect("in-memory load cannot fail");
    session
}

fn drain_until_rendered(session: &mut ViewerSession) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !session.surfaces().iter().all(PageSurface::is_ready) {
        session.poll_responses();
        assert!(Instant::now() < deadline, "timed out waiting for renders");
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Drive the tracker and session together the way the shell does.
fn sync_visibility(session: &mut ViewerSession, tracker: &mut ViewportTracker) {
    let extents = session.layout_extents();
    let events = tracker.update(&extents, PAGE_SEPARATOR_PX);
    session.apply_visibility(&events);
}

#[test]
fn scrolling_through_the_document_advances_the_active_page() {
    let mut session = loaded_session(3);
    drain_until_rendered(&mut session);

    let mut tracker = ViewportTracker::new();
    tracker.set_viewport_height(250);
    sync_visibility(&mut session, &mut tracker);

    // Pages are 200px tall with a 16px separator; the first viewport
    // covers page 1 fully and page 2 partially.
    assert_eq!(session.active_page(), Some(2));

    // Scroll until page 1 is gone and page 3 has entered.
    let extents = session.layout_extents();
    tracker.scroll(ScrollDirection::Down, 250, &extents, PAGE_SEPARATOR_PX);
    sync_visibility(&mut session, &mut tracker);
    assert_eq!(session.active_page(), Some(3));

    // Back to the top: page 1 re-enters and page 3 leaves.
    tracker.scroll_to_top();
    sync_visibility(&mut session, &mut tracker);
    assert_eq!(session.active_page(), Some(1));
}

#[test]
fn zoom_rebuilds_every_surface_at_the_new_scale() {
    let mut session = loaded_session(3);
    drain_until_rendered(&mut session);

    let mut tracker = ViewportTracker::new();
    tracker.set_viewport_height(250);
    sync_visibility(&mut session, &mut tracker);
    assert!(session.active_page().is_some());

    assert!(session.zoom_in());
    tracker.reset();

    // The teardown is synchronous: stack and surfaces reset before any
    // new render lands.
    assert_eq!(session.active_page(), None);
    assert_eq!(session.surfaces().len(), 3);

    drain_until_rendered(&mut session);
    let factor = session.zoom().factor();
    let expected = (
        (100.0 * factor).ceil() as u32,
        (200.0 * factor).ceil() as u32,
    );
    for surface in session.surfaces() {
        assert!((surface.scale - 1.1).abs() < 1e-9);
        assert_eq!((surface.width_px, surface.height_px), expected);
    }

    // Taller pages: the viewport still reaches into page 2, which was
    // scrolled into last.
    sync_visibility(&mut session, &mut tracker);
    assert_eq!(session.active_page(), Some(2));
}

#[test]
fn rapid_zoom_leaves_exactly_one_generation_of_surfaces() {
    let mut session = loaded_session(4);

    // Two relayouts back to back, without waiting for the first to settle.
    assert!(session.zoom_in());
    assert!(session.zoom_in());

    assert_eq!(session.surfaces().len(), 4);
    drain_until_rendered(&mut session);

    for surface in session.surfaces() {
        assert!((surface.scale - 1.2).abs() < 1e-9);
        let rendered = surface.image.as_ref().expect("surface is ready");
        assert!((rendered.scale - 1.2).abs() < 1e-9);
    }
}

#[test]
fn session_state_reaches_ready_for_an_empty_document() {
    let source = Arc::new(MemorySource {
        pages: 0,
        page_size: (100, 200),
    });
    let mut session = ViewerSession::with_workers(source, 2);
    session.load().expect("empty documents load fine");

    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.surfaces().is_empty());
    assert!(!session.status().controls_enabled);

    let mut tracker = ViewportTracker::new();
    tracker.set_viewport_height(250);
    sync_visibility(&mut session, &mut tracker);
    assert_eq!(session.active_page(), None);
}
