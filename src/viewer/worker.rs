//! Render worker - runs in dedicated thread(s)

use std::sync::Arc;

use flume::{Receiver, Sender};
use log::warn;

use super::request::{Generation, RenderRequest, RenderResponse, RequestId};
use super::source::{DocumentHandle, DocumentSource};
use super::surface::RenderedPage;

/// Main worker function - runs in a dedicated thread
#[expect(
    clippy::needless_pass_by_value,
    reason = "Values moved into thread, need ownership"
)]
pub fn render_worker(
    source: Arc<dyn DocumentSource>,
    requests: Receiver<RenderRequest>,
    responses: Sender<RenderResponse>,
) {
    let doc = match source.open() {
        Ok(doc) => doc,
        Err(e) => {
            warn!("render worker failed to open document: {e}");
            let _ = responses.send(RenderResponse::Error {
                id: RequestId::new(0),
                generation: Generation::new(0),
                error: e,
            });
            return;
        }
    };

    for request in requests {
        match request {
            RenderRequest::Page {
                id,
                generation,
                page,
                scale,
            } => {
                handle_page_request(doc.as_ref(), id, generation, page, scale, &responses);
            }

            RenderRequest::Shutdown => break,
        }
    }
}

fn handle_page_request(
    doc: &dyn DocumentHandle,
    id: RequestId,
    generation: Generation,
    page: usize,
    scale: f64,
    responses: &Sender<RenderResponse>,
) {
    let page_handle = match doc.page(page) {
        Ok(p) => p,
        Err(e) => {
            let _ = responses.send(RenderResponse::Error { id, generation, error: e });
            return;
        }
    };

    // Dimensions go out before the draw so the session can reserve layout
    // space while the pixels are still being painted.
    let (width_px, height_px) = page_handle.size_at(scale);
    let _ = responses.send(RenderResponse::PageSized {
        id,
        generation,
        page,
        width_px,
        height_px,
    });

    match page_handle.rasterize(scale) {
        Ok(image) => {
            let _ = responses.send(RenderResponse::Page {
                id,
                generation,
                page,
                data: Arc::new(RenderedPage { image, page, scale }),
            });
        }
        Err(e) => {
            let _ = responses.send(RenderResponse::Error { id, generation, error: e });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::request::WorkerFault;
    use super::super::source::PageHandle;
    use super::super::surface::RasterImage;
    use super::*;

    struct OnePageSource;

    impl DocumentSource for OnePageSource {
        fn open(&self) -> Result<Box<dyn DocumentHandle>, WorkerFault> {
            Ok(Box::new(OnePageDocument))
        }
    }

    struct OnePageDocument;

    impl DocumentHandle for OnePageDocument {
        fn page_count(&self) -> usize {
            1
        }

        fn page(&self, page: usize) -> Result<Box<dyn PageHandle>, WorkerFault> {
            if page != 1 {
                return Err(WorkerFault::generic(format!("page {page} out of range")));
            }
            Ok(Box::new(OnePage))
        }
    }

    struct OnePage;

    impl PageHandle for OnePage {
        fn size_at(&self, scale: f64) -> (u32, u32) {
            ((40.0 * scale) as u32, (60.0 * scale) as u32)
        }

        fn rasterize(&self, scale: f64) -> Result<RasterImage, WorkerFault> {
            let (width_px, height_px) = self.size_at(scale);
            Ok(RasterImage {
                pixels: vec![0; (width_px * height_px * 3) as usize],
                width_px,
                height_px,
            })
        }
    }

    #[test]
    fn dimensions_are_reported_before_pixels() {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        request_tx
            .send(RenderRequest::Page {
                id: RequestId::new(1),
                generation: Generation::new(1),
                page: 1,
                scale: 1.0,
            })
            .unwrap();
        request_tx.send(RenderRequest::Shutdown).unwrap();

        render_worker(Arc::new(OnePageSource), request_rx, response_tx);

        let first = response_rx.recv().unwrap();
        assert!(matches!(
            first,
            RenderResponse::PageSized {
                page: 1,
                width_px: 40,
                height_px: 60,
                ..
            }
        ));

        let second = response_rx.recv().unwrap();
        match second {
            RenderResponse::Page { page, data, .. } => {
                assert_eq!(page, 1);
                assert_eq!(data.image.pixels.len(), 40 * 60 * 3);
            }
            other => panic!("expected pixels after dimensions, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_page_reports_a_fault_not_a_blank_surface() {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        request_tx
            .send(RenderRequest::Page {
                id: RequestId::new(7),
                generation: Generation::new(1),
                page: 9,
                scale: 1.0,
            })
            .unwrap();
        request_tx.send(RenderRequest::Shutdown).unwrap();

        render_worker(Arc::new(OnePageSource), request_rx, response_tx);

        match response_rx.recv().unwrap() {
            RenderResponse::Error { id, error, .. } => {
                assert_eq!(id, RequestId::new(7));
                assert!(error.to_string().contains("out of range"));
            }
            other => panic!("expected a fault, got {other:?}"),
        }
        assert!(response_rx.recv().is_err(), "no further responses expected");
    }
}
