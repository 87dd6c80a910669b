//! MuPDF-backed document source

use std::path::PathBuf;

use mupdf::{Colorspace, Document, Matrix, Page, Pixmap};

use super::request::WorkerFault;
use super::source::{DocumentHandle, DocumentSource, PageHandle};
use super::surface::RasterImage;

/// Opens documents through the MuPDF engine.
#[derive(Clone, Debug)]
pub struct MupdfSource {
    path: PathBuf,
}

impl MupdfSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for MupdfSource {
    fn open(&self) -> Result<Box<dyn DocumentHandle>, WorkerFault> {
        let doc = Document::open(self.path.to_string_lossy().as_ref())?;
        let page_count = doc.page_count()? as usize;
        let title = doc
            .metadata(mupdf::MetadataName::Title)
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Box::new(MupdfDocument {
            doc,
            page_count,
            title,
        }))
    }
}

struct MupdfDocument {
    doc: Document,
    page_count: usize,
    title: Option<String>,
}

impl DocumentHandle for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn page(&self, page: usize) -> Result<Box<dyn PageHandle>, WorkerFault> {
        if page == 0 || page > self.page_count {
            return Err(WorkerFault::generic(format!(
                "page {page} out of range (document has {} pages)",
                self.page_count
            )));
        }

        let inner = self.doc.load_page((page - 1) as i32)?;
        let bounds = inner.bounds()?;

        Ok(Box::new(MupdfPage {
            inner,
            width: bounds.x1 - bounds.x0,
            height: bounds.y1 - bounds.y0,
        }))
    }
}

struct MupdfPage {
    inner: Page,
    /// Intrinsic page width in points
    width: f32,
    /// Intrinsic page height in points
    height: f32,
}

impl PageHandle for MupdfPage {
    fn size_at(&self, scale: f64) -> (u32, u32) {
        let scale = scale as f32;
        (
            (self.width * scale).ceil().max(1.0) as u32,
            (self.height * scale).ceil().max(1.0) as u32,
        )
    }

    fn rasterize(&self, scale: f64) -> Result<RasterImage, WorkerFault> {
        let scale = scale as f32;
        let transform = Matrix::new_scale(scale, scale);
        let rgb = Colorspace::device_rgb();
        let pixmap = self.inner.to_pixmap(&transform, &rgb, false, false)?;
        let pixels = pixmap_to_rgb(&pixmap)?;

        Ok(RasterImage {
            pixels,
            width_px: pixmap.width(),
            height_px: pixmap.height(),
        })
    }
}

/// Copy pixmap samples into a tightly-packed RGB buffer, honoring the
/// pixmap stride and dropping any extra channels.
fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, WorkerFault> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(WorkerFault::generic(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(WorkerFault::generic("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}
