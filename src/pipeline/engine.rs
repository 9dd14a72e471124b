//! PDF engine: turn a document into [`PageLayout`]s via pdfium.
//!
//! Table detection only needs glyph boxes and path-object segments, so that is
//! all this stage reads. Everything downstream sees the [`PageSource`]
//! trait, which lets tests feed hand-built pages instead of real PDFs.
//!
//! pdfium reports coordinates bottom-up; they are flipped to top-down here
//! so the rest of the crate can read rows in natural order.

use super::layout::{BBox, PageLayout, PathSegment, TextChar};
use crate::config::ParseConfig;
use crate::error::StatementError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Source of page geometry for a document.
pub trait PageSource {
    /// Load the selected pages of an in-memory document.
    fn pages_from_bytes(
        &self,
        name: &str,
        bytes: &[u8],
        config: &ParseConfig,
    ) -> Result<Vec<PageLayout>, StatementError>;

    /// Load the selected pages of a document on disk.
    fn pages_from_file(
        &self,
        name: &str,
        path: &Path,
        config: &ParseConfig,
    ) -> Result<Vec<PageLayout>, StatementError>;
}

/// [`PageSource`] backed by a bound pdfium library.
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    /// Bind pdfium from `library` if given, otherwise from the working
    /// directory, otherwise from the system library path.
    pub fn bind(library: Option<&Path>) -> Result<Self, StatementError> {
        let bindings = match library {
            Some(path) => {
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(path.to_string_lossy().to_string())
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| StatementError::PdfiumBindingFailed(format!("{e:?}")))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    fn read_pages(&self, name: &str, document: &PdfDocument, config: &ParseConfig) -> Vec<PageLayout> {
        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("'{}' loaded: {} pages", name, total_pages);

        let indices = config.pages.to_indices(total_pages);
        if indices.is_empty() {
            warn!(
                "Page selection {:?} matches none of the {} pages of '{}'",
                config.pages, total_pages, name
            );
        }

        let mut layouts = Vec::with_capacity(indices.len());
        for idx in indices {
            let page = match pages.get(idx as u16) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Skipping page {} of '{}': {:?}", idx + 1, name, e);
                    continue;
                }
            };
            match page_layout(&page, idx + 1) {
                Ok(layout) => {
                    debug!(
                        "Page {}: {} glyphs, {} path objects",
                        idx + 1,
                        layout.chars.len(),
                        layout.rulings.len()
                    );
                    layouts.push(layout);
                }
                Err(e) => warn!("Skipping page {} of '{}': {:?}", idx + 1, name, e),
            }
        }
        layouts
    }
}

impl PageSource for PdfiumEngine {
    fn pages_from_bytes(
        &self,
        name: &str,
        bytes: &[u8],
        config: &ParseConfig,
    ) -> Result<Vec<PageLayout>, StatementError> {
        let password = config.password.as_deref();
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| map_load_error(name, password, e))?;
        Ok(self.read_pages(name, &document, config))
    }

    fn pages_from_file(
        &self,
        name: &str,
        path: &Path,
        config: &ParseConfig,
    ) -> Result<Vec<PageLayout>, StatementError> {
        let password = config.password.as_deref();
        let document = self
            .pdfium
            .load_pdf_from_file(path, password)
            .map_err(|e| map_load_error(name, password, e))?;
        Ok(self.read_pages(name, &document, config))
    }
}

/// pdfium reports a bad or missing password through the generic load
/// error, so the debug text is the only place to tell it apart.
fn map_load_error(name: &str, password: Option<&str>, error: PdfiumError) -> StatementError {
    let detail = format!("{error:?}");
    if detail.contains("Password") || detail.contains("password") {
        if password.is_some() {
            StatementError::WrongPassword {
                name: name.to_string(),
            }
        } else {
            StatementError::PasswordRequired {
                name: name.to_string(),
            }
        }
    } else {
        StatementError::CorruptPdf {
            name: name.to_string(),
            detail,
        }
    }
}

fn page_layout(page: &PdfPage, page_num: usize) -> Result<PageLayout, PdfiumError> {
    let height = page.height().value;
    let mut layout = PageLayout::new(page_num, page.width().value, height);

    let text = page.text()?;
    let chars = text.chars();
    for ch in chars.iter() {
        let Some(c) = ch.unicode_char() else {
            continue;
        };
        let Ok(rect) = ch.loose_bounds() else {
            continue;
        };
        layout.chars.push(TextChar {
            ch: c,
            bbox: top_down(&rect, height),
        });
    }

    for object in page.objects().iter() {
        if object.object_type() != PdfPageObjectType::Path {
            continue;
        }
        let segments = object
            .as_path_object()
            .map(|path| path_segments(path, height))
            .unwrap_or_default();
        if !segments.is_empty() {
            layout.push_path(&segments);
        } else if let Ok(bounds) = object.bounds() {
            layout.rulings.push(top_down(&bounds.page_rect(), height));
        }
    }

    Ok(layout)
}

/// Segments in page space. pdfium reports them relative to the object, so
/// the object's matrix is applied when it can be read.
fn path_segments(path: &PdfPagePathObject, page_height: f32) -> Vec<PathSegment> {
    let segments = match path.matrix() {
        Ok(matrix) => path.segments().transform(matrix),
        Err(_) => path.segments(),
    };

    let mut out = Vec::with_capacity(segments.len() as usize);
    for segment in segments.iter() {
        let (x, y) = (segment.x().value, page_height - segment.y().value);
        out.push(match segment.segment_type() {
            PdfPathSegmentType::LineTo => PathSegment::LineTo(x, y),
            _ => PathSegment::MoveTo(x, y),
        });
        if segment.is_close() {
            out.push(PathSegment::Close);
        }
    }
    out
}

#[allow(deprecated)]
fn top_down(rect: &PdfRect, page_height: f32) -> BBox {
    BBox::new(
        rect.left.value,
        page_height - rect.top.value,
        rect.right.value,
        page_height - rect.bottom.value,
    )
}

/// `PdfPageObjectCommon::bounds` returns a plain rectangle in older 0.8
/// releases and quad points in newer ones.
trait PageRect {
    fn page_rect(&self) -> PdfRect;
}

impl PageRect for PdfRect {
    fn page_rect(&self) -> PdfRect {
        *self
    }
}

impl PageRect for PdfQuadPoints {
    fn page_rect(&self) -> PdfRect {
        self.to_rect()
    }
}
