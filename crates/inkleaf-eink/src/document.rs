use std::path::Path;
use std::sync::{Arc, RwLock};

use inkleaf::{FlowDocument, FlowError};
use inkleaf_render::{
    LayoutError, LayoutOptions, LayoutProfileId, PageTable, PaginationEngine, ReadingPosition,
    Size,
};
use thiserror::Error;

use crate::font::MonoTextMeasurer;
use crate::render::PageRenderer;
use crate::surface::{RenderSurface, SurfaceError};

/// Default page size in device units (a 480x800 e-ink panel).
pub const DEFAULT_PAGE_SIZE: Size = Size::new(480, 800);

/// Boundary status classification.
///
/// Every engine operation is total: each input maps to one of these rather
/// than undefined behavior. `Unsupported` is reserved for future format
/// gaps and is not currently raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Operation succeeded.
    Ok,
    /// Reserved for future format/feature gaps.
    Unsupported,
    /// Malformed input, out-of-range index, or invalid surface. Detected
    /// before any mutation; the handle remains usable.
    InvalidArgument,
    /// The content model is unusable; the document should be closed.
    InternalError,
}

/// Errors surfaced by the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The document path was empty or unreadable.
    #[error("cannot read document: {0}")]
    Unreadable(#[source] FlowError),
    /// The content model could not be constructed from the input.
    #[error("content model construction failed: {0}")]
    Content(#[source] FlowError),
    /// Layout preferences were rejected.
    #[error("layout rejected: {0}")]
    Layout(#[from] LayoutError),
    /// A page index was outside the available range.
    #[error("page {index} is out of bounds for a document with {total} pages")]
    PageOutOfBounds { index: u32, total: u32 },
    /// The caller supplied a structurally unsound surface.
    #[error("invalid render surface: {0}")]
    Surface(#[from] SurfaceError),
}

impl EngineError {
    /// Status tier of this error.
    pub fn status(&self) -> Status {
        match self {
            Self::Unreadable(_)
            | Self::Layout(_)
            | Self::PageOutOfBounds { .. }
            | Self::Surface(_) => Status::InvalidArgument,
            Self::Content(_) => Status::InternalError,
        }
    }
}

fn classify_flow_error(err: FlowError) -> EngineError {
    match err {
        FlowError::EmptyPath | FlowError::Io(_) => EngineError::Unreadable(err),
        FlowError::Markup { .. } => EngineError::Content(err),
    }
}

/// One entry of a heading-derived document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Heading text.
    pub title: String,
    /// Heading level, 1..=6.
    pub level: u8,
    /// Page the heading starts on, once a layout exists.
    pub page: Option<u32>,
}

/// Owning handle binding a loaded content model, the current layout, and
/// the current page table.
///
/// Operations on distinct handles are fully independent. On one handle,
/// `layout` swaps the page table atomically behind a write lock while
/// `render_page` and `page_count` read a cloned snapshot, so concurrent
/// renders of different pages against an unchanged table proceed in
/// parallel and never observe a partially built table.
#[derive(Debug)]
pub struct Document {
    content: FlowDocument,
    page_size: Size,
    table: RwLock<Option<Arc<PageTable>>>,
    renderer: PageRenderer,
    measurer: Arc<MonoTextMeasurer>,
}

impl Document {
    fn from_content(content: FlowDocument) -> Self {
        Self {
            content,
            page_size: DEFAULT_PAGE_SIZE,
            table: RwLock::new(None),
            renderer: PageRenderer::new(),
            measurer: Arc::new(MonoTextMeasurer::new()),
        }
    }

    /// Open a document from `path` with the default page size.
    ///
    /// The handle starts with zero pages; call [`layout`](Self::layout)
    /// before rendering.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        FlowDocument::open(path)
            .map(Self::from_content)
            .map_err(classify_flow_error)
    }

    /// Open a document from `path` for a specific page size.
    pub fn open_with_page_size<P: AsRef<Path>>(path: P, page: Size) -> Result<Self, EngineError> {
        Self::open(path).map(|doc| doc.with_page_size(page))
    }

    /// Build a document from in-memory markup bytes.
    pub fn from_markup_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        FlowDocument::from_markup_bytes(bytes)
            .map(Self::from_content)
            .map_err(classify_flow_error)
    }

    /// Build a document from in-memory plain text.
    pub fn from_plain_text(text: &str) -> Self {
        Self::from_content(FlowDocument::from_plain_text(text))
    }

    /// Override the target page size. Drops any existing page table, since
    /// it was produced for the old dimensions.
    pub fn with_page_size(mut self, page: Size) -> Self {
        self.page_size = page;
        match self.table.get_mut() {
            Ok(slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        self
    }

    /// Target page size in device units.
    pub fn page_size(&self) -> Size {
        self.page_size
    }

    /// The flow content model this handle owns.
    pub fn content(&self) -> &FlowDocument {
        &self.content
    }

    /// Number of pages produced by the most recent layout; zero before the
    /// first successful layout.
    pub fn page_count(&self) -> u32 {
        self.table_snapshot()
            .map(|table| table.page_count() as u32)
            .unwrap_or(0)
    }

    /// Paginate the content under new preferences.
    ///
    /// The new table fully replaces any previous one; the swap is atomic
    /// from a concurrent reader's point of view. Returns the new page
    /// count, which is at least one.
    pub fn layout(&self, options: LayoutOptions) -> Result<u32, EngineError> {
        let metrics = options.resolve(self.page_size)?;
        let engine =
            PaginationEngine::new(metrics).with_text_measurer(self.measurer.clone());
        let table = Arc::new(engine.paginate(&self.content));
        let pages = table.page_count() as u32;

        let mut guard = match self.table.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(table);
        drop(guard);

        log::debug!(
            "layout: font {} lh {}% margin {} -> {} page(s)",
            options.font_size,
            options.line_height_percent,
            options.page_margin,
            pages
        );
        Ok(pages)
    }

    /// Render one page into a validated caller surface.
    ///
    /// Fails with an out-of-bounds error before any write when
    /// `page_index >= page_count()`, including the never-laid-out case.
    /// On success the full page is drawn; rows are written honoring the
    /// surface stride and nothing outside the surface extent is touched.
    pub fn render_page(
        &self,
        page_index: u32,
        surface: &mut RenderSurface<'_>,
    ) -> Result<(), EngineError> {
        let snapshot = self.table_snapshot();
        let total = snapshot
            .as_ref()
            .map(|table| table.page_count() as u32)
            .unwrap_or(0);
        let Some(table) = snapshot.filter(|_| page_index < total) else {
            return Err(EngineError::PageOutOfBounds {
                index: page_index,
                total,
            });
        };

        match self
            .renderer
            .render_page(&self.content, &table, page_index as usize, surface)
        {
            Ok(()) => {
                log::trace!(
                    "rendered page {}/{} into {}x{} {:?} surface",
                    page_index,
                    total,
                    surface.width(),
                    surface.height(),
                    surface.format()
                );
                Ok(())
            }
            Err(unreachable) => match unreachable {},
        }
    }

    /// Heading-derived outline with page numbers once a layout exists.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let snapshot = self.table_snapshot();
        self.content
            .blocks()
            .iter()
            .filter_map(|block| match block.role() {
                inkleaf::BlockRole::Heading(level) => Some(OutlineEntry {
                    title: block.text().to_string(),
                    level,
                    page: snapshot
                        .as_ref()
                        .and_then(|table| table.page_for_word(block.first_word()))
                        .map(|page| page as u32),
                }),
                _ => None,
            })
            .collect()
    }

    /// Whole-document text extraction, blocks separated by blank lines.
    pub fn extract_text(&self) -> String {
        let mut out = String::new();
        for block in self.content.blocks() {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(block.text());
        }
        out
    }

    /// Snapshot a reading position for `page_index` under the current
    /// layout. `None` before the first layout or for out-of-range pages.
    pub fn reading_position(&self, page_index: u32) -> Option<ReadingPosition> {
        self.table_snapshot()?.reading_position(page_index as usize)
    }

    /// Map a reading position captured under any earlier layout onto the
    /// current one. Returns page zero before the first layout.
    pub fn resolve_position(&self, position: &ReadingPosition) -> u32 {
        self.table_snapshot()
            .map(|table| table.resolve_position(position) as u32)
            .unwrap_or(0)
    }

    /// Deterministic identity of the current pagination, if any.
    pub fn layout_profile(&self) -> Option<LayoutProfileId> {
        self.table_snapshot().map(|table| table.profile_id())
    }

    /// Release the content model and page table.
    ///
    /// Dropping the handle is equivalent; this form makes the lifecycle
    /// explicit at call sites.
    pub fn close(self) {
        drop(self);
    }

    fn table_snapshot(&self) -> Option<Arc<PageTable>> {
        match self.table.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelFormat;

    fn two_page_doc() -> Document {
        let body = (0..600).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        Document::from_plain_text(&body)
    }

    #[test]
    fn page_count_is_zero_before_layout() {
        let doc = Document::from_plain_text("hello");
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.layout_profile(), None);
        assert_eq!(doc.reading_position(0), None);
    }

    #[test]
    fn render_before_layout_is_out_of_bounds() {
        let doc = Document::from_plain_text("hello");
        let mut buf = vec![0x42u8; 64 * 64];
        let mut surface =
            RenderSurface::new(&mut buf, 64, 64, 64, PixelFormat::Gray8).expect("valid");
        let err = doc.render_page(0, &mut surface).expect_err("no layout yet");
        assert!(matches!(
            err,
            EngineError::PageOutOfBounds { index: 0, total: 0 }
        ));
        assert_eq!(err.status(), Status::InvalidArgument);
        assert!(buf.iter().all(|&b| b == 0x42), "no write may occur");
    }

    #[test]
    fn layout_then_render_succeeds() {
        let doc = two_page_doc();
        let pages = doc.layout(LayoutOptions::default()).expect("layout");
        assert!(pages >= 1);
        assert_eq!(doc.page_count(), pages);

        let mut buf = vec![0u8; 480 * 800];
        let mut surface =
            RenderSurface::new(&mut buf, 480, 480, 800, PixelFormat::Gray8).expect("valid");
        doc.render_page(0, &mut surface).expect("render");
        assert!(buf.contains(&0x00));
    }

    #[test]
    fn layout_error_statuses_are_invalid_argument() {
        let doc = Document::from_plain_text("hello");
        let err = doc
            .layout(LayoutOptions {
                font_size: 0,
                ..LayoutOptions::default()
            })
            .expect_err("zero font size");
        assert_eq!(err.status(), Status::InvalidArgument);
        // A failed layout leaves the handle usable and the table absent.
        assert_eq!(doc.page_count(), 0);
        assert!(doc.layout(LayoutOptions::default()).is_ok());
    }

    #[test]
    fn empty_document_lays_out_to_one_page() {
        let doc = Document::from_plain_text("");
        assert_eq!(doc.layout(LayoutOptions::default()).expect("layout"), 1);
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn with_page_size_drops_stale_tables() {
        let doc = two_page_doc();
        doc.layout(LayoutOptions::default()).expect("layout");
        let doc = doc.with_page_size(Size::new(240, 320));
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn outline_reports_heading_pages() {
        let doc = Document::from_markup_bytes(
            b"<h1>Alpha</h1><p>one two three</p><h2>Beta</h2><p>four five</p>",
        )
        .expect("parse");
        let unpositioned = doc.outline();
        assert_eq!(unpositioned.len(), 2);
        assert!(unpositioned.iter().all(|entry| entry.page.is_none()));

        doc.layout(LayoutOptions::default()).expect("layout");
        let outline = doc.outline();
        assert_eq!(outline[0].title, "Alpha");
        assert_eq!(outline[0].level, 1);
        assert_eq!(outline[0].page, Some(0));
        assert_eq!(outline[1].level, 2);
        assert!(outline[1].page.is_some());
    }

    #[test]
    fn extract_text_joins_blocks() {
        let doc = Document::from_markup_bytes(b"<h1>Title</h1><p>body text</p>").expect("parse");
        assert_eq!(doc.extract_text(), "Title\n\nbody text");
    }

    #[test]
    fn markup_error_maps_to_internal_error() {
        let err = Document::from_markup_bytes(b"<p>broken <<<").expect_err("malformed");
        assert_eq!(err.status(), Status::InternalError);
    }
}
