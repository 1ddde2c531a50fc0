//! Surface rendering and the document handle for `inkleaf` e-ink targets.
//!
//! This crate draws laid-out pages into caller-owned pixel buffers
//! (`Gray8` or packed `Mono1`) and exposes the engine's stable boundary:
//! open, layout, page count, render, close.

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod document;
mod font;
mod render;
mod surface;

pub use document::{Document, EngineError, OutlineEntry, Status, DEFAULT_PAGE_SIZE};
pub use font::{FontBackend, FontId, FontMetrics, MonoFontBackend, MonoTextMeasurer};
pub use render::PageRenderer;
pub use surface::{PixelFormat, RenderSurface, SurfaceError};

pub use inkleaf_render::{
    LayoutOptions, LayoutProfileId, PageTable, ReadingPosition, Size, TextStyle,
};
