//! Layout metrics, pagination engine, and page table for `inkleaf`.
//!
//! This crate turns raw typographic preferences into resolved device-unit
//! metrics, walks a flow document once to produce an immutable
//! [`PageTable`], and exposes the measurement seam rasterization backends
//! plug into.

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

mod metrics;
mod page_table;
mod paginate;

pub use inkleaf::BlockRole;
pub use metrics::{LayoutError, LayoutOptions, ResolvedMetrics, Size, TextStyle};
pub use page_table::{LayoutProfileId, LineSpan, PageSpan, PageTable, ReadingPosition};
pub use paginate::{PaginationEngine, TextMeasurer};
