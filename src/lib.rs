//! Flow-content model and loaders for the `inkleaf` reading engine.
//!
//! This crate owns the reflowable representation of a document's text,
//! independent of page boundaries. Pagination and rasterization live in
//! `inkleaf-render` and `inkleaf-eink`.

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

mod error;
mod flow;
mod markup;

pub use error::FlowError;
pub use flow::{BlockRole, FlowBlock, FlowDocument};
