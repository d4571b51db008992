//! Post-processing of model output: segmentation into prompt and rationale,
//! table normalization, and inline markup rendering.

mod inline;
mod segment;
mod table;
mod wrap;

pub use segment::{SegmentedResponse, segment};
pub use table::normalize_tables;
pub use wrap::wrap_message;

/// Display pipeline for execution results: tables first, then inline markup.
pub fn format_result(text: &str) -> String {
    inline::render_inline(&normalize_tables(text))
}
