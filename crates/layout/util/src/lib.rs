//! Shared length arithmetic for the layout crates.
//!
//! Layout works in sub-pixel coordinates to avoid cumulative rounding
//! errors, the same way the major engines do. [`LayoutUnit`] stores 1/64px
//! fixed-point values; flow-thread offsets can exceed any viewport many
//! times over, so the raw value is an `i64`.

pub mod layout_unit;

pub use layout_unit::LayoutUnit;
