//! CSS Multi-column Layout Module Level 1 — style inputs and used-value resolution.
//! Spec: <https://www.w3.org/TR/css-multicol-1/>
//!
//! This crate covers the style side of multi-column layout: the resolved
//! `column-width` / `column-count` / `column-gap` / `column-fill` inputs a
//! multicol container hands to layout, and the §3.4 pseudo-algorithm that
//! turns them into a used column count and width. The balancing engine that
//! consumes these lives in `layout_multicol`.

mod pseudo_algorithm;
mod types;

pub use pseudo_algorithm::{UsedColumns, resolve_count_and_width};
pub use types::{ColumnFill, ColumnStyle};
