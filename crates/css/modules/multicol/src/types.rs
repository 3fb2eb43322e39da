//! Resolved multi-column style values.

use layout_util::LayoutUnit;

/// `column-fill` — how content is distributed over the columns.
/// Spec: CSS Multi-column L1 §7.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnFill {
    /// Distribute content so column heights end up as equal as possible.
    #[default]
    Balance,
    /// Fill columns sequentially; later columns may stay empty.
    Auto,
}

/// The multicol style inputs after cascade resolution.
///
/// `None` means the property computed to `auto`. The cascade guarantees
/// `width` and `count` are never both `auto` by the time layout runs; the
/// resolver still handles that combination defensively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnStyle {
    /// Computed `column-width`, or `None` for `auto`.
    pub width: Option<LayoutUnit>,
    /// Computed `column-count`, or `None` for `auto`.
    pub count: Option<u32>,
    /// Computed `column-gap`.
    pub gap: LayoutUnit,
    /// Computed `column-fill`.
    pub fill: ColumnFill,
}

impl ColumnStyle {
    /// Style with an explicit `column-count` and everything else defaulted.
    pub fn with_count(count: u32) -> Self {
        Self { width: None, count: Some(count), gap: LayoutUnit::ZERO, fill: ColumnFill::Balance }
    }

    /// Style with an explicit `column-width` and everything else defaulted.
    pub fn with_width(width: LayoutUnit) -> Self {
        Self { width: Some(width), count: None, gap: LayoutUnit::ZERO, fill: ColumnFill::Balance }
    }

    /// The gap to use between columns; negative computed gaps are treated
    /// as zero.
    pub fn used_gap(&self) -> LayoutUnit {
        self.gap.max(LayoutUnit::ZERO)
    }

    /// Whether this container must run the column balancing machinery.
    ///
    /// Balancing is required when there is no height budget to fill
    /// (`available_height` of zero means "auto") or when `column-fill`
    /// asks for it explicitly. Spec: CSS Multi-column L1 §7.2.
    pub fn requires_balancing(&self, available_height: LayoutUnit) -> bool {
        available_height == LayoutUnit::ZERO || self.fill == ColumnFill::Balance
    }
}
