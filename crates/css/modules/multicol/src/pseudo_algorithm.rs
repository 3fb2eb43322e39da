//! The used column count/width pseudo-algorithm.
//! Spec: CSS Multi-column L1 §3.4.
//!
//! Three cases, depending on which of `column-count` / `column-width`
//! computed to a value:
//!
//! - only `count`: divide the available width evenly;
//! - only `width`: fit as many columns of at least that width as possible,
//!   then widen them to consume the leftover space;
//! - both: `count` acts as a maximum on the width-derived count.

use layout_util::LayoutUnit;
use log::debug;

use crate::types::ColumnStyle;

/// The resolved column geometry for one container width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsedColumns {
    /// Used column count, always at least 1.
    pub count: u32,
    /// Used column width, never negative.
    pub width: LayoutUnit,
}

/// Resolve the used column count and width for `available_width`.
///
/// The result always satisfies `count >= 1`, `width >= 0`, and
/// `count * width + (count - 1) * gap <= available_width + count` raw
/// units (the slack is floor-division rounding).
pub fn resolve_count_and_width(available_width: LayoutUnit, style: &ColumnStyle) -> UsedColumns {
    let gap = style.used_gap();
    let available = available_width.max(LayoutUnit::ZERO);

    let used = match (style.width, style.count) {
        (None, Some(count)) => {
            let count = count.max(1);
            UsedColumns { count, width: width_for_count(available, gap, count) }
        }
        (Some(width), None) => {
            let count = count_for_width(available, gap, width);
            UsedColumns { count, width: widened_width(available, gap, count) }
        }
        (Some(width), Some(count)) => {
            let count = count_for_width(available, gap, width).min(count.max(1)).max(1);
            UsedColumns { count, width: widened_width(available, gap, count) }
        }
        (None, None) => {
            // The cascade resolves at least one of the two; answer a single
            // full-width column rather than guessing.
            debug!("column-width and column-count both auto; using a single column");
            UsedColumns { count: 1, width: available }
        }
    };

    debug!(
        "resolved columns: available={available_width} gap={gap} -> count={} width={}",
        used.count, used.width
    );
    used
}

/// Evenly divide the available width among `count` columns.
fn width_for_count(available: LayoutUnit, gap: LayoutUnit, count: u32) -> LayoutUnit {
    let gaps = gap * (count - 1);
    ((available - gaps) / count).max(LayoutUnit::ZERO)
}

/// Number of columns of at least `width` that fit, floored at 1.
fn count_for_width(available: LayoutUnit, gap: LayoutUnit, width: LayoutUnit) -> u32 {
    let unit = width + gap;
    if unit <= LayoutUnit::ZERO {
        return 1;
    }
    (((available + gap).raw().div_euclid(unit.raw())) as u32).max(1)
}

/// Widen `count` columns to consume the leftover space.
fn widened_width(available: LayoutUnit, gap: LayoutUnit, count: u32) -> LayoutUnit {
    (((available + gap) / count) - gap).max(LayoutUnit::ZERO)
}
