//! A run of same-size columns and the height balancing that sizes them.
//!
//! A [`ColumnSet`] owns one contiguous slice of the flow thread and decides
//! how tall its columns should be. Balancing happens in two kinds of step:
//! an initial guess derived from the content runs recorded between forced
//! breaks, and stretch steps that grow the height by the smallest space
//! shortage observed during the previous layout pass.

use layout_util::LayoutUnit;
use log::debug;
use smallvec::SmallVec;

use crate::flow_thread::ColumnSpanConstraints;

/// How `recalculate_column_height` should derive the next candidate height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnHeightMode {
    /// First attempt: estimate from the flow-thread portion by simulating
    /// implicit breaks between the recorded content runs.
    GuessFromPortion,
    /// Later attempts: grow the current height by the smallest recorded
    /// space shortage.
    StretchBySpaceShortage,
}

/// Whether an offset past the end of the set maps to the last real column
/// or keeps counting hypothetical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnIndexMode {
    /// Keep counting; used during layout when the set's end is unknown.
    Unclamped,
    /// Clamp to the last existing column; used for geometry lookups.
    ClampToExisting,
}

/// A maximal span of content between two forced breaks (or the flow-thread
/// start/end), plus the number of implicit breaks the balancer has decided
/// to assume inside it.
#[derive(Debug, Clone, Copy)]
struct ContentRun {
    /// Where this run ends in the flow thread.
    break_offset: LayoutUnit,
    /// Implicit breaks assumed inside the run so far.
    assumed_implicit_breaks: u32,
}

impl ContentRun {
    const fn new(break_offset: LayoutUnit) -> Self {
        Self { break_offset, assumed_implicit_breaks: 0 }
    }

    /// Height of each column this run produces when it starts at `start`.
    fn column_height(&self, start: LayoutUnit) -> LayoutUnit {
        (self.break_offset - start).div_ceil_by(self.assumed_implicit_breaks + 1)
    }
}

/// One contiguous run of same-size columns.
///
/// The set's flow-thread portion starts where the previous set's portion
/// ends; the sets owned by a flow thread tile it without gaps.
#[derive(Debug)]
pub struct ColumnSet {
    /// Start of this set's portion in flow-thread coordinates.
    flow_thread_top: LayoutUnit,
    /// Height of the portion; updated after every content layout pass.
    portion_height: LayoutUnit,
    /// Block offset of this set inside the container's border box.
    logical_top_in_container: LayoutUnit,
    /// Current candidate/used height per column.
    column_height: LayoutUnit,
    /// Ceiling for `column_height`, derived from the container's height
    /// inputs. Always at least 1px.
    max_column_height: LayoutUnit,
    /// Smallest positive "missed space" recorded in the last pass;
    /// `LayoutUnit::MAX` while nothing has been recorded.
    min_space_shortage: LayoutUnit,
    /// Floor imposed by unbreakable content.
    minimum_column_height: LayoutUnit,
    /// Pass-scoped bookkeeping of spans between forced breaks.
    content_runs: SmallVec<ContentRun, 4>,
    /// Set when the candidate height changed and the content inside this
    /// set must be laid out again.
    needs_layout: bool,
}

impl ColumnSet {
    pub(crate) fn new(flow_thread_top: LayoutUnit, logical_top_in_container: LayoutUnit) -> Self {
        Self {
            flow_thread_top,
            portion_height: LayoutUnit::ZERO,
            logical_top_in_container,
            column_height: LayoutUnit::ZERO,
            max_column_height: LayoutUnit::MAX,
            min_space_shortage: LayoutUnit::MAX,
            minimum_column_height: LayoutUnit::ZERO,
            content_runs: SmallVec::new(),
            needs_layout: true,
        }
    }

    /// Current per-column height.
    pub fn column_height(&self) -> LayoutUnit {
        self.column_height
    }

    /// Start of this set's slice of the flow thread.
    pub fn flow_thread_top(&self) -> LayoutUnit {
        self.flow_thread_top
    }

    /// End of this set's slice of the flow thread.
    pub fn flow_thread_bottom(&self) -> LayoutUnit {
        self.flow_thread_top + self.portion_height
    }

    /// Block offset of the set inside the container.
    pub fn logical_top_in_container(&self) -> LayoutUnit {
        self.logical_top_in_container
    }

    pub(crate) fn set_portion_height(&mut self, height: LayoutUnit) {
        self.portion_height = height.max(LayoutUnit::ZERO);
    }

    /// Reposition the set inside the container; border/padding inputs can
    /// change between layouts.
    pub(crate) fn set_logical_top_in_container(&mut self, top: LayoutUnit) {
        if self.logical_top_in_container != top {
            self.logical_top_in_container = top;
            self.needs_layout = true;
        }
    }

    pub(crate) fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub(crate) fn mark_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    pub(crate) fn clear_needs_layout(&mut self) {
        self.needs_layout = false;
    }

    /// Prepare for a fresh (non-balancing) layout.
    ///
    /// Content may have changed since the last layout, so the height
    /// ceiling is recomputed. When balancing is required the candidate
    /// height drops to zero so the guess pass runs from scratch; otherwise
    /// the height comes straight from the container's height budget.
    pub(crate) fn reset_column_height(
        &mut self,
        requires_balancing: bool,
        constraints: &ColumnSpanConstraints,
    ) {
        self.max_column_height = self.calculate_max_column_height(constraints);
        let old_height = self.column_height;
        if requires_balancing {
            self.column_height = LayoutUnit::ZERO;
        } else {
            let budget = self.height_adjusted_for_set_offset(
                constraints.available_height,
                constraints.border_padding_before,
            );
            self.column_height = budget.min(self.max_column_height);
        }
        if self.column_height != old_height {
            self.needs_layout = true;
        }
        // Runs and unbreakable-content measurements belong to a single
        // balancing sequence; a fresh layout starts a new one.
        self.content_runs.clear();
        self.minimum_column_height = LayoutUnit::ZERO;
        self.min_space_shortage = LayoutUnit::MAX;
    }

    /// Register a forced break at `end_offset`, closing the current run.
    ///
    /// Breaks that do not advance past the last recorded run coalesce into
    /// it. Runs are capped at the used column count: further forced breaks
    /// end up in overflow columns, which must not influence balancing.
    pub(crate) fn add_content_run(
        &mut self,
        end_offset: LayoutUnit,
        used_column_count: u32,
        requires_balancing: bool,
    ) {
        if !requires_balancing {
            return;
        }
        if let Some(last) = self.content_runs.last() {
            if end_offset <= last.break_offset {
                return;
            }
        }
        if self.content_runs.len() < used_column_count as usize {
            self.content_runs.push(ContentRun::new(end_offset));
        }
    }

    /// Keep the smallest positive shortage seen during the pass. Growing
    /// by less than the minimum would unblock nothing; growing by more
    /// than it risks overshooting.
    pub(crate) fn record_space_shortage(&mut self, shortage: LayoutUnit) {
        if shortage <= LayoutUnit::ZERO || shortage >= self.min_space_shortage {
            return;
        }
        self.min_space_shortage = shortage;
    }

    /// Raise the floor imposed by unbreakable content.
    pub(crate) fn update_minimum_column_height(&mut self, height: LayoutUnit) {
        self.minimum_column_height = self.minimum_column_height.max(height);
    }

    /// One balancing step. Returns whether the candidate height changed,
    /// in which case the content must be laid out again at the new height.
    pub(crate) fn recalculate_column_height(
        &mut self,
        mode: ColumnHeightMode,
        used_column_count: u32,
    ) -> bool {
        let old_height = self.column_height;
        if mode == ColumnHeightMode::GuessFromPortion {
            self.distribute_implicit_breaks(used_column_count);
        }
        let new_height = self.calculate_column_height(mode, used_column_count);
        self.column_height = new_height.min(self.max_column_height);
        debug!(
            "recalculate ({mode:?}): {} -> {} (max {})",
            old_height, self.column_height, self.max_column_height
        );

        // Runs and the recorded shortage are scoped to the pass that just
        // ended; the next pass measures afresh either way.
        self.content_runs.clear();
        self.min_space_shortage = LayoutUnit::MAX;

        if self.column_height == old_height {
            return false;
        }
        self.needs_layout = true;
        true
    }

    /// Number of columns the content actually occupies at the current
    /// height. Never less than 1; a zero height would otherwise imply
    /// infinitely many columns.
    pub fn actual_column_count(&self) -> u32 {
        self.portion_height.count_units_ceil(self.column_height, 1)
    }

    /// Map a flow-thread offset to a column index within this set.
    pub fn column_index_at_offset(&self, offset: LayoutUnit, mode: ColumnIndexMode) -> u32 {
        if offset < self.flow_thread_top {
            return 0;
        }
        if mode == ColumnIndexMode::ClampToExisting && offset >= self.flow_thread_bottom() {
            return self.actual_column_count() - 1;
        }
        if self.column_height == LayoutUnit::ZERO {
            return 0;
        }
        ((offset - self.flow_thread_top).raw().div_euclid(self.column_height.raw())) as u32
    }

    /// Reduce a container-level height budget to what this set can use,
    /// accounting for where the set sits inside the container. Floored at
    /// 1px: a zero-height column would mean an infinite number of columns.
    pub(crate) fn height_adjusted_for_set_offset(
        &self,
        height: LayoutUnit,
        border_padding_before: LayoutUnit,
    ) -> LayoutUnit {
        let content_top = self.logical_top_in_container - border_padding_before;
        (height - content_top.max(LayoutUnit::ZERO)).max(LayoutUnit::ONE_PX)
    }

    /// Ceiling for the candidate column height, from the container's
    /// height budget and `max-height` style.
    pub(crate) fn calculate_max_column_height(
        &self,
        constraints: &ColumnSpanConstraints,
    ) -> LayoutUnit {
        let mut max_height = if constraints.available_height > LayoutUnit::ZERO {
            constraints.available_height
        } else {
            LayoutUnit::MAX
        };
        if let Some(style_max) = constraints.max_height {
            max_height = max_height.min(style_max);
        }
        self.height_adjusted_for_set_offset(max_height, constraints.border_padding_before)
    }

    /// Simulate where soft breaks would fall, without laying anything out.
    ///
    /// A final synthetic run absorbs everything after the last forced
    /// break (including overflow if this is the last set). While there is
    /// room for more columns than there are runs, the run currently
    /// producing the tallest columns is subdivided once more.
    fn distribute_implicit_breaks(&mut self, used_column_count: u32) {
        self.add_content_run(self.flow_thread_bottom(), used_column_count, true);
        let mut column_count = self.content_runs.len() as u32;
        while column_count < used_column_count {
            let index = self.find_run_with_tallest_columns();
            if let Some(run) = self.content_runs.get_mut(index) {
                run.assumed_implicit_breaks += 1;
            }
            column_count += 1;
        }
    }

    /// Index of the run whose columns are currently tallest. Ties go to
    /// the lowest index.
    fn find_run_with_tallest_columns(&self) -> usize {
        let mut tallest_index = 0;
        let mut tallest_height = LayoutUnit::ZERO;
        let mut previous_offset = self.flow_thread_top;
        for (index, run) in self.content_runs.iter().enumerate() {
            let height = run.column_height(previous_offset);
            if height > tallest_height {
                tallest_height = height;
                tallest_index = index;
            }
            previous_offset = run.break_offset;
        }
        tallest_index
    }

    /// The next candidate height for the given mode; see
    /// [`ColumnHeightMode`].
    fn calculate_column_height(
        &self,
        mode: ColumnHeightMode,
        used_column_count: u32,
    ) -> LayoutUnit {
        if mode == ColumnHeightMode::GuessFromPortion {
            // Start with the lowest height that could possibly work: the
            // tallest column produced by the simulated breaks. If that is
            // too short anywhere, later stretch steps will find out.
            let index = self.find_run_with_tallest_columns();
            let start = if index > 0 {
                self.content_runs.get(index - 1).map_or(self.flow_thread_top, |run| run.break_offset)
            } else {
                self.flow_thread_top
            };
            let tallest = self
                .content_runs
                .get(index)
                .map_or(LayoutUnit::ZERO, |run| run.column_height(start));
            return tallest.max(self.minimum_column_height);
        }

        if self.actual_column_count() <= used_column_count {
            // The content already fits without overflowing columns.
            return self.column_height;
        }
        if self.content_runs.len() as u32 >= used_column_count {
            // Forced breaks alone use up every column; no implicit break
            // can be moved by stretching, so the initial height stands.
            return self.column_height;
        }
        if self.min_space_shortage.is_max() {
            // Nothing recorded a shortage even though the content
            // overflows. Stretching by an unknown amount would loop
            // forever; keep the current height instead.
            debug!("column overflow with no recorded space shortage; not stretching");
            return self.column_height;
        }
        self.column_height.saturating_add(self.min_space_shortage)
    }
}
