//! The flow thread: a single logical column of content and the passes
//! that slice it into visual columns.
//!
//! The container drives the engine in a loop: one call to
//! [`FlowThread::layout_columns`] lays the content out as a single logical
//! column (collecting break and shortage signals on the way), then
//! [`FlowThread::recalculate_column_heights`] answers whether a column set
//! changed its candidate height and another pass is needed.
//! [`FlowThread::layout`] wraps that loop.

use css_multicol::{ColumnStyle, UsedColumns, resolve_count_and_width};
use layout_util::LayoutUnit;
use log::debug;
use tracing::trace;

use crate::column_set::{ColumnHeightMode, ColumnIndexMode, ColumnSet};

/// Per-pass inputs read from the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpanConstraints {
    /// Content width of the container.
    pub available_width: LayoutUnit,
    /// Height budget across all columns; zero means "auto" and forces
    /// balancing.
    pub available_height: LayoutUnit,
    /// Container `max-height`, if constrained.
    pub max_height: Option<LayoutUnit>,
    /// Border plus padding before the first column set.
    pub border_padding_before: LayoutUnit,
}

impl ColumnSpanConstraints {
    /// Constraints for an auto-height container of the given width.
    pub fn auto_height(available_width: LayoutUnit) -> Self {
        Self {
            available_width,
            available_height: LayoutUnit::ZERO,
            max_height: None,
            border_padding_before: LayoutUnit::ZERO,
        }
    }
}

/// Where the flow thread is in the layout/balance cycle.
///
/// Replaces the pair of mode booleans ("in balancing pass", "needs height
/// recalculation") whose valid combinations were implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BalancePhase {
    /// Heights are committed; nothing to measure.
    Idle,
    /// A fresh layout finished; heights must be guessed from the portion.
    MeasureGuess,
    /// A balancing relayout finished; measure using recorded shortage.
    MeasureStretch,
    /// A height changed; the next layout pass is balancing-triggered.
    Rebalance,
}

/// What the content collaborator needs to lay itself out as one logical
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLayoutContext {
    /// Resolved used column width.
    pub column_width: LayoutUnit,
    /// Current candidate column height; zero during the first balancing
    /// pass, when no height assumption exists yet.
    pub column_height: LayoutUnit,
}

/// Receiver for break signals emitted while the content lays out.
///
/// Implemented by [`FlowThread`], which routes each signal to the column
/// set responsible for the offset.
pub trait BreakSink {
    /// A forced (explicit) break at `offset`.
    fn forced_break(&mut self, offset: LayoutUnit);

    /// A break candidate at `offset` missed fitting its content by
    /// `shortage`. Non-positive shortages mean nothing was missed and are
    /// ignored.
    fn space_shortage(&mut self, offset: LayoutUnit, shortage: LayoutUnit);

    /// Unbreakable content at `offset` needs at least `height` of column.
    fn minimum_height(&mut self, offset: LayoutUnit, height: LayoutUnit);
}

/// The content tree the flow thread reflows. The actual line/box breaking
/// algorithm lives entirely on the collaborator side.
pub trait FlowThreadContent {
    /// Lay the content out as a single logical column of
    /// `ctx.column_width`, reporting breaks through `breaks`, and return
    /// the content's total logical height.
    fn layout(&mut self, ctx: ContentLayoutContext, breaks: &mut dyn BreakSink) -> LayoutUnit;
}

/// Translation from flow-thread coordinates into container coordinates
/// for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnTranslation {
    /// Physical column index within the set.
    pub column_index: u32,
    /// Inline delta to apply to flow-thread positions.
    pub inline_offset: LayoutUnit,
    /// Block delta to apply to flow-thread positions.
    pub block_offset: LayoutUnit,
}

/// The single logical column all content flows into, plus the column sets
/// that slice it up.
#[derive(Debug)]
pub struct FlowThread {
    style: ColumnStyle,
    constraints: ColumnSpanConstraints,
    /// Last resolved used column count, always at least 1.
    column_count: u32,
    /// Last resolved used column width.
    column_width: LayoutUnit,
    /// Logical height of the content after the last pass.
    flow_thread_height: LayoutUnit,
    phase: BalancePhase,
    needs_layout: bool,
    /// Ordered column sets; their flow-thread portions tile the thread.
    /// This slice of the engine supports a single set, but the storage
    /// and routing generalize to several (spanner-split configurations).
    sets: Vec<ColumnSet>,
}

impl FlowThread {
    /// Create the flow thread for a block that just gained multicol
    /// styling. Dropping the thread hands the content back to the block.
    pub fn new(style: ColumnStyle, constraints: ColumnSpanConstraints) -> Self {
        let used = resolve_count_and_width(constraints.available_width, &style);
        Self {
            style,
            constraints,
            column_count: used.count,
            column_width: used.width,
            flow_thread_height: LayoutUnit::ZERO,
            phase: BalancePhase::Idle,
            needs_layout: true,
            sets: vec![ColumnSet::new(LayoutUnit::ZERO, constraints.border_padding_before)],
        }
    }

    /// Used column count from the last resolution.
    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    /// Used column width from the last resolution.
    pub fn column_width(&self) -> LayoutUnit {
        self.column_width
    }

    /// Logical height of the content as one column.
    pub fn flow_thread_height(&self) -> LayoutUnit {
        self.flow_thread_height
    }

    /// The column sets, in flow-thread order.
    pub fn column_sets(&self) -> &[ColumnSet] {
        &self.sets
    }

    /// Whether the balancing machinery must run: always, unless the
    /// container has a fixed height budget and `column-fill` is not
    /// `balance`.
    pub fn requires_balancing(&self) -> bool {
        self.style.requires_balancing(self.constraints.available_height)
    }

    /// Replace the style inputs (e.g. after a style recalc) and schedule
    /// a fresh layout.
    pub fn set_style(&mut self, style: ColumnStyle) {
        if self.style != style {
            self.style = style;
            self.needs_layout = true;
        }
    }

    /// Replace the container constraints and schedule a fresh layout.
    pub fn set_constraints(&mut self, constraints: ColumnSpanConstraints) {
        if self.constraints != constraints {
            self.constraints = constraints;
            self.needs_layout = true;
        }
    }

    /// One flow-thread layout pass.
    ///
    /// Skips entirely when nothing needs layout and no relayout was
    /// forced; otherwise resets column heights (unless this pass was
    /// triggered by balancing), re-resolves the used column count and
    /// width, and reflows the content as one logical column.
    pub fn layout_columns(&mut self, content: &mut dyn FlowThreadContent, relayout_children: bool) {
        let any_set_dirty = self.sets.iter().any(ColumnSet::needs_layout);
        if !self.needs_layout && !any_set_dirty && !relayout_children {
            // Layout did no work, so there is nothing new to balance.
            self.phase = BalancePhase::Idle;
            return;
        }

        let balancing_pass = self.phase == BalancePhase::Rebalance;
        if !balancing_pass {
            // New content may have arrived; start the height search over.
            // The container's border/padding may have changed too, so the
            // first set is repositioned before heights are derived from it.
            let requires_balancing = self.requires_balancing();
            let constraints = self.constraints;
            if let Some(first) = self.sets.first_mut() {
                first.set_logical_top_in_container(constraints.border_padding_before);
            }
            for set in &mut self.sets {
                set.reset_column_height(requires_balancing, &constraints);
            }
        }

        self.update_logical_width();
        trace!(
            count = self.column_count,
            balancing_pass,
            "flow thread layout pass"
        );

        let ctx = ContentLayoutContext {
            column_width: self.column_width,
            column_height: self
                .sets
                .first()
                .map_or(LayoutUnit::ZERO, ColumnSet::column_height),
        };
        let height = content.layout(ctx, self);
        self.flow_thread_height = height.max(LayoutUnit::ZERO);
        self.update_set_portions();
        for set in &mut self.sets {
            set.clear_needs_layout();
        }
        self.needs_layout = false;

        self.phase = if self.requires_balancing() {
            if balancing_pass {
                BalancePhase::MeasureStretch
            } else {
                BalancePhase::MeasureGuess
            }
        } else {
            BalancePhase::Idle
        };
    }

    /// Balancing step, to be called right after [`Self::layout_columns`].
    ///
    /// Returns whether another layout pass is needed. The container is
    /// expected to loop over the two calls until this returns false;
    /// convergence takes at most one stretch per used column for
    /// well-behaved content.
    pub fn recalculate_column_heights(&mut self) -> bool {
        debug_assert!(self.portions_are_contiguous());
        let mode = match self.phase {
            BalancePhase::Idle => return false,
            BalancePhase::MeasureGuess => ColumnHeightMode::GuessFromPortion,
            BalancePhase::MeasureStretch => ColumnHeightMode::StretchBySpaceShortage,
            BalancePhase::Rebalance => {
                // A relayout is already pending; nothing to measure yet.
                debug!("recalculate_column_heights called with a relayout pending");
                return true;
            }
        };

        let used_count = self.column_count;
        let mut first_changed = None;
        for (index, set) in self.sets.iter_mut().enumerate() {
            if set.recalculate_column_height(mode, used_count) && first_changed.is_none() {
                first_changed = Some(index);
            }
        }

        if let Some(start) = first_changed {
            // A new height shifts the logical top of every later set, so
            // they all need layout too.
            for set in self.sets.iter_mut().skip(start) {
                set.mark_needs_layout();
            }
            self.needs_layout = true;
            self.phase = BalancePhase::Rebalance;
            return true;
        }
        self.phase = BalancePhase::Idle;
        false
    }

    /// Run layout passes until the column heights are stable.
    ///
    /// Termination does not need a pass cap: candidate heights only grow,
    /// the max-height ceiling stops growth, and the sentinel guard stops
    /// stretch requests that could not name an amount.
    pub fn layout(&mut self, content: &mut dyn FlowThreadContent) {
        loop {
            self.layout_columns(content, false);
            if !self.recalculate_column_heights() {
                break;
            }
        }
    }

    /// Map a flow-thread offset to the column holding it: the physical
    /// column index plus the translation from flow-thread coordinates to
    /// container coordinates.
    pub fn column_translation(
        &self,
        offset: LayoutUnit,
        mode: ColumnIndexMode,
    ) -> ColumnTranslation {
        let set = self.set_at(offset);
        let index = set.column_index_at_offset(offset, mode);
        let inline_per_column = self.column_width + self.style.used_gap();
        ColumnTranslation {
            column_index: index,
            inline_offset: inline_per_column * index,
            block_offset: set.logical_top_in_container()
                - set.flow_thread_top()
                - set.column_height() * index,
        }
    }

    fn update_logical_width(&mut self) {
        let UsedColumns { count, width } =
            resolve_count_and_width(self.constraints.available_width, &self.style);
        self.column_count = count;
        self.column_width = width;
    }

    /// After a content pass, the last set's portion extends to the end of
    /// the thread (absorbing overflow); earlier sets keep their spans.
    fn update_set_portions(&mut self) {
        let thread_height = self.flow_thread_height;
        if let Some(last) = self.sets.last_mut() {
            last.set_portion_height(thread_height - last.flow_thread_top());
        }
    }

    fn portions_are_contiguous(&self) -> bool {
        let mut expected_top = LayoutUnit::ZERO;
        for set in &self.sets {
            if set.flow_thread_top() != expected_top {
                return false;
            }
            expected_top = set.flow_thread_bottom();
        }
        true
    }

    /// The set responsible for `offset`: the last one whose portion starts
    /// at or before it. A flow thread always owns at least one set.
    fn set_at(&self, offset: LayoutUnit) -> &ColumnSet {
        &self.sets[self.set_index_at(offset)]
    }

    fn set_index_at(&self, offset: LayoutUnit) -> usize {
        let mut responsible = 0;
        for (index, set) in self.sets.iter().enumerate() {
            if set.flow_thread_top() > offset {
                break;
            }
            responsible = index;
        }
        responsible
    }
}

impl BreakSink for FlowThread {
    fn forced_break(&mut self, offset: LayoutUnit) {
        let used_count = self.column_count;
        let requires_balancing = self.requires_balancing();
        let index = self.set_index_at(offset);
        if let Some(set) = self.sets.get_mut(index) {
            set.add_content_run(offset, used_count, requires_balancing);
        }
    }

    fn space_shortage(&mut self, offset: LayoutUnit, shortage: LayoutUnit) {
        if shortage <= LayoutUnit::ZERO {
            // Zero or negative means nothing was squeezed at this break.
            return;
        }
        let index = self.set_index_at(offset);
        if let Some(set) = self.sets.get_mut(index) {
            set.record_space_shortage(shortage);
        }
    }

    fn minimum_height(&mut self, offset: LayoutUnit, height: LayoutUnit) {
        let index = self.set_index_at(offset);
        if let Some(set) = self.sets.get_mut(index) {
            set.update_minimum_column_height(height);
        }
    }
}
