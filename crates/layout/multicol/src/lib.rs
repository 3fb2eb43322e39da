//! Multi-column layout: flow thread, column sets, and height balancing.
//!
//! Content is first reflowed into a single logical column (the flow
//! thread), then sliced into N visual columns. When the container has no
//! fixed height budget — or asks for it via `column-fill: balance` — an
//! iterative balancer converges on the shortest column height that keeps
//! the content within the used column count, using content runs between
//! forced breaks for the initial guess and recorded space shortages for
//! subsequent stretches.
//!
//! The engine is single-threaded and synchronous: the container calls
//! [`FlowThread::layout_columns`] and
//! [`FlowThread::recalculate_column_heights`] in a loop until the latter
//! reports stability. Painting, hit testing, and the box/line breaking
//! algorithm itself are external collaborators behind the
//! [`FlowThreadContent`] and [`BreakSink`] seams.

mod column_set;
mod flow_thread;

pub use column_set::{ColumnIndexMode, ColumnSet};
pub use flow_thread::{
    BreakSink, ColumnSpanConstraints, ColumnTranslation, ContentLayoutContext, FlowThread,
    FlowThreadContent,
};
