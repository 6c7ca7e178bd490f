//! Windowed list - virtualized rendering of variable-height rows.
//!
//! Only rows intersecting the viewport, plus an overscan margin on each
//! side, are built. Rows are measured lazily the first time they enter the
//! window; until then they count with a default height so the scrollable
//! extent stays close to its final value.

mod cache;
mod height_index;
mod measure;

pub use cache::MeasurementCache;
pub use height_index::HeightIndex;
pub use measure::{FixedHeight, LineWrapMeasurer, RowMeasurer};

use crate::row::{NotificationRow, RowSignature};
use std::collections::HashMap;
use std::ops::Range;

/// Size of the list container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A container that has not been laid out yet.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A row positioned within the list's content.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    /// Index in the filtered sequence.
    pub index: usize,
    /// Top edge in content coordinates.
    pub top: f32,
    pub height: f32,
    pub row: NotificationRow,
}

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedList {
    /// Rows in the window, in sequence order.
    pub rows: Vec<PlacedRow>,
    /// Range of sequence indices covered by `rows`.
    pub range: Range<usize>,
    /// Number of rows in the whole sequence.
    pub row_count: usize,
    pub total_height: f32,
    pub scroll_offset: f32,
}

impl RenderedList {
    /// Height of the spacer standing in for rows above the window.
    pub fn top_spacer(&self) -> f32 {
        self.rows.first().map_or(0.0, |r| r.top)
    }

    /// Height of the spacer standing in for rows below the window.
    pub fn bottom_spacer(&self) -> f32 {
        self.rows
            .last()
            .map_or(self.total_height, |r| self.total_height - (r.top + r.height))
            .max(0.0)
    }
}

/// Virtualized list state: measurement cache plus scroll position.
#[derive(Debug, Clone)]
pub struct WindowedList {
    cache: MeasurementCache,
    scroll_offset: f32,
    overscan: usize,
}

impl WindowedList {
    pub fn new(default_height: f32, overscan: usize) -> Self {
        Self {
            cache: MeasurementCache::new(Vec::new(), default_height, 0.0),
            scroll_offset: 0.0,
            overscan,
        }
    }

    pub fn cache(&self) -> &MeasurementCache {
        &self.cache
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Start a new measurement cache for a new sequence of rows.
    ///
    /// Must be called whenever the sequence's composition changes, even if
    /// the keys look the same: positional keys say nothing about content.
    pub fn reset(&mut self, rows: Vec<RowSignature>, width: f32) {
        tracing::trace!("Rebuilding measurement cache for {} row(s)", rows.len());
        self.cache = self.cache.rebuild(rows, width);
    }

    /// Adapt to a new container width. Heights depend on width, so a width
    /// change drops every measurement.
    pub fn resize(&mut self, width: f32) {
        if width != self.cache.width() {
            let rows = (0..self.cache.len())
                .map(|i| self.cache.signature(i).clone())
                .collect();
            self.cache = MeasurementCache::new(rows, self.cache.default_height(), width);
        }
    }

    /// Largest valid scroll offset for a viewport of `viewport_height`.
    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.cache.total_height() - viewport_height).max(0.0)
    }

    /// Scroll towards the end of the list by `delta` (negative scrolls back).
    pub fn scroll_by(&mut self, delta: f32, viewport_height: f32) {
        self.scroll_to(self.scroll_offset + delta, viewport_height);
    }

    pub fn scroll_to(&mut self, offset: f32, viewport_height: f32) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        self.scroll_offset = offset.clamp(0.0, self.max_scroll(viewport_height));
    }

    /// Scroll so that row `index` starts at the top of the viewport.
    pub fn scroll_to_row(&mut self, index: usize, viewport_height: f32) {
        if self.cache.is_empty() {
            return;
        }
        let index = index.min(self.cache.len() - 1);
        self.scroll_to(self.cache.offset_of(index), viewport_height);
    }

    /// Indices of rows to build at the current offset, overscan included.
    pub fn window(&self, viewport_height: f32) -> Range<usize> {
        let len = self.cache.len();
        if len == 0 || viewport_height <= 0.0 {
            return 0..0;
        }

        let top = self.scroll_offset;
        let bottom = top + viewport_height;
        let first_visible = self.cache.index_at(top);
        let mut last_visible = self.cache.index_at(bottom);
        // A row starting exactly at the bottom edge is not visible.
        if last_visible > first_visible && self.cache.offset_of(last_visible) >= bottom {
            last_visible -= 1;
        }

        let start = first_visible.saturating_sub(self.overscan);
        let end = (last_visible + 1 + self.overscan).min(len);
        start..end
    }

    /// Lay out the rows around the current scroll position.
    ///
    /// `row_at` builds the row for a sequence index and is only called for
    /// rows in the window. Unmeasured rows in the window are measured, and
    /// the window is recomputed until it contains no unmeasured rows. The
    /// first visible row keeps its on-screen position while rows above it
    /// change height.
    pub fn render<F, M>(&mut self, viewport: Viewport, row_at: F, measurer: &mut M) -> RenderedList
    where
        F: Fn(usize) -> NotificationRow,
        M: RowMeasurer + ?Sized,
    {
        if viewport.is_empty() {
            return RenderedList::default();
        }
        if viewport.width != self.cache.width() {
            self.resize(viewport.width);
        }
        self.scroll_to(self.scroll_offset, viewport.height);

        let anchor = self.cache.index_at(self.scroll_offset);
        let anchor_delta = if self.cache.is_empty() {
            0.0
        } else {
            self.scroll_offset - self.cache.offset_of(anchor)
        };

        let mut built: HashMap<usize, NotificationRow> = HashMap::new();
        loop {
            let mut measured_any = false;
            for index in self.window(viewport.height) {
                if self.cache.is_measured(index) {
                    continue;
                }
                let row = row_at(index);
                let height = measurer.measure(&row, viewport.width);
                self.cache.record(index, height);
                built.insert(index, row);
                measured_any = true;
            }

            if !measured_any {
                break;
            }
            if !self.cache.is_empty() {
                let delta = anchor_delta.min(self.cache.row_height(anchor));
                self.scroll_to(self.cache.offset_of(anchor) + delta, viewport.height);
            }
        }

        let range = self.window(viewport.height);
        let rows = range
            .clone()
            .map(|index| PlacedRow {
                index,
                top: self.cache.offset_of(index),
                height: self.cache.row_height(index),
                row: built.remove(&index).unwrap_or_else(|| row_at(index)),
            })
            .collect();

        RenderedList {
            rows,
            range,
            row_count: self.cache.len(),
            total_height: self.cache.total_height(),
            scroll_offset: self.scroll_offset,
        }
    }
}
