//! Measured row heights for one rendered sequence.

use super::height_index::HeightIndex;
use crate::row::{RowKey, RowSignature};
use admin_query::NotificationId;
use std::collections::HashMap;

/// Per-row height cache keyed by position in the current sequence.
///
/// Rows start at the default height and switch to their measured height the
/// first time they are rendered. A cache describes exactly one sequence of
/// row signatures at one width; when either changes a new cache is built
/// with [`MeasurementCache::rebuild`].
#[derive(Debug, Clone)]
pub struct MeasurementCache {
    rows: Vec<RowSignature>,
    measured: Vec<bool>,
    heights: HeightIndex,
    default_height: f32,
    width: f32,
}

impl MeasurementCache {
    pub fn new(rows: Vec<RowSignature>, default_height: f32, width: f32) -> Self {
        let len = rows.len();
        Self {
            rows,
            measured: vec![false; len],
            heights: HeightIndex::uniform(len, default_height),
            default_height,
            width,
        }
    }

    /// Build a cache for a new sequence, keeping what is still valid.
    ///
    /// A measured height survives when the width is unchanged and the row
    /// keeps both its stable key and its content. Positional heights never
    /// survive: the same index may now hold a different notification.
    pub fn rebuild(&self, rows: Vec<RowSignature>, width: f32) -> Self {
        if width != self.width {
            return Self::new(rows, self.default_height, width);
        }

        let carried: HashMap<(&NotificationId, u64), f32> = self
            .rows
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.measured[i])
            .filter_map(|(i, row)| {
                row.key
                    .id()
                    .map(|id| ((id, row.content), self.heights.height(i)))
            })
            .collect();

        let mut measured = vec![false; rows.len()];
        let heights: Vec<f32> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let kept = row
                    .key
                    .id()
                    .and_then(|id| carried.get(&(id, row.content)));
                match kept {
                    Some(&height) => {
                        measured[i] = true;
                        height
                    }
                    None => self.default_height,
                }
            })
            .collect();

        Self {
            rows,
            measured,
            heights: HeightIndex::from_heights(heights),
            default_height: self.default_height,
            width,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn default_height(&self) -> f32 {
        self.default_height
    }

    pub fn key(&self, index: usize) -> &RowKey {
        &self.rows[index].key
    }

    pub fn signature(&self, index: usize) -> &RowSignature {
        &self.rows[index]
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured[index]
    }

    pub fn measured_count(&self) -> usize {
        self.measured.iter().filter(|&&m| m).count()
    }

    /// Measured height, or the default before measurement.
    pub fn row_height(&self, index: usize) -> f32 {
        self.heights.height(index)
    }

    /// Record the measured height of a row.
    ///
    /// Unusable measurements (negative, NaN, infinite) fall back to the
    /// default height but still mark the row measured.
    pub fn record(&mut self, index: usize, height: f32) {
        let height = if height.is_finite() && height >= 0.0 {
            height
        } else {
            tracing::warn!(
                "Row {} measured as {}, using default height",
                index,
                height
            );
            self.default_height
        };
        self.measured[index] = true;
        self.heights.set(index, height);
    }

    pub fn offset_of(&self, index: usize) -> f32 {
        self.heights.offset_of(index)
    }

    pub fn index_at(&self, y: f32) -> usize {
        self.heights.index_at(y)
    }

    /// Scrollable extent: measured rows at their height, the rest at the default.
    pub fn total_height(&self) -> f32 {
        self.heights.total()
    }
}
