//! Row measurement.

use crate::constants::measure::{CHAR_WIDTH, LINE_HEIGHT, ROW_CHROME};
use crate::row::NotificationRow;

/// Measures the natural height of a row rendered at a given width.
///
/// Hosts implement this by laying out their real row widget off screen.
/// The list calls it at most once per row for each measurement cache.
pub trait RowMeasurer {
    fn measure(&mut self, row: &NotificationRow, width: f32) -> f32;
}

impl<F> RowMeasurer for F
where
    F: FnMut(&NotificationRow, f32) -> f32,
{
    fn measure(&mut self, row: &NotificationRow, width: f32) -> f32 {
        self(row, width)
    }
}

/// Every row has the same height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedHeight(pub f32);

impl RowMeasurer for FixedHeight {
    fn measure(&mut self, _row: &NotificationRow, _width: f32) -> f32 {
        self.0
    }
}

/// Estimates height from the number of wrapped message lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineWrapMeasurer {
    pub char_width: f32,
    pub line_height: f32,
    /// Height of everything around the message text.
    pub chrome: f32,
}

impl Default for LineWrapMeasurer {
    fn default() -> Self {
        Self {
            char_width: CHAR_WIDTH,
            line_height: LINE_HEIGHT,
            chrome: ROW_CHROME,
        }
    }
}

impl LineWrapMeasurer {
    /// Number of lines `text` wraps to at `width`. Empty text takes one line.
    pub fn line_count(&self, text: &str, width: f32) -> usize {
        let per_line = ((width / self.char_width).floor() as usize).max(1);
        text.lines()
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum::<usize>()
            .max(1)
    }
}

impl RowMeasurer for LineWrapMeasurer {
    fn measure(&mut self, row: &NotificationRow, width: f32) -> f32 {
        self.chrome + self.line_count(&row.message, width) as f32 * self.line_height
    }
}
