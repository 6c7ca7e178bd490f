//! Prefix sums over row heights.
//!
//! A Fenwick tree keeps row offsets queryable in O(log n) while individual
//! heights change as rows get measured.

/// Row heights with logarithmic offset and position lookups.
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// 1-based Fenwick tree of partial sums.
    tree: Vec<f32>,
    heights: Vec<f32>,
    total: f32,
}

impl HeightIndex {
    /// Index `len` rows that all have height `height`.
    pub fn uniform(len: usize, height: f32) -> Self {
        Self::from_heights(vec![height; len])
    }

    /// Index the given heights. Builds in O(n).
    pub fn from_heights(heights: Vec<f32>) -> Self {
        let len = heights.len();
        let mut tree = vec![0.0; len + 1];
        tree[1..].copy_from_slice(&heights);
        for i in 1..=len {
            let parent = i + lowest_bit(i);
            if parent <= len {
                tree[parent] += tree[i];
            }
        }
        let total = heights.iter().sum();

        Self {
            tree,
            heights,
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn height(&self, index: usize) -> f32 {
        self.heights[index]
    }

    /// Sum of all row heights.
    pub fn total(&self) -> f32 {
        self.total
    }

    /// Change the height of one row.
    pub fn set(&mut self, index: usize, height: f32) {
        let delta = height - self.heights[index];
        if delta == 0.0 {
            return;
        }
        self.heights[index] = height;
        self.total += delta;

        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += lowest_bit(i);
        }
    }

    /// Top edge of row `index`: the sum of all heights before it.
    ///
    /// `index == len()` yields the total height.
    pub fn offset_of(&self, index: usize) -> f32 {
        let mut i = index.min(self.len());
        let mut sum = 0.0;
        while i > 0 {
            sum += self.tree[i];
            i -= lowest_bit(i);
        }
        sum
    }

    /// Row containing vertical position `y`.
    ///
    /// A position on a boundary belongs to the row starting there. Positions
    /// past the end map to the last row. Returns 0 for an empty index.
    pub fn index_at(&self, y: f32) -> usize {
        let len = self.len();
        if len == 0 || y <= 0.0 {
            return 0;
        }

        // Binary lifting: find how many leading rows end at or before `y`.
        let mut position = 0;
        let mut remaining = y;
        let mut step = highest_power_of_two(len);
        while step > 0 {
            let next = position + step;
            if next <= len && self.tree[next] <= remaining {
                position = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }

        position.min(len - 1)
    }
}

fn lowest_bit(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn highest_power_of_two(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_of_uniform_rows() {
        let index = HeightIndex::uniform(1000, 58.0);
        assert_eq!(index.total(), 58_000.0);
        assert_eq!(index.offset_of(0), 0.0);
        assert_eq!(index.offset_of(100), 5800.0);
        assert_eq!(index.offset_of(1000), 58_000.0);
    }

    #[test]
    fn test_index_at_boundaries() {
        let index = HeightIndex::from_heights(vec![10.0, 20.0, 30.0]);
        assert_eq!(index.index_at(0.0), 0);
        assert_eq!(index.index_at(9.5), 0);
        assert_eq!(index.index_at(10.0), 1);
        assert_eq!(index.index_at(29.9), 1);
        assert_eq!(index.index_at(30.0), 2);
        assert_eq!(index.index_at(500.0), 2);
        assert_eq!(index.index_at(-4.0), 0);
    }

    #[test]
    fn test_set_updates_offsets_and_total() {
        let mut index = HeightIndex::uniform(8, 10.0);
        index.set(2, 40.0);
        assert_eq!(index.height(2), 40.0);
        assert_eq!(index.total(), 110.0);
        assert_eq!(index.offset_of(2), 20.0);
        assert_eq!(index.offset_of(3), 60.0);
        assert_eq!(index.offset_of(8), 110.0);
        assert_eq!(index.index_at(59.0), 2);
        assert_eq!(index.index_at(60.0), 3);
    }

    #[test]
    fn test_matches_linear_scan() {
        let heights: Vec<f32> = (0..37).map(|i| 5.0 + (i % 7) as f32 * 3.0).collect();
        let mut index = HeightIndex::from_heights(heights.clone());
        index.set(11, 2.0);
        let mut expected = heights;
        expected[11] = 2.0;

        let mut top = 0.0;
        for (i, h) in expected.iter().enumerate() {
            assert_eq!(index.offset_of(i), top);
            assert_eq!(index.index_at(top), i);
            assert_eq!(index.index_at(top + h / 2.0), i);
            top += h;
        }
    }

    #[test]
    fn test_empty_index() {
        let index = HeightIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.total(), 0.0);
        assert_eq!(index.index_at(100.0), 0);
        assert_eq!(index.offset_of(3), 0.0);
    }
}
