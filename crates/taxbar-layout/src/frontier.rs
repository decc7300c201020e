/// Rightmost claimed x per row on one side of a bar.
///
/// A value is the smallest left edge a new box may take in that row; separation from what is
/// already there is included. Values never decrease.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFrontier {
    floor: f64,
    rows: Vec<f64>,
}

impl RowFrontier {
    /// A frontier for `rows` rows, all starting at `floor` (the diagram's left boundary).
    pub fn new(rows: usize, floor: f64) -> Self {
        Self {
            floor,
            rows: vec![floor; rows],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn extent(&self, row: usize) -> f64 {
        self.rows.get(row).copied().unwrap_or(self.floor)
    }

    /// Raises row `row` to at least `x`.
    pub fn claim(&mut self, row: usize, x: f64) {
        if row >= self.rows.len() {
            self.rows.resize(row + 1, self.floor);
        }
        let slot = &mut self.rows[row];
        if x > *slot {
            *slot = x;
        }
    }

    /// Whether every row of `self` is at or beyond the same row of `earlier`.
    pub fn dominates(&self, earlier: &RowFrontier) -> bool {
        (0..self.len().max(earlier.len())).all(|r| self.extent(r) >= earlier.extent(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_only_move_right() {
        let mut f = RowFrontier::new(2, -1.0);
        let before = f.clone();
        f.claim(0, 3.0);
        f.claim(0, 2.0);
        assert_eq!(f.extent(0), 3.0);
        assert_eq!(f.extent(1), -1.0);
        assert!(f.dominates(&before));
        assert!(!before.dominates(&f));
    }

    #[test]
    fn rows_beyond_the_budget_grow_on_demand() {
        let mut f = RowFrontier::new(1, 0.0);
        assert_eq!(f.extent(4), 0.0);
        f.claim(3, 5.0);
        assert_eq!(f.len(), 4);
        assert_eq!(f.extent(2), 0.0);
        assert_eq!(f.extent(3), 5.0);
    }
}
