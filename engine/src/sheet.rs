//! FILENAME: engine/src/sheet.rs
//! PURPOSE: The public coordinator tying grid, parser, and dependency
//! graph together into a single assignment operation.
//! CONTEXT: `Sheet::assign` is the one place a formula ever gets
//! installed on a cell. Cycle rejection and syntactically invalid
//! formulas fully roll the cell back to its prior snapshot. A reversed
//! range or an out-of-bounds reference during evaluation are the two
//! deliberate exceptions: the rewiring from steps 3-5 is left in place
//! even though the assignment is reported as failed, matching an
//! observable quirk of the system this behavior was carried over from.

use std::collections::HashSet;

use log::debug;

use crate::cell::{Cell, CellStatus};
use crate::coord::{coord_to_name, name_to_coord, CellCoord};
use crate::depgraph::{add_edges, clear_forward_edges, extract_precedents, would_cycle};
use crate::error::{AssignError, EvalError};
use crate::evaluator::Evaluator;
use crate::grid::Grid;
use crate::recompute::recompute_from;

pub struct Sheet {
    grid: Grid,
}

impl Sheet {
    pub fn new(rows: usize, cols: usize) -> Self {
        Sheet {
            grid: Grid::new(rows, cols),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Assigns `formula_text` to the cell named `cell_name`, returning
    /// `Ok(())` on success or the specific reason the assignment was
    /// rejected.
    pub fn assign(&mut self, cell_name: &str, formula_text: &str) -> Result<(), AssignError> {
        let coord = name_to_coord(cell_name).ok_or(AssignError::InvalidCell)?;
        if !self.grid.in_bounds(coord) {
            return Err(AssignError::OutOfBounds);
        }

        let expr = parser::parse(formula_text).map_err(|_| AssignError::InvalidFormula)?;

        let snapshot = self.grid.get(coord).clone();

        clear_forward_edges(&mut self.grid, coord);
        self.grid.get_mut(coord).formula = Some(formula_text.to_string());

        // Edges can only target cells that actually exist in the dense
        // grid; an out-of-bounds reference in the formula text is still
        // caught, but by the evaluator below rather than by the edge
        // set, since there is no cell to record it against.
        let precedents: HashSet<CellCoord> = extract_precedents(&expr)
            .into_iter()
            .filter(|&p| self.grid.in_bounds(p))
            .collect();
        add_edges(&mut self.grid, coord, &precedents);

        if would_cycle(&self.grid, coord, &self.grid.get(coord).depends_on.clone()) {
            self.restore(coord, snapshot);
            return Err(AssignError::Circular(coord_to_name(coord)));
        }

        match Evaluator::new(&self.grid).evaluate(&expr) {
            Ok(value) => {
                let cell = self.grid.get_mut(coord);
                cell.value = value;
                cell.status = CellStatus::Ok;
            }
            Err(EvalError::DivByZero) | Err(EvalError::DependencyError) => {
                let cell = self.grid.get_mut(coord);
                cell.value = 0;
                cell.status = CellStatus::Error;
            }
            Err(EvalError::RefOutOfBounds) => {
                // Commit retained: formula and edges already installed
                // above; this cell's value/status are left as they were.
                return Err(AssignError::RefOutOfBounds);
            }
            Err(EvalError::InvalidRange) => {
                return Err(AssignError::InvalidRange);
            }
        }

        recompute_from(&mut self.grid, coord);
        debug!("assigned {} = {}", cell_name, formula_text);
        Ok(())
    }

    /// Restores a cell (and the edges pointing at it) to a prior
    /// snapshot, used when an assignment is rejected for a cycle.
    fn restore(&mut self, coord: CellCoord, snapshot: Cell) {
        clear_forward_edges(&mut self.grid, coord);
        add_edges(&mut self.grid, coord, &snapshot.depends_on.clone());
        let cell = self.grid.get_mut(coord);
        cell.formula = snapshot.formula;
        cell.value = snapshot.value;
        cell.status = snapshot.status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_a_literal() {
        let mut sheet = Sheet::new(3, 3);
        sheet.assign("A1", "5").unwrap();
        assert_eq!(sheet.grid().get((0, 0)).value, 5);
    }

    #[test]
    fn rejects_malformed_cell_name() {
        let mut sheet = Sheet::new(3, 3);
        assert_eq!(sheet.assign("1A", "5").unwrap_err(), AssignError::InvalidCell);
    }

    #[test]
    fn rejects_out_of_bounds_cell() {
        let mut sheet = Sheet::new(2, 2);
        assert_eq!(
            sheet.assign("Z99", "5").unwrap_err(),
            AssignError::OutOfBounds
        );
    }

    #[test]
    fn rejects_invalid_formula_syntax() {
        let mut sheet = Sheet::new(3, 3);
        assert_eq!(
            sheet.assign("A1", "1 +").unwrap_err(),
            AssignError::InvalidFormula
        );
    }

    #[test]
    fn invalid_formula_syntax_does_not_mutate_the_cell() {
        let mut sheet = Sheet::new(3, 3);
        sheet.assign("A1", "5").unwrap();
        assert!(sheet.assign("A1", "1 +").is_err());
        assert_eq!(sheet.grid().get((0, 0)).value, 5);
        assert_eq!(sheet.grid().get((0, 0)).formula.as_deref(), Some("5"));
    }

    #[test]
    fn reference_out_of_bounds_retains_the_commit() {
        let mut sheet = Sheet::new(2, 2);
        let err = sheet.assign("A1", "Z99+1").unwrap_err();
        assert_eq!(err, AssignError::RefOutOfBounds);
        // Formula is committed even though the assignment is reported failed.
        assert_eq!(sheet.grid().get((0, 0)).formula.as_deref(), Some("Z99+1"));
        // Value/status are left at their prior (default) state.
        assert_eq!(sheet.grid().get((0, 0)).status, CellStatus::Ok);
        assert_eq!(sheet.grid().get((0, 0)).value, 0);
    }

    #[test]
    fn rejects_circular_dependency_and_rolls_back() {
        let mut sheet = Sheet::new(3, 3);
        sheet.assign("A1", "5").unwrap();
        sheet.assign("B1", "A1+1").unwrap();

        let err = sheet.assign("A1", "B1+1").unwrap_err();
        assert_eq!(err, AssignError::Circular("A1".to_string()));
        // A1 must still hold its prior value, unaffected by the rejected attempt.
        assert_eq!(sheet.grid().get((0, 0)).value, 5);
        assert_eq!(sheet.grid().get((0, 0)).formula.as_deref(), Some("5"));
    }

    #[test]
    fn self_inclusion_via_sum_range_is_a_cycle() {
        let mut sheet = Sheet::new(3, 3);
        let err = sheet.assign("A1", "SUM(A1:C3)").unwrap_err();
        assert_eq!(err, AssignError::Circular("A1".to_string()));
    }

    #[test]
    fn cascades_recompute_to_dependents() {
        let mut sheet = Sheet::new(3, 3);
        sheet.assign("A1", "5").unwrap();
        sheet.assign("B1", "A1*2").unwrap();
        sheet.assign("A1", "10").unwrap();
        assert_eq!(sheet.grid().get((0, 1)).value, 20);
    }

    #[test]
    fn div_by_zero_sets_error_status_but_keeps_formula() {
        let mut sheet = Sheet::new(3, 3);
        sheet.assign("A1", "0").unwrap();
        sheet.assign("B1", "1/A1").unwrap();
        assert_eq!(sheet.grid().get((0, 1)).status, CellStatus::Error);
        assert_eq!(sheet.grid().get((0, 1)).formula.as_deref(), Some("1/A1"));
    }

    #[test]
    fn dependency_error_propagates_and_then_clears() {
        let mut sheet = Sheet::new(3, 3);
        sheet.assign("A1", "10").unwrap();
        sheet.assign("B1", "A1/0").unwrap();
        sheet.assign("C1", "B1+1").unwrap();
        assert_eq!(sheet.grid().get((0, 2)).status, CellStatus::Error);

        sheet.assign("B1", "1").unwrap();
        assert_eq!(sheet.grid().get((0, 2)).status, CellStatus::Ok);
        assert_eq!(sheet.grid().get((0, 2)).value, 2);
    }

    #[test]
    fn reversed_range_is_rejected_but_commit_is_retained() {
        // C1's range (B1:A1) does not include C1 itself, so this is a
        // pure InvalidRange case rather than also tripping the cycle
        // detector (compare `self_inclusion_via_sum_range_is_a_cycle`).
        let mut sheet = Sheet::new(3, 3);
        let err = sheet.assign("C1", "MIN(B1:A1)").unwrap_err();
        assert_eq!(err, AssignError::InvalidRange);
        assert_eq!(sheet.grid().get((0, 2)).formula.as_deref(), Some("MIN(B1:A1)"));
        assert_eq!(sheet.grid().get((0, 2)).status, CellStatus::Ok);
        assert_eq!(sheet.grid().get((0, 2)).value, 0);
    }

    #[test]
    fn avg_and_stdev_over_a_column() {
        let mut sheet = Sheet::new(3, 3);
        sheet.assign("A1", "1").unwrap();
        sheet.assign("A2", "2").unwrap();
        sheet.assign("A3", "3").unwrap();
        sheet.assign("B1", "AVG(A1:A3)").unwrap();
        assert_eq!(sheet.grid().get((0, 1)).value, 2);
        sheet.assign("B2", "STDEV(A1:A3)").unwrap();
        assert_eq!(sheet.grid().get((1, 1)).value, 1);
    }
}
