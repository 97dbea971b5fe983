//! FILENAME: engine/src/recompute.rs
//! PURPOSE: Re-evaluates the subgraph affected by a single cell's new
//! value, in dependency order.
//! CONTEXT: Only `root`'s transitive dependents are touched -- the rest
//! of the grid is left alone, since nothing else could have changed.
//! A cell whose formula divides by zero or reads a broken dependency
//! lands in an error state and recomputation continues past it (its
//! own dependents still need to see that it is broken). A cell whose
//! formula re-evaluates to `InvalidRange` or `RefOutOfBounds` -- only
//! possible because the coordinator's commit-retention quirk can leave
//! such a formula installed -- aborts the whole pass instead: that
//! cell's value and status are left exactly as they already were, and
//! nothing further downstream of it is recomputed this pass.

use log::{trace, warn};

use crate::cell::CellStatus;
use crate::coord::{coord_to_name, CellCoord};
use crate::depgraph::{topological_order, transitive_dependents};
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::grid::Grid;

use parser::Expr;

/// Re-evaluates every cell transitively dependent on `root`, in an
/// order where each cell is recomputed only after all of its
/// precedents have settled. Cells with no formula (plain values) are
/// never part of this subgraph, since nothing points to them as a
/// precedent unless they have one.
pub fn recompute_from(grid: &mut Grid, root: CellCoord) {
    let affected = transitive_dependents(grid, root);
    if affected.is_empty() {
        return;
    }

    let order = match topological_order(grid, &affected) {
        Some(order) => order,
        None => {
            // A cycle here would mean a bad edge slipped past the
            // coordinator's cycle check; nothing more can be computed
            // safely, so leave the affected cells as they are.
            return;
        }
    };

    for coord in order {
        trace!("recomputing {}", coord_to_name(coord));
        let formula = grid.get(coord).formula.clone();
        let Some(formula_text) = formula else {
            continue;
        };
        let expr = match parser::parse(&formula_text) {
            Ok(expr) => expr,
            Err(_) => {
                // Unreachable in practice: only formulas that already
                // parsed successfully are ever installed on a cell.
                mark_error(grid, coord);
                continue;
            }
        };
        if !apply_result(grid, coord, &expr) {
            warn!(
                "recomputation aborted at {}: invalid range or out-of-bounds reference",
                coord_to_name(coord)
            );
            return;
        }
    }
}

/// Applies one cell's evaluation result. Returns `false` when the
/// recomputation pass must stop here.
fn apply_result(grid: &mut Grid, coord: CellCoord, expr: &Expr) -> bool {
    let result = Evaluator::new(grid).evaluate(expr);
    match result {
        Ok(value) => {
            let cell = grid.get_mut(coord);
            cell.value = value;
            cell.status = CellStatus::Ok;
            true
        }
        Err(EvalError::DivByZero) | Err(EvalError::DependencyError) => {
            mark_error(grid, coord);
            true
        }
        Err(EvalError::RefOutOfBounds) | Err(EvalError::InvalidRange) => false,
    }
}

fn mark_error(grid: &mut Grid, coord: CellCoord) {
    let cell = grid.get_mut(coord);
    cell.value = 0;
    cell.status = CellStatus::Error;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depgraph::{add_edges, clear_forward_edges, extract_precedents};
    use std::collections::HashSet;

    fn assign(grid: &mut Grid, coord: CellCoord, formula: &str) {
        let expr = parser::parse(formula).unwrap();
        let precedents = extract_precedents(&expr);
        clear_forward_edges(grid, coord);
        add_edges(grid, coord, &precedents);
        grid.get_mut(coord).formula = Some(formula.to_string());
        apply_result(grid, coord, &expr);
    }

    #[test]
    fn cascades_through_a_chain() {
        let mut grid = Grid::new(1, 3);
        assign(&mut grid, (0, 0), "5");
        assign(&mut grid, (0, 1), "A1+1");
        assign(&mut grid, (0, 2), "B1+1");

        grid.get_mut((0, 0)).value = 10;
        recompute_from(&mut grid, (0, 0));

        assert_eq!(grid.get((0, 1)).value, 11);
        assert_eq!(grid.get((0, 2)).value, 12);
    }

    #[test]
    fn div_by_zero_marks_error_and_continues_downstream() {
        let mut grid = Grid::new(1, 3);
        assign(&mut grid, (0, 0), "0");
        assign(&mut grid, (0, 1), "10/A1");
        assign(&mut grid, (0, 2), "B1+1");

        recompute_from(&mut grid, (0, 0));

        assert_eq!(grid.get((0, 1)).status, CellStatus::Error);
        assert_eq!(grid.get((0, 2)).status, CellStatus::Error);
    }

    #[test]
    fn fixing_the_source_clears_downstream_errors() {
        let mut grid = Grid::new(1, 2);
        assign(&mut grid, (0, 0), "0");
        assign(&mut grid, (0, 1), "10/A1");
        recompute_from(&mut grid, (0, 0));
        assert_eq!(grid.get((0, 1)).status, CellStatus::Error);

        grid.get_mut((0, 0)).value = 2;
        recompute_from(&mut grid, (0, 0));
        assert_eq!(grid.get((0, 1)).status, CellStatus::Ok);
        assert_eq!(grid.get((0, 1)).value, 5);
    }

    #[test]
    fn unaffected_cells_are_left_untouched() {
        let mut grid = Grid::new(1, 3);
        assign(&mut grid, (0, 2), "99");
        let untouched_before = grid.get((0, 2)).value;
        recompute_from(&mut grid, (0, 0));
        assert_eq!(grid.get((0, 2)).value, untouched_before);
    }

    #[test]
    fn invalid_range_during_recompute_aborts_without_marking_error() {
        let mut grid = Grid::new(4, 1);
        assign(&mut grid, (0, 0), "1"); // A1
        assign(&mut grid, (1, 0), "A1+1"); // A2

        // Simulate a formula installed despite evaluating to InvalidRange
        // (the coordinator's commit-retention quirk): wire the formula
        // and edges directly, without ever calling apply_result.
        let reversed = parser::parse("SUM(A2:A1)").unwrap();
        let precedents = extract_precedents(&reversed);
        clear_forward_edges(&mut grid, (2, 0));
        add_edges(&mut grid, (2, 0), &precedents);
        grid.get_mut((2, 0)).formula = Some("SUM(A2:A1)".to_string());
        grid.get_mut((2, 0)).value = 42;
        grid.get_mut((2, 0)).status = CellStatus::Ok;

        assign(&mut grid, (3, 0), "A3+1"); // A4, depends on A3

        grid.get_mut((0, 0)).value = 5;
        recompute_from(&mut grid, (0, 0));

        assert_eq!(grid.get((1, 0)).value, 6);
        assert_eq!(grid.get((2, 0)).value, 42);
        assert_eq!(grid.get((2, 0)).status, CellStatus::Ok);
        assert_eq!(grid.get((3, 0)).value, 43);
    }

    #[test]
    fn empty_precedent_set_has_no_affected_cells() {
        let mut grid = Grid::new(1, 1);
        assign(&mut grid, (0, 0), "1");
        let affected: HashSet<CellCoord> = transitive_dependents(&grid, (0, 0));
        assert!(affected.is_empty());
    }
}
