//! FILENAME: engine/src/depgraph.rs
//! PURPOSE: Dependency-edge maintenance, cycle detection, and transitive
//! dependent collection over a grid's cells.
//! CONTEXT: Unlike a graph kept in a separate precedent/dependent map
//! keyed by coordinate, each cell carries its own `depends_on` and
//! `depended_by` sets directly -- the grid's cells *are* the graph. The
//! algorithms below (DFS reachability, Kahn's-algorithm topological
//! sort) are the same shape either way; only the storage differs.

use std::collections::{HashMap, HashSet, VecDeque};

use parser::Expr;

use crate::coord::CellCoord;
use crate::grid::Grid;

/// Removes every forward edge `cell -> p` for `p` in `cell`'s current
/// `depends_on`, updating each precedent's `depended_by` in step.
/// Called before installing a cell's new dependencies, so stale edges
/// from the previous formula never linger.
pub fn clear_forward_edges(grid: &mut Grid, cell: CellCoord) {
    let old_precedents: Vec<CellCoord> = grid.get(cell).depends_on.iter().copied().collect();
    for prec in old_precedents {
        grid.get_mut(prec).depended_by.remove(&cell);
    }
    grid.get_mut(cell).depends_on.clear();
}

/// Installs `cell -> precedent` edges for every entry in `precedents`,
/// maintaining the reverse `depended_by` side. Assumes forward edges
/// were already cleared by [`clear_forward_edges`].
pub fn add_edges(grid: &mut Grid, cell: CellCoord, precedents: &HashSet<CellCoord>) {
    for &prec in precedents {
        grid.get_mut(prec).depended_by.insert(cell);
    }
    grid.get_mut(cell).depends_on = precedents.clone();
}

/// Walks an expression tree and collects every cell coordinate it
/// reads from. Range corners are normalized (the lower corner first)
/// so a reversed range still contributes the correct rectangle of
/// precedents -- evaluation later re-validates corner order and
/// reports `InvalidRange` if it is still reversed; extraction's job is
/// only to get the dependency edges right.
pub fn extract_precedents(expr: &Expr) -> HashSet<CellCoord> {
    let mut out = HashSet::new();
    collect(expr, &mut out);
    out
}

fn collect(expr: &Expr, out: &mut HashSet<CellCoord>) {
    match expr {
        Expr::Number(_) => {}
        Expr::CellRef((letters, row)) => {
            if let Some(col) = crate::coord::col_to_index(letters) {
                if *row >= 1 {
                    out.insert(((*row - 1) as usize, col));
                }
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            collect(left, out);
            collect(right, out);
        }
        Expr::RangeCall { start, end, .. } => {
            if let (Some(s), Some(e)) = (named_coord(start), named_coord(end)) {
                let (r0, r1) = (s.0.min(e.0), s.0.max(e.0));
                let (c0, c1) = (s.1.min(e.1), s.1.max(e.1));
                for r in r0..=r1 {
                    for c in c0..=c1 {
                        out.insert((r, c));
                    }
                }
            }
        }
        Expr::Sleep(inner) => collect(inner, out),
        Expr::UnknownCall => {}
    }
}

fn named_coord(raw: &parser::RawCellRef) -> Option<CellCoord> {
    let (letters, row) = raw;
    if *row == 0 {
        return None;
    }
    crate::coord::col_to_index(letters).map(|col| ((*row - 1) as usize, col))
}

/// Returns `true` if adding edges `cell -> p` for every `p` in
/// `precedents` would create a cycle, without mutating the grid.
/// `cell` depending on itself is the trivial case; otherwise this is a
/// DFS from each candidate precedent, following existing `depends_on`
/// edges, looking for a path back to `cell`.
pub fn would_cycle(grid: &Grid, cell: CellCoord, precedents: &HashSet<CellCoord>) -> bool {
    if precedents.contains(&cell) {
        return true;
    }
    precedents.iter().any(|&p| can_reach(grid, p, cell))
}

fn can_reach(grid: &Grid, start: CellCoord, target: CellCoord) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        for &prec in &grid.get(current).depends_on {
            if !visited.contains(&prec) {
                stack.push(prec);
            }
        }
    }
    false
}

/// Collects every cell transitively reachable from `root` by following
/// `depended_by` edges -- i.e. everything that (directly or
/// indirectly) reads from `root`. `root` itself is not included.
pub fn transitive_dependents(grid: &Grid, root: CellCoord) -> HashSet<CellCoord> {
    let mut result = HashSet::new();
    let mut queue: VecDeque<CellCoord> = grid.get(root).depended_by.iter().copied().collect();
    while let Some(current) = queue.pop_front() {
        if !result.insert(current) {
            continue;
        }
        for &dep in &grid.get(current).depended_by {
            if !result.contains(&dep) {
                queue.push_back(dep);
            }
        }
    }
    result
}

/// Orders `cells` (a subset of the grid) so that every cell appears
/// after all of its precedents that are also in the subset, using
/// Kahn's algorithm. Returns `None` if the subset contains a cycle --
/// which should not happen for a subset collected by
/// [`transitive_dependents`] from a graph that passed [`would_cycle`]
/// checks on every edge it contains, but the caller still treats it as
/// a defensive signal rather than assuming it away.
pub fn topological_order(grid: &Grid, cells: &HashSet<CellCoord>) -> Option<Vec<CellCoord>> {
    let mut in_degree: HashMap<CellCoord, usize> = cells.iter().map(|&c| (c, 0)).collect();
    for &cell in cells {
        for prec in &grid.get(cell).depends_on {
            if cells.contains(prec) {
                *in_degree.get_mut(&cell).unwrap() += 1;
            }
        }
    }

    let mut queue: VecDeque<CellCoord> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&c, _)| c)
        .collect();

    let mut order = Vec::with_capacity(cells.len());
    while let Some(cell) = queue.pop_front() {
        order.push(cell);
        for &dep in &grid.get(cell).depended_by {
            if let Some(deg) = in_degree.get_mut(&dep) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(dep);
                }
            }
        }
    }

    if order.len() == cells.len() {
        Some(order)
    } else {
        None
    }
}
