//! FILENAME: engine/src/evaluator.rs
//! PURPOSE: Evaluates a parsed formula expression against a grid.
//! CONTEXT: Arithmetic wraps on overflow rather than panicking, since
//! there is no floating point to fall back to and the grid must always
//! produce *some* i32. A cell reference into an errored cell is not
//! itself an error at the arithmetic level -- it surfaces as
//! `DependencyError` so the caller can tell "this formula is broken"
//! apart from "a cell I read from is broken".

use parser::{BinaryOperator, Expr, RangeFunction};

use crate::coord::col_to_index;
use crate::error::EvalError;
use crate::grid::Grid;

pub struct Evaluator<'a> {
    grid: &'a Grid,
}

impl<'a> Evaluator<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Evaluator { grid }
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<i32, EvalError> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::CellRef(raw) => self.read_cell(raw),
            Expr::BinaryOp { left, op, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                self.apply(*op, l, r)
            }
            Expr::RangeCall { func, start, end } => self.evaluate_range(*func, start, end),
            Expr::Sleep(inner) => {
                let n = self.evaluate(inner)?;
                if n > 0 {
                    std::thread::sleep(std::time::Duration::from_secs(n as u64));
                }
                Ok(n)
            }
            Expr::UnknownCall => Ok(0),
        }
    }

    fn apply(&self, op: BinaryOperator, l: i32, r: i32) -> Result<i32, EvalError> {
        Ok(match op {
            BinaryOperator::Add => l.wrapping_add(r),
            BinaryOperator::Sub => l.wrapping_sub(r),
            BinaryOperator::Mul => l.wrapping_mul(r),
            BinaryOperator::Div => {
                if r == 0 {
                    return Err(EvalError::DivByZero);
                }
                l.wrapping_div(r)
            }
        })
    }

    fn read_cell(&self, raw: &parser::RawCellRef) -> Result<i32, EvalError> {
        let coord = self.resolve(raw)?;
        let cell = self.grid.get(coord);
        if cell.status == crate::cell::CellStatus::Error {
            return Err(EvalError::DependencyError);
        }
        Ok(cell.value)
    }

    fn resolve(&self, raw: &parser::RawCellRef) -> Result<(usize, usize), EvalError> {
        let (letters, row) = raw;
        if *row == 0 {
            return Err(EvalError::RefOutOfBounds);
        }
        let col = col_to_index(letters).ok_or(EvalError::RefOutOfBounds)?;
        let coord = ((*row - 1) as usize, col);
        if !self.grid.in_bounds(coord) {
            return Err(EvalError::RefOutOfBounds);
        }
        Ok(coord)
    }

    fn evaluate_range(
        &self,
        func: RangeFunction,
        start: &parser::RawCellRef,
        end: &parser::RawCellRef,
    ) -> Result<i32, EvalError> {
        let start = self.resolve(start)?;
        let end = self.resolve(end)?;
        if start.0 > end.0 || start.1 > end.1 {
            return Err(EvalError::InvalidRange);
        }

        let mut values = Vec::new();
        for r in start.0..=end.0 {
            for c in start.1..=end.1 {
                let cell = self.grid.get((r, c));
                if cell.status == crate::cell::CellStatus::Error {
                    return Err(EvalError::DependencyError);
                }
                values.push(cell.value as i64);
            }
        }

        let result = match func {
            RangeFunction::Min => *values.iter().min().unwrap(),
            RangeFunction::Max => *values.iter().max().unwrap(),
            RangeFunction::Sum => values.iter().sum(),
            RangeFunction::Avg => values.iter().sum::<i64>() / values.len() as i64,
            RangeFunction::Stdev => population_stdev(&values),
        };

        Ok(result as i32)
    }
}

/// Population standard deviation using a truncated integer mean, but a
/// real-valued division when averaging the squared deviations -- matching
/// the source's `double variance; variance /= count;` -- rounded to the
/// nearest integer (half away from zero).
fn population_stdev(values: &[i64]) -> i64 {
    let n = values.len() as i64;
    let mean = values.iter().sum::<i64>() / n;
    let sum_sq: i64 = values.iter().map(|v| (v - mean).pow(2)).sum();
    let variance = sum_sq as f64 / n as f64;
    variance.sqrt().round() as i64
}
