//! FILENAME: parser/src/ast.rs
//! PURPOSE: Defines the expression tree for formula grammar.
//! CONTEXT: The Parser converts a token stream from the Lexer into this
//! tree; `engine::evaluator` then walks it against a grid, and
//! `engine::depgraph` walks it to extract the cells it reads.
//!
//! A cell reference keeps the raw letters rather than a decoded column
//! index: the parser does not know the grid's dimensions (bounds are an
//! engine concern), and the letters' case is irrelevant until the name
//! codec decodes them.

/// A single cell reference's textual coordinates: column letters and a
/// 1-based row number, exactly as written in the formula.
pub type RawCellRef = (String, u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
        };
        write!(f, "{}", s)
    }
}

/// The five range-aggregate functions the grammar recognizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeFunction {
    Min,
    Max,
    Sum,
    Avg,
    Stdev,
}

impl RangeFunction {
    /// Resolves a case-sensitive, upper-case function name to its range
    /// function, if it is one of the five recognized.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MIN" => Some(RangeFunction::Min),
            "MAX" => Some(RangeFunction::Max),
            "SUM" => Some(RangeFunction::Sum),
            "AVG" => Some(RangeFunction::Avg),
            "STDEV" => Some(RangeFunction::Stdev),
            _ => None,
        }
    }
}

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An integer literal, sign already folded in.
    Number(i32),
    /// A single cell reference, e.g. `B12`.
    CellRef(RawCellRef),
    /// `left op right`.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// `MIN(A1:B2)`, `SUM(A1:A1)`, etc. -- the only place a range may
    /// appear in the grammar.
    RangeCall {
        func: RangeFunction,
        start: RawCellRef,
        end: RawCellRef,
    },
    /// `SLEEP(n)` -- the only function taking a general expression.
    Sleep(Box<Expr>),
    /// Any other `ident(...)` call: parsed permissively (balanced
    /// parens consumed without interpreting their contents) and always
    /// evaluates to 0. A deliberate soft-fail, preserved from the
    /// source this spec was distilled from.
    UnknownCall,
}
