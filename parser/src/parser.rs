//! FILENAME: parser/src/parser.rs
//! PURPOSE: Recursive-descent parser converting a token stream into an Expr.
//! CONTEXT: Second stage of the parsing pipeline.
//!
//! GRAMMAR:
//!   expr    := term   (('+'|'-') term)*
//!   term    := factor (('*'|'/') factor)*
//!   factor  := number | cellref | funcall | '(' expr ')'
//!   number  := '-'? digit+
//!   cellref := letter+ digit+
//!   funcall := ident '(' args ')'
//!   args    := expr                     (for SLEEP)
//!            | cellref ':' cellref      (for MIN|MAX|SUM|AVG|STDEV)
//!   ident   := letter+
//!
//! A unary minus is only ever the sign of a numeric literal: it is
//! recognized in `factor` position and nowhere else. `-A1`, `-(1+2)`,
//! and `-SUM(A1:A1)` are therefore not valid factors.

use log::trace;

use crate::ast::{BinaryOperator, Expr, RangeFunction, RawCellRef};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Lexer;
use crate::token::Token;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Parser { lexer, current }
    }

    /// Parses the entire input as a single expression; errors if any
    /// input remains afterward.
    pub fn parse(&mut self) -> ParseResult<Expr> {
        if self.current == Token::EOF {
            return Err(ParseError::Empty);
        }
        let expr = self.parse_expr()?;
        if self.current != Token::EOF {
            trace!("trailing token after expression: {}", self.current);
            return Err(ParseError::TrailingInput);
        }
        Ok(expr)
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken(format!(
                "expected {}, found {}",
                expected, self.current
            )))
        }
    }

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current {
                Token::Star => BinaryOperator::Mul,
                Token::Slash => BinaryOperator::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        match self.current.clone() {
            Token::Minus => {
                self.advance();
                match self.current {
                    Token::Number(n) => {
                        self.advance();
                        Ok(Expr::Number(n.wrapping_neg()))
                    }
                    _ => Err(ParseError::UnexpectedToken(
                        "'-' is only valid before a numeric literal".to_string(),
                    )),
                }
            }
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::CellRef(letters, row) => {
                self.advance();
                Ok(Expr::CellRef((letters, row)))
            }
            Token::Ident(name) => {
                self.advance();
                if self.current == Token::LParen {
                    self.parse_function_call(&name)
                } else {
                    Err(ParseError::UnexpectedToken(format!(
                        "bare identifier '{}' is not a cell reference or call",
                        name
                    )))
                }
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::Illegal(ch) => Err(ParseError::UnexpectedToken(format!(
                "illegal lexeme starting with '{}'",
                ch
            ))),
            Token::EOF => Err(ParseError::UnexpectedToken("end of input".to_string())),
            other => Err(ParseError::UnexpectedToken(format!("{}", other))),
        }
    }

    fn parse_function_call(&mut self, name: &str) -> ParseResult<Expr> {
        // Consume '('.
        self.advance();

        if let Some(func) = RangeFunction::from_name(name) {
            let start = self.parse_cellref()?;
            if self.current != Token::Colon {
                return Err(ParseError::MissingColon);
            }
            self.advance();
            let end = self.parse_cellref()?;
            self.expect(Token::RParen)?;
            return Ok(Expr::RangeCall { func, start, end });
        }

        if name == "SLEEP" {
            let arg = self.parse_expr()?;
            self.expect(Token::RParen)?;
            return Ok(Expr::Sleep(Box::new(arg)));
        }

        // Unknown function: soft-fail. Consume tokens up to the matching
        // ')' without attempting to parse their contents, so arbitrary
        // junk inside an unrecognized call never produces a syntax error.
        trace!("unrecognized function '{}' parsed as a no-op call", name);
        self.skip_balanced_parens()?;
        Ok(Expr::UnknownCall)
    }

    fn parse_cellref(&mut self) -> ParseResult<RawCellRef> {
        match self.current.clone() {
            Token::CellRef(letters, row) => {
                self.advance();
                Ok((letters, row))
            }
            _ => Err(ParseError::ExpectedCellRef),
        }
    }

    /// Having just consumed the call's opening '(', skips forward until
    /// the matching ')' (tracking nested parens) and consumes it too.
    fn skip_balanced_parens(&mut self) -> ParseResult<()> {
        let mut depth: u32 = 1;
        loop {
            match self.current {
                Token::EOF => return Err(ParseError::UnmatchedParen),
                Token::LParen => {
                    depth += 1;
                    self.advance();
                }
                Token::RParen => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => self.advance(),
            }
        }
    }
}

/// Parses a formula string directly, trimming surrounding whitespace
/// (the lexer already ignores it between tokens; this just documents
/// the contract for callers).
pub fn parse(input: &str) -> ParseResult<Expr> {
    Parser::new(input.trim()).parse()
}
