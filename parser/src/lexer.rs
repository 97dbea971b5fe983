//! FILENAME: parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: First stage of the parsing pipeline. Handles whitespace
//! skipping, integer literals, and identifiers -- including the
//! letters-immediately-followed-by-digits shape that denotes a cell
//! reference.

use crate::token::Token;
use std::iter::Peekable;
use std::str::Chars;

/// Identifiers longer than this are rejected as malformed.
const MAX_LEXEME_LEN: usize = 32;

/// Digit runs longer than this are rejected before ever reaching
/// `str::parse`, so a numeric literal or a cell reference's row number
/// can never overflow `i32`/`u32` silently. Nine digits is one below
/// `i32::MAX`'s ten, which is enough headroom for every value that can
/// actually parse.
const MAX_DIGIT_LEN: usize = 9;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.input.next() {
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Star,
            Some('/') => Token::Slash,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,
            Some(':') => Token::Colon,

            Some(ch) if ch.is_ascii_digit() => self.read_number(ch),
            Some(ch) if ch.is_ascii_alphabetic() => self.read_ident_or_cellref(ch),

            None => Token::EOF,
            Some(ch) => Token::Illegal(ch),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.input.next();
        }
    }

    fn read_number(&mut self, first_digit: char) -> Token {
        let mut digits = String::from(first_digit);
        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() && digits.len() < MAX_DIGIT_LEN {
                digits.push(ch);
                self.input.next();
            } else {
                break;
            }
        }
        match digits.parse::<i32>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Illegal(digits.chars().next().unwrap_or('0')),
        }
    }

    /// Reads a letter run, and if digits follow with no intervening
    /// whitespace, consumes them too and emits a `CellRef`.
    fn read_ident_or_cellref(&mut self, first_letter: char) -> Token {
        let mut letters = String::from(first_letter);
        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_alphabetic() {
                if letters.len() >= MAX_LEXEME_LEN {
                    // Keep consuming the rest of the run so the illegal
                    // token's length reflects the whole oversized lexeme
                    // rather than leaving a dangling tail for next_token.
                    while matches!(self.input.peek(), Some(c) if c.is_ascii_alphabetic()) {
                        self.input.next();
                    }
                    return Token::Illegal(first_letter);
                }
                letters.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        match self.input.peek() {
            Some(&ch) if ch.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&ch) = self.input.peek() {
                    if ch.is_ascii_digit() && digits.len() < MAX_DIGIT_LEN {
                        digits.push(ch);
                        self.input.next();
                    } else {
                        break;
                    }
                }
                match digits.parse::<u32>() {
                    Ok(row) => Token::CellRef(letters, row),
                    Err(_) => Token::Illegal(digits.chars().next().unwrap_or('0')),
                }
            }
            _ => Token::Ident(letters),
        }
    }
}
