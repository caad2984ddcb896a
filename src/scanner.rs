//! Streaming lexer for Pulse source text.
//!
//! [`Scanner`] walks the UTF-8 bytes of a borrowed `&str` once and yields
//! `Result<Token, PulseError>` items.  A bad character produces an `Err` item
//! and scanning carries on, so a single pass reports every lexical problem.
//! Exactly one `EOF` token closes the stream, after which the iterator is
//! fused.
//!
//! ```rust
//! use pulse::scanner::Scanner;
//!
//! let kinds: Vec<&str> = Scanner::new("print 1; // done")
//!     .filter_map(Result::ok)
//!     .map(|t| t.token_type.name())
//!     .collect();
//!
//! assert_eq!(kinds, ["PRINT", "NUMBER", "SEMICOLON", "EOF"]);
//! ```

use std::iter::FusedIterator;

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::error::{PulseError, Result};
use crate::token::{Token, TokenType};

/// Reserved words.  `function` is an alternate spelling of `fun`.
static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and" => TokenType::AND,
    b"class" => TokenType::CLASS,
    b"else" => TokenType::ELSE,
    b"false" => TokenType::FALSE,
    b"for" => TokenType::FOR,
    b"fun" => TokenType::FUN,
    b"function" => TokenType::FUN,
    b"if" => TokenType::IF,
    b"nil" => TokenType::NIL,
    b"or" => TokenType::OR,
    b"print" => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super" => TokenType::SUPER,
    b"this" => TokenType::THIS,
    b"true" => TokenType::TRUE,
    b"var" => TokenType::VAR,
    b"while" => TokenType::WHILE,
};

pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// Next unread byte.
    pos: usize,
    line: usize,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        info!("Scanning {} bytes of source", source.len());

        Self {
            source,
            bytes: source.as_bytes(),
            start: 0,
            pos: 0,
            line: 1,
            finished: false,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Byte `offset` positions ahead of the cursor, or `0` past the end.
    fn look(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn bump(&mut self) -> u8 {
        let b = self.bytes[self.pos];
        self.pos += 1;
        b
    }

    /// Picks `double` and consumes `second` if it comes next, else `single`.
    fn either(&mut self, second: u8, double: TokenType, single: TokenType) -> TokenType {
        if self.look(0) == second {
            self.pos += 1;
            double
        } else {
            single
        }
    }

    /// Skips whitespace and `//` comments, counting newlines.
    fn skip_trivia(&mut self) {
        while !self.at_end() {
            match self.look(0) {
                b' ' | b'\r' | b'\t' => self.pos += 1,

                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }

                b'/' if self.look(1) == b'/' => {
                    // Leave the newline itself for the arm above.
                    self.pos = match memchr(b'\n', &self.bytes[self.pos..]) {
                        Some(offset) => self.pos + offset,
                        None => self.bytes.len(),
                    };
                }

                _ => return,
            }
        }
    }

    /// Scans the lexeme starting at `self.start`.
    fn scan_token(&mut self) -> Result<TokenType> {
        let kind = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b'[' => TokenType::LEFT_BRACKET,
            b']' => TokenType::RIGHT_BRACKET,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,
            b'/' => TokenType::SLASH,

            b'!' => self.either(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.word(),

            other => {
                // Step over the whole code point, not just its first byte.
                let ch = self.source[self.start..]
                    .chars()
                    .next()
                    .unwrap_or(other as char);
                self.pos = self.start + ch.len_utf8();

                return Err(PulseError::lex(
                    self.line,
                    format!("Unexpected character: {}", ch),
                ));
            }
        };

        Ok(kind)
    }

    /// Body of a `"..."` literal; the opening quote is already consumed.
    /// Newlines are allowed inside.
    fn string(&mut self) -> Result<TokenType> {
        while !self.at_end() && self.look(0) != b'"' {
            if self.bump() == b'\n' {
                self.line += 1;
            }
        }

        if self.at_end() {
            return Err(PulseError::lex(self.line, "Unterminated string."));
        }

        self.pos += 1;

        let body = &self.source[self.start + 1..self.pos - 1];

        Ok(TokenType::STRING(body.to_string()))
    }

    /// `123` or `1.5`; a dot needs a digit on both sides to belong here.
    fn number(&mut self) -> TokenType {
        while self.look(0).is_ascii_digit() {
            self.pos += 1;
        }

        if self.look(0) == b'.' && self.look(1).is_ascii_digit() {
            self.pos += 1;

            while self.look(0).is_ascii_digit() {
                self.pos += 1;
            }
        }

        let text = &self.source[self.start..self.pos];

        // Only ASCII digits with an optional single dot reach here.
        TokenType::NUMBER(text.parse().unwrap_or(0.0))
    }

    fn word(&mut self) -> TokenType {
        while matches!(self.look(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }

        KEYWORDS
            .get(&self.bytes[self.start..self.pos])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.skip_trivia();

        if self.at_end() {
            self.finished = true;
            debug!("Reached end of source on line {}", self.line);

            return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
        }

        self.start = self.pos;

        // A string spanning lines is attributed to the line it ends on.
        let item = self.scan_token().map(|kind| {
            Token::new(kind, &self.source[self.start..self.pos], self.line)
        });

        Some(item)
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
