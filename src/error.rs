//! Centralised error hierarchy for the **Pulse interpreter**.
//!
//! All subsystems (scanner, parser, runtime, CLI) convert their internal
//! failure modes into one of the variants defined here.  This gives a uniform
//! `Result<T>` alias throughout the crate and ergonomic inter‑operation with
//! `anyhow` in the binary, while still preserving the line and location detail
//! the host needs to format diagnostics.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PulseError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `location` is either empty, ` at end`
    /// or ` at 'lexeme'`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error, attributed to the triggering token's line.
    #[error("[line {line}] Runtime Error: {message}")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl PulseError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        PulseError::Lex { message, line }
    }

    /// Helper constructor for the **parser**; derives the location context
    /// from the offending token.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        let location: String = if token.token_type == TokenType::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };

        info!(
            "Creating Parse error: line={}, location={}, msg={}",
            token.line, location, message
        );

        PulseError::Parse {
            message,
            location,
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        PulseError::Runtime {
            message,
            line: token.line,
        }
    }

    /// Source line the error is attributed to, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            PulseError::Lex { line, .. }
            | PulseError::Parse { line, .. }
            | PulseError::Runtime { line, .. } => Some(*line),
            PulseError::Io(_) | PulseError::Utf8(_) => None,
        }
    }

    /// The bare message without line or location decoration.
    pub fn message(&self) -> String {
        match self {
            PulseError::Lex { message, .. }
            | PulseError::Parse { message, .. }
            | PulseError::Runtime { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, PulseError>;
