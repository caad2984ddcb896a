use log::debug;
use serde::Serialize;
use std::fmt;
use std::mem;

/// Declares `TokenType` together with its `name()` table so the two can't
/// drift apart.  Literal categories carry their decoded value.
macro_rules! token_types {
    (
        literals { $($lit:ident($payload:ty)),* $(,)? }
        plain { $($plain:ident),* $(,)? }
    ) => {
        /// Closed lexical category of a [`Token`].
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Serialize)]
        pub enum TokenType {
            $($lit($payload),)*
            $($plain,)*
        }

        impl TokenType {
            /// Upper-case category name without payload, as shown by `tokenize`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(TokenType::$lit(_) => stringify!($lit),)*
                    $(TokenType::$plain => stringify!($plain),)*
                }
            }
        }
    };
}

token_types! {
    literals {
        STRING(String),
        NUMBER(f64),
    }

    plain {
        // punctuation
        LEFT_PAREN, RIGHT_PAREN, LEFT_BRACE, RIGHT_BRACE, LEFT_BRACKET, RIGHT_BRACKET,
        COMMA, DOT, MINUS, PLUS, SEMICOLON, SLASH, STAR,

        // one or two characters
        BANG, BANG_EQUAL, EQUAL, EQUAL_EQUAL,
        GREATER, GREATER_EQUAL, LESS, LESS_EQUAL,

        IDENTIFIER,

        // keywords; `class`, `super` and `this` are reserved only
        AND, CLASS, ELSE, FALSE, FUN, FOR, IF, NIL, OR,
        PRINT, RETURN, SUPER, THIS, TRUE, VAR, WHILE,

        EOF,
    }
}

/// Categories compare equal regardless of literal payload.
impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// One lexeme of source.  Tokens own their text so an AST built from them
/// outlives the buffer it was scanned from (the REPL drops each line).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    /// 1-based.
    pub line: usize,
}

impl Token {
    pub fn new<S: Into<String>>(token_type: TokenType, lexeme: S, line: usize) -> Self {
        let token = Self {
            token_type,
            lexeme: lexeme.into(),
            line,
        };

        debug!("New token {:?} on line {}", token.token_type, token.line);

        token
    }
}

/// `TYPE lexeme literal`, with `null` standing in for a missing literal and
/// integral numbers keeping a `.0` suffix.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.token_type.name();

        match &self.token_type {
            TokenType::STRING(text) => write!(f, "{} {} {}", kind, self.lexeme, text),

            TokenType::NUMBER(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                let mut digits = itoa::Buffer::new();

                write!(f, "{} {} {}.0", kind, self.lexeme, digits.format(*n as i64))
            }

            TokenType::NUMBER(n) => write!(f, "{} {} {}", kind, self.lexeme, n),

            _ => write!(f, "{} {} null", kind, self.lexeme),
        }
    }
}
