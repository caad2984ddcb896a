//! Abstract syntax tree for Pulse programs.
//!
//! Both node families are closed sum types: the grammar is fixed, and the
//! interpreter evaluates each family with one exhaustive `match`.  Every node
//! exclusively owns its children, so a parsed program is a strict tree.  The
//! only shared piece is [`FunctionDecl`], which sits behind an `Rc` so that a
//! runtime function value can point at its declaration without copying it.

use std::rc::Rc;

use serde::Serialize;

use crate::token::Token;

/// A **literal constant** that appears directly in the source code.
///
/// The parser converts the token payload at parse‑time, so literal leaves do
/// not retain the originating [`Token`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal.
    Nil,
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Variable access, resolved through the scope chain at runtime.
    Variable(Token),

    /// Assignment to an existing binding: `identifier "=" expression`.
    Assign { name: Token, value: Box<Expr> },

    /// Infix binary operator expression, e.g. `a + b`, `x <= y`.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Prefix unary operator expression, e.g. `!ready` or `-42`.
    Unary { operator: Token, right: Box<Expr> },

    /// Function call, e.g. `clock()` or `add(1, 2)`.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token, retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    /// Array literal `[a, b, c]`.  `[]` yields an empty element list.
    Array { bracket: Token, elements: Vec<Expr> },

    /// Indexed read `object[index]`.
    Subscript {
        object: Box<Expr>,
        /// The closing `]` token.
        bracket: Token,
        index: Box<Expr>,
    },

    /// Indexed write `object[index] = value`.
    Set {
        object: Box<Expr>,
        bracket: Token,
        index: Box<Expr>,
        value: Box<Expr>,
    },
}

/// A named function declaration: `fun name(params) { body }`.
#[derive(Debug, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a sequence
/// of these nodes returned by [`crate::parser::Parser::parse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.  `for` loops are desugared into this at parse time.
    While { condition: Expr, body: Box<Stmt> },

    /// Function declaration; becomes a first‑class callable when executed.
    Function(Rc<FunctionDecl>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token.
        keyword: Token,

        /// Optional expression to return.  Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },
}
